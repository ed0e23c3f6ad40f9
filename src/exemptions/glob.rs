use regex::Regex;

/// Shell-style wildcard pattern (`*`, `?`, `[seq]`, `[!seq]`) matched against
/// the whole input. Case-sensitive.
#[derive(Debug, Clone)]
pub struct Glob {
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&translate(pattern))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^(?s:");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // collapse runs of '*'
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end]));
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push_str(")$");
    out
}

/// Index of the `]` closing a class that opens just before `start`.
/// A `]` right after `[` or `[!` is a literal member.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn translate_class(members: &[char]) -> String {
    let (negated, members) = match members.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, members),
    };

    let escape = |c: char| regex::escape(c.encode_utf8(&mut [0; 4]));
    let mut body = String::new();
    let mut i = 0;
    while i < members.len() {
        match members.get(i..i + 3) {
            Some(&[lo, '-', hi]) => {
                // reversed ranges are empty
                if lo <= hi {
                    body.push_str(&format!("{}-{}", escape(lo), escape(hi)));
                }
                i += 3;
            }
            _ => {
                body.push_str(&escape(members[i]));
                i += 1;
            }
        }
    }

    match (body.is_empty(), negated) {
        (true, false) => r"[^\s\S]".to_owned(),
        (true, true) => ".".to_owned(),
        (false, false) => format!("[{}]", body),
        (false, true) => format!("[^{}]", body),
    }
}
