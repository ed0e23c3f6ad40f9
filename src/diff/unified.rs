use std::fmt;
use std::ops::Range;

/// Unchanged lines shown around each change.
pub const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    FromFile(String),
    ToFile(String),
    Hunk {
        old_start: usize,
        old_len: usize,
        new_start: usize,
        new_len: usize,
    },
    Context(String),
    Removed(String),
    Added(String),
}

impl DiffLine {
    /// File and hunk markers, as opposed to content lines.
    pub fn is_header(&self) -> bool {
        matches!(self, DiffLine::FromFile(_) | DiffLine::ToFile(_) | DiffLine::Hunk { .. })
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::FromFile(name) => write!(f, "--- {}", name),
            DiffLine::ToFile(name) => write!(f, "+++ {}", name),
            DiffLine::Hunk { old_start, old_len, new_start, new_len } => write!(
                f,
                "@@ -{} +{} @@",
                format_range(*old_start, *old_len),
                format_range(*new_start, *new_len)
            ),
            DiffLine::Context(line) => write!(f, " {}", line),
            DiffLine::Removed(line) => write!(f, "-{}", line),
            DiffLine::Added(line) => write!(f, "+{}", line),
        }
    }
}

/// `start` is zero-based; output follows the classic unified range format.
fn format_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Rendered unified diff between two line sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDiff {
    lines: Vec<DiffLine>,
}

impl UnifiedDiff {
    pub fn new<S: AsRef<str>>(old: &[S], new: &[S], from: &str, to: &str, context: usize) -> Self {
        let script = edit_script(old, new);
        let mut lines = Vec::new();

        let hunks = group(&script, context);
        if !hunks.is_empty() {
            lines.push(DiffLine::FromFile(from.to_owned()));
            lines.push(DiffLine::ToFile(to.to_owned()));
        }

        // cursor[k] = (old, new) lines consumed before script[k]
        let mut cursor = Vec::with_capacity(script.len() + 1);
        let (mut o, mut n) = (0, 0);
        for edit in &script {
            cursor.push((o, n));
            match edit {
                Edit::Equal(..) => {
                    o += 1;
                    n += 1;
                }
                Edit::Delete(_) => o += 1,
                Edit::Insert(_) => n += 1,
            }
        }
        cursor.push((o, n));

        for hunk in hunks {
            let (old_start, new_start) = cursor[hunk.start];
            let (old_end, new_end) = cursor[hunk.end];
            lines.push(DiffLine::Hunk {
                old_start,
                old_len: old_end - old_start,
                new_start,
                new_len: new_end - new_start,
            });
            for edit in &script[hunk] {
                lines.push(match *edit {
                    Edit::Equal(i, _) => DiffLine::Context(old[i].as_ref().to_owned()),
                    Edit::Delete(i) => DiffLine::Removed(old[i].as_ref().to_owned()),
                    Edit::Insert(j) => DiffLine::Added(new[j].as_ref().to_owned()),
                });
            }
        }

        Self { lines }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn added(&self) -> usize {
        self.lines.iter().filter(|l| matches!(l, DiffLine::Added(_))).count()
    }

    pub fn removed(&self) -> usize {
        self.lines.iter().filter(|l| matches!(l, DiffLine::Removed(_))).count()
    }
}

impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Largest LCS table built in one piece; bigger regions are split recursively
/// in linear space.
const MAX_TABLE_CELLS: usize = 1 << 22;

fn edit_script<S: AsRef<str>>(old: &[S], new: &[S]) -> Vec<Edit> {
    edit_script_within(old, new, MAX_TABLE_CELLS)
}

/// Shortest edit script over the region left after stripping the common
/// prefix and suffix. On ties deletions come first.
fn edit_script_within<S: AsRef<str>>(old: &[S], new: &[S], max_cells: usize) -> Vec<Edit> {
    let eq = |i: usize, j: usize| old[i].as_ref() == new[j].as_ref();

    let prefix = (0..old.len().min(new.len())).take_while(|&k| eq(k, k)).count();
    let suffix = (0..(old.len() - prefix).min(new.len() - prefix))
        .take_while(|&k| eq(old.len() - 1 - k, new.len() - 1 - k))
        .count();

    let (old_tail, new_tail) = (old.len() - suffix, new.len() - suffix);
    let (old_mid, new_mid) = (prefix..old_tail, prefix..new_tail);

    let mut script = Vec::with_capacity(old.len() + new.len());
    script.extend((0..prefix).map(|k| Edit::Equal(k, k)));
    if (old_mid.len() + 1).saturating_mul(new_mid.len() + 1) <= max_cells {
        table_script(&eq, old_mid, new_mid, &mut script);
    } else {
        split_script(&eq, old_mid, new_mid, &mut script);
    }
    script.extend((0..suffix).map(|k| Edit::Equal(old_tail + k, new_tail + k)));
    script
}

/// Full LCS table, walked front to back.
fn table_script<F>(eq: &F, old: Range<usize>, new: Range<usize>, script: &mut Vec<Edit>)
where
    F: Fn(usize, usize) -> bool,
{
    let (n, m) = (old.len(), new.len());
    let (oi, nj) = (old.start, new.start);
    let width = m + 1;
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if eq(oi + i, nj + j) {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if eq(oi + i, nj + j) {
            script.push(Edit::Equal(oi + i, nj + j));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            script.push(Edit::Delete(oi + i));
            i += 1;
        } else {
            script.push(Edit::Insert(nj + j));
            j += 1;
        }
    }
    script.extend((oi + i..old.end).map(Edit::Delete));
    script.extend((nj + j..new.end).map(Edit::Insert));
}

/// Hirschberg's divide and conquer: same script length as the table, two rows of memory.
fn split_script<F>(eq: &F, old: Range<usize>, new: Range<usize>, script: &mut Vec<Edit>)
where
    F: Fn(usize, usize) -> bool,
{
    if old.is_empty() || new.is_empty() {
        script.extend(old.map(Edit::Delete));
        script.extend(new.map(Edit::Insert));
        return;
    }

    if old.len() == 1 {
        let i = old.start;
        match new.clone().find(|&j| eq(i, j)) {
            Some(j) => {
                script.extend((new.start..j).map(Edit::Insert));
                script.push(Edit::Equal(i, j));
                script.extend((j + 1..new.end).map(Edit::Insert));
            }
            None => {
                script.push(Edit::Delete(i));
                script.extend(new.map(Edit::Insert));
            }
        }
        return;
    }

    let mid = old.start + old.len() / 2;
    let head = lcs_row(eq, (old.start..mid).collect(), new.clone(), false);
    let tail = lcs_row(eq, (mid..old.end).rev().collect(), new.clone(), true);
    // smallest split point on ties
    let cut = (0..=new.len())
        .rev()
        .max_by_key(|&k| head[k] + tail[k])
        .unwrap_or(0);

    split_script(eq, old.start..mid, new.start..new.start + cut, script);
    split_script(eq, mid..old.end, new.start + cut..new.end, script);
}

/// `row[k]` is the LCS length of `rows` against the first `k` lines of `new`,
/// or against the last `new.len() - k` lines when scanning backwards.
fn lcs_row<F>(eq: &F, rows: Vec<usize>, new: Range<usize>, backwards: bool) -> Vec<u32>
where
    F: Fn(usize, usize) -> bool,
{
    let m = new.len();
    let mut row = vec![0u32; m + 1];
    for i in rows {
        let mut diagonal = 0;
        for k in 1..=m {
            let j = if backwards { new.end - k } else { new.start + k - 1 };
            let above = row[k];
            row[k] = if eq(i, j) { diagonal + 1 } else { above.max(row[k - 1]) };
            diagonal = above;
        }
    }
    if backwards {
        row.reverse();
    }
    row
}

/// Script ranges of each hunk; changes separated by at most `2 * context`
/// equal lines share a hunk.
fn group(script: &[Edit], context: usize) -> Vec<Range<usize>> {
    let mut changes = script
        .iter()
        .enumerate()
        .filter(|(_, e)| !matches!(e, Edit::Equal(..)))
        .map(|(k, _)| k);

    let Some(first) = changes.next() else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    let (mut start, mut end) = (first, first);
    for k in changes {
        if k - end - 1 > 2 * context {
            spans.push((start, end));
            start = k;
        }
        end = k;
    }
    spans.push((start, end));

    spans
        .into_iter()
        .map(|(s, e)| s.saturating_sub(context)..(e + context + 1).min(script.len()))
        .collect()
}
