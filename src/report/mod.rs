//! Console rendering of a comparison.

use std::io::{self, Write};

use crate::diff::{Comparison, DiffLine};

const RULE_WIDTH: usize = 40;

/// ANSI escape codes; all empty when colour is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub green: &'static str,
    pub red: &'static str,
    pub cyan: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        if color {
            Self {
                green: "\x1b[92m",
                red: "\x1b[91m",
                cyan: "\x1b[96m",
                bold: "\x1b[1m",
                reset: "\x1b[0m",
            }
        } else {
            Self { green: "", red: "", cyan: "", bold: "", reset: "" }
        }
    }

    fn for_line(&self, line: &DiffLine) -> &'static str {
        match line {
            DiffLine::Added(_) | DiffLine::ToFile(_) => self.green,
            DiffLine::Removed(_) | DiffLine::FromFile(_) => self.red,
            DiffLine::Hunk { .. } => self.cyan,
            DiffLine::Context(_) => "",
        }
    }
}

/// Verdict, optional detailed diff, and summary counts.
pub fn render<W: Write>(comparison: &Comparison, simplified: bool, palette: &Palette, out: &mut W) -> io::Result<()> {
    let p = palette;
    if comparison.equal {
        return writeln!(out, "{}✅ Configurations match.{}", p.green, p.reset);
    }

    writeln!(out, "{}❌ Configurations do not match.{}", p.red, p.reset)?;

    if let Some(diff) = comparison.diff.as_ref().filter(|_| !simplified) {
        writeln!(out, "{}List of detailed differences:{}", p.cyan, p.reset)?;
        for line in diff.iter() {
            match p.for_line(line) {
                "" => writeln!(out, "{}", line)?,
                color => writeln!(out, "{}{}{}", color, line, p.reset)?,
            }
        }
    }

    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{}", rule)?;
    writeln!(out, "{}Summary of differences:{}", p.bold, p.reset)?;
    writeln!(out, "  Lines added:    {}{}{}", p.green, comparison.added, p.reset)?;
    writeln!(out, "  Lines removed:  {}{}{}", p.red, comparison.removed, p.reset)?;
    writeln!(out, "{}", rule)
}
