//! Plain-text report sections.

use std::io::{self, Write};
use std::path::Path;

const SEPARATOR_WIDTH: usize = 80;

/// One suspect function and the patch proposed for it.
pub struct Section<'a> {
    pub path: &'a Path,
    pub function: &'a str,
    pub original: &'a str,
    pub patched: &'a str,
}

pub fn write_section<W: Write>(out: &mut W, section: &Section<'_>) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH))?;
    writeln!(out, "[FILE] {}", section.path.display())?;
    writeln!(out, "[SUSPECT] {}", section.function)?;
    writeln!(out, "Original:")?;
    writeln!(out, "{}", section.original)?;
    writeln!(out)?;
    writeln!(out, "Patched:")?;
    writeln!(out, "{}", section.patched)?;
    writeln!(out)
}
