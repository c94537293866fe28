//! Plain-text table descriptions.

use std::io::{self, Write};

use crate::processor::ProcessorInfo;

/// Width of the banner rules framing a description.
pub const BANNER_WIDTH: usize = 80;

/// Formats the description of a table as lines of text.
///
/// The table's name and documentation are framed by `=` rules. With `full`
/// set and at least one post-processor, a `-`-framed block listing each
/// processor's name and documentation is inserted before the closing rule.
pub fn describe_lines(
    name: &str,
    doc: &str,
    processors: &[ProcessorInfo],
    full: bool,
) -> Vec<String> {
    let double = "=".repeat(BANNER_WIDTH);
    let single = "-".repeat(BANNER_WIDTH);

    let mut message = vec![double.clone(), format!("{name}:"), doc.to_string()];
    if full && !processors.is_empty() {
        message.push(single.clone());
        message.push("Post processors:".to_string());
        message.push(single);
        for processor in processors {
            message.push(format!(">   {}:", processor.name));
            message.push(format!("    {}", processor.doc));
            message.push(String::new());
        }
    }
    message.push(double);
    message.push(String::new());
    message
}

/// Writes `lines` to `out`, one per line.
pub fn write_lines(out: &mut dyn Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
