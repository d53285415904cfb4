//! The `build files:` report.
//!
//! One block per classified source module: the name padded to the available
//! width, then a right-aligned `[build]` or `[ignore]` tag. Long names wrap
//! onto right-aligned continuation lines and only the last line carries the
//! tag.

use std::io::{self, Write};

use console::Term;

use crate::core::source::SourceEntry;

/// Width assumed when the terminal width is unknown.
pub const DEFAULT_COLUMNS: usize = 120;

const HEADER: &str = "build files:";
const PREFIX: &str = "  ";
const TAG_WIDTH: usize = 10;
const TAG_BUILD: &str = "[build]";
const TAG_IGNORE: &str = "[ignore]";

const GREEN: &str = "\x1B[32m";
const YELLOW: &str = "\x1B[33m";
const GRAY: &str = "\x1B[38;5;8m";
const RESET: &str = "\x1B[0m";

/// Report width: `$COLUMNS`, then the width of the terminal on stdout, then
/// [`DEFAULT_COLUMNS`].
pub fn terminal_columns() -> usize {
    let detected = Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| cols as usize);
    pick_columns(std::env::var("COLUMNS").ok().as_deref(), detected)
}

fn pick_columns(env: Option<&str>, detected: Option<usize>) -> usize {
    env.and_then(|v| v.trim().parse::<usize>().ok())
        .or(detected)
        .filter(|&c| c > 0)
        .unwrap_or(DEFAULT_COLUMNS)
}

/// Write the report for `entries` to `out`.
pub fn write_file_report<W: Write>(
    out: &mut W,
    entries: &[SourceEntry],
    columns: usize,
    color: bool,
) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;

    let name_width = columns.saturating_sub(PREFIX.len() + TAG_WIDTH);
    let chunk_width = name_width.saturating_sub(1).max(1);

    for entry in entries {
        let (tag, tag_color, name_color) = if entry.ignored {
            (TAG_IGNORE, YELLOW, GRAY)
        } else {
            (TAG_BUILD, GREEN, "")
        };

        let lines = chunk(&entry.path, chunk_width);
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            let name = if i == 0 {
                format!("{:<width$}", line, width = name_width)
            } else {
                format!("{:>width$}", line, width = name_width)
            };

            let mut row = String::from(PREFIX);
            if color {
                row.push_str(name_color);
            }
            row.push_str(&name);
            if i == last {
                if color {
                    row.push_str(tag_color);
                }
                row.push_str(&format!("{:>width$}", tag, width = TAG_WIDTH));
            }
            if color {
                row.push_str(RESET);
            }
            writeln!(out, "{}", row)?;
        }
    }

    Ok(())
}

/// Split `name` into pieces of at most `width` characters.
fn chunk(name: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    chars
        .chunks(width)
        .map(|piece| piece.iter().collect())
        .collect()
}
