//! Canonical formatting of generated Go source.
//!
//! The renderer builds source with `\t` between the cells that gofmt would
//! align (field names and types, one-line function signatures and bodies).
//! [`CanonicalFormatter`] lays those cells out the way gofmt's tabwriter
//! does. [`GofmtCommand`] hands the buffer to a real `gofmt` instead.

use std::io::{Read, Write};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Spaces added after the widest cell of a column.
const PADDING: usize = 1;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{line}:{column}: unexpected '{found}'")]
    Unbalanced {
        line: usize,
        column: usize,
        found: char,
    },
    #[error("{line}:{column}: '{open}' is never closed")]
    Unclosed {
        line: usize,
        column: usize,
        open: char,
    },
    #[error("cannot run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} rejected the source: {message}")]
    Rejected { program: String, message: String },
}

/// Final formatting stage of the renderer.
pub trait SourceFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

// ============================================================================
// CANONICAL FORMATTER
// ============================================================================

/// Built-in formatter producing gofmt-compatible layout for generated code.
///
/// Its output is a fixed point: formatting it again changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl SourceFormatter for CanonicalFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        check_balance(source)?;

        let mut lines: Vec<&str> = Vec::new();
        for line in source.lines().map(str::trim_end) {
            let blank = line.is_empty();
            if blank && lines.last().map_or(true, |prev| prev.is_empty()) {
                continue;
            }
            lines.push(line);
        }
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        let mut out = String::with_capacity(source.len());
        let mut start = 0;
        while start < lines.len() {
            let indent = indentation(lines[start]);
            let end = lines[start..]
                .iter()
                .position(|line| indentation(line) != indent || line.is_empty())
                .map_or(lines.len(), |offset| start + offset)
                .max(start + 1);
            write_block(&mut out, &lines[start..end], indent);
            start = end;
        }
        Ok(out)
    }
}

fn indentation(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b'\t').count()
}

/// Writes lines sharing one indentation, aligning their cells.
fn write_block(out: &mut String, lines: &[&str], indent: usize) {
    let cells: Vec<Vec<&str>> = lines
        .iter()
        .map(|line| line[indent..].split('\t').collect())
        .collect();
    let mut widths: Vec<Vec<usize>> = cells.iter().map(|c| vec![0; c.len()]).collect();
    layout(&cells, 0, cells.len(), 0, &mut widths);

    for (row, line_widths) in cells.iter().zip(&widths) {
        let mut line = "\t".repeat(indent);
        let last = row.len() - 1;
        for (column, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if column < last {
                let pad = line_widths[column].saturating_sub(cell_width(cell));
                line.extend(std::iter::repeat(' ').take(pad));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

/// Computes column widths like text/tabwriter: a column spans the
/// consecutive lines that have a terminated cell in it, and nested columns
/// are computed within that span. The last cell of a line is not aligned.
fn layout(
    cells: &[Vec<&str>],
    first: usize,
    last: usize,
    column: usize,
    widths: &mut [Vec<usize>],
) {
    let mut line = first;
    while line < last {
        if column + 1 >= cells[line].len() {
            line += 1;
            continue;
        }

        let start = line;
        let mut width = 0;
        let mut empty = true;
        while line < last && column + 1 < cells[line].len() {
            let cell = cell_width(cells[line][column]);
            width = width.max(cell + PADDING);
            empty &= cell == 0;
            line += 1;
        }
        if empty {
            width = 0;
        }

        for row in &mut widths[start..line] {
            row[column] = width;
        }
        layout(cells, start, line, column + 1, widths);
    }
}

fn cell_width(cell: &str) -> usize {
    cell.chars().count()
}

/// Checks that brackets outside of literals and comments are balanced.
fn check_balance(source: &str) -> Result<(), FormatError> {
    let mut stack: Vec<(char, usize, usize)> = Vec::new();
    let mut chars = source.chars().peekable();
    let (mut line, mut column) = (1, 0);

    while let Some(c) = chars.next() {
        column += 1;
        match c {
            '\n' => {
                line += 1;
                column = 0;
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                        column = 0;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for next in chars.by_ref() {
                    column += 1;
                    if next == '\n' {
                        line += 1;
                        column = 0;
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '"' | '\'' => {
                let mut escaped = false;
                for next in chars.by_ref() {
                    column += 1;
                    if next == '\n' {
                        break;
                    }
                    if !escaped && next == c {
                        break;
                    }
                    escaped = !escaped && next == '\\';
                }
            }
            '`' => {
                for next in chars.by_ref() {
                    column += 1;
                    if next == '\n' {
                        line += 1;
                        column = 0;
                    }
                    if next == '`' {
                        break;
                    }
                }
            }
            '(' | '[' | '{' => stack.push((c, line, column)),
            ')' | ']' | '}' => {
                let expected = match stack.pop() {
                    Some(('(', ..)) => ')',
                    Some(('[', ..)) => ']',
                    Some(_) => '}',
                    None => {
                        return Err(FormatError::Unbalanced {
                            line,
                            column,
                            found: c,
                        })
                    }
                };
                if c != expected {
                    return Err(FormatError::Unbalanced {
                        line,
                        column,
                        found: c,
                    });
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, line, column)) => Err(FormatError::Unclosed { line, column, open }),
        None => Ok(()),
    }
}

// ============================================================================
// EXTERNAL GOFMT
// ============================================================================

/// Formats by piping the source through an external `gofmt`.
#[derive(Debug, Clone)]
pub struct GofmtCommand {
    pub program: String,
}

impl GofmtCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> FormatError {
        FormatError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl SourceFormatter for GofmtCommand {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        debug!(program = %self.program, "running external formatter");
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Feed stdin from another thread so a full stdout pipe cannot block us.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.spawn_error(std::io::Error::other("stdin not captured")))?;
        let input = source.to_string();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let mut formatted = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout
                .read_to_string(&mut formatted)
                .map_err(|e| self.spawn_error(e))?;
        }
        let output = child.wait_with_output().map_err(|e| self.spawn_error(e))?;
        writer
            .join()
            .map_err(|_| self.spawn_error(std::io::Error::other("writer thread panicked")))?
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(FormatError::Rejected {
                program: self.program.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(formatted)
    }
}
