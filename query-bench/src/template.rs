//! Query source: loads query templates from a file, one per line.
//!
//! A template is a SQL statement where `%s` marks the table name. `%%` is a
//! literal percent sign. Every other `%` sequence is rejected at load time,
//! so a stray `LIKE 'a%'` is reported with its line number instead of
//! failing later against the database.

use bench_core::BenchError;
use std::fs;
use std::path::Path;

/// One line of the query file, validated and ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    text: String,
    line: usize,
}

impl QueryTemplate {
    /// Validate `text` as a template. `line` is 1-based and only used for
    /// error messages and logging.
    pub fn parse(text: &str, line: usize) -> Result<Self, BenchError> {
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                continue;
            }
            match chars.next() {
                Some('s') | Some('%') => {}
                Some(other) => {
                    return Err(BenchError::Format {
                        line,
                        message: format!("unsupported placeholder '%{other}' (only %s and %% are allowed)"),
                    });
                }
                None => {
                    return Err(BenchError::Format {
                        line,
                        message: "dangling '%' at end of template".to_string(),
                    });
                }
            }
        }

        Ok(QueryTemplate {
            text: text.to_string(),
            line,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Substitute every `%s` with `table` and unescape `%%`.
    pub fn render(&self, table: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + table.len());
        let mut chars = self.text.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            // parse() guarantees a following 's' or '%'.
            match chars.next() {
                Some('s') => out.push_str(table),
                Some(other) => out.push(other),
                None => out.push('%'),
            }
        }
        out
    }
}

/// Read every template from `path` in file order.
pub fn load_queries(path: impl AsRef<Path>) -> Result<Vec<QueryTemplate>, BenchError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| BenchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        BenchError::Format {
            line,
            message: "line is not valid UTF-8".to_string(),
        }
    })?;

    let queries = parse_queries(&text)?;
    log::info!("Loaded {} queries from {}", queries.len(), path.display());
    Ok(queries)
}

/// Parse templates from in-memory text. Blank lines are skipped.
pub fn parse_queries(input: &str) -> Result<Vec<QueryTemplate>, BenchError> {
    let mut queries = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            log::debug!("Skipping blank line {}", idx + 1);
            continue;
        }
        queries.push(QueryTemplate::parse(line, idx + 1)?);
    }
    Ok(queries)
}
