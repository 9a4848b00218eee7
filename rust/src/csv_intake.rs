//! Contribution CSV parsing
//!
//! A deliberately small reader for the contribution template: one header line,
//! comma-separated data lines, double quotes to protect embedded commas. There
//! is no `""` escaping; a quote character only toggles quoted mode and is never
//! part of a value.
//!
//! Data lines whose field count differs from the header are not rows. They are
//! kept in [`ParsedCsv::skipped`] so validation can report them.

use std::collections::BTreeMap;

use intervention_types::CANONICAL_HEADERS;

use crate::error::CsvError;

/// One parsed data line, keyed by header name
pub type RawRow = BTreeMap<String, String>;

/// A data line dropped because its field count did not match the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the uploaded text, blank lines included
    pub line: usize,
    pub field_count: usize,
    pub expected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub skipped: Vec<SkippedLine>,
}

impl ParsedCsv {
    /// Rows that did not come from a file (form entries) carry the template header
    pub fn with_canonical_headers(rows: Vec<RawRow>) -> Self {
        Self {
            headers: CANONICAL_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
            skipped: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse contribution CSV text.
///
/// Fails only when there are fewer than two non-blank lines. Rows with the
/// wrong number of fields are dropped, never reported as an error here.
pub fn parse(text: &str) -> Result<ParsedCsv, CsvError> {
    let lines: Vec<(usize, &str)> = text
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(CsvError::TooFewLines {
            non_blank: lines.len(),
        });
    }

    let headers = split_header(lines[0].1);
    let mut rows = Vec::with_capacity(lines.len() - 1);
    let mut skipped = Vec::new();

    for &(index, line) in &lines[1..] {
        let values = split_fields(line);
        if values.len() == headers.len() {
            rows.push(headers.iter().cloned().zip(values).collect());
        } else {
            skipped.push(SkippedLine {
                line: index + 1,
                field_count: values.len(),
                expected: headers.len(),
            });
        }
    }

    Ok(ParsedCsv {
        headers,
        rows,
        skipped,
    })
}

/// Header names: plain comma split, quotes removed, whitespace trimmed
fn split_header(line: &str) -> Vec<String> {
    line.split(',')
        .map(|h| h.replace('"', "").trim().to_string())
        .collect()
}

/// Split one data line, honouring quoted commas. Fields are trimmed.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    values.push(current.trim().to_string());

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Intervention Type,Description,Focus,Driver,User Journey,Scope,Link,Contact";

    #[test]
    fn test_quoted_commas_stay_in_one_field() {
        let fields = split_fields(r#""Removal","Deletes content, then notifies",Content"#);
        assert_eq!(
            fields,
            vec!["Removal", "Deletes content, then notifies", "Content"]
        );
    }

    #[test]
    fn test_fields_are_trimmed_and_unquoted() {
        let fields = split_fields(r#"  "  padded  " , plain ,"#);
        assert_eq!(fields, vec!["padded", "plain", ""]);
    }

    #[test]
    fn test_header_quotes_stripped() {
        let text = "\"Intervention Type\", \"Description\"\n\"a\",\"b\"\n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.headers, vec!["Intervention Type", "Description"]);
        assert_eq!(parsed.rows[0]["Description"], "b");
    }

    #[test]
    fn test_too_few_lines() {
        assert_eq!(
            parse(""),
            Err(CsvError::TooFewLines { non_blank: 0 })
        );
        assert_eq!(
            parse(&format!("{HEADER}\n\n   \n")),
            Err(CsvError::TooFewLines { non_blank: 1 })
        );
    }

    #[test]
    fn test_mismatched_rows_dropped_and_recorded() {
        let text = format!(
            "{HEADER}\n\
             a,b,c,d,e,f,g,h\n\
             only,three,fields\n\
             \n\
             a,\"b, with comma\",c,d,e,f,g,h\n"
        );
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.row_count(), 2);
        assert_eq!(
            parsed.skipped,
            vec![SkippedLine {
                line: 3,
                field_count: 3,
                expected: 8
            }]
        );
        assert_eq!(parsed.rows[1]["Description"], "b, with comma");
    }

    #[test]
    fn test_skipped_line_counts_blank_lines() {
        let text = format!("\n{HEADER}\n\na,b,c,d,e,f,g,h\n\nshort,line\n");
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.row_count(), 1);
        assert_eq!(parsed.skipped[0].line, 6);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = format!("{HEADER}\r\na,b,c,d,e,f,g,h\r\n");
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.headers.last().map(String::as_str), Some("Contact"));
        assert_eq!(parsed.rows[0]["Contact"], "h");
    }

    #[test]
    fn test_with_canonical_headers() {
        let parsed = ParsedCsv::with_canonical_headers(vec![RawRow::new()]);
        assert_eq!(parsed.headers.len(), 8);
        assert_eq!(parsed.row_count(), 1);
    }
}
