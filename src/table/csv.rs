//! CSV codec for the canonical table.
//!
//! Handles quoted fields, embedded commas/quotes and CRLF line endings.
//! Empty cells parse as `Null`; cells that parse as a number become `Num`.

use super::{Table, Value};

/// Parse CSV text into a table. The first record is the header.
pub fn parse(text: &str) -> Option<Table> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next()?;
    let columns: Vec<String> = parse_record(header)
        .into_iter()
        .map(|c| c.trim().to_string())
        .collect();

    let mut table = Table::new(columns);
    for line in lines {
        let cells = parse_record(line).into_iter().map(parse_cell).collect();
        table.push_row(cells);
    }
    Some(table)
}

/// Render a table as CSV text with a header record.
pub fn write(table: &Table) -> String {
    let mut out = String::new();
    let header: Vec<String> = table.columns().iter().map(|c| quote(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in 0..table.row_count() {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .map(|c| {
                let value = table.get(row, c).cloned().unwrap_or(Value::Null);
                quote(&value.to_text())
            })
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn parse_cell(raw: String) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Num(n),
        _ => Value::Str(trimmed.to_string()),
    }
}

fn parse_record(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut out: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '"' {
            if in_quotes && i + 1 < chars.len() && chars[i + 1] == '"' {
                buf.push('"');
                i += 2;
                continue;
            }
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if ch == ',' && !in_quotes {
            out.push(buf);
            buf = String::new();
            i += 1;
            continue;
        }
        buf.push(ch);
        i += 1;
    }
    out.push(buf);
    out
}

fn quote(s: &str) -> String {
    // The parser is line-based, so embedded line breaks (possible in
    // spreadsheet cells) are flattened to spaces before quoting.
    let flat = if s.contains('\n') || s.contains('\r') {
        s.replace("\r\n", " ").replace(['\r', '\n'], " ")
    } else {
        s.to_string()
    };
    if flat.contains(',') || flat.contains('"') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_cells() {
        let t = parse("name,score,note\nAlice,60,good\nBob,,\n").unwrap();
        assert_eq!(t.columns(), &["name", "score", "note"]);
        assert_eq!(t.get(0, "score"), Some(&Value::Num(60.0)));
        assert_eq!(t.get(0, "name"), Some(&Value::Str("Alice".into())));
        assert_eq!(t.get(1, "score"), Some(&Value::Null));
        assert_eq!(t.get(1, "note"), Some(&Value::Null));
    }

    #[test]
    fn quoted_fields_with_commas_and_quotes() {
        let t = parse("name,remark\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(t.get(0, "name"), Some(&Value::Str("Doe, Jane".into())));
        assert_eq!(t.get(0, "remark"), Some(&Value::Str("said \"hi\"".into())));
    }

    #[test]
    fn crlf_lines_are_tolerated() {
        let t = parse("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(t.get(0, "b"), Some(&Value::Num(2.0)));
    }

    #[test]
    fn round_trip_preserves_table() {
        let t = parse("student_id,Student_Name,Previous_Scores\n1001,\"Doe, Jane\",72.5\n1002,,\n").unwrap();
        let again = parse(&write(&t)).unwrap();
        assert_eq!(t, again);
    }

    #[test]
    fn embedded_newlines_are_flattened_on_write() {
        let mut t = Table::new(vec!["name".into(), "score".into()]);
        t.push_row(vec![Value::Str("Jane\r\nDoe, Jr".into()), Value::Num(70.0)]);
        let text = write(&t);
        assert_eq!(text.lines().count(), 2);
        let again = parse(&text).unwrap();
        assert_eq!(again.get(0, "name"), Some(&Value::Str("Jane Doe, Jr".into())));
        assert_eq!(again.get(0, "score"), Some(&Value::Num(70.0)));
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(parse("").is_none());
        assert!(parse("\n\n").is_none());
    }
}
