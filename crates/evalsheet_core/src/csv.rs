//! Permissive CSV reading and spreadsheet-friendly CSV writing.

use crate::Record;

const BOM: char = '\u{feff}';

pub const EXPORT_HEADERS: [&str; 6] = [
    "이름",
    "영역",
    "목표 글자수",
    "키워드",
    "생성된 내용",
    "실제 글자수",
];

pub const TEMPLATE_HEADERS: [&str; 4] = ["이름", "영역", "목표 글자수", "키워드(활동내용)"];

const TEMPLATE_EXAMPLE_ROW: [&str; 4] = ["홍길동", "진로활동", "500", "자율주행 자동차 탐구..."];

/// Split delimited text into rows of trimmed cells.
///
/// Quoted cells may contain commas, line breaks and doubled quotes. Input is
/// never rejected: stray quotes simply toggle quoted mode. Blank lines outside
/// quotes do not produce rows.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => row.push(finish_cell(&mut cell)),
            '\n' | '\r' => {
                if !cell.is_empty() || !row.is_empty() {
                    row.push(finish_cell(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => cell.push(ch),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(finish_cell(&mut cell));
        rows.push(row);
    }
    rows
}

fn finish_cell(cell: &mut String) -> String {
    let value = trim_cell(cell).to_string();
    cell.clear();
    value
}

// The byte-order mark is stripped along with ordinary whitespace.
fn trim_cell(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == BOM)
}

/// Serialize records with a header row; text fields are always quoted.
pub fn export_csv<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    let mut lines = vec![EXPORT_HEADERS.join(",")];
    for record in records {
        lines.push(
            [
                quote(&record.name),
                quote(&record.category),
                record.target_length.to_string(),
                quote(&record.keywords),
                quote(&record.generated_content),
                record.generated_chars().to_string(),
            ]
            .join(","),
        );
    }

    let mut out = String::from(BOM);
    out.push_str(&lines.join("\n"));
    out
}

/// Blank import sheet with one illustrative row.
pub fn template_csv() -> String {
    let mut out = String::from(BOM);
    out.push_str(&TEMPLATE_HEADERS.join(","));
    out.push('\n');
    out.push_str(&TEMPLATE_EXAMPLE_ROW.join(","));
    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_carriage_return_ends_row() {
        assert_eq!(parse_csv("a\rb"), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn bom_is_trimmed_from_first_cell() {
        assert_eq!(parse_csv("\u{feff}이름,영역"), vec![vec!["이름", "영역"]]);
    }

    #[test]
    fn quoted_empty_cell_alone_on_line_is_dropped() {
        // Nothing was accumulated, so the guard treats the line as blank.
        assert_eq!(parse_csv("\"\"\nx"), vec![vec!["x"]]);
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote(r#"say "hi""#), r#""say ""hi""""#);
    }
}
