//! Delimiter detection, header normalization and row splitting

use super::error::ImportError;

/// Field separator, decided once from the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Tab if the line contains one, comma otherwise
    pub fn detect(first_line: &str) -> Self {
        if first_line.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

/// Straight and curly quote characters removed from header cells
const QUOTE_CHARS: [char; 6] = ['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Parsed input: normalized header plus raw data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub delimiter: Delimiter,
    pub header_row: Vec<String>,
    pub data_rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Split `text` into non-blank lines and parse header and data rows.
    ///
    /// Fails with [`ImportError::EmptyInput`] unless there is a header line
    /// and at least one data line.
    pub fn parse(text: &str) -> Result<Self, ImportError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim_start_matches(BYTE_ORDER_MARK))
            .filter(|line| !line.trim().is_empty())
            .collect();

        if lines.len() < 2 {
            return Err(ImportError::EmptyInput { lines: lines.len() });
        }

        let delimiter = Delimiter::detect(lines[0]);
        let header_row = split_row(lines[0], delimiter)
            .iter()
            .map(|cell| normalize_header(cell))
            .collect();
        let data_rows = lines[1..]
            .iter()
            .map(|line| split_row(line, delimiter))
            .collect();

        Ok(Self {
            delimiter,
            header_row,
            data_rows,
        })
    }
}

/// Trim, lowercase and strip quote characters from a header cell.
///
/// Idempotent: normalizing an already-normalized header is a no-op.
pub fn normalize_header(cell: &str) -> String {
    cell.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !QUOTE_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split one line into trimmed cells.
///
/// Each `"` toggles an in-quotes flag and is dropped; the delimiter only
/// separates cells outside quotes. Escaped quotes (`""`) are not supported:
/// they toggle the flag twice and leave the state unchanged.
pub fn split_row(line: &str, delimiter: Delimiter) -> Vec<String> {
    let separator = delimiter.as_char();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            cells.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    cells.push(current.trim().to_string());

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(Delimiter::detect("Name\tEmail"), Delimiter::Tab);
        assert_eq!(Delimiter::detect("Name,Email"), Delimiter::Comma);
        assert_eq!(Delimiter::detect("Name"), Delimiter::Comma);
    }

    #[test]
    fn test_quoted_comma_is_preserved() {
        let cells = split_row(r#"name,"Smith, John",city"#, Delimiter::Comma);
        assert_eq!(cells, vec!["name", "Smith, John", "city"]);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let cells = split_row("  Alice , bob@example.com ,", Delimiter::Comma);
        assert_eq!(cells, vec!["Alice", "bob@example.com", ""]);
    }

    #[test]
    fn test_tab_rows_keep_commas() {
        let cells = split_row("Dupont, Jean\tParis", Delimiter::Tab);
        assert_eq!(cells, vec!["Dupont, Jean", "Paris"]);
    }

    #[test]
    fn test_doubled_quotes_toggle_twice() {
        // `""` inside a quoted field resumes the same quoted state
        let cells = split_row(r#""say ""hi"", ok",next"#, Delimiter::Comma);
        assert_eq!(cells, vec!["say hi, ok", "next"]);
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  \"Join Date\" "), "join date");
        assert_eq!(normalize_header("\u{201C}Présentation\u{201D}"), "présentation");
        assert_eq!(normalize_header("'Email'"), "email");
    }

    #[test]
    fn test_normalize_header_is_idempotent() {
        for raw in ["  \"Join Date\" ", "Rejoindre le groupe le", "\u{2018}Bio\u{2019}", "e-mail"] {
            let once = normalize_header(raw);
            assert_eq!(normalize_header(&once), once);
        }
    }

    #[test]
    fn test_parse_skips_blank_lines_and_bom() {
        let text = "\u{FEFF}Name,Email\r\n\r\nAlice,a@example.com\r\n   \r\nBob,\r\n";
        let table = RawTable::parse(text).unwrap();
        assert_eq!(table.delimiter, Delimiter::Comma);
        assert_eq!(table.header_row, vec!["name", "email"]);
        assert_eq!(table.data_rows.len(), 2);
        assert_eq!(table.data_rows[1], vec!["Bob", ""]);
    }

    #[test]
    fn test_parse_requires_header_and_data() {
        assert_eq!(RawTable::parse(""), Err(ImportError::EmptyInput { lines: 0 }));
        assert_eq!(RawTable::parse("Name,Email\n\n  \n"), Err(ImportError::EmptyInput { lines: 1 }));
    }

    #[test]
    fn test_parse_tab_separated() {
        let table = RawTable::parse("Nom\tE-mail\nJean Dupont\tjean@example.fr").unwrap();
        assert_eq!(table.delimiter, Delimiter::Tab);
        assert_eq!(table.header_row, vec!["nom", "e-mail"]);
        assert_eq!(table.data_rows[0], vec!["Jean Dupont", "jean@example.fr"]);
    }
}
