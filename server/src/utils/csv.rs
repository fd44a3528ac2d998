//! Minimal CSV writer (RFC 4180 quoting)

/// Quote a cell when it contains a delimiter, quote or line break
pub fn escape_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render one CSV record terminated by CRLF
pub fn csv_row<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = cells
        .into_iter()
        .map(|cell| escape_cell(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_cell_plain() {
        assert_eq!(escape_cell("Ann"), "Ann");
        assert_eq!(escape_cell(""), "");
    }

    #[test]
    fn test_escape_cell_quotes_special() {
        assert_eq!(escape_cell("Smith, Ann"), "\"Smith, Ann\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_csv_row() {
        assert_eq!(csv_row(["1", "Ann", "a@x.io"]), "1,Ann,a@x.io\r\n");
        assert_eq!(
            csv_row(vec!["2".to_string(), "O'Neil, B".to_string()]),
            "2,\"O'Neil, B\"\r\n"
        );
    }
}
