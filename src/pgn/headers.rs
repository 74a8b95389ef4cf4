//! Tag pair lines: `[Key "Value"]`.

use chrono::NaiveDate;

use crate::domain::PieceColor;
use crate::domain::header::{VALUE_BLACK, VALUE_NO_COLOR, VALUE_WHITE};

/// Builds one header line. An empty key produces an empty string.
pub fn build_header_line(key: &str, value: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    format!("[{} \"{}\"]", key, value.replace('"', "'"))
}

/// Appends `[Key "Value"]` and a newline
pub fn push_header(out: &mut String, key: &str, value: &str) {
    out.push_str(&build_header_line(key, value));
    out.push('\n');
}

/// Appends the header only when the value is not empty
pub fn push_header_if_set(out: &mut String, key: &str, value: &str) {
    if !value.is_empty() {
        push_header(out, key, value);
    }
}

/// Parses a header line. Returns `None` if the line is not a header: it must
/// start with `[`, end with `]` and hold a quoted value.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (key, rest) = inner.split_once('"')?;
    let value = rest.rsplit_once('"').map_or(rest, |(v, _)| v);
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Date in the `YYYY.MM.DD` form
pub fn format_pgn_date(date: NaiveDate) -> String {
    date.format("%Y.%m.%d").to_string()
}

/// Reads `YYYY.MM.DD`; unknown parts such as `????` give `None`
pub fn parse_pgn_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y.%m.%d").ok()
}

/// Header value for a side, `None` for no side
pub fn color_value(color: Option<PieceColor>) -> &'static str {
    match color {
        Some(PieceColor::White) => VALUE_WHITE,
        Some(PieceColor::Black) => VALUE_BLACK,
        None => VALUE_NO_COLOR,
    }
}

pub fn parse_color_value(text: &str) -> Option<PieceColor> {
    match text.trim() {
        VALUE_WHITE => Some(PieceColor::White),
        VALUE_BLACK => Some(PieceColor::Black),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_header_line() {
        assert_eq!(build_header_line("Event", "Open"), "[Event \"Open\"]");
        assert_eq!(build_header_line("Event", ""), "[Event \"\"]");
        assert_eq!(build_header_line("", "x"), "");
    }

    #[test]
    fn test_parse_header_line() {
        assert_eq!(
            parse_header_line("[White \"Tal, Mikhail\"]"),
            Some(("White".to_string(), "Tal, Mikhail".to_string()))
        );
        assert_eq!(
            parse_header_line("  [Result \"*\"]  "),
            Some(("Result".to_string(), "*".to_string()))
        );
        assert_eq!(parse_header_line("1. e4 e5"), None);
        assert_eq!(parse_header_line("{[%chf-bkm]}"), None);
        assert_eq!(parse_header_line("[%cal Ge2e4]"), None);
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_pgn_date(date), "2024.03.07");
        assert_eq!(parse_pgn_date("2024.03.07"), Some(date));
        assert_eq!(parse_pgn_date("2024.??.??"), None);
    }

    #[test]
    fn test_color_values() {
        assert_eq!(color_value(Some(PieceColor::Black)), "Black");
        assert_eq!(color_value(None), "None");
        assert_eq!(parse_color_value("White"), Some(PieceColor::White));
        assert_eq!(parse_color_value("None"), None);
    }
}
