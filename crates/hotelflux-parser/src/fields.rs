//! Scalar coercions applied cell by cell. Every function here maps bad input
//! to `None`; none of them can fail a row.

use chrono::NaiveDate;

/// Which component comes first when a date like `03/04/2025` is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
}

/// Parses a number the way a spreadsheet export writes it: surrounding blanks,
/// `nan`, and infinities read as absent.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Cleans a revenue cell such as `Value : 9,800` or `"350"` and parses it.
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned = sanitize_amount(value)?;
    parse_number(&cleaned)
}

/// Text clean-up half of [`parse_amount`]. Returns `None` when nothing is left.
pub fn sanitize_amount(value: &str) -> Option<String> {
    let mut text = strip_value_label(value.trim()).replace('"', "");
    text.retain(|ch| !ch.is_whitespace() && ch != '\u{a0}' && ch != '\u{202f}');

    let normalized = normalize_separators(&text);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn strip_value_label(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("Value") else {
        return text;
    };
    match rest.trim_start().strip_prefix(':') {
        Some(after_colon) => after_colon.trim_start(),
        None => text,
    }
}

// A lone comma followed by exactly three digits groups thousands; any other
// lone comma is the decimal mark. With both marks present the last one is the
// decimal mark.
fn normalize_separators(text: &str) -> String {
    let commas = text.matches(',').count();
    let dots = text.matches('.').count();

    match (commas, dots) {
        (0, _) => text.to_string(),
        (_, 0) => {
            let groups_thousands = commas > 1
                || text
                    .rsplit(',')
                    .next()
                    .is_some_and(|tail| tail.len() == 3 && tail.bytes().all(|b| b.is_ascii_digit()));
            if groups_thousands {
                text.replace(',', "")
            } else {
                text.replace(',', ".")
            }
        }
        _ => {
            let last_comma = text.rfind(',');
            let last_dot = text.rfind('.');
            if last_comma > last_dot {
                text.replace('.', "").replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
    }
}

/// Lenient calendar-date parse. Accepts `/`, `-` or `.` separated dates with
/// two- or four-digit years, ISO `YYYY-MM-DD`, and ignores a trailing time.
/// When `order` cannot hold (a month above 12) the other order is tried.
pub fn parse_date(value: &str, order: DateOrder) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed
        .split(|ch: char| ch.is_whitespace() || ch == 'T')
        .next()
        .filter(|part| !part.is_empty())?;

    let parts: Vec<&str> = date_part.split(['/', '-', '.']).collect();
    let [first, second, third] = parts.as_slice() else {
        return None;
    };
    if !parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    if first.len() == 4 {
        let year = first.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, second.parse().ok()?, third.parse().ok()?);
    }

    let year = expand_year(third)?;
    let a: u32 = first.parse().ok()?;
    let b: u32 = second.parse().ok()?;
    let (day, month, fallback) = match order {
        DateOrder::DayFirst => (a, b, (b, a)),
        DateOrder::MonthFirst => (b, a, (a, b)),
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, fallback.1, fallback.0))
}

/// Strict `DD.MM.YY` parse used by the second PMS family.
pub fn parse_dotted_short_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let parts: Vec<&str> = trimmed.split('.').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    if year.len() != 2 || day.is_empty() || day.len() > 2 || month.is_empty() || month.len() > 2 {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%d.%m.%y").ok()
}

// Two-digit years pivot like strptime's `%y`: 69-99 are 19xx, 00-68 are 20xx.
fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    match text.len() {
        2 if year >= 69 => Some(1900 + year),
        2 => Some(2000 + year),
        4 => Some(year),
        _ => None,
    }
}
