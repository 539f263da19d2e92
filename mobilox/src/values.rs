//! Lenient parsers for the free-form values feed providers put into their documents.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Normalizes a tag or attribute name into a lookup key: namespace prefix dropped, lowercase,
/// `-` and spaces become `_`, german umlauts transliterated.
pub fn normalize_key(raw: &str) -> String {
    let local = raw.rsplit(':').next().unwrap_or(raw);
    let mut key = String::with_capacity(local.len());
    for c in local.trim().chars().flat_map(char::to_lowercase) {
        match c {
            '-' | ' ' => key.push('_'),
            'ä' => key.push_str("ae"),
            'ö' => key.push_str("oe"),
            'ü' => key.push_str("ue"),
            'ß' => key.push_str("ss"),
            c => key.push(c),
        }
    }
    key
}

pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// First run of digits and separators in `raw`, without trailing separators.
fn numeric_token(raw: &str) -> Option<&str> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let rest = &raw[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(rest.len());
    Some(rest[..end].trim_end_matches(['.', ',']))
}

/// Parses numbers written with either german (`12.990,50`) or english (`12,990.50`) grouping.
/// A single separator followed by exactly three digits is read as a thousands separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let token = numeric_token(raw)?;
    let dots = token.matches('.').count();
    let commas = token.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => token.to_string(),
        (d, c) if d > 0 && c > 0 => {
            let last_dot = token.rfind('.')?;
            let last_comma = token.rfind(',')?;
            if last_comma > last_dot {
                token.replace('.', "").replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
        (n, 0) | (0, n) => {
            let separator = if dots > 0 { '.' } else { ',' };
            let (before, after) = token.split_once(separator)?;
            if n > 1 || (after.len() == 3 && before != "0") {
                token.replace(separator, "")
            } else {
                format!("{before}.{after}")
            }
        }
        _ => unreachable!("separator counts are covered above"),
    };

    normalized.parse().ok()
}

pub fn parse_int(raw: &str) -> Option<i32> {
    let value = parse_decimal(raw)?.round();
    (value >= i32::MIN as f64 && value <= i32::MAX as f64).then_some(value as i32)
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "ja" | "j" | "x" | "wahr" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "nein" | "falsch" | "off" => Some(false),
        _ => None,
    }
}

/// Parses full dates, timestamps and month precision dates (`03/2019`, `2019-03`), which
/// resolve to the first of the month. A bare year resolves to the first of january.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(timestamp.date());
        }
    }

    let parts = trimmed
        .split(['/', '.', '-'])
        .map(str::trim)
        .collect::<Vec<_>>();
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match parts.as_slice() {
        [year] if year.len() == 4 && all_digits(year) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1)
        }
        [first, second] if all_digits(first) && all_digits(second) => {
            let (year, month) = if first.len() == 4 {
                (first, second)
            } else if second.len() == 4 {
                (second, first)
            } else {
                return None;
            };
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        _ => None,
    }
}

pub fn year_of(date: NaiveDate) -> i32 {
    date.year()
}

pub fn looks_like_url(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Splits text that may hold several urls.
pub fn split_urls(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c.is_whitespace() || c == ',' || c == ';' || c == '|')
        .filter(|part| looks_like_url(part))
}

/// Splits delimited lists (`ABS, ESP; Navi`).
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', ';', '|', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Erstzulassung"), "erstzulassung");
        assert_eq!(normalize_key("mx:first-registration"), "first_registration");
        assert_eq!(normalize_key("Türen"), "tueren");
        assert_eq!(normalize_key("Höchstgeschwindigkeit"), "hoechstgeschwindigkeit");
        assert_eq!(normalize_key("Anzahl Gänge"), "anzahl_gaenge");
    }

    #[test]
    fn test_parse_decimal_grouping() {
        assert_eq!(parse_decimal("12.990,00 €"), Some(12990.0));
        assert_eq!(parse_decimal("12,990.50"), Some(12990.5));
        assert_eq!(parse_decimal("120.000 km"), Some(120000.0));
        assert_eq!(parse_decimal("1.234.567"), Some(1234567.0));
        assert_eq!(parse_decimal("5,6 l/100km"), Some(5.6));
        assert_eq!(parse_decimal("0.500"), Some(0.5));
        assert_eq!(parse_decimal("EUR 18.500,-"), Some(18500.0));
        assert_eq!(parse_decimal("8.5"), Some(8.5));
        assert_eq!(parse_decimal("n/a"), None);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("4/5"), Some(4));
        assert_eq!(parse_int(" 150 PS"), Some(150));
        assert_eq!(parse_int("1.968 ccm"), Some(1968));
        assert_eq!(parse_int("99999999999"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Ja"), Some(true));
        assert_eq!(parse_bool(" x "), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("nein"), Some(false));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("vielleicht"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let march_first = NaiveDate::from_ymd_opt(2019, 3, 1);
        assert_eq!(parse_date("2019-03-01"), march_first);
        assert_eq!(parse_date("01.03.2019"), march_first);
        assert_eq!(parse_date("03/2019"), march_first);
        assert_eq!(parse_date("03.2019"), march_first);
        assert_eq!(parse_date("2019-03"), march_first);
        assert_eq!(parse_date("2019-03-01T12:30:00+02:00"), march_first);
        assert_eq!(parse_date("2019-03-01 08:00:00"), march_first);
        assert_eq!(parse_date("2019"), NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(parse_date("13/2019"), None);
        assert_eq!(parse_date("neu"), None);
    }

    #[test]
    fn test_split_urls_and_lists() {
        let urls = split_urls("https://a/1.jpg, https://a/2.jpg;nonsense https://a/3.jpg")
            .collect::<Vec<_>>();
        assert_eq!(urls, vec!["https://a/1.jpg", "https://a/2.jpg", "https://a/3.jpg"]);

        let items = split_list("ABS, ESP;\nNavigationssystem | ").collect::<Vec<_>>();
        assert_eq!(items, vec!["ABS", "ESP", "Navigationssystem"]);
    }
}
