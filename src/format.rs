//! Display helpers shared by product, event, and profile views.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unrecognized date '{0}'")]
    Date(String),
    #[error("date formatting failed: {0}")]
    Render(#[from] time::error::Format),
}

/// Minor units to a display price, e.g. `123456, "USD"` → `$1,234.56`.
#[must_use]
pub fn format_currency(cents: i64, currency: &str) -> String {
    let code = currency.trim().to_ascii_uppercase();
    let symbol = match code.as_str() {
        "USD" | "CAD" | "AUD" => "$".to_owned(),
        "EUR" => "€".to_owned(),
        "GBP" => "£".to_owned(),
        _ => format!("{code} "),
    };
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{symbol}{}.{:02}", group_thousands(abs / 100), abs % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// URL slug: lowercase ASCII alphanumerics joined by single hyphens.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch != '\'' {
            pending_dash = true;
        }
    }
    slug
}

/// North American numbers as `(555) 123-4567`; anything else is returned
/// trimmed.
#[must_use]
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..]),
        _ => raw.trim().to_owned(),
    }
}

/// RFC 3339 timestamp or `YYYY-MM-DD` to `Oct 16, 2026`.
///
/// # Errors
///
/// Returns an error if the input matches neither layout.
pub fn format_date(raw: &str) -> Result<String, FormatError> {
    let raw = raw.trim();
    let date = OffsetDateTime::parse(raw, &Rfc3339)
        .map(OffsetDateTime::date)
        .or_else(|_| Date::parse(raw, format_description!("[year]-[month]-[day]")))
        .map_err(|_| FormatError::Date(raw.to_owned()))?;
    Ok(date.format(format_description!("[month repr:short] [day padding:none], [year]"))?)
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
