//! en-US display formatting for the recap context.

use chrono::NaiveDate;

use crate::streaks::DayRange;
use crate::types::YearMonth;

/// Shown wherever a value is unavailable or would divide by zero.
pub const PLACEHOLDER: &str = "—";

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Insert thousands separators into a run of ASCII digits.
fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_integer(value: usize) -> String {
    group_digits(&value.to_string())
}

/// Round half away from zero, then group, e.g. `1234.5` becomes `"1,235"`.
pub fn format_rounded(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_digits(&format!("{:.0}", rounded.abs())))
}

/// At most one fraction digit, no trailing zero: `3.0` is `"3"`, `1234.56` is `"1,234.6"`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let tenths = (value * 10.0).round();
    let sign = if tenths < 0.0 { "-" } else { "" };
    let tenths = tenths.abs();
    let whole = (tenths / 10.0).trunc();
    let fraction = (tenths - whole * 10.0) as u8;
    let whole = group_digits(&format!("{whole:.0}"));
    if fraction == 0 {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{fraction}")
    }
}

/// Render a fraction (`0.25`) as a percentage (`"25%"`) with at most one decimal.
pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("{}%", format_number(fraction * 100.0))
}

pub fn fraction_to_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        return PLACEHOLDER.to_string();
    }
    format_percent(numerator as f64 / denominator as f64)
}

/// `Jan 05, 2024`
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// `Jan 2024`
pub fn format_month_label(month: YearMonth) -> String {
    let name = month
        .month
        .checked_sub(1)
        .and_then(|idx| MONTH_ABBREVIATIONS.get(idx as usize))
        .copied()
        .unwrap_or(PLACEHOLDER);
    format!("{name} {}", month.year)
}

pub fn format_day_range(range: DayRange) -> String {
    if range.is_single_day() {
        format_date_label(range.start)
    } else {
        format!(
            "{} — {}",
            format_date_label(range.start),
            format_date_label(range.end)
        )
    }
}

/// `07:00`
pub fn hour_label(hour: usize) -> String {
    format!("{hour:02}:00")
}

/// Abbreviated weekday name, 0 being Sunday.
pub fn weekday_label(index: usize) -> &'static str {
    WEEKDAY_ABBREVIATIONS
        .get(index)
        .copied()
        .unwrap_or(PLACEHOLDER)
}

pub fn integer_or_placeholder(value: Option<usize>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format_integer)
}
