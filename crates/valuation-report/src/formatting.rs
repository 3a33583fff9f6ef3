use chrono::{DateTime, Utc};

/// Insert thousands separators into a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed decimals with thousands separators, e.g. `1,234.50`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, group_thousands(int_part), frac),
        None => format!("{}{}", sign, group_thousands(int_part)),
    }
}

/// Currency with two decimals: `KES 1,234.57`.
pub fn format_kes(value: f64) -> String {
    if value < 0.0 {
        format!("-KES {}", format_grouped(-value, 2))
    } else {
        format!("KES {}", format_grouped(value, 2))
    }
}

/// Abbreviate with K/M/B/T, two decimals.
pub fn format_large_number(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs >= 1e12 {
        format!("{}{:.2}T", sign, abs / 1e12)
    } else if abs >= 1e9 {
        format!("{}{:.2}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}{:.2}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}{:.2}K", sign, abs / 1e3)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_kes_short(value: f64) -> String {
    format!("KES {}", format_large_number(value))
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

/// Multiple, e.g. `1.15x`.
pub fn format_ratio(value: f64, decimals: usize) -> String {
    format!("{:.*}x", decimals, value)
}

/// Thousands separators with up to three decimals, trailing zeros dropped.
pub fn format_with_commas(value: f64) -> String {
    let grouped = format_grouped(value, 3);
    if grouped.contains('.') {
        grouped.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        grouped
    }
}

/// Parse user-typed numbers such as `"KES 1,234.5"`. Anything unparsable is 0.
pub fn parse_number(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let cleaned = strip_currency(&cleaned);
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn strip_currency(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if lower[i..].starts_with("kes") {
            i += 3;
        } else {
            let ch = s[i..].chars().next().unwrap_or_default();
            out.push(ch);
            i += ch.len_utf8().max(1);
        }
    }
    out
}

/// Short date and time, e.g. `18 Oct 2026, 14:05`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %b %Y, %H:%M").to_string()
}
