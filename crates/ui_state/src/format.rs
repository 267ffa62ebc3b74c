//! Display helpers for tournament and team views.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// `$` followed by the en-US grouped amount, e.g. `$25,000` or `$12.5`.
/// Anything that is not a finite number (or numeric string) renders `$0`.
pub fn format_money(amount: &Value) -> String {
    let parsed = match amount {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.map_or_else(|| "$0".to_string(), format_money_amount)
}

pub fn format_money_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    // At most three fraction digits, like the default locale formatting.
    let fixed = format!("{:.3}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::from("$");
    if amount < 0.0 && (whole != "0" || !fraction.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// en-US `M/D/YYYY, h:mm:ss AM` in the timestamp's own offset.
pub fn format_date(raw: &str) -> String {
    const OUTPUT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(OUTPUT).to_string();
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format(OUTPUT).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return midnight.format(OUTPUT).to_string();
        }
    }
    "Invalid Date".to_string()
}

pub fn tournament_status_label(status: &str) -> &str {
    match status {
        "registration" => "Registration Open",
        "active" => "Active",
        "completed" => "Completed",
        "cancelled" => "Cancelled",
        other => other,
    }
}

pub fn tournament_status_icon(status: &str) -> &'static str {
    match status {
        "registration" => "fas fa-clock",
        "active" => "fas fa-play",
        "completed" => "fas fa-trophy",
        "cancelled" => "fas fa-ban",
        _ => "fas fa-question",
    }
}

pub fn role_label(role: &str) -> &str {
    match role {
        "captain" => "Captain",
        "driver" => "Driver",
        "navigator" => "Navigator",
        "mechanic1" | "mechanic2" => "Mechanic",
        other => other,
    }
}

pub fn role_icon(role: &str) -> &'static str {
    match role {
        "captain" => "fas fa-crown",
        "driver" => "fas fa-car",
        "navigator" => "fas fa-map",
        "mechanic1" => "fas fa-wrench",
        "mechanic2" => "fas fa-tools",
        _ => "fas fa-user",
    }
}

pub fn team_status_label(status: &str) -> &str {
    match status {
        "registered" => "Registered",
        "active" => "Active",
        "eliminated" => "Eliminated",
        "disqualified" => "Disqualified",
        other => other,
    }
}

pub fn format_record(wins: u32, losses: u32) -> String {
    format!("{wins}W - {losses}L")
}
