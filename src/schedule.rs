use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

/// Next UTC occurrence of `expression` strictly after `from`.
pub fn next_run_for(expression: &str, from: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let schedule = parse_schedule(expression)?;
    schedule
        .after(&from)
        .next()
        .ok_or_else(|| anyhow::anyhow!("No future occurrence for expression: {expression}"))
}

pub fn validate_expression(expression: &str) -> Result<()> {
    parse_schedule(expression).map(|_| ())
}

fn parse_schedule(expression: &str) -> Result<Schedule> {
    let normalized = normalize_expression(expression)?;
    Schedule::from_str(&normalized).with_context(|| format!("Invalid cron expression: {expression}"))
}

fn normalize_expression(expression: &str) -> Result<String> {
    let expression = expression.trim();
    let field_count = expression.split_whitespace().count();

    match field_count {
        // standard crontab syntax: minute hour day month weekday
        5 => Ok(format!("0 {expression}")),
        // crate-native syntax includes seconds (+ optional year)
        6 | 7 => Ok(expression.to_string()),
        _ => anyhow::bail!(
            "Invalid cron expression: {expression} (expected 5, 6, or 7 fields, got {field_count})"
        ),
    }
}

pub(crate) fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid RFC3339 timestamp in database: {raw}"))?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn five_field_expression_gets_seconds_prepended() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 1, 30, 0).unwrap();
        let next = next_run_for("0 2 * * *", from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn six_field_expression_is_used_verbatim() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        let next = next_run_for("0 0 2 * * *", from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 2, 2, 0, 0).unwrap());
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let err = validate_expression("* *").unwrap_err();
        assert!(err.to_string().contains("expected 5, 6, or 7 fields"));
    }

    #[test]
    fn rfc3339_round_trips_to_utc() {
        let parsed = parse_rfc3339("2024-03-01T04:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap());
    }
}
