//! Provides miscellaneous utilities.

use std::time::Duration;

/// Returns the trimmed value if it is present and not blank.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a threshold amount.
///
/// Returns zero if `value` is `None` or blank.
///
/// Fails if:
/// - `value` is not a decimal number
/// - `value` is negative or not finite
pub fn parse_threshold_amount(value: Option<&str>) -> Result<f64, anyhow::Error> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(0.0),
        Some(value) => value,
    };
    let amount: f64 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("\"{value}\" is not a decimal number"))?;
    if !amount.is_finite() {
        anyhow::bail!("\"{value}\" is not a finite number");
    }
    if amount < 0.0 {
        anyhow::bail!("\"{value}\" is negative");
    }
    Ok(amount)
}

/// Parses a delay given in (possibly fractional) seconds.
///
/// Returns `default` if `value` is `None` or blank.
///
/// Fails if:
/// - `value` is not a decimal number
/// - `value` is negative or not finite
pub fn parse_delay_seconds(
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, anyhow::Error> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(value) => value,
    };
    let seconds: f64 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("\"{value}\" is not a number of seconds"))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| anyhow::anyhow!("\"{value}\" is not a valid delay"))
}

/// Parses an optional maximum number of attempts.
///
/// Returns `None` if `value` is `None` or blank.
///
/// Fails if:
/// - `value` is not an unsigned integer
/// - `value` is zero
pub fn parse_max_attempts(value: Option<&str>) -> Result<Option<u32>, anyhow::Error> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };
    let attempts: u32 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("\"{value}\" is not an unsigned integer"))?;
    if attempts == 0 {
        anyhow::bail!("maximum attempts must be at least 1");
    }
    Ok(Some(attempts))
}
