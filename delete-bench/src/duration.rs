//! Parsing of human-written durations such as `6h`, `90m` or `1h30m`.

use bench_core::BenchError;
use chrono::TimeDelta;

/// Parse a sequence of `<number><unit>` terms into a duration.
///
/// Units: `h`, `m`, `s`, `ms`, `us` (or `µs`), `ns`. Numbers may carry a
/// fractional part (`1.5h`). A bare `0` is accepted; signs are not.
pub fn parse_duration(input: &str) -> Result<TimeDelta, BenchError> {
    let invalid = || {
        BenchError::Config(format!(
            "invalid duration '{input}' (expected e.g. 1h, 90m, 1h30m)"
        ))
    };

    let s = input.trim();
    if s.is_empty() {
        return Err(invalid());
    }
    if s == "0" {
        return Ok(TimeDelta::zero());
    }

    let mut rest = s;
    let mut total_ns = 0f64;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if number_end == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_end].parse().map_err(|_| invalid())?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let ns_per_unit = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return Err(invalid()),
        };
        total_ns += value * ns_per_unit;
        rest = &rest[unit_end..];
    }

    if total_ns >= i64::MAX as f64 {
        return Err(invalid());
    }
    Ok(TimeDelta::nanoseconds(total_ns.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_units() {
        assert_eq!(parse_duration("1h").unwrap(), TimeDelta::hours(1));
        assert_eq!(parse_duration("90m").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration("45s").unwrap(), TimeDelta::seconds(45));
        assert_eq!(parse_duration("250ms").unwrap(), TimeDelta::milliseconds(250));
        assert_eq!(parse_duration("3us").unwrap(), TimeDelta::microseconds(3));
        assert_eq!(parse_duration("3µs").unwrap(), TimeDelta::microseconds(3));
        assert_eq!(parse_duration("7ns").unwrap(), TimeDelta::nanoseconds(7));
    }

    #[test]
    fn compound_and_fractional() {
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            TimeDelta::minutes(90)
        );
        assert_eq!(parse_duration("1.5h").unwrap(), TimeDelta::minutes(90));
        assert_eq!(
            parse_duration("2h45m30s").unwrap(),
            TimeDelta::seconds(2 * 3600 + 45 * 60 + 30)
        );
    }

    #[test]
    fn zero_is_accepted() {
        assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "h", "6", "6x", "-1h", "1..5h", "1h 30m", "abc"] {
            assert!(
                matches!(parse_duration(bad), Err(BenchError::Config(_))),
                "accepted {bad:?}"
            );
        }
    }
}
