//! Time formatting for TEI `from`/`to`/`when`/`dur` attributes.
//!
//! Detection services report times as float seconds (or integer
//! milliseconds). The document carries two renderings:
//!
//! - Clock form `HH:MM:SS` for positions and cue durations. Fractions are
//!   truncated and the value wraps at 24 hours, so clock strings only sort
//!   in time order for recordings shorter than a day. Ordering inside the
//!   assembler therefore compares seconds, never these strings.
//! - Decimal form with two places (`12.50`) for shot and speech durations.

use chrono::NaiveTime;

const SECONDS_PER_DAY: u64 = 86_400;

/// Format an offset in seconds as `HH:MM:SS`.
///
/// Negative and non-finite inputs clamp to `00:00:00`.
pub fn clock(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let secs = (whole % SECONDS_PER_DAY) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "00:00:00".to_string())
}

/// Format seconds with exactly two decimals.
pub fn decimal(seconds: f64) -> String {
    format!("{seconds:.2}")
}

/// Convert integer milliseconds to seconds rounded to hundredths.
pub fn millis_to_seconds(millis: i64) -> f64 {
    (millis as f64 / 10.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: assert clock strings of ascending inputs are strictly ascending.
    fn assert_sorted_order(inputs: &[f64]) {
        let keys: Vec<String> = inputs.iter().map(|&s| clock(s)).collect();
        for i in 1..keys.len() {
            assert!(
                keys[i - 1] < keys[i],
                "Expected {} ({}) < {} ({})",
                inputs[i - 1],
                keys[i - 1],
                inputs[i],
                keys[i],
            );
        }
    }

    #[test]
    fn exact_values() {
        assert_eq!(clock(0.0), "00:00:00");
        assert_eq!(clock(12.99), "00:00:12");
        assert_eq!(clock(61.0), "00:01:01");
        assert_eq!(clock(3_725.4), "01:02:05");
    }

    #[test]
    fn wraps_after_a_day() {
        assert_eq!(clock(86_400.0), "00:00:00");
        assert_eq!(clock(86_461.0), "00:01:01");
    }

    #[test]
    fn negative_and_nan_clamp() {
        assert_eq!(clock(-4.0), "00:00:00");
        assert_eq!(clock(f64::NAN), "00:00:00");
    }

    #[test]
    fn clock_strings_sort_within_a_day() {
        assert_sorted_order(&[0.0, 9.0, 10.0, 59.0, 60.0, 599.0, 3_600.0, 86_399.0]);
    }

    #[test]
    fn decimal_two_places() {
        assert_eq!(decimal(5.0), "5.00");
        assert_eq!(decimal(1.234), "1.23");
    }

    #[test]
    fn millis_round_to_hundredths() {
        assert_eq!(millis_to_seconds(12_300), 12.3);
        assert_eq!(millis_to_seconds(1_001), 1.0);
        assert_eq!(millis_to_seconds(0), 0.0);
        assert_eq!(millis_to_seconds(15_126), 15.13);
    }
}
