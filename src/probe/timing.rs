use std::time::Duration;

const NANOS_PER_MILLI: u128 = 1_000_000;

/// Rounds `elapsed` to whole milliseconds, ties to even.
pub fn round_millis(elapsed: Duration) -> u64 {
    let nanos = elapsed.as_nanos();
    let quotient = nanos / NANOS_PER_MILLI;
    let remainder = nanos % NANOS_PER_MILLI;
    let half = NANOS_PER_MILLI / 2;
    let rounded = if remainder > half || (remainder == half && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    };
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// URL actually requested for a stored record: `https://` is assumed when
/// the record carries no scheme.
pub fn probe_target(url: &str) -> String {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(Duration::from_secs_f64(0.1234)), 123);
        assert_eq!(round_millis(Duration::from_secs_f64(1.5678)), 1568);
        assert_eq!(round_millis(Duration::ZERO), 0);
        assert_eq!(round_millis(Duration::from_nanos(400_000)), 0);
        assert_eq!(round_millis(Duration::from_nanos(600_000)), 1);
    }

    #[test]
    fn test_round_millis_ties_to_even() {
        assert_eq!(round_millis(Duration::from_micros(2_500)), 2);
        assert_eq!(round_millis(Duration::from_micros(3_500)), 4);
        assert_eq!(round_millis(Duration::from_micros(500)), 0);
        assert_eq!(round_millis(Duration::from_micros(1_500)), 2);
    }

    #[test]
    fn test_probe_target() {
        assert_eq!(probe_target("app.example.com/x"), "https://app.example.com/x");
        assert_eq!(probe_target("http://app.example.com"), "http://app.example.com");
        assert_eq!(probe_target("HTTPS://app.example.com"), "HTTPS://app.example.com");
        assert_eq!(probe_target("é.example"), "https://é.example");
    }
}
