use chrono::{Local, NaiveDateTime, Timelike};

/// Local wall-clock time rendered as ISO-8601 without offset.
/// Microseconds are printed only when non-zero.
pub fn local_iso_timestamp() -> String {
    format_iso(Local::now().naive_local())
}

pub fn format_iso(at: NaiveDateTime) -> String {
    if at.nanosecond() / 1_000 == 0 {
        at.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", at.format("%Y-%m-%dT%H:%M:%S"), at.nanosecond() / 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_microseconds_are_zero_padded() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 1, 42)
            .unwrap();
        assert_eq!(format_iso(at), "2025-03-09T07:05:01.000042");
    }

    #[test]
    fn test_whole_seconds_drop_fraction() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(format_iso(at), "2025-03-09T23:59:59");
    }
}
