//! Age classification against an archiving or deletion window
//!
//! All ages are measured against a single `now` fixed at run start, so every file in a
//! run is judged by the same clock.

use chrono::{DateTime, Local};

/// Seconds in one day, the unit of every window
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calendar format used for bundle names and entry prefixes (day-month-year)
pub const BUNDLE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Age of a file in (fractional) days
///
/// Negative when the modification time lies in the future.
pub fn age_days(now_epoch: f64, modified_epoch: f64) -> f64 {
    (now_epoch - modified_epoch) / SECONDS_PER_DAY
}

/// Strict window test: a file exactly at the boundary is not yet a candidate
pub fn is_past_window(age_days: f64, window_days: f64) -> bool {
    age_days > window_days
}

/// Local calendar date of a modification time, formatted `DD-MM-YYYY`
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use logkeeper_domain::age::bucket_date;
///
/// let noon = Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).single().unwrap();
/// assert_eq!(bucket_date(noon.timestamp() as f64), "15-03-2024");
/// ```
pub fn bucket_date(modified_epoch: f64) -> String {
    let secs = modified_epoch.floor();
    let nanos = ((modified_epoch - secs) * 1e9) as u32;
    let utc = DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)).unwrap_or_default();
    utc.with_timezone(&Local).format(BUNDLE_DATE_FORMAT).to_string()
}

/// Result of classifying one file
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Whether the file is strictly older than the window
    pub is_candidate: bool,

    /// Age in days relative to the run's `now`
    pub age_days: f64,

    /// Bundle date, only computed for log files headed for archiving
    pub bucket_date: Option<String>,
}

/// Classifies modification times against one window
///
/// # Examples
///
/// ```
/// use logkeeper_domain::AgeClassifier;
///
/// let now = 1_700_000_000.0;
/// let classifier = AgeClassifier::new(now, 7.0);
///
/// assert!(!classifier.classify(now - 7.0 * 86_400.0).is_candidate);
/// assert!(classifier.classify(now - 8.0 * 86_400.0).is_candidate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeClassifier {
    now_epoch: f64,
    window_days: f64,
}

impl AgeClassifier {
    /// Create a classifier for a fixed `now` (seconds since the Unix epoch) and window
    pub fn new(now_epoch: f64, window_days: f64) -> Self {
        Self {
            now_epoch,
            window_days,
        }
    }

    /// The run's reference time
    pub fn now_epoch(&self) -> f64 {
        self.now_epoch
    }

    /// The window in days
    pub fn window_days(&self) -> f64 {
        self.window_days
    }

    /// Classify without a bucket date (deletion candidates)
    pub fn classify(&self, modified_epoch: f64) -> Classification {
        let age = age_days(self.now_epoch, modified_epoch);
        Classification {
            is_candidate: is_past_window(age, self.window_days),
            age_days: age,
            bucket_date: None,
        }
    }

    /// Classify a log file, attaching its bundle date when it is a candidate
    pub fn classify_for_archive(&self, modified_epoch: f64) -> Classification {
        let mut classification = self.classify(modified_epoch);
        if classification.is_candidate {
            classification.bucket_date = Some(bucket_date(modified_epoch));
        }
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const NOW: f64 = 1_700_000_000.0;

    #[test]
    fn test_exact_boundary_is_not_candidate() {
        let classifier = AgeClassifier::new(NOW, 7.0);
        let result = classifier.classify(NOW - 7.0 * SECONDS_PER_DAY);

        assert_eq!(result.age_days, 7.0);
        assert!(!result.is_candidate);
    }

    #[test]
    fn test_just_past_boundary_is_candidate() {
        let classifier = AgeClassifier::new(NOW, 7.0);
        let result = classifier.classify(NOW - 7.01 * SECONDS_PER_DAY);

        assert!(result.is_candidate);
        assert!(result.age_days > 7.0);
    }

    #[test]
    fn test_future_mtime_never_candidate() {
        let classifier = AgeClassifier::new(NOW, 0.0);
        let result = classifier.classify(NOW + 3600.0);

        assert!(result.age_days < 0.0);
        assert!(!result.is_candidate);
    }

    #[test]
    fn test_zero_window_archives_anything_older_than_now() {
        let classifier = AgeClassifier::new(NOW, 0.0);
        assert!(classifier.classify(NOW - 1.0).is_candidate);
        assert!(!classifier.classify(NOW).is_candidate);
    }

    #[test]
    fn test_plain_classify_has_no_bucket_date() {
        let classifier = AgeClassifier::new(NOW, 1.0);
        assert_eq!(classifier.classify(NOW - 10.0 * SECONDS_PER_DAY).bucket_date, None);
    }

    #[test]
    fn test_archive_classify_dates_candidates_only() {
        let classifier = AgeClassifier::new(NOW, 1.0);

        let old = classifier.classify_for_archive(NOW - 10.0 * SECONDS_PER_DAY);
        assert_eq!(old.bucket_date, Some(bucket_date(NOW - 10.0 * SECONDS_PER_DAY)));

        let fresh = classifier.classify_for_archive(NOW - 3600.0);
        assert_eq!(fresh.bucket_date, None);
    }

    #[test]
    fn test_bucket_date_uses_local_calendar_day() {
        let morning = Local.with_ymd_and_hms(2023, 1, 2, 0, 30, 0).single().unwrap();
        let evening = Local.with_ymd_and_hms(2023, 1, 2, 23, 30, 0).single().unwrap();

        assert_eq!(bucket_date(morning.timestamp() as f64), "02-01-2023");
        assert_eq!(bucket_date(evening.timestamp() as f64), "02-01-2023");
    }

    #[test]
    fn test_bucket_date_ignores_subsecond_part() {
        let t = Local.with_ymd_and_hms(2022, 12, 31, 12, 0, 0).single().unwrap();
        assert_eq!(bucket_date(t.timestamp() as f64 + 0.75), "31-12-2022");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: candidacy is exactly the strict comparison on age
        #[test]
        fn test_candidacy_matches_strict_inequality(
            age_secs in 0u64..(400 * 86_400),
            window in 0u32..365,
        ) {
            let now = 1_700_000_000.0;
            let classifier = AgeClassifier::new(now, window as f64);
            let result = classifier.classify(now - age_secs as f64);

            prop_assert_eq!(result.is_candidate, age_secs as f64 > window as f64 * SECONDS_PER_DAY);
        }

        /// Property: bucket dates always render as DD-MM-YYYY
        #[test]
        fn test_bucket_date_shape(epoch in 0i64..4_000_000_000i64) {
            let date = bucket_date(epoch as f64);
            prop_assert_eq!(date.len(), 10);
            prop_assert_eq!(&date[2..3], "-");
            prop_assert_eq!(&date[5..6], "-");
        }
    }
}
