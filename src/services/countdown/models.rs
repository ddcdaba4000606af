use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use super::error::CountdownError;

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// The deadline the countdown runs towards.
///
/// Keeps the offset it was written with so logs can echo it back, but all
/// arithmetic is done on the absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetInstant(DateTime<FixedOffset>);

impl TargetInstant {
    /// Parse an ISO-8601 / RFC 3339 timestamp carrying an explicit offset,
    /// e.g. `2025-08-25T00:00:00+05:30` or `2025-08-24T18:30:00Z`.
    pub fn parse(input: &str) -> Result<Self, CountdownError> {
        let trimmed = input.trim();
        DateTime::parse_from_rfc3339(trimmed)
            .map(Self)
            .map_err(|source| CountdownError::InvalidTarget {
                input: trimmed.to_string(),
                source,
            })
    }

    pub fn from_datetime<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self(instant.fixed_offset())
    }

    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// Milliseconds left until the deadline as seen from `now`, floored at zero.
    pub fn millis_remaining<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        let delta = self.0.signed_duration_since(now).num_milliseconds();
        u64::try_from(delta).unwrap_or(0)
    }
}

impl fmt::Display for TargetInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Lifecycle of a countdown. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Running,
    Finished,
}

/// Time left on the countdown split into display buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RemainingDuration {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub total_milliseconds: u64,
}

impl RemainingDuration {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        total_milliseconds: 0,
    };

    /// Decompose a millisecond count. Sub-second remainders are truncated,
    /// so anything under 1000 ms shows as all zeros while
    /// `total_milliseconds` stays positive.
    pub fn from_millis(total_milliseconds: u64) -> Self {
        let total_seconds = total_milliseconds / 1000;
        let days = total_seconds / SECONDS_PER_DAY;
        let hours = (total_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
        let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
        let seconds = total_seconds % SECONDS_PER_MINUTE;

        Self {
            days,
            // Bounded by 23 and 59 respectively.
            hours: hours as u32,
            minutes: minutes as u32,
            seconds: seconds as u32,
            total_milliseconds,
        }
    }

    /// Remaining time from `now` until `target`, zero once the target has passed.
    pub fn between<Tz: TimeZone>(target: &TargetInstant, now: &DateTime<Tz>) -> Self {
        Self::from_millis(target.millis_remaining(now))
    }

    pub fn is_zero(&self) -> bool {
        self.total_milliseconds == 0
    }

    /// Whole seconds represented by the four display buckets.
    pub fn total_seconds(&self) -> u64 {
        self.days * SECONDS_PER_DAY
            + u64::from(self.hours) * SECONDS_PER_HOUR
            + u64::from(self.minutes) * SECONDS_PER_MINUTE
            + u64::from(self.seconds)
    }

    pub fn formatted(&self) -> FormattedRemaining {
        FormattedRemaining {
            days: format_component(self.days),
            hours: format_component(u64::from(self.hours)),
            minutes: format_component(u64::from(self.minutes)),
            seconds: format_component(u64::from(self.seconds)),
        }
    }
}

impl fmt::Display for RemainingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// The four display strings, each zero-padded to at least two digits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedRemaining {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl FormattedRemaining {
    /// Components in display order: days, hours, minutes, seconds.
    pub fn components(&self) -> [&str; 4] {
        [&self.days, &self.hours, &self.minutes, &self.seconds]
    }
}

impl fmt::Display for FormattedRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Zero-pad to a minimum of two digits; wider values keep their natural width.
pub fn format_component(value: u64) -> String {
    format!("{:02}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn ist(input: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(input).unwrap()
    }

    #[test]
    fn one_second_before_deadline() {
        let target = TargetInstant::parse("2025-08-25T00:00:00+05:30").unwrap();
        let now = ist("2025-08-24T23:59:59+05:30");

        let remaining = RemainingDuration::between(&target, &now);
        assert_eq!(
            remaining,
            RemainingDuration {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 1,
                total_milliseconds: 1000,
            }
        );
    }

    #[test]
    fn one_of_each_bucket() {
        let remaining = RemainingDuration::from_millis(90_061_000);
        assert_eq!(remaining.days, 1);
        assert_eq!(remaining.hours, 1);
        assert_eq!(remaining.minutes, 1);
        assert_eq!(remaining.seconds, 1);
    }

    #[test]
    fn target_in_the_past_is_zero() {
        let target = TargetInstant::parse("2025-08-25T00:00:00+05:30").unwrap();
        let now = ist("2025-08-25T00:00:00+05:30") + Duration::hours(3);

        assert_eq!(RemainingDuration::between(&target, &now), RemainingDuration::ZERO);
    }

    #[test]
    fn comparison_is_absolute_across_offsets() {
        let target = TargetInstant::parse("2025-08-25T00:00:00+05:30").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 8, 24, 18, 29, 0).unwrap();

        let remaining = RemainingDuration::between(&target, &now);
        assert_eq!(remaining.total_milliseconds, 60_000);
        assert_eq!(remaining.minutes, 1);
    }

    #[test]
    fn sub_second_remainder_truncates_to_zero_display() {
        let remaining = RemainingDuration::from_millis(999);
        assert_eq!(remaining.formatted().to_string(), "00:00:00:00");
        assert!(!remaining.is_zero());
    }

    #[test_case(0, "00")]
    #[test_case(7, "07")]
    #[test_case(59, "59")]
    #[test_case(100, "100")]
    #[test_case(1234, "1234")]
    fn format_component_pads_to_two_digits(value: u64, expected: &str) {
        assert_eq!(format_component(value), expected);
    }

    #[test]
    fn formatted_components_keep_display_order() {
        let formatted = RemainingDuration::from_millis(90_061_000).formatted();
        assert_eq!(formatted.components(), ["01", "01", "01", "01"]);
    }

    #[test_case("2025-08-25T00:00:00+05:30" ; "ist offset")]
    #[test_case("2025-08-25T00:00:00.000+05:30" ; "fractional seconds")]
    #[test_case("2025-08-24T18:30:00Z" ; "utc designator")]
    fn parses_targets_with_offsets(input: &str) {
        let target = TargetInstant::parse(input).unwrap();
        assert_eq!(
            target.as_datetime().timestamp(),
            ist("2025-08-25T00:00:00+05:30").timestamp()
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("2025-08-25T00:00:00" ; "missing offset")]
    #[test_case("2025-08-25" ; "date only")]
    #[test_case("August 25, 2025" ; "prose")]
    #[test_case("2025-13-01T00:00:00Z" ; "bad month")]
    fn rejects_invalid_targets(input: &str) {
        let err = TargetInstant::parse(input).unwrap_err();
        assert!(matches!(err, CountdownError::InvalidTarget { .. }));
    }

    #[test]
    fn engine_state_defaults_to_running() {
        assert_eq!(EngineState::default(), EngineState::Running);
    }
}
