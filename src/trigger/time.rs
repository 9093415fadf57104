use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Text format of rule timestamps, e.g. `3 Oct 2016 17:00:10`.
pub const TIMESTAMP_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Zone rule timestamps are read in unless configured otherwise (EST).
pub fn default_reference_zone() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).expect("UTC-05:00 is a valid offset")
}

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("expected format like `3 Oct 2016 17:00:10`: {0}")]
    Format(#[from] chrono::ParseError),

    #[error("time is outside the supported date range")]
    OutOfRange,
}

/// A fixed instant compared against item publication times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTrigger {
    boundary: DateTime<Utc>,
}

impl TimeTrigger {
    pub fn new(boundary: DateTime<Utc>) -> Self {
        Self { boundary }
    }

    /// Parse `text` as wall-clock time in `zone` and convert it to an instant.
    pub fn parse(text: &str, zone: FixedOffset) -> Result<Self, TimestampError> {
        let naive = NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)?;
        let local = naive
            .and_local_timezone(zone)
            .single()
            .ok_or(TimestampError::OutOfRange)?;
        Ok(Self::new(local.with_timezone(&Utc)))
    }

    pub fn boundary(&self) -> DateTime<Utc> {
        self.boundary
    }

    pub fn is_before(&self, at: DateTime<Utc>) -> bool {
        at < self.boundary
    }

    pub fn is_after(&self, at: DateTime<Utc>) -> bool {
        at > self.boundary
    }
}

impl fmt::Display for TimeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.boundary.to_rfc3339())
    }
}
