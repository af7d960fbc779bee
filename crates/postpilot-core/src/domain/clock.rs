use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};

use crate::error::DomainError;

/// Naive formats accepted from `datetime-local` style inputs.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// The single timezone context used for every "now vs fire time" comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerClock {
    offset: FixedOffset,
}

impl SchedulerClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse an offset such as `+05:30`, `-0800` or `Z`.
    pub fn from_offset_str(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        let (sign, rest) = match s.split_at_checked(1) {
            Some(("+", rest)) => (1, rest),
            Some(("-", rest)) => (-1, rest),
            _ => return Err(invalid_offset(s)),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid_offset(s));
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid_offset(s))?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid_offset(s))?;
        if minutes >= 60 {
            return Err(invalid_offset(s));
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::new)
            .ok_or_else(|| invalid_offset(s))
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Attach the clock's offset to a naive timestamp.
    pub fn localize(&self, naive: NaiveDateTime) -> DateTime<FixedOffset> {
        naive
            .and_local_timezone(self.offset)
            .single()
            .unwrap_or_else(|| DateTime::from_naive_utc_and_offset(naive - self.offset, self.offset))
    }

    /// Express an aware timestamp in the clock's offset. The instant is unchanged.
    pub fn normalize(&self, time: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        time.with_timezone(&self.offset)
    }

    /// Parse RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` assumed to be in the clock's offset.
    pub fn parse(&self, input: &str) -> Result<DateTime<FixedOffset>, DomainError> {
        let input = input.trim();
        if let Ok(aware) = DateTime::parse_from_rfc3339(input) {
            return Ok(self.normalize(aware));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .map(|naive| self.localize(naive))
            .ok_or_else(|| {
                DomainError::Validation(format!("invalid scheduled time '{input}'"))
            })
    }
}

impl Default for SchedulerClock {
    /// IST, the offset the service has always scheduled in.
    fn default() -> Self {
        FixedOffset::east_opt(5 * 3600 + 30 * 60)
            .map(Self::new)
            .unwrap_or_else(Self::utc)
    }
}

fn invalid_offset(s: &str) -> DomainError {
    DomainError::Validation(format!("invalid timezone offset '{s}'"))
}
