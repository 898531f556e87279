// crates/worldclock-core/src/clock.rs
use crate::error::ClockError;
use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;

/// A named clock showing the time in one timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    name: String,
    tz: Tz,
}

impl Clock {
    pub fn new(name: impl Into<String>, timezone: &str) -> Result<Self, ClockError> {
        let tz = parse_timezone(timezone)?;
        Ok(Self {
            name: name.into(),
            tz,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_at(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// 24-hour `HH:MM:SS`.
    pub fn format_time_at(&self, instant: DateTime<Utc>) -> String {
        self.time_at(instant).format("%H:%M:%S").to_string()
    }

    /// `YYYY-MM-DD`.
    pub fn format_date_at(&self, instant: DateTime<Utc>) -> String {
        self.time_at(instant).format("%Y-%m-%d").to_string()
    }

    /// Seconds east of UTC at `instant` (DST aware).
    pub fn utc_offset_at(&self, instant: DateTime<Utc>) -> i32 {
        self.time_at(instant).offset().fix().local_minus_utc()
    }

    /// `UTC±HH:MM`.
    pub fn format_utc_offset_at(&self, instant: DateTime<Utc>) -> String {
        format_offset(self.utc_offset_at(instant))
    }

    /// `YYYY-MM-DD - UTC±HH:MM`.
    pub fn format_date_with_offset_at(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{} - {}",
            self.format_date_at(instant),
            self.format_utc_offset_at(instant)
        )
    }
}

pub fn parse_timezone(timezone: &str) -> Result<Tz, ClockError> {
    timezone
        .parse::<Tz>()
        .map_err(|_| ClockError::UnknownTimezone(timezone.to_string()))
}

fn format_offset(offset: i32) -> String {
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    format!("UTC{}{:02}:{:02}", sign, offset / 3600, (offset % 3600) / 60)
}

/// Orders clocks west to east by their offset at `instant`. Stable.
pub fn sort_by_utc_offset(clocks: &mut [Clock], instant: DateTime<Utc>) {
    clocks.sort_by_key(|c| c.utc_offset_at(instant));
}
