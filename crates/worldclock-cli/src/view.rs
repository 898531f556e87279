//! Plain-text rendering of the clock list.

use chrono::{DateTime, Utc};
use std::time::Duration;
use worldclock_core::{sort_by_utc_offset, CityRecord, Clock};

/// ANSI clear screen + cursor home, used between `--watch` redraws.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// One line per clock, west to east at `now`.
pub fn render_clocks(clocks: &mut [Clock], now: DateTime<Utc>) -> String {
    // Offsets can change between ticks (DST), so sort on every render.
    sort_by_utc_offset(clocks, now);
    let mut out = String::new();
    for clock in clocks.iter() {
        out.push_str(&format!(
            "{:<24} {}  {}\n",
            clock.name().to_uppercase(),
            clock.format_time_at(now),
            clock.format_date_with_offset_at(now)
        ));
    }
    out
}

/// Answer line for `worldclock timezone`.
pub fn best_city_line(city: &CityRecord) -> String {
    format!("{city}, population {}", city.population())
}

/// Time left until the next whole second, so redraws land on the tick.
pub fn until_next_second(now: DateTime<Utc>) -> Duration {
    let nanos = 1_000_000_000u32.saturating_sub(now.timestamp_subsec_nanos());
    Duration::from_nanos(u64::from(nanos.max(1)))
}
