//! Local civil time from epoch seconds: timezone offset, night hours,
//! ISO-8601 timestamps.
//!
//! Pure arithmetic so it runs identically on host and device.  The wall
//! clock itself comes from [`ClockPort`](crate::app::ports::ClockPort).

use core::fmt::Write as _;

use crate::config::TimeConfig;

/// 2020-01-01T00:00:00Z.  Anything earlier means SNTP has not synced yet.
pub const SYNC_EPOCH_FLOOR: u64 = 1_577_836_800;

/// `YYYY-MM-DDTHH:MM:SSZ`
pub type Timestamp = heapless::String<20>;

/// Broken-down local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CivilTime {
    /// Convert seconds since the Unix epoch (already offset to local time).
    pub fn from_epoch(secs: i64) -> Self {
        let days = secs.div_euclid(86_400);
        let rem = secs.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u8,
            minute: (rem % 3600 / 60) as u8,
            second: (rem % 60) as u8,
        }
    }

    pub fn iso(&self) -> Timestamp {
        let mut out = Timestamp::new();
        // 20 bytes always fit a four-digit year.
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        );
        out
    }
}

/// Days since 1970-01-01 to (year, month, day), proleptic Gregorian.
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}

/// Night window in local hours.  Wraps past midnight when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightHours {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl NightHours {
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            // e.g. 20..7, across midnight
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// Applies the configured offset and night window to wall-clock readings.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    offset_secs: i64,
    night: NightHours,
}

impl LocalClock {
    pub fn new(utc_offset_hours: i8, night: NightHours) -> Self {
        Self {
            offset_secs: i64::from(utc_offset_hours) * 3600,
            night,
        }
    }

    pub fn from_config(cfg: &TimeConfig) -> Self {
        Self::new(
            cfg.utc_offset_hours,
            NightHours {
                start_hour: cfg.night_start_hour,
                end_hour: cfg.night_end_hour,
            },
        )
    }

    /// Local time for a UTC epoch reading, `None` while unsynced.
    pub fn local(&self, utc_epoch_secs: u64) -> Option<CivilTime> {
        if utc_epoch_secs < SYNC_EPOCH_FLOOR {
            return None;
        }
        let secs = i64::try_from(utc_epoch_secs).ok()?;
        Some(CivilTime::from_epoch(secs + self.offset_secs))
    }

    /// Unsynced counts as day, so the lamp stays off until time is known.
    pub fn is_night(&self, now: Option<CivilTime>) -> bool {
        now.is_some_and(|t| self.night.contains(t.hour))
    }

    pub fn night(&self) -> NightHours {
        self.night
    }
}
