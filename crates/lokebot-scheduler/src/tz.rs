//! Timezone resolution: IANA zone name or raw offset → minutes east of UTC.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, SchedulerError};

/// Timezone designator accepted by the facade: an IANA zone name, or a UTC
/// offset given directly in minutes east of UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneSpec {
    Iana(String),
    OffsetMinutes(i32),
}

impl From<&str> for ZoneSpec {
    fn from(name: &str) -> Self {
        ZoneSpec::Iana(name.to_string())
    }
}

impl From<String> for ZoneSpec {
    fn from(name: String) -> Self {
        ZoneSpec::Iana(name)
    }
}

impl From<i32> for ZoneSpec {
    fn from(minutes: i32) -> Self {
        ZoneSpec::OffsetMinutes(minutes)
    }
}

/// Resolve `zone` to its UTC offset in minutes east of UTC, as in effect at
/// `now`.
///
/// A zone currently under daylight saving returns its seasonal offset, not a
/// fixed year-round constant. Raw offsets pass through unchanged; sub-hour
/// offsets are supported.
pub fn resolve_offset(zone: &ZoneSpec, now: DateTime<Utc>) -> Result<i32> {
    match zone {
        ZoneSpec::OffsetMinutes(minutes) => Ok(*minutes),
        ZoneSpec::Iana(name) => {
            let tz: Tz = name
                .parse()
                .map_err(|_| SchedulerError::UnknownTimezone(name.clone()))?;
            let offset = tz.offset_from_utc_datetime(&now.naive_utc());
            Ok(offset.fix().local_minus_utc() / 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn utc_resolves_to_zero() {
        let offset = resolve_offset(&"UTC".into(), at(2024, 1, 15)).unwrap();
        assert_eq!(offset, 0);
    }

    #[test]
    fn oslo_is_plus_one_in_winter() {
        let offset = resolve_offset(&"Europe/Oslo".into(), at(2024, 1, 15)).unwrap();
        assert_eq!(offset, 60);
    }

    #[test]
    fn oslo_is_plus_two_in_summer() {
        let offset = resolve_offset(&"Europe/Oslo".into(), at(2024, 7, 15)).unwrap();
        assert_eq!(offset, 120);
    }

    #[test]
    fn kathmandu_has_sub_hour_offset() {
        let offset = resolve_offset(&"Asia/Kathmandu".into(), at(2024, 1, 15)).unwrap();
        assert_eq!(offset, 345);
    }

    #[test]
    fn raw_offset_passes_through() {
        let offset = resolve_offset(&ZoneSpec::OffsetMinutes(90), at(2024, 1, 15)).unwrap();
        assert_eq!(offset, 90);
        let offset = resolve_offset(&(-120).into(), at(2024, 1, 15)).unwrap();
        assert_eq!(offset, -120);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let err = resolve_offset(&"Middle/Earth".into(), at(2024, 1, 15)).unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownTimezone(name) if name == "Middle/Earth"));
    }
}
