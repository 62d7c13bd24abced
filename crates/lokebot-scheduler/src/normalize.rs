//! UTC normalization of wall-clock field specs.
//!
//! A schedule arrives expressed in the wall-clock terms of some timezone.
//! The executor evaluates rules in its own clock frame, so every field value
//! must be re-expressed there. Shifting a single representative instant and
//! reusing its per-field *delta* is what lets multi-valued fields (e.g.
//! `hour: [9, 13, 17]`) convert in one pass: the carry is a property of the
//! offset transition at roughly that time of day/year, not of the individual
//! value.

use chrono::{DateTime, Datelike, Duration, Months, Timelike, Utc};
use tracing::warn;

use crate::types::{FieldSpec, NormalizedFieldSpec, RecurrenceDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarField {
    Year,
    Month,
    Date,
    Hour,
    Minute,
    Second,
}

/// Convert `spec` from the wall-clock frame at `target_offset_minutes` east
/// of UTC into the executor's frame at `executor_offset_minutes` east of UTC.
///
/// Pure function of its arguments: the input spec is never mutated, and equal
/// inputs always produce equal output. When both offsets agree the spec comes
/// back numerically unchanged.
pub fn normalize(
    spec: &FieldSpec,
    target_offset_minutes: i32,
    executor_offset_minutes: i32,
    now: DateTime<Utc>,
) -> NormalizedFieldSpec {
    let year = expand_field(&spec.year, "year");
    let month = expand_field(&spec.month, "month");
    let date = expand_field(&spec.date, "date");
    let hour = expand_field(&spec.hour, "hour");
    let minute = expand_field(&spec.minute, "minute");
    let mut second = expand_field(&spec.second, "second");
    let day_of_week = expand_field(&spec.day_of_week, "day_of_week");

    // An unset second would fire on every second of a matching minute;
    // default it to :00 whenever any other field is constrained.
    let any_other = year.is_some()
        || month.is_some()
        || date.is_some()
        || hour.is_some()
        || minute.is_some()
        || day_of_week.is_some();
    if second.is_none() && any_other {
        second = Some(vec![0]);
    }

    // Representative instant: "now" with each constrained field overwritten
    // by its first value. Used only to measure the carry each field undergoes
    // under the frame shift, never as a fired value.
    let mut t0 = now.with_nanosecond(0).expect("zero nanoseconds is valid");
    if let Some(vs) = &year {
        t0 = set_field(t0, CalendarField::Year, vs[0] as i64);
    }
    if let Some(vs) = &month {
        t0 = set_field(t0, CalendarField::Month, vs[0] as i64);
    }
    if let Some(vs) = &date {
        t0 = set_field(t0, CalendarField::Date, vs[0] as i64);
    }
    if let Some(vs) = &hour {
        t0 = set_field(t0, CalendarField::Hour, vs[0] as i64);
    }
    if let Some(vs) = &minute {
        t0 = set_field(t0, CalendarField::Minute, vs[0] as i64);
    }
    if let Some(vs) = &second {
        t0 = set_field(t0, CalendarField::Second, vs[0] as i64);
    }

    // Reinterpret the same clock-face reading in the executor's frame:
    // strip the executor's own offset, apply the target offset.
    let shift = executor_offset_minutes as i64 - target_offset_minutes as i64;
    let t1 = t0 + Duration::minutes(shift);

    // Whole-unit carry per field, with all finer-grained fields zeroed so
    // smaller-field noise cannot leak into the diff.
    let delta_year = floor_to_year(t1).year() as i64 - floor_to_year(t0).year() as i64;
    let (m0, m1) = (floor_to_month(t0), floor_to_month(t1));
    let delta_month = (m1.year() as i64 * 12 + m1.month0() as i64)
        - (m0.year() as i64 * 12 + m0.month0() as i64);
    let delta_days =
        (floor_to_day(t1).date_naive() - floor_to_day(t0).date_naive()).num_days();
    let delta_hours = (floor_to_hour(t1) - floor_to_hour(t0)).num_hours();
    let delta_minutes = t1.minute() as i64 - t0.minute() as i64;
    let delta_seconds = t1.second() as i64 - t0.second() as i64;

    let shifted = |vs: &Option<Vec<i32>>, field: CalendarField, delta: i64| -> Option<Vec<i32>> {
        vs.as_ref().map(|vs| {
            vs.iter()
                .map(|&v| read_field(set_field(t0, field, v as i64 + delta), field))
                .collect()
        })
    };

    NormalizedFieldSpec {
        year: shifted(&year, CalendarField::Year, delta_year),
        month: shifted(&month, CalendarField::Month, delta_month),
        date: shifted(&date, CalendarField::Date, delta_days),
        hour: shifted(&hour, CalendarField::Hour, delta_hours),
        minute: shifted(&minute, CalendarField::Minute, delta_minutes),
        second: shifted(&second, CalendarField::Second, delta_seconds),
        // Weekday has no calendar-carry semantics of its own: the day delta
        // applies modulo the week, and the result must stay in 0..=6.
        day_of_week: day_of_week.map(|vs| {
            vs.iter()
                .map(|&v| (v as i64 + delta_days).rem_euclid(7) as i32)
                .collect()
        }),
    }
}

fn expand_field(def: &Option<RecurrenceDef>, name: &str) -> Option<Vec<i32>> {
    let values = def.as_ref()?.expand();
    if values.is_empty() {
        warn!(field = name, "field expands to no values; treating as unconstrained");
        return None;
    }
    Some(values)
}

/// Set one calendar field on `t`, letting out-of-range values bubble through
/// coarser fields via real date arithmetic (day 32 of January lands on
/// February 1st; hour 25 lands on 01:00 the next day). Month lengths and
/// leap years are honoured because the arithmetic goes through the calendar,
/// not through a raw modulus.
fn set_field(t: DateTime<Utc>, field: CalendarField, value: i64) -> DateTime<Utc> {
    match field {
        CalendarField::Year => {
            // Anchor at the 1st so setting the year on a leap day bubbles
            // into March instead of producing an invalid date.
            let day0 = t.day0() as i64;
            let first = t.with_day(1).expect("the 1st exists in every month");
            let moved = first
                .with_year(value as i32)
                .expect("the 1st exists in every year");
            moved + Duration::days(day0)
        }
        CalendarField::Month => {
            let day0 = t.day0() as i64;
            let first = t.with_day(1).expect("the 1st exists in every month");
            let jan = first.with_month(1).expect("january has a 1st");
            add_months(jan, value - 1) + Duration::days(day0)
        }
        CalendarField::Date => {
            let first = t.with_day(1).expect("the 1st exists in every month");
            first + Duration::days(value - 1)
        }
        CalendarField::Hour => {
            let floor = t.with_hour(0).expect("hour zero is valid");
            floor + Duration::hours(value)
        }
        CalendarField::Minute => {
            let floor = t.with_minute(0).expect("minute zero is valid");
            floor + Duration::minutes(value)
        }
        CalendarField::Second => {
            let floor = t.with_second(0).expect("second zero is valid");
            floor + Duration::seconds(value)
        }
    }
}

fn read_field(t: DateTime<Utc>, field: CalendarField) -> i32 {
    match field {
        CalendarField::Year => t.year(),
        CalendarField::Month => t.month() as i32,
        CalendarField::Date => t.day() as i32,
        CalendarField::Hour => t.hour() as i32,
        CalendarField::Minute => t.minute() as i32,
        CalendarField::Second => t.second() as i32,
    }
}

fn add_months(t: DateTime<Utc>, months: i64) -> DateTime<Utc> {
    if months >= 0 {
        t.checked_add_months(Months::new(months as u32))
    } else {
        t.checked_sub_months(Months::new((-months) as u32))
    }
    .expect("month arithmetic within supported range")
}

fn floor_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .expect("zeroing minute and second is valid")
}

fn floor_to_day(t: DateTime<Utc>) -> DateTime<Utc> {
    floor_to_hour(t).with_hour(0).expect("hour zero is valid")
}

fn floor_to_month(t: DateTime<Utc>) -> DateTime<Utc> {
    floor_to_day(t).with_day(1).expect("the 1st exists in every month")
}

fn floor_to_year(t: DateTime<Utc>) -> DateTime<Utc> {
    floor_to_month(t).with_month(1).expect("january has a 1st")
}
