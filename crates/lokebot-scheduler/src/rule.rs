//! Next-occurrence computation for normalized recurrence rules.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Timelike, Utc};

use crate::types::NormalizedFieldSpec;

// Generous upper bound on search steps. Every adjustment below moves the
// candidate strictly forward by at least a day, hour, minute or second at
// the matching granularity, so real rules resolve in a handful of steps.
const MAX_STEPS: u32 = 100_000;

/// Compute the next UTC instant strictly after `after` whose calendar fields
/// all match `spec`.
///
/// An absent field matches every value; all present fields must match
/// simultaneously, day-of-month and day-of-week included. Returns `None`
/// when the rule is exhausted (a year-constrained rule entirely in the past)
/// or can never match (e.g. February 30th).
pub fn next_occurrence(
    spec: &NormalizedFieldSpec,
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let mut c = (after + Duration::seconds(1))
        .with_nanosecond(0)
        .expect("zero nanoseconds is valid");

    // Scan horizon: past the last listed year, or past the longest gap an
    // unconstrained-year rule can exhibit (a Feb-29 rule can wait 8 years).
    let max_year = match &spec.year {
        Some(years) => years.iter().copied().max()?,
        None => after.year() + 12,
    };

    for _ in 0..MAX_STEPS {
        if c.year() > max_year {
            return None;
        }

        if let Some(years) = &spec.year {
            if !years.contains(&c.year()) {
                let next = years.iter().copied().filter(|&y| y > c.year()).min()?;
                c = Utc.with_ymd_and_hms(next, 1, 1, 0, 0, 0).single()?;
                continue;
            }
        }

        if let Some(months) = &spec.month {
            if !months.contains(&(c.month() as i32)) {
                let next = months
                    .iter()
                    .copied()
                    .filter(|&m| m > c.month() as i32 && m <= 12)
                    .min();
                c = match next {
                    Some(m) => Utc
                        .with_ymd_and_hms(c.year(), m as u32, 1, 0, 0, 0)
                        .single()?,
                    None => Utc
                        .with_ymd_and_hms(c.year() + 1, 1, 1, 0, 0, 0)
                        .single()?,
                };
                continue;
            }
        }

        if let Some(dates) = &spec.date {
            if !dates.contains(&(c.day() as i32)) {
                let last = days_in_month(c.year(), c.month()) as i32;
                let next = dates
                    .iter()
                    .copied()
                    .filter(|&d| d > c.day() as i32 && d <= last)
                    .min();
                c = match next {
                    Some(d) => Utc
                        .with_ymd_and_hms(c.year(), c.month(), d as u32, 0, 0, 0)
                        .single()?,
                    None => first_of_next_month(c)?,
                };
                continue;
            }
        }

        if let Some(dows) = &spec.day_of_week {
            if !dows.contains(&(c.weekday().num_days_from_sunday() as i32)) {
                c = midnight(c.date_naive().checked_add_days(Days::new(1))?)?;
                continue;
            }
        }

        if let Some(hours) = &spec.hour {
            if !hours.contains(&(c.hour() as i32)) {
                let next = hours
                    .iter()
                    .copied()
                    .filter(|&h| h > c.hour() as i32 && h <= 23)
                    .min();
                c = match next {
                    Some(h) => c
                        .with_hour(h as u32)
                        .and_then(|c| c.with_minute(0))
                        .and_then(|c| c.with_second(0))?,
                    None => midnight(c.date_naive().checked_add_days(Days::new(1))?)?,
                };
                continue;
            }
        }

        if let Some(minutes) = &spec.minute {
            if !minutes.contains(&(c.minute() as i32)) {
                let next = minutes
                    .iter()
                    .copied()
                    .filter(|&m| m > c.minute() as i32 && m <= 59)
                    .min();
                c = match next {
                    Some(m) => c.with_minute(m as u32).and_then(|c| c.with_second(0))?,
                    None => {
                        c.with_minute(0).and_then(|c| c.with_second(0))?
                            + Duration::hours(1)
                    }
                };
                continue;
            }
        }

        if let Some(seconds) = &spec.second {
            if !seconds.contains(&(c.second() as i32)) {
                let next = seconds
                    .iter()
                    .copied()
                    .filter(|&s| s > c.second() as i32 && s <= 59)
                    .min();
                c = match next {
                    Some(s) => c.with_second(s as u32)?,
                    None => c.with_second(0)? + Duration::minutes(1),
                };
                continue;
            }
        }

        return Some(c);
    }

    None
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn first_of_next_month(c: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if c.month() == 12 {
        Utc.with_ymd_and_hms(c.year() + 1, 1, 1, 0, 0, 0).single()
    } else {
        Utc.with_ymd_and_hms(c.year(), c.month() + 1, 1, 0, 0, 0).single()
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid month start");
    (next - first).num_days() as u32
}
