//! The scheduling facade: cron parsing → timezone resolution → UTC
//! normalization → registration, in one synchronous call.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tracing::{error, info};

use crate::clock::{Clock, SystemClock};
use crate::cron;
use crate::error::Result;
use crate::normalize;
use crate::registry::{JobCallback, JobHandle, JobRegistry};
use crate::types::ScheduleInput;
use crate::tz::{self, ZoneSpec};

/// Entry point for registering UTC-normalized recurring jobs.
#[derive(Clone)]
pub struct Scheduler {
    registry: JobRegistry,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Build a scheduler on an explicit clock (tests use [`crate::MockClock`]).
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: JobRegistry::new(Arc::clone(&clock)),
            clock,
        }
    }

    /// Register a recurring job whose schedule is given in the wall-clock
    /// terms of `zone`.
    ///
    /// `input` is either a [`crate::FieldSpec`] or a 6-field cron expression.
    /// The zone's UTC offset is resolved once, here, at the current instant:
    /// a job registered under standard time keeps that offset across later
    /// daylight-saving transitions.
    ///
    /// Registration is all-or-nothing. On any failure nothing is registered,
    /// the error is logged, and `Err` is returned; other jobs are unaffected
    /// and the call may simply be repeated with corrected input.
    pub fn schedule_job_utc<F, Fut>(
        &self,
        name: &str,
        input: impl Into<ScheduleInput>,
        zone: impl Into<ZoneSpec>,
        callback: F,
    ) -> Result<JobHandle>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
    {
        let spec = match input.into() {
            ScheduleInput::Cron(expr) => cron::parse(&expr).map_err(|e| {
                error!(job = %name, %e, "registration rejected");
                e
            })?,
            ScheduleInput::Fields(spec) => spec,
        };

        let now = self.clock.now_utc();
        let offset = tz::resolve_offset(&zone.into(), now).map_err(|e| {
            error!(job = %name, %e, "registration rejected");
            e
        })?;

        // Rules are evaluated in UTC, so the executor frame's own offset is
        // zero.
        let normalized = normalize::normalize(&spec, offset, 0, now);

        // The callback may return any value; the scheduler discards it.
        let callback: JobCallback = Arc::new(move || {
            let fut = callback();
            Box::pin(async move {
                let _ = fut.await;
            }) as BoxFuture<'static, ()>
        });
        self.registry.register(name, normalized, callback)
    }

    /// The underlying registry; clones share the same job table.
    pub fn registry(&self) -> JobRegistry {
        self.registry.clone()
    }

    /// Fresh (name, next invocation) listing for diagnostics.
    pub fn next_invocations(&self) -> Vec<(String, Option<DateTime<Utc>>)> {
        self.registry.list_all()
    }

    /// Write one diagnostic line per registered job.
    pub fn log_next_invocations(&self) {
        for (name, next) in self.registry.list_all() {
            match next {
                Some(ts) => info!("Job <{name}> next invocation: {ts}"),
                None => info!("Job <{name}> next invocation: never"),
            }
        }
    }

    /// Drive job execution until `shutdown` broadcasts `true`.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        self.registry.run(shutdown).await;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::error::SchedulerError;
    use crate::types::{FieldSpec, RecurrenceDef::Single};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn oslo_morning() -> FieldSpec {
        FieldSpec {
            hour: Some(Single(9)),
            minute: Some(Single(0)),
            second: Some(Single(0)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn oslo_daily_job_fires_at_eight_utc_exactly_once() {
        let clock = MockClock::new(at(2024, 1, 15, 0, 0, 0));
        let scheduler = Scheduler::with_clock(Arc::new(clock.clone()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = scheduler
            .schedule_job_utc("Reset Loke-Status", oslo_morning(), "Europe/Oslo", move || {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(());
                }
            })
            .unwrap();

        // Oslo is UTC+1 in January: local 09:00 normalizes to 08:00 UTC.
        assert_eq!(handle.next_invocation(), Some(at(2024, 1, 15, 8, 0, 0)));

        clock.set(at(2024, 1, 15, 8, 0, 0));
        scheduler.registry().tick();
        tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("callback fired")
            .expect("channel open");
        assert_eq!(handle.run_count(), 1);
        assert_eq!(handle.next_invocation(), Some(at(2024, 1, 16, 8, 0, 0)));
    }

    #[tokio::test]
    async fn cron_input_registers_a_friday_job() {
        // 2024-01-15 is a Monday.
        let clock = MockClock::new(at(2024, 1, 15, 0, 0, 0));
        let scheduler = Scheduler::with_clock(Arc::new(clock));

        let handle = scheduler
            .schedule_job_utc("Weekend Announcement", "0 0 16 * * 5", "UTC", || async {})
            .unwrap();
        assert_eq!(handle.next_invocation(), Some(at(2024, 1, 19, 16, 0, 0)));
    }

    #[tokio::test]
    async fn invalid_cron_registers_nothing_and_never_fires() {
        let clock = MockClock::new(at(2024, 1, 15, 0, 0, 0));
        let scheduler = Scheduler::with_clock(Arc::new(clock.clone()));
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_in_cb = Arc::clone(&fired);
        let result = scheduler.schedule_job_utc("x", "not a cron string", "UTC", move || {
            let fired = Arc::clone(&fired_in_cb);
            async move {
                fired.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert!(matches!(
            result,
            Err(SchedulerError::InvalidCronExpression { .. })
        ));
        assert!(scheduler.next_invocations().is_empty());

        // Tick across a two-day window: nothing can fire.
        let registry = scheduler.registry();
        for _ in 0..48 {
            clock.advance(Duration::hours(1));
            registry.tick();
        }
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_timezone_registers_nothing() {
        let clock = MockClock::new(at(2024, 1, 15, 0, 0, 0));
        let scheduler = Scheduler::with_clock(Arc::new(clock));

        let result =
            scheduler.schedule_job_utc("morning", oslo_morning(), "Atlantis/Hyperborea", || async {});
        assert!(matches!(result, Err(SchedulerError::UnknownTimezone(_))));
        assert!(scheduler.next_invocations().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_keeps_the_first_registration() {
        let clock = MockClock::new(at(2024, 1, 15, 0, 0, 0));
        let scheduler = Scheduler::with_clock(Arc::new(clock));

        let first = scheduler
            .schedule_job_utc("morning", oslo_morning(), "Europe/Oslo", || async {})
            .unwrap();
        let planned = first.next_invocation();

        let second = scheduler.schedule_job_utc("morning", oslo_morning(), "UTC", || async {});
        assert!(matches!(
            second,
            Err(SchedulerError::DuplicateJobName { .. })
        ));
        assert_eq!(first.next_invocation(), planned);
        assert_eq!(scheduler.next_invocations().len(), 1);
    }

    #[tokio::test]
    async fn raw_offset_in_minutes_is_accepted() {
        let clock = MockClock::new(at(2024, 1, 15, 0, 0, 0));
        let scheduler = Scheduler::with_clock(Arc::new(clock));

        // UTC+5:45, sub-hour offset.
        let handle = scheduler
            .schedule_job_utc("katmandu-morning", oslo_morning(), 345, || async {})
            .unwrap();
        assert_eq!(handle.next_invocation(), Some(at(2024, 1, 15, 3, 15, 0)));
    }
}
