//! Name-keyed job registry and the 1-second execution loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::{Result, SchedulerError};
use crate::rule;
use crate::types::NormalizedFieldSpec;

/// Job callbacks are async and opaque: the registry spawns them and never
/// inspects their output. Overlapping firings of the same job are not
/// serialized — a callback whose previous run is still pending fires again
/// regardless, so callbacks needing mutual exclusion must guard internally.
pub type JobCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct JobState {
    spec: NormalizedFieldSpec,
    callback: JobCallback,
    next_run: Option<DateTime<Utc>>,
    run_count: u64,
}

/// Registry of named recurring jobs.
///
/// Cheaply cloneable — all clones share the same job table. Jobs live for
/// the registry's lifetime; there is no cancellation path.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<String, JobState>>>,
    clock: Arc<dyn Clock>,
}

impl JobRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Register a named recurring job.
    ///
    /// Rejects duplicate names — the existing job is never overwritten.
    pub fn register(
        &self,
        name: &str,
        spec: NormalizedFieldSpec,
        callback: JobCallback,
    ) -> Result<JobHandle> {
        let now = self.clock.now_utc();

        // Check-then-insert stays under one guard so the no-duplicate
        // invariant holds even with registrations from multiple threads.
        let mut jobs = self.jobs.lock().expect("job registry poisoned");
        if jobs.contains_key(name) {
            error!(job = %name, "job name already registered");
            return Err(SchedulerError::DuplicateJobName {
                name: name.to_string(),
            });
        }

        let next_run = rule::next_occurrence(&spec, now);
        jobs.insert(
            name.to_string(),
            JobState {
                spec,
                callback,
                next_run,
                run_count: 0,
            },
        );
        info!(job = %name, next_run = ?next_run, "job registered");

        Ok(JobHandle {
            name: name.to_string(),
            registry: self.clone(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs
            .lock()
            .expect("job registry poisoned")
            .contains_key(name)
    }

    /// (name, next invocation) for every registered job, produced fresh on
    /// each call and sorted by name for stable diagnostics.
    pub fn list_all(&self) -> Vec<(String, Option<DateTime<Utc>>)> {
        let jobs = self.jobs.lock().expect("job registry poisoned");
        let mut out: Vec<_> = jobs
            .iter()
            .map(|(name, job)| (name.clone(), job.next_run))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Main loop. Polls every second until `shutdown` broadcasts `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("job registry started");
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick();
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("job registry shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Fire every job whose `next_run` has arrived and compute its following
    /// run time.
    ///
    /// Due jobs are spawned independently; two jobs due on the same tick are
    /// not ordered relative to each other.
    pub fn tick(&self) {
        let now = self.clock.now_utc();

        let due: Vec<(String, JobCallback)> = {
            let mut jobs = self.jobs.lock().expect("job registry poisoned");
            let mut due = Vec::new();
            for (name, job) in jobs.iter_mut() {
                if matches!(job.next_run, Some(next) if next <= now) {
                    job.run_count += 1;
                    job.next_run = rule::next_occurrence(&job.spec, now);
                    due.push((name.clone(), Arc::clone(&job.callback)));
                }
            }
            due
        };

        for (name, callback) in due {
            debug!(job = %name, "firing scheduled job");
            tokio::spawn(callback());
        }
    }

    fn job_field<T>(&self, name: &str, f: impl FnOnce(&JobState) -> T) -> Option<T> {
        let jobs = self.jobs.lock().expect("job registry poisoned");
        jobs.get(name).map(f)
    }
}

/// Handle returned on successful registration.
///
/// The registry keeps ownership of the job; the handle is an introspection
/// key into it.
pub struct JobHandle {
    name: String,
    registry: JobRegistry,
}

impl JobHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The job's next planned firing time, if any remains.
    pub fn next_invocation(&self) -> Option<DateTime<Utc>> {
        self.registry
            .job_field(&self.name, |job| job.next_run)
            .flatten()
    }

    /// How many times the job has fired so far.
    pub fn run_count(&self) -> u64 {
        self.registry
            .job_field(&self.name, |job| job.run_count)
            .unwrap_or(0)
    }
}
