//! `lokebot-scheduler` — UTC-normalized recurrence scheduling.
//!
//! # Overview
//!
//! A job is registered with a name, a wall-clock schedule (a [`FieldSpec`]
//! or a 6-field cron expression), a timezone (IANA name or raw offset in
//! minutes), and an async callback. The schedule's field values are
//! converted once into UTC terms at registration time; the [`JobRegistry`]
//! then polls every second and fires any job whose next occurrence has
//! arrived.
//!
//! # Pipeline
//!
//! | Stage       | Module                                               |
//! |-------------|------------------------------------------------------|
//! | Parse       | [`cron`] — cron string → explicit per-field lists    |
//! | Resolve     | [`tz`] — zone name/offset → minutes east of UTC      |
//! | Normalize   | [`normalize`] — wall-clock values → UTC values       |
//! | Match       | [`rule`] — next matching UTC instant                 |
//! | Execute     | [`registry`] — named jobs, 1 s polling loop          |
//!
//! The timezone offset is resolved once per registration, at the current
//! instant. A job registered during standard time keeps that offset across
//! later daylight-saving transitions and will fire an hour askew of local
//! wall clocks until re-registered.

pub mod clock;
pub mod cron;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod rule;
pub mod scheduler;
pub mod types;
pub mod tz;

pub use clock::{Clock, MockClock, SystemClock};
pub use error::{Result, SchedulerError};
pub use registry::{JobCallback, JobHandle, JobRegistry};
pub use scheduler::Scheduler;
pub use types::{FieldSpec, NormalizedFieldSpec, RecurrenceDef, ScheduleInput};
pub use tz::ZoneSpec;
