//! The three standing jobs of the daily game, wired onto a scheduler.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc, Weekday};
use tracing::{debug, info};

use lokebot_roster::Roster;
use lokebot_scheduler::{FieldSpec, RecurrenceDef, ScheduleInput, Scheduler};

use crate::config::RoutineConfig;
use crate::error::Result;
use crate::sink::AnnouncementSink;
use crate::window::JudgementWindow;

/// Register the morning reset, the verdict, and the weekend announcement.
///
/// Each job's schedule is wall-clock in the configured timezone. Job names
/// are fixed; calling this twice on the same scheduler fails on the
/// duplicate names and leaves the first wiring in place.
pub fn init_routine(
    scheduler: &Scheduler,
    roster: Arc<Roster>,
    sink: Arc<dyn AnnouncementSink>,
    config: &RoutineConfig,
) -> Result<()> {
    // Every morning: everyone is a loker again.
    let reset_roster = Arc::clone(&roster);
    scheduler.schedule_job_utc(
        "Reset Loke-Status",
        at_hour(config.period_start),
        config.timezone.as_str(),
        move || {
            let roster = Arc::clone(&reset_roster);
            async move {
                info!("resetting loke status");
                roster.set_status_all(true);
            }
        },
    )?;

    // When the window closes: judge everyone still flagged.
    let verdict_input: ScheduleInput = match &config.judgement_cron {
        Some(expr) => expr.as_str().into(),
        None => at_hour(config.period_end).into(),
    };
    let verdict_roster = Arc::clone(&roster);
    let verdict_sink = Arc::clone(&sink);
    let verdict_scheduler = scheduler.clone();
    scheduler.schedule_job_utc(
        "Prosecute Lokere",
        verdict_input,
        config.timezone.as_str(),
        move || {
            let roster = Arc::clone(&verdict_roster);
            let sink = Arc::clone(&verdict_sink);
            let scheduler = verdict_scheduler.clone();
            async move {
                run_prosecution(roster.as_ref(), sink.as_ref(), Utc::now()).await;
                scheduler.log_next_invocations();
            }
        },
    )?;

    let weekend_roster = Arc::clone(&roster);
    let weekend_sink = Arc::clone(&sink);
    scheduler.schedule_job_utc(
        "Weekend Announcement",
        config.weekend_cron.as_str(),
        config.timezone.as_str(),
        move || {
            let roster = Arc::clone(&weekend_roster);
            let sink = Arc::clone(&weekend_sink);
            async move {
                info!("announcing the weekend");
                for guild_id in roster.guild_ids() {
                    sink.announce_weekend(guild_id).await;
                }
            }
        },
    )?;

    Ok(())
}

/// Deliver the daily verdict: every guild hears who is still flagged.
///
/// Saturdays and Sundays (UTC) are exempt from judgement.
pub async fn run_prosecution(roster: &Roster, sink: &dyn AnnouncementSink, now: DateTime<Utc>) {
    let weekday = now.weekday();
    if weekday == Weekday::Sat || weekday == Weekday::Sun {
        debug!("judgement skipped on weekends");
        return;
    }

    info!("prosecuting lokere");
    for (guild_id, guilty) in roster.guilty_by_guild() {
        sink.announce_verdict(guild_id, &guilty).await;
    }
}

/// A message inside the judgement window clears the sender's flag for the
/// day.
pub fn handle_chat(
    roster: &Roster,
    window: &JudgementWindow,
    utc_offset_minutes: i32,
    user_id: u64,
    now: DateTime<Utc>,
) {
    if window.is_active(now, utc_offset_minutes) && roster.set_status(user_id, false) {
        debug!(user_id, "loker status cleared");
    }
}

fn at_hour(hour: u32) -> FieldSpec {
    FieldSpec {
        hour: Some(RecurrenceDef::Single(hour as i32)),
        minute: Some(RecurrenceDef::Single(0)),
        second: Some(RecurrenceDef::Single(0)),
        ..Default::default()
    }
}
