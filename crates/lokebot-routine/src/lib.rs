//! `lokebot-routine` — configuration and wiring of the daily game.
//!
//! # Overview
//!
//! The daily game runs on three standing jobs, registered through
//! [`init_routine`] in the configured timezone:
//!
//! | Job                   | When                          | Effect                         |
//! |-----------------------|-------------------------------|--------------------------------|
//! | Reset Loke-Status     | daily, window opens           | every user flagged again       |
//! | Prosecute Lokere      | daily, window closes          | flagged users announced (not on weekends) |
//! | Weekend Announcement  | cron, Fridays 16:00 (default) | kickoff message per guild      |
//!
//! In between, [`handle_chat`] clears a user's flag when they chat inside
//! the judgement window. Announcements leave the process through the
//! [`AnnouncementSink`] trait; the chat adapter behind it is out of scope.

pub mod config;
pub mod error;
pub mod routine;
pub mod sink;
pub mod window;

pub use config::RoutineConfig;
pub use error::{Result, RoutineError};
pub use routine::{handle_chat, init_routine, run_prosecution};
pub use sink::AnnouncementSink;
pub use window::JudgementWindow;
