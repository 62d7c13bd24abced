//! `lokebot-roster` — in-memory guild/user membership cache.
//!
//! # Overview
//!
//! [`Roster`] mirrors the chat service's membership state: one entry per
//! unique user across all guilds, each carrying the daily "loker" status
//! flag, plus a per-guild member index. The out-of-scope gateway adapter
//! feeds it live guild/member add and remove events; the daily routine
//! reads it to reset statuses in the morning and collect the guilty at
//! judgement time.

pub mod roster;

pub use roster::{Loker, Roster};
