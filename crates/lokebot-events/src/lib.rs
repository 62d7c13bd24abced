//! `lokebot-events` — in-process notification dispatcher.
//!
//! # Overview
//!
//! [`EventBus`] fans string-identified events out to subscribed listeners.
//! Two subscription flavours:
//!
//! | Flavour  | Multi-event semantics                                      |
//! |----------|------------------------------------------------------------|
//! | [`EventBus::on`]   | OR — fires every time any listed event triggers  |
//! | [`EventBus::once`] | AND — fires once, when all listed events have triggered |
//!
//! Startup gating is the typical use: subsystems `trigger` readiness events
//! as they come up, and `once` subscribers run as soon as everything they
//! depend on is ready — even if that was already true when they subscribed.

pub mod bus;

pub use bus::{EventBus, Listener};
