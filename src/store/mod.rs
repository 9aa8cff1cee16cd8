//! Usage data is organized as a single JSON document:
//!  - The document maps normalized project roots to projects.
//!  - A project maps calendar dates (local time) to day buckets.
//!  - A day bucket carries total seconds, keystrokes, line deltas and
//!    per-language, per-hour and per-file second counters.
//!
//! The whole document is rewritten on every flush. Documents written by older
//! versions may lack some of the per-day maps; deserialization normalizes
//! them to the current shape.

pub mod aggregator;
pub mod entities;
pub mod export;
pub mod persist;
pub mod session;
