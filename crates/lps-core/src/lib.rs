//! Learning progress and review scheduling engine for Lingo Time.
//!
//! This crate holds the pure algorithms behind the study dashboard: turning
//! practice attempts into study minutes, computing checkin streaks, picking
//! the next item to review and partitioning item sets into groups. Nothing in
//! here performs I/O; callers load the inputs from the event store and hand
//! them over.

pub mod grouping;
pub mod item;
pub mod review;
pub mod session;
pub mod settings;
pub mod streak;
pub mod window;

pub use item::ItemType;
pub use settings::EngineSettings;
