//! Daily water intake tracking: a running total for today, a seven day
//! history that rolls over at the day boundary, and optional reminders.

pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod intake;
pub mod ledger;
pub mod logging;
pub mod mood;
pub mod notification;
pub mod reconcile;
pub mod storage;
pub mod structs;
pub mod tasks;
pub mod tracker;

pub use error::{AppError, AppResult};
pub use tracker::{Snapshot, Tracker, TrackerOptions};
