pub mod reminder;

pub use reminder::{ReminderScheduler, ReminderState};
