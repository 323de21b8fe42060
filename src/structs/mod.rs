pub mod goal;
pub mod history_entry;

pub use goal::{Goal, Serving};
pub use history_entry::HistoryEntry;
