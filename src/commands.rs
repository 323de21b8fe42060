use std::fmt::Write;

use crate::{
    mood::Mood,
    structs::HistoryEntry,
    tasks::ReminderState,
    tracker::Snapshot,
};

pub const EMPTY_HISTORY: &str =
    "No history yet. Your daily progress will start appearing here tomorrow! \u{1f4c8}";

pub fn render_status(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}ml / {}ml ({}%)",
        snapshot.amount_ml,
        snapshot.goal.ml(),
        snapshot.percent
    );

    let cheer = match snapshot.mood {
        Mood::Celebratory => "Goal reached!",
        Mood::Neutral => "Keep going!",
        Mood::NeedsAttention => "Take a sip...",
    };
    let _ = writeln!(out, "\u{1f428} Your koala is {}. {cheer}", snapshot.mood);

    if snapshot.celebrating {
        let _ = writeln!(out, "\u{1f389}\u{1f389}\u{1f389}");
    }

    let reminders = match (snapshot.reminders_enabled, snapshot.reminder_state) {
        (true, ReminderState::Enabled) => "ON",
        (true, ReminderState::Disabled) => "ON (not scheduled in this process)",
        (false, _) => "OFF",
    };
    let _ = write!(out, "Reminders: {reminders}");
    out
}

pub fn render_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    let mut out = String::from("Last 7 Days");
    for entry in history {
        let _ = write!(
            out,
            "\n{}  {}ml / {}ml",
            entry.date.format("%a %b %d"),
            entry.amount,
            entry.goal
        );
    }
    out
}
