//! Startup reconciliation of persisted state against the calendar.
//!
//! Runs once per process, before anything else reads or writes the store.
//! When the last recorded day differs from today, the recorded day's total is
//! snapshotted into the ledger and today starts from zero. A gap of several
//! days still yields a single entry for the last recorded day.

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::AppResult,
    intake::IntakeState,
    ledger::HistoryLedger,
    storage::{keys, Store},
    structs::{Goal, HistoryEntry},
};

/// What reconciliation decided to do with the persisted day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// Same calendar day, the total carries forward
    SameDay,
    /// Nothing was ever recorded
    FirstRun,
    /// A new day, the previous one went into the ledger
    Archived(HistoryEntry),
    /// A new day, but there was no total to archive
    NewDay,
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub today: NaiveDate,
    pub intake: IntakeState,
    pub ledger: HistoryLedger,
    pub reminders_enabled: bool,
    pub rollover: Rollover,
}

#[instrument(skip(store))]
pub async fn reconcile(store: &dyn Store, today: NaiveDate) -> AppResult<Reconciled> {
    let stored_amount = store.get(keys::WATER_AMOUNT).await?;
    let stored_goal = store.get(keys::GOAL).await?;
    let stored_history = store.get(keys::HISTORY).await?;
    let last_update = store.get(keys::LAST_UPDATE).await?;
    let stored_reminders = store.get(keys::REMINDERS_ENABLED).await?;

    let goal = stored_goal.as_deref().map(parse_goal).unwrap_or_default();
    let mut ledger = stored_history
        .as_deref()
        .map(parse_history)
        .unwrap_or_default();
    let reminders_enabled = stored_reminders.as_deref() == Some("true");
    let amount = stored_amount.as_deref().and_then(parse_amount);
    let last_update = last_update.as_deref().and_then(parse_day);

    if last_update == Some(today) {
        debug!("Same-day resume");
        return Ok(Reconciled {
            today,
            intake: IntakeState::new(amount.unwrap_or(0), goal),
            ledger,
            reminders_enabled,
            rollover: Rollover::SameDay,
        });
    }

    let rollover = match (last_update, amount) {
        (Some(day), Some(amount)) => {
            let entry = HistoryEntry::new(day, amount, goal.ml());
            ledger.archive(entry);
            info!(date = %day, amount, goal = goal.ml(), "Archived previous day");
            best_effort(
                store
                    .set(keys::HISTORY, serde_json::to_string(&ledger)?)
                    .await,
            );
            Rollover::Archived(entry)
        }
        (Some(_), None) => Rollover::NewDay,
        (None, _) => Rollover::FirstRun,
    };

    best_effort(
        store
            .set_many(&[
                (keys::WATER_AMOUNT, "0".to_string()),
                (keys::LAST_UPDATE, today.to_string()),
            ])
            .await,
    );

    Ok(Reconciled {
        today,
        intake: IntakeState::new(0, goal),
        ledger,
        reminders_enabled,
        rollover,
    })
}

fn best_effort(result: AppResult<()>) {
    if let Err(error) = result {
        warn!(%error, "Unable to persist reconciled state, keeping it in memory");
    }
}

fn parse_amount(raw: &str) -> Option<u32> {
    match raw.trim().parse() {
        Ok(amount) => Some(amount),
        Err(_) => {
            warn!(raw, "Ignoring unparsable water amount");
            None
        }
    }
}

fn parse_goal(raw: &str) -> Goal {
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(|ml| Goal::try_from(ml).ok())
        .unwrap_or_else(|| {
            warn!(raw, "Stored goal is not an allowed value, using the default");
            Goal::default()
        })
}

fn parse_history(raw: &str) -> HistoryLedger {
    match serde_json::from_str::<Vec<HistoryEntry>>(raw) {
        Ok(entries) => HistoryLedger::from_entries(entries),
        Err(error) => {
            warn!(%error, "Stored history is corrupted, starting with an empty ledger");
            HistoryLedger::new()
        }
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    match raw.trim().parse() {
        Ok(day) => Some(day),
        Err(_) => {
            warn!(raw, "Ignoring unparsable last update marker");
            None
        }
    }
}
