//! The running session's state.
//!
//! A [`Tracker`] only exists once startup reconciliation has finished, so
//! nothing can mutate intake before the day rollover has been settled. Every
//! mutation writes the amount, goal and reminder preference back as one unit.

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    error::AppResult,
    intake::IntakeState,
    ledger::HistoryLedger,
    mood::{progress_percent, Mood, MoodTracker, DEFAULT_CELEBRATION},
    notification::Notifier,
    reconcile::{reconcile, Rollover},
    storage::{keys, Store},
    structs::{Goal, HistoryEntry, Serving},
    tasks::{reminder::DEFAULT_REMINDER_INTERVAL, ReminderScheduler, ReminderState},
};

#[derive(Debug, Clone, Copy)]
pub struct TrackerOptions {
    pub reminder_interval: Duration,
    pub celebration: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
            celebration: DEFAULT_CELEBRATION,
        }
    }
}

/// Read-only view for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub today: NaiveDate,
    pub amount_ml: u32,
    pub goal: Goal,
    pub percent: u32,
    pub mood: Mood,
    pub celebrating: bool,
    pub reminders_enabled: bool,
    pub reminder_state: ReminderState,
}

pub struct Tracker {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    today: NaiveDate,
    rollover: Rollover,
    intake: IntakeState,
    ledger: HistoryLedger,
    reminders_enabled: bool,
    reminders: ReminderScheduler,
    mood: MoodTracker,
}

impl Tracker {
    /// Reconciles the store with today's date, then brings the reminder
    /// schedule in line with the stored preference.
    pub async fn load(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        options: TrackerOptions,
    ) -> AppResult<Self> {
        let reconciled = reconcile(store.as_ref(), clock.today()).await?;
        info!(
            today = %reconciled.today,
            rollover = ?reconciled.rollover,
            amount = reconciled.intake.amount_ml(),
            "Load complete"
        );

        let mut tracker = Self {
            store,
            clock,
            today: reconciled.today,
            rollover: reconciled.rollover,
            intake: reconciled.intake,
            ledger: reconciled.ledger,
            reminders_enabled: reconciled.reminders_enabled,
            reminders: ReminderScheduler::new(notifier, options.reminder_interval),
            mood: MoodTracker::new(options.celebration),
        };
        tracker.refresh_mood();

        if let Err(error) = tracker.sync_reminders().await {
            warn!(%error, "Unable to restore reminders");
        }

        Ok(tracker)
    }

    pub async fn add_water(&mut self, amount_ml: u32) -> AppResult<u32> {
        let total = self.intake.add_water(amount_ml)?;
        debug!(amount_ml, total, "Water added");

        self.refresh_mood();
        self.persist().await;
        Ok(total)
    }

    pub async fn drink(&mut self, serving: Serving) -> AppResult<u32> {
        self.add_water(serving.ml()).await
    }

    /// Callers are expected to have asked the user first.
    pub async fn reset_today(&mut self) {
        self.intake.reset();
        info!("Today's progress reset");

        self.mood.stop_celebrating();
        self.refresh_mood();
        self.persist().await;
    }

    pub async fn set_goal(&mut self, goal: Goal) {
        self.intake.set_goal(goal);
        info!(goal = goal.ml(), "Goal changed");

        self.refresh_mood();
        self.persist().await;
    }

    /// Stores the preference and re-derives the schedule. The preference is
    /// switched back off when the notifier refuses.
    pub async fn set_reminders(&mut self, enabled: bool) -> AppResult<ReminderState> {
        self.reminders_enabled = enabled;
        self.persist().await;
        self.sync_reminders().await
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.ledger.read()
    }

    pub fn rollover(&self) -> Rollover {
        self.rollover
    }

    pub fn intake(&self) -> IntakeState {
        self.intake
    }

    pub fn reminders_enabled(&self) -> bool {
        self.reminders_enabled
    }

    pub fn subscribe_celebration(&self) -> watch::Receiver<bool> {
        self.mood.subscribe_celebration()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            today: self.today,
            amount_ml: self.intake.amount_ml(),
            goal: self.intake.goal(),
            percent: progress_percent(self.intake.amount_ml(), self.intake.goal().ml()),
            mood: self.mood.mood(),
            celebrating: self.mood.celebrating(),
            reminders_enabled: self.reminders_enabled,
            reminder_state: self.reminders.state(),
        }
    }

    fn refresh_mood(&mut self) {
        self.mood
            .observe(self.intake.amount_ml(), self.intake.goal().ml());
    }

    async fn sync_reminders(&mut self) -> AppResult<ReminderState> {
        let result = self
            .reminders
            .apply(self.reminders_enabled, self.clock.now())
            .await;

        let reached = result.as_ref().copied().unwrap_or(ReminderState::Disabled);
        if self.reminders_enabled && reached == ReminderState::Disabled {
            self.reminders_enabled = false;
            self.persist().await;
        }
        result
    }

    async fn persist(&self) {
        let write = self
            .store
            .set_many(&[
                (keys::WATER_AMOUNT, self.intake.amount_ml().to_string()),
                (keys::GOAL, self.intake.goal().ml().to_string()),
                (keys::REMINDERS_ENABLED, self.reminders_enabled.to_string()),
            ])
            .await;

        if let Err(error) = write {
            warn!(%error, "Unable to persist intake, keeping in-memory state");
        }
    }
}
