use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Local};
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    notification::{Notifier, Permission, ReminderSpec},
};

/// Every id a reminder may ever have been scheduled under
pub const REMINDER_SLOTS: [u32; 3] = [1, 2, 3];
pub const REMINDER_SLOT: u32 = 1;

pub const DEFAULT_REMINDER_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

pub const REMINDER_TITLE: &str = "Time to hydrate! \u{1f428}";
pub const REMINDER_BODY: &str = "Your friend needs some water. Take a sip!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderState {
    #[default]
    Disabled,
    Enabled,
}

/// Keeps the notifier's schedule in line with the reminder preference
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    state: ReminderState,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self {
            notifier,
            interval,
            state: ReminderState::Disabled,
        }
    }

    pub fn state(&self) -> ReminderState {
        self.state
    }

    /// Cancels every slot, then schedules a fresh reminder if `enabled` and
    /// the notifier allows it. Returns the state actually reached; a denied
    /// permission ends in [`ReminderState::Disabled`].
    #[instrument(skip(self))]
    pub async fn apply(
        &mut self,
        enabled: bool,
        now: DateTime<Local>,
    ) -> AppResult<ReminderState> {
        self.state = ReminderState::Disabled;
        self.notifier.cancel(&REMINDER_SLOTS).await?;

        if !enabled {
            info!("Reminders disabled");
            return Ok(self.state);
        }

        if self.notifier.request_permission().await? == Permission::Denied {
            warn!("Notification permission denied, rolling reminders back");
            return Ok(self.state);
        }

        let first_fire = chrono::Duration::from_std(self.interval)
            .ok()
            .and_then(|interval| now.checked_add_signed(interval))
            .ok_or_else(|| {
                AppError::Config(format!("reminder interval {:?} is out of range", self.interval))
            })?;
        self.notifier
            .schedule(ReminderSpec {
                id: REMINDER_SLOT,
                title: REMINDER_TITLE.to_string(),
                body: REMINDER_BODY.to_string(),
                first_fire,
                repeat_every: self.interval,
            })
            .await?;

        self.state = ReminderState::Enabled;
        info!(%first_fire, "Reminders enabled");
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Mutex};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct FakeNotifier {
        deny: bool,
        scheduled: Mutex<BTreeMap<u32, ReminderSpec>>,
        cancel_calls: Mutex<usize>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn cancel(&self, ids: &[u32]) -> AppResult<()> {
            *self.cancel_calls.lock().unwrap() += 1;
            let mut scheduled = self.scheduled.lock().unwrap();
            for id in ids {
                scheduled.remove(id);
            }
            Ok(())
        }

        async fn request_permission(&self) -> AppResult<Permission> {
            Ok(if self.deny {
                Permission::Denied
            } else {
                Permission::Granted
            })
        }

        async fn schedule(&self, spec: ReminderSpec) -> AppResult<()> {
            self.scheduled.lock().unwrap().insert(spec.id, spec);
            Ok(())
        }
    }

    fn scheduler(notifier: &Arc<FakeNotifier>) -> ReminderScheduler {
        ReminderScheduler::new(notifier.clone(), DEFAULT_REMINDER_INTERVAL)
    }

    #[tokio::test]
    async fn enabling_schedules_one_reminder_two_hours_out() {
        let notifier = Arc::new(FakeNotifier::default());
        let mut scheduler = scheduler(&notifier);
        let now = Local::now();

        let state = scheduler.apply(true, now).await.unwrap();

        assert_eq!(state, ReminderState::Enabled);
        let scheduled = notifier.scheduled.lock().unwrap();
        let spec = &scheduled[&REMINDER_SLOT];
        assert_eq!(spec.first_fire - now, chrono::Duration::hours(2));
        assert_eq!(spec.repeat_every, DEFAULT_REMINDER_INTERVAL);
    }

    #[tokio::test]
    async fn enabling_twice_keeps_a_single_schedule() {
        let notifier = Arc::new(FakeNotifier::default());
        let mut scheduler = scheduler(&notifier);

        scheduler.apply(true, Local::now()).await.unwrap();
        scheduler.apply(true, Local::now()).await.unwrap();

        assert_eq!(notifier.scheduled.lock().unwrap().len(), 1);
        assert_eq!(*notifier.cancel_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn denied_permission_leaves_nothing_scheduled() {
        let notifier = Arc::new(FakeNotifier {
            deny: true,
            ..Default::default()
        });
        let mut scheduler = scheduler(&notifier);

        let state = scheduler.apply(true, Local::now()).await.unwrap();

        assert_eq!(state, ReminderState::Disabled);
        assert!(notifier.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_interval_is_an_error() {
        let notifier = Arc::new(FakeNotifier::default());
        let mut scheduler = ReminderScheduler::new(
            notifier.clone(),
            Duration::from_secs(200_000_000_000 * 60),
        );

        let result = scheduler.apply(true, Local::now()).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(scheduler.state(), ReminderState::Disabled);
        assert!(notifier.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabling_cancels_every_slot() {
        let notifier = Arc::new(FakeNotifier::default());
        let mut scheduler = scheduler(&notifier);
        scheduler.apply(true, Local::now()).await.unwrap();

        let state = scheduler.apply(false, Local::now()).await.unwrap();

        assert_eq!(state, ReminderState::Disabled);
        assert!(notifier.scheduled.lock().unwrap().is_empty());
    }
}
