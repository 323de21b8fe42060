//! Notification delivery, the collaborator the reminder scheduler talks to.
//!
//! [`DesktopNotifier`] keeps each scheduled slot as a tokio task that sleeps
//! until the first fire time and then repeats on a fixed interval, showing a
//! native toast where the platform has one.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// A single repeating reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSpec {
    pub id: u32,
    pub title: String,
    pub body: String,
    pub first_fire: DateTime<Local>,
    pub repeat_every: Duration,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn cancel(&self, ids: &[u32]) -> AppResult<()>;

    async fn request_permission(&self) -> AppResult<Permission>;

    /// Replaces whatever was scheduled under `spec.id`.
    async fn schedule(&self, spec: ReminderSpec) -> AppResult<()>;
}

pub struct DesktopNotifier {
    permission: Permission,
    slots: Mutex<HashMap<u32, JoinHandle<()>>>,
}

impl DesktopNotifier {
    pub fn new(notifications_allowed: bool) -> Self {
        Self {
            permission: if notifications_allowed {
                Permission::Granted
            } else {
                Permission::Denied
            },
            slots: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn active_slots(&self) -> Vec<u32> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.retain(|_, task| !task.is_finished());
        let mut ids: Vec<u32> = slots.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn cancel(&self, ids: &[u32]) -> AppResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        for id in ids {
            if let Some(task) = slots.remove(id) {
                debug!(id, "Cancelling reminder");
                task.abort();
            }
        }
        Ok(())
    }

    async fn request_permission(&self) -> AppResult<Permission> {
        Ok(self.permission)
    }

    async fn schedule(&self, spec: ReminderSpec) -> AppResult<()> {
        let id = spec.id;
        info!(id, first_fire = %spec.first_fire, every = ?spec.repeat_every, "Scheduling reminder");

        let task = tokio::spawn(reminder_task(spec));
        let previous = self
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, task);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }
}

impl Drop for DesktopNotifier {
    fn drop(&mut self) {
        let slots = self.slots.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, task) in slots.drain() {
            task.abort();
        }
    }
}

#[instrument(skip(spec), fields(id = spec.id))]
async fn reminder_task(spec: ReminderSpec) {
    let delay = (spec.first_fire - Local::now())
        .to_std()
        .unwrap_or(Duration::ZERO);
    trace!("First reminder in {delay:?}");

    let mut ticker =
        tokio::time::interval_at(tokio::time::Instant::now() + delay, spec.repeat_every);
    loop {
        ticker.tick().await;
        let (title, body) = (spec.title.clone(), spec.body.clone());
        if let Err(error) = tokio::task::spawn_blocking(move || show_toast(&title, &body)).await {
            warn!(%error, "Reminder delivery task failed");
        }
    }
}

fn show_toast(title: &str, body: &str) {
    #[cfg(target_os = "macos")]
    {
        if let Err(error) = mac_notification_sys::Notification::new()
            .title(title)
            .message(body)
            .send()
        {
            warn!(%error, "Unable to show reminder notification");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Err(error) = winrt_notification::Toast::new(winrt_notification::Toast::POWERSHELL_APP_ID)
            .title(title)
            .text1(body)
            .duration(winrt_notification::Duration::Short)
            .sound(None)
            .show()
        {
            warn!(?error, "Unable to show reminder notification");
        }
    }

    // No native toast on other platforms yet, the terminal has to do
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        println!("\u{1f514} {title}: {body}");
    }

    info!(title, "Reminder delivered");
}
