#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use hydrate_tracker::{
    clock::Clock,
    notification::{Notifier, Permission, ReminderSpec},
    storage::{MemoryStore, Store},
    AppError, AppResult,
};

/// Clock pinned to a settable instant
pub struct TestClock(Mutex<DateTime<Local>>);

impl TestClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        Self(Mutex::new(morning(year, month, day)))
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::Duration::days(days);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock().unwrap()
    }
}

pub fn morning(year: i32, month: u32, day: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Notifier double that records what would have been scheduled
#[derive(Default)]
pub struct RecordingNotifier {
    deny: AtomicBool,
    fail_schedule: AtomicBool,
    pub scheduled: Mutex<BTreeMap<u32, ReminderSpec>>,
    pub permission_requests: AtomicUsize,
}

impl RecordingNotifier {
    pub fn denying() -> Self {
        let notifier = Self::default();
        notifier.deny.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn set_deny(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    pub fn set_fail_schedule(&self, fail: bool) {
        self.fail_schedule.store(fail, Ordering::SeqCst);
    }

    pub fn active(&self) -> Vec<u32> {
        self.scheduled.lock().unwrap().keys().copied().collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn cancel(&self, ids: &[u32]) -> AppResult<()> {
        let mut scheduled = self.scheduled.lock().unwrap();
        for id in ids {
            scheduled.remove(id);
        }
        Ok(())
    }

    async fn request_permission(&self) -> AppResult<Permission> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        Ok(if self.deny.load(Ordering::SeqCst) {
            Permission::Denied
        } else {
            Permission::Granted
        })
    }

    async fn schedule(&self, spec: ReminderSpec) -> AppResult<()> {
        if self.fail_schedule.load(Ordering::SeqCst) {
            return Err(AppError::Notification(format!(
                "unable to schedule reminder {}",
                spec.id
            )));
        }
        self.scheduled.lock().unwrap().insert(spec.id, spec);
        Ok(())
    }
}

/// Memory store whose writes can be switched off
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set_many(&self, updates: &[(&str, String)]) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("writes are disabled".into()));
        }
        self.inner.set_many(updates).await
    }
}
