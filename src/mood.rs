use std::{fmt, sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};
use tracing::trace;

/// Below this share of the goal the buddy gets thirsty
pub const NEEDS_ATTENTION_BELOW: f64 = 0.30;

pub const DEFAULT_CELEBRATION: Duration = Duration::from_secs(5);

/// `min(amount / goal, 1.0)`
pub fn progress_ratio(amount_ml: u32, goal_ml: u32) -> f64 {
    if goal_ml == 0 {
        return 1.0;
    }
    (f64::from(amount_ml) / f64::from(goal_ml)).min(1.0)
}

/// Rounded percentage of the goal, capped at 100
pub fn progress_percent(amount_ml: u32, goal_ml: u32) -> u32 {
    (progress_ratio(amount_ml, goal_ml) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Celebratory,
    Neutral,
    NeedsAttention,
}

impl Mood {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 1.0 {
            Mood::Celebratory
        } else if ratio < NEEDS_ATTENTION_BELOW {
            Mood::NeedsAttention
        } else {
            Mood::Neutral
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mood::Celebratory => "party",
            Mood::Neutral => "happy",
            Mood::NeedsAttention => "thirsty",
        };
        f.write_str(label)
    }
}

/// Self-clearing "goal reached" flag.
///
/// Re-arming aborts the pending clear so an old timer can never switch off a
/// newer celebration. Must be used from inside a tokio runtime.
pub struct Celebration {
    duration: Duration,
    flag: Arc<watch::Sender<bool>>,
    clear_timer: Option<JoinHandle<()>>,
}

impl Celebration {
    pub fn new(duration: Duration) -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            duration,
            flag: Arc::new(flag),
            clear_timer: None,
        }
    }

    pub fn is_active(&self) -> bool {
        *self.flag.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    pub fn trigger(&mut self) {
        self.cancel_timer();
        self.flag.send_replace(true);

        let flag = Arc::clone(&self.flag);
        let duration = self.duration;
        self.clear_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            trace!("Celebration over");
            flag.send_replace(false);
        }));
    }

    pub fn clear(&mut self) {
        self.cancel_timer();
        self.flag.send_replace(false);
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Celebration {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Derives the mood from intake, re-evaluating only when the ratio moves
pub struct MoodTracker {
    last_ratio: Option<f64>,
    mood: Mood,
    celebration: Celebration,
}

impl MoodTracker {
    pub fn new(celebration_duration: Duration) -> Self {
        Self {
            last_ratio: None,
            mood: Mood::NeedsAttention,
            celebration: Celebration::new(celebration_duration),
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn celebrating(&self) -> bool {
        self.celebration.is_active()
    }

    pub fn subscribe_celebration(&self) -> watch::Receiver<bool> {
        self.celebration.subscribe()
    }

    pub fn observe(&mut self, amount_ml: u32, goal_ml: u32) -> Mood {
        let ratio = progress_ratio(amount_ml, goal_ml);
        if self.last_ratio == Some(ratio) {
            return self.mood;
        }
        self.last_ratio = Some(ratio);
        self.mood = Mood::from_ratio(ratio);

        if self.mood == Mood::Celebratory {
            self.celebration.trigger();
        } else {
            self.celebration.clear();
        }
        self.mood
    }

    /// Explicit reset always stops the party, even if the ratio did not move.
    pub fn stop_celebrating(&mut self) {
        self.celebration.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_clamped_and_monotonic() {
        assert_eq!(progress_ratio(250, 2000), 0.125);
        assert_eq!(progress_ratio(5000, 2000), 1.0);

        let mut previous = 0.0;
        for amount in (0..4000).step_by(50) {
            let ratio = progress_ratio(amount, 2000);
            assert!(ratio >= previous);
            previous = ratio;
        }

        for amount in [0, 400, 1600, 2600] {
            let mut previous = f64::MAX;
            for goal in [1500, 2000, 2500, 3000] {
                let ratio = progress_ratio(amount, goal);
                assert!(ratio <= previous);
                previous = ratio;
            }
        }
    }

    #[test]
    fn moods_follow_thresholds() {
        assert_eq!(Mood::from_ratio(0.0), Mood::NeedsAttention);
        assert_eq!(Mood::from_ratio(0.29), Mood::NeedsAttention);
        assert_eq!(Mood::from_ratio(0.30), Mood::Neutral);
        assert_eq!(Mood::from_ratio(0.99), Mood::Neutral);
        assert_eq!(Mood::from_ratio(1.0), Mood::Celebratory);
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(progress_percent(250, 2000), 13);
        assert_eq!(progress_percent(2050, 2000), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn celebration_clears_itself() {
        let mut celebration = Celebration::new(DEFAULT_CELEBRATION);

        celebration.trigger();
        let mut flag = celebration.subscribe();
        assert!(*flag.borrow());

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(celebration.is_active());

        flag.changed().await.unwrap();
        assert!(!*flag.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn retrigger_cancels_the_stale_timer() {
        let mut celebration = Celebration::new(DEFAULT_CELEBRATION);

        celebration.trigger();
        tokio::time::sleep(Duration::from_secs(3)).await;
        celebration.trigger();

        // The first timer would have fired here.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(celebration.is_active());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!celebration.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn tracker_only_celebrates_when_ratio_moves() {
        let mut tracker = MoodTracker::new(DEFAULT_CELEBRATION);

        assert_eq!(tracker.observe(250, 2000), Mood::NeedsAttention);
        assert!(!tracker.celebrating());

        assert_eq!(tracker.observe(2050, 2000), Mood::Celebratory);
        assert!(tracker.celebrating());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!tracker.celebrating());

        // Still at 100%, no new celebration.
        assert_eq!(tracker.observe(2550, 2000), Mood::Celebratory);
        assert!(!tracker.celebrating());

        assert_eq!(tracker.observe(1000, 2000), Mood::Neutral);
    }
}
