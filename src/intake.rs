use crate::{
    error::{AppError, AppResult},
    structs::Goal,
};

/// Today's running total and the goal it is measured against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeState {
    amount_ml: u32,
    goal: Goal,
}

impl IntakeState {
    pub fn new(amount_ml: u32, goal: Goal) -> Self {
        Self { amount_ml, goal }
    }

    pub fn amount_ml(&self) -> u32 {
        self.amount_ml
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    /// No upper clamp; only the displayed ratio is capped.
    pub fn add_water(&mut self, amount_ml: u32) -> AppResult<u32> {
        if amount_ml == 0 {
            return Err(AppError::InvalidAmount);
        }
        self.amount_ml = self.amount_ml.saturating_add(amount_ml);
        Ok(self.amount_ml)
    }

    pub fn reset(&mut self) {
        self.amount_ml = 0;
    }

    pub fn set_goal(&mut self, goal: Goal) {
        self.goal = goal;
    }
}
