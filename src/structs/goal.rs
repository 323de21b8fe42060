use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Daily intake goals a user can pick from
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub enum Goal {
    Ml1500,
    #[default]
    Ml2000,
    Ml2500,
    Ml3000,
}

impl Goal {
    pub const ALL: [Goal; 4] = [Goal::Ml1500, Goal::Ml2000, Goal::Ml2500, Goal::Ml3000];

    pub const fn ml(self) -> u32 {
        match self {
            Goal::Ml1500 => 1500,
            Goal::Ml2000 => 2000,
            Goal::Ml2500 => 2500,
            Goal::Ml3000 => 3000,
        }
    }
}

impl TryFrom<u32> for Goal {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Goal::ALL
            .into_iter()
            .find(|goal| goal.ml() == value)
            .ok_or(AppError::InvalidGoal(value))
    }
}

impl From<Goal> for u32 {
    fn from(goal: Goal) -> Self {
        goal.ml()
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ml", self.ml())
    }
}

/// The two fixed "drink" actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serving {
    /// +250ml
    Glass,
    /// +500ml
    Bottle,
}

impl Serving {
    pub const fn ml(self) -> u32 {
        match self {
            Serving::Glass => 250,
            Serving::Bottle => 500,
        }
    }
}
