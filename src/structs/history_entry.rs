use {
    chrono::NaiveDate,
    serde::{Deserialize, Serialize},
};

/// Snapshot of a finished day, taken when the day boundary is detected
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Calendar day the snapshot belongs to
    pub date: NaiveDate,

    /// Amount of water drank that day in milliliters
    pub amount: u32,

    /// Goal that was active that day in milliliters
    pub goal: u32,
}

impl HistoryEntry {
    pub fn new(date: NaiveDate, amount: u32, goal: u32) -> Self {
        Self { date, amount, goal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_the_persisted_wire_shape() {
        let entry = HistoryEntry::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 2050, 2000);
        let json = serde_json::to_value(entry).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "date": "2026-10-18", "amount": 2050, "goal": 2000 })
        );
    }

    #[test]
    fn rejects_negative_amounts() {
        let parsed = serde_json::from_str::<HistoryEntry>(
            r#"{ "date": "2026-10-18", "amount": -5, "goal": 2000 }"#,
        );
        assert!(parsed.is_err());
    }
}
