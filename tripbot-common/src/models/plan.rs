// File: tripbot-common/src/models/plan.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::error::Error;

/// Travel-preference form submitted from the trip-planner page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub user_id: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub preference: Option<String>,
    #[serde(default)]
    pub companions: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.user_id.trim().is_empty() {
            return Err(Error::InvalidRequest("userId is required".into()));
        }
        if self.destination.trim().is_empty() {
            return Err(Error::InvalidRequest("destination is required".into()));
        }
        if self.end_date < self.start_date {
            return Err(Error::InvalidRequest("endDate precedes startDate".into()));
        }
        Ok(())
    }

    /// Inclusive trip length in days.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PlanRequest {
        serde_json::from_value(serde_json::json!({
            "userId": "U123",
            "origin": "กรุงเทพ",
            "destination": "เชียงใหม่",
            "budget": "10000",
            "startDate": "2026-11-01",
            "endDate": "2026-11-03"
        }))
        .unwrap()
    }

    #[test]
    fn parses_camel_case_form() {
        let req = form();
        assert_eq!(req.user_id, "U123");
        assert_eq!(req.days(), 3);
        assert!(req.preference.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn reversed_dates_are_invalid() {
        let mut req = form();
        req.end_date = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        assert!(matches!(req.validate(), Err(Error::InvalidRequest(_))));
    }
}
