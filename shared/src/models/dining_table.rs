//! Dining Table Availability Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `GET /tables/availability/{id}/immediate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableAvailability {
    pub available: bool,
    /// Server-side table state, e.g. `available`, `occupied`, `reserved`
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default)]
    pub estimated_available_time: Option<DateTime<Utc>>,
}

impl TableAvailability {
    pub fn status(&self) -> &str {
        match self.current_status.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ if self.available => "available",
            _ => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupied_table() {
        let json = r#"{"available": false, "current_status": "occupied", "estimated_available_time": "2026-10-16T19:30:00Z"}"#;
        let table: TableAvailability = serde_json::from_str(json).unwrap();
        assert!(!table.available);
        assert_eq!(table.status(), "occupied");
        assert!(table.estimated_available_time.is_some());
    }

    #[test]
    fn test_status_fallback() {
        let table: TableAvailability = serde_json::from_str(r#"{"available": true}"#).unwrap();
        assert_eq!(table.status(), "available");

        let table: TableAvailability =
            serde_json::from_str(r#"{"available": false, "current_status": null}"#).unwrap();
        assert_eq!(table.status(), "unavailable");
    }
}
