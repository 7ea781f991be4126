//! Alert records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    ExpiryWarning,
    HighDebt,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// A stored alert. Only `is_read` is flipped by users; the generator may
/// refresh severity and message for the same `{alert_type, related_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub related_id: Option<String>,
    pub is_read: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn from_new(id: String, new: NewAlert, now: DateTime<Utc>) -> Self {
        Alert {
            id,
            alert_type: new.alert_type,
            severity: new.severity,
            message: new.message,
            related_id: new.related_id,
            is_read: new.is_read,
            created_at: now,
        }
    }

    /// Structural identity used to deduplicate generated alerts.
    pub fn key(&self) -> AlertKey {
        AlertKey {
            alert_type: self.alert_type,
            related_id: self.related_id.clone(),
        }
    }
}

/// `{type, related entity}` pair; one open alert per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub alert_type: AlertType,
    pub related_id: Option<String>,
}

/// Candidate alert, as produced by the generator (no identity yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub related_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl NewAlert {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            alert_type: self.alert_type,
            related_id: self.related_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
}

impl AlertPatch {
    /// Patch that marks the alert as read.
    pub fn read() -> Self {
        AlertPatch {
            is_read: Some(true),
            ..Default::default()
        }
    }

    pub fn apply(&self, alert: &mut Alert) {
        if let Some(severity) = self.severity {
            alert.severity = severity;
        }
        if let Some(message) = &self.message {
            alert.message = message.clone();
        }
        if let Some(is_read) = self.is_read {
            alert.is_read = is_read;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_type_serializes_under_type_key() {
        let alert = NewAlert {
            alert_type: AlertType::LowStock,
            severity: AlertSeverity::High,
            message: "Pan Blanco tiene stock agotado".to_string(),
            related_id: Some("p1".to_string()),
            is_read: false,
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "low_stock");
        assert_eq!(json["severity"], "high");
    }
}
