//! Bounded alert log shared by the dashboard and alert feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const ALERT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SafetyZone,
    AiPrediction,
    WeatherAlert,
    Sos,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AlertLog {
    records: VecDeque<AlertRecord>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self {
            records: VecDeque::with_capacity(ALERT_LOG_CAPACITY),
        }
    }

    pub fn log(&mut self, kind: AlertKind, message: impl Into<String>, data: serde_json::Value) -> &AlertRecord {
        self.log_at(kind, message, data, Utc::now())
    }

    pub fn log_at(
        &mut self,
        kind: AlertKind,
        message: impl Into<String>,
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> &AlertRecord {
        self.records.push_back(AlertRecord {
            kind,
            message: message.into(),
            data,
            timestamp,
        });
        while self.records.len() > ALERT_LOG_CAPACITY {
            self.records.pop_front();
        }
        tracing::debug!(?kind, total = self.records.len(), "alert logged");
        // Just pushed, never empty
        &self.records[self.records.len() - 1]
    }

    /// Last `n` alerts, oldest first
    pub fn recent(&self, n: usize) -> Vec<AlertRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
