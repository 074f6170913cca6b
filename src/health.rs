use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

use crate::history::HistoryStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub history: ServiceStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub error: Option<String>,
}

static START_TIME: std::sync::LazyLock<SystemTime> = std::sync::LazyLock::new(SystemTime::now);

#[derive(Clone)]
pub struct HealthChecker {
    history: Arc<dyn HistoryStore>,
}

impl HealthChecker {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        // start the uptime clock with the first checker
        let _ = *START_TIME;
        Self { history }
    }

    pub fn check_health(&self) -> HealthStatus {
        let now = SystemTime::now();
        let uptime = now.duration_since(*START_TIME)
            .unwrap_or_default()
            .as_secs();

        let history_status = self.check_history();

        let overall_status = if history_status.status == "healthy" {
            "healthy"
        } else {
            "degraded"
        };

        HealthStatus {
            status: overall_status.to_string(),
            timestamp: now.duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            history: history_status,
        }
    }

    fn check_history(&self) -> ServiceStatus {
        match self.history.check() {
            Ok(()) => ServiceStatus {
                status: "healthy".to_string(),
                error: None,
            },
            Err(e) => ServiceStatus {
                status: "unavailable".to_string(),
                error: Some(e.to_string()),
            },
        }
    }
}
