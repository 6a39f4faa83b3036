use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Milliseconds since the Unix epoch, the unit every echo timestamp uses
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Server-side state of one connected echo channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoSession {
    pub session_id: String,
    pub connected_at: i64,
    pub test_started_at: Option<i64>,
    pub test_config: Option<Value>,
    pub test_completed_at: Option<i64>,
    pub last_results: Option<Value>,
}

impl EchoSession {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            connected_at: now_millis(),
            test_started_at: None,
            test_config: None,
            test_completed_at: None,
            last_results: None,
        }
    }

    /// Begin a new test. Results of any earlier test on this session are dropped.
    pub fn start_test(&mut self, config: Value) -> i64 {
        let now = now_millis();
        self.test_started_at = Some(now);
        self.test_config = Some(config);
        self.test_completed_at = None;
        self.last_results = None;
        now
    }

    pub fn complete_test(&mut self, results: Value) {
        self.test_completed_at = Some(now_millis());
        self.last_results = Some(results);
    }

    pub fn is_testing(&self) -> bool {
        self.test_started_at.is_some() && self.test_completed_at.is_none()
    }
}
