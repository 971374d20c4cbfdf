use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tracing::{error, info, warn};

const SERVICE: &str = "interview-tracker-backend";
const SLOW_QUERY_MS: u128 = 1000;

#[derive(Debug)]
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_request(&self, method: &str, path: &str, status: u16, duration_ms: u128) {
        let log_entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event_type": "http_request",
            "method": method,
            "path": path,
            "status_code": status,
            "duration_ms": duration_ms,
            "service": SERVICE
        });

        if status >= 500 {
            error!("{}", log_entry);
        } else {
            info!("{}", log_entry);
        }
    }

    pub fn log_database_query(&self, query: &str, duration_ms: u128, result_count: Option<usize>) {
        let query = query.trim();
        let log_entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event_type": "database_query",
            "query_hash": format!("{:x}", md5::compute(query)),
            "query_preview": preview(query, 100),
            "duration_ms": duration_ms,
            "result_count": result_count,
            "service": SERVICE
        });

        if duration_ms > SLOW_QUERY_MS {
            warn!("Slow query detected: {}", log_entry);
        } else {
            info!("{}", log_entry);
        }
    }

    pub fn log_error(&self, error: &str, context: HashMap<String, serde_json::Value>) {
        let mut log_entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event_type": "error",
            "error_message": error,
            "service": SERVICE
        });

        for (key, value) in context {
            log_entry[key] = value;
        }

        error!("{}", log_entry);
    }

    pub fn log_business_event(
        &self,
        event_name: &str,
        candidate_id: Option<i32>,
        metadata: HashMap<String, serde_json::Value>,
    ) {
        let mut log_entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event_type": "business_event",
            "event_name": event_name,
            "candidate_id": candidate_id,
            "service": SERVICE
        });

        for (key, value) in metadata {
            log_entry[key] = value;
        }

        info!("{}", log_entry);
    }
}

/// Cuts on a char boundary so multi-byte text never panics.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

pub static LOGGER: StructuredLogger = StructuredLogger;

/// Builds a metadata map from `(key, value)` pairs.
pub fn metadata<const N: usize>(
    pairs: [(&str, serde_json::Value); N],
) -> HashMap<String, serde_json::Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
