//! Trace id configuration

use serde::{Deserialize, Serialize};

/// Header carrying the request trace id by default
pub const DEFAULT_TRACE_HEADER: &str = "X-Request-ID";

/// Length of an accepted incoming trace id (canonical UUID text)
pub const TRACE_ID_LENGTH: usize = 36;

/// Request trace id settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TraceConfig {
    /// Header read from requests and echoed on responses
    #[serde(default = "default_header_name")]
    pub header_name: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            header_name: default_header_name(),
        }
    }
}

fn default_header_name() -> String {
    DEFAULT_TRACE_HEADER.to_string()
}
