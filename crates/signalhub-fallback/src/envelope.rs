//! Response envelope of the assistant API.

use crate::error::FallbackError;
use serde::Deserialize;
use serde_json::Value;

/// `code` value of a successful response.
pub const SUCCESS_CODE: i64 = 0;

/// `{ code, msg, data }` wrapper around every assistant API response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Returns the payload if `code` is [`SUCCESS_CODE`].
    pub fn into_data(self, endpoint: &str) -> Result<Value, FallbackError> {
        if self.code == SUCCESS_CODE {
            return Ok(self.data);
        }

        let message = if self.msg.is_empty() {
            "no message".to_string()
        } else {
            self.msg
        };
        Err(FallbackError::Envelope {
            endpoint: endpoint.to_string(),
            code: self.code,
            message,
        })
    }
}
