use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::CounterState;

/// Response body for a successful `POST /state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAck {
    pub success: bool,
}

impl UpdateAck {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

pub fn state_route() -> &'static str {
    "/state"
}

pub fn control_route() -> &'static str {
    "/"
}

pub fn display_route() -> &'static str {
    "/display"
}

/// Display pages poll `GET /state` at this cadence; there is no push
/// channel.
pub const POLL_INTERVAL_MS: u64 = 200;

/// Key-wise merge of a client patch into `current`.
///
/// Controllers may submit any subset of the wire keys; unspecified keys
/// keep their stored value. Unknown keys and values of the wrong type are
/// skipped per key so one bad field cannot reject the rest of the patch.
pub fn merge_patch(current: &CounterState, patch: &Value) -> CounterState {
    let mut next = current.clone();
    let Some(fields) = patch.as_object() else {
        return next;
    };
    for (key, value) in fields {
        match key.as_str() {
            "successes" => {
                if let Some(count) = read_count(value) {
                    next.successes = count;
                }
            }
            "attempts" => {
                if let Some(count) = read_count(value) {
                    next.attempts = count;
                }
            }
            "trackAttempts" => {
                if let Some(flag) = value.as_bool() {
                    next.track_attempts = flag;
                }
            }
            "showButtons" => {
                if let Some(flag) = value.as_bool() {
                    next.show_buttons = flag;
                }
            }
            "label" => {
                if let Some(text) = value.as_str() {
                    next.label = text.to_string();
                }
            }
            "fontFamily" => {
                if let Some(text) = value.as_str() {
                    next.font_family = text.to_string();
                }
            }
            "fontSize" => {
                if let Some(size) = read_count(value).filter(|size| *size > 0) {
                    next.font_size = size;
                }
            }
            "fontColor" => {
                if let Some(text) = value.as_str() {
                    next.font_color = text.to_string();
                }
            }
            _ => {}
        }
    }
    next
}

fn read_count(value: &Value) -> Option<u32> {
    value.as_u64().map(|raw| raw.min(u64::from(u32::MAX)) as u32)
}
