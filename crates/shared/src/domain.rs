use serde::{Deserialize, Serialize};

/// Single-key bindings for the desktop overlay. `inc_attempt` only fires
/// while attempt tracking is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotkeyBindings {
    pub inc_success: Option<String>,
    pub inc_attempt: Option<String>,
    pub dec_success: Option<String>,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            inc_success: Some("+".into()),
            inc_attempt: Some("|".into()),
            dec_success: Some("_".into()),
        }
    }
}

/// The one counter per process. Serializes to the wire snapshot served by
/// `GET /state`; hotkeys are desktop-only and never leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    pub successes: u32,
    pub attempts: u32,
    pub track_attempts: bool,
    pub show_buttons: bool,
    pub label: String,
    pub font_family: String,
    pub font_size: u32,
    pub font_color: String,
    #[serde(skip)]
    pub hotkeys: HotkeyBindings,
}

impl Default for CounterState {
    fn default() -> Self {
        Self {
            successes: 0,
            attempts: 0,
            track_attempts: true,
            show_buttons: true,
            label: "Mounts Dropped:".into(),
            font_family: "Arial".into(),
            font_size: 48,
            font_color: "#FF0000".into(),
            hotkeys: HotkeyBindings::default(),
        }
    }
}

/// Every legal transition on [`CounterState`]. Applying an action is total:
/// decrements clamp at zero instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterAction {
    /// A success is by definition also an attempt, so in tracking mode both
    /// counters move in the same transition.
    IncrementSuccess,
    /// No-op unless attempt tracking is enabled.
    IncrementAttempt,
    /// In tracking mode both counters decrement, each clamped at zero
    /// independently. Attempts are not forced to stay >= successes.
    DecrementSuccess,
    DecrementSuccessOnly,
    DecrementAttempt,
    SetTrackAttempts(bool),
    SetShowButtons(bool),
    SetLabel(String),
    SetFontFamily(String),
    SetFontSize(u32),
    SetFontColor(String),
    SetHotkeys(HotkeyBindings),
}

impl CounterAction {
    pub fn apply(&self, state: &CounterState) -> CounterState {
        let mut next = state.clone();
        match self {
            CounterAction::IncrementSuccess => {
                next.successes = next.successes.saturating_add(1);
                if next.track_attempts {
                    next.attempts = next.attempts.saturating_add(1);
                }
            }
            CounterAction::IncrementAttempt => {
                if next.track_attempts {
                    next.attempts = next.attempts.saturating_add(1);
                }
            }
            CounterAction::DecrementSuccess => {
                next.successes = next.successes.saturating_sub(1);
                if next.track_attempts {
                    next.attempts = next.attempts.saturating_sub(1);
                }
            }
            CounterAction::DecrementSuccessOnly => {
                next.successes = next.successes.saturating_sub(1);
            }
            CounterAction::DecrementAttempt => {
                next.attempts = next.attempts.saturating_sub(1);
            }
            CounterAction::SetTrackAttempts(enabled) => next.track_attempts = *enabled,
            CounterAction::SetShowButtons(visible) => next.show_buttons = *visible,
            CounterAction::SetLabel(label) => next.label = label.clone(),
            CounterAction::SetFontFamily(family) => next.font_family = family.clone(),
            CounterAction::SetFontSize(size) => next.font_size = *size,
            CounterAction::SetFontColor(color) => next.font_color = color.clone(),
            CounterAction::SetHotkeys(bindings) => next.hotkeys = bindings.clone(),
        }
        next
    }
}

/// Overlay text: `label S/A` in tracking mode, `label S` otherwise.
pub fn display_text(state: &CounterState) -> String {
    if state.track_attempts {
        format!("{} {}/{}", state.label, state.successes, state.attempts)
    } else {
        format!("{} {}", state.label, state.successes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleControls {
    pub success_buttons: bool,
    pub attempt_buttons: bool,
}

/// Which manual button groups render. Recomputed from state on every
/// render rather than tracked imperatively.
pub fn visible_controls(state: &CounterState) -> VisibleControls {
    VisibleControls {
        success_buttons: state.show_buttons,
        attempt_buttons: state.show_buttons && state.track_attempts,
    }
}
