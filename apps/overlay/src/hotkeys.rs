//! Background hotkey listener. Runs on its own thread, independent of the
//! window event loop, and writes to the store only through the atomic
//! apply path.

use std::{sync::Arc, thread, thread::JoinHandle};

use anyhow::{anyhow, Result};
use crossbeam_channel::Receiver;
use shared::domain::{CounterAction, HotkeyBindings};
use store::CounterStore;
use tracing::warn;

/// Raw key signal forwarded from the window input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySignal {
    /// A typed character with shift already applied ("+", "|", "_").
    Char(char),
    /// A named non-character key, lowercase ("f8").
    Named(String),
}

pub enum ListenerMsg {
    Key(KeySignal),
    Rebind(HotkeyBindings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Char(char),
    Named(String),
}

const NAMED_KEYS: &[&str] = &[
    "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
];

/// Single characters bind as typed characters, longer strings as named
/// keys. An unresolvable string deactivates that one binding; the others
/// keep working.
fn resolve_binding(raw: Option<&str>) -> Option<Binding> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut chars = raw.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(Binding::Char(ch));
    }
    let name = raw.to_ascii_lowercase();
    if NAMED_KEYS.contains(&name.as_str()) {
        return Some(Binding::Named(name));
    }
    warn!(binding = raw, "unresolvable hotkey binding left inactive");
    None
}

#[derive(Debug, Default)]
struct ResolvedBindings {
    inc_success: Option<Binding>,
    inc_attempt: Option<Binding>,
    dec_success: Option<Binding>,
}

impl ResolvedBindings {
    fn resolve(bindings: &HotkeyBindings) -> Self {
        Self {
            inc_success: resolve_binding(bindings.inc_success.as_deref()),
            inc_attempt: resolve_binding(bindings.inc_attempt.as_deref()),
            dec_success: resolve_binding(bindings.dec_success.as_deref()),
        }
    }

    fn action_for(&self, signal: &KeySignal) -> Option<CounterAction> {
        let pressed = match signal {
            KeySignal::Char(ch) => Binding::Char(*ch),
            KeySignal::Named(name) => Binding::Named(name.clone()),
        };
        if self.inc_success.as_ref() == Some(&pressed) {
            Some(CounterAction::IncrementSuccess)
        } else if self.inc_attempt.as_ref() == Some(&pressed) {
            Some(CounterAction::IncrementAttempt)
        } else if self.dec_success.as_ref() == Some(&pressed) {
            Some(CounterAction::DecrementSuccess)
        } else {
            None
        }
    }
}

/// Spawn the listener thread. It drains the channel until every sender is
/// gone, resolving bindings from the store's current hotkeys and again on
/// every rebind message.
pub fn spawn_hotkey_listener(
    store: Arc<CounterStore>,
    rx: Receiver<ListenerMsg>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("hotkey-listener".into())
        .spawn(move || {
            let mut bindings = ResolvedBindings::resolve(&store.snapshot().hotkeys);
            while let Ok(message) = rx.recv() {
                match message {
                    ListenerMsg::Rebind(next) => {
                        bindings = ResolvedBindings::resolve(&next);
                    }
                    ListenerMsg::Key(signal) => {
                        if let Some(action) = bindings.action_for(&signal) {
                            store.apply_action(&action);
                        }
                    }
                }
            }
        })
        .map_err(|err| anyhow!("failed to spawn hotkey listener: {err}"))
}
