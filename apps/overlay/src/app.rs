//! Floating overlay window: reads the store every frame, renders the
//! counter, and turns button presses and key input into actions.

use std::{sync::Arc, time::Duration};

use crossbeam_channel::Sender;
use eframe::egui;
use shared::domain::{
    display_text, visible_controls, CounterAction, CounterState, HotkeyBindings,
};
use store::CounterStore;

use crate::hotkeys::{KeySignal, ListenerMsg};

pub struct OverlayApp {
    store: Arc<CounterStore>,
    listener_tx: Sender<ListenerMsg>,
    settings: Option<SettingsDraft>,
}

impl OverlayApp {
    pub fn new(store: Arc<CounterStore>, listener_tx: Sender<ListenerMsg>) -> Self {
        Self {
            store,
            listener_tx,
            settings: None,
        }
    }

    /// Key input goes to the listener thread, not straight to the store;
    /// the listener owns binding resolution. Suppressed while a text
    /// field has focus so typing a label cannot move the counter.
    fn forward_key_signals(&self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let signals: Vec<KeySignal> = ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => {
                        let mut chars = text.chars();
                        match (chars.next(), chars.next()) {
                            (Some(ch), None) => Some(KeySignal::Char(ch)),
                            _ => None,
                        }
                    }
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => Some(KeySignal::Named(key.name().to_ascii_lowercase())),
                    _ => None,
                })
                .collect()
        });
        for signal in signals {
            let _ = self.listener_tx.send(ListenerMsg::Key(signal));
        }
    }

    fn show_counter(&self, ctx: &egui::Context, state: &CounterState) {
        let store = &self.store;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    let text = egui::RichText::new(display_text(state))
                        .size(state.font_size.max(1) as f32)
                        .family(font_family_for(&state.font_family))
                        .color(parse_font_color(&state.font_color));
                    let label = ui.add(egui::Label::new(text).sense(egui::Sense::drag()));
                    if label.drag_started() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
                    }

                    let controls = visible_controls(state);
                    if controls.success_buttons {
                        ui.horizontal(|ui| {
                            if ui.button("Success +").clicked() {
                                store.apply_action(&CounterAction::IncrementSuccess);
                            }
                            if ui.button("Success -").clicked() {
                                store.apply_action(&CounterAction::DecrementSuccessOnly);
                            }
                            if controls.attempt_buttons {
                                if ui.button("Attempt +").clicked() {
                                    store.apply_action(&CounterAction::IncrementAttempt);
                                }
                                if ui.button("Attempt -").clicked() {
                                    store.apply_action(&CounterAction::DecrementAttempt);
                                }
                            }
                        });
                    }
                });
            });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.settings.as_mut() else {
            return;
        };
        let mut open = true;
        let mut apply_clicked = false;

        egui::Window::new("Counter Settings")
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Label Text");
                ui.text_edit_singleline(&mut draft.label);
                ui.label("Font Family");
                ui.text_edit_singleline(&mut draft.font_family);
                ui.horizontal(|ui| {
                    ui.label("Font Size");
                    ui.add(egui::DragValue::new(&mut draft.font_size).range(1..=200));
                });
                ui.horizontal(|ui| {
                    ui.label("Font Color");
                    ui.text_edit_singleline(&mut draft.font_color);
                });
                ui.checkbox(&mut draft.track_attempts, "Track Attempts (X/Y)");
                ui.checkbox(&mut draft.show_buttons, "Show on-screen buttons");
                ui.separator();
                if draft.track_attempts {
                    ui.label("Increment Success & Attempt key");
                    ui.text_edit_singleline(&mut draft.inc_success);
                    ui.label("Increment Attempt Only key");
                    ui.text_edit_singleline(&mut draft.inc_attempt);
                    ui.label("Decrement Success & Attempt key");
                    ui.text_edit_singleline(&mut draft.dec_success);
                } else {
                    ui.label("Increment Success key");
                    ui.text_edit_singleline(&mut draft.inc_success);
                    ui.label("Decrement Success key");
                    ui.text_edit_singleline(&mut draft.dec_success);
                }
                ui.small("Note: +, _, and | require holding Shift");
                if ui.button("Apply").clicked() {
                    apply_clicked = true;
                }
            });

        if apply_clicked {
            if let Some(draft) = self.settings.take() {
                self.commit_settings(&draft);
            }
        } else if !open {
            self.settings = None;
        }
    }

    /// Commit edited preferences through the atomic apply path so counts
    /// changed by the listener while the panel was open survive.
    fn commit_settings(&self, draft: &SettingsDraft) {
        let bindings = draft.bindings();
        let committed = bindings.clone();
        self.store.apply(|current| CounterState {
            successes: current.successes,
            attempts: current.attempts,
            track_attempts: draft.track_attempts,
            show_buttons: draft.show_buttons,
            label: draft.label.clone(),
            font_family: draft.font_family.clone(),
            font_size: draft.font_size.max(1),
            font_color: draft.font_color.clone(),
            hotkeys: committed,
        });
        let _ = self.listener_tx.send(ListenerMsg::Rebind(bindings));
    }
}

impl eframe::App for OverlayApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // the listener thread mutates the store between frames
        ctx.request_repaint_after(Duration::from_millis(100));

        self.forward_key_signals(ctx);

        let state = self.store.snapshot();
        if ctx.input(|input| input.key_pressed(egui::Key::F2)) {
            self.settings = match self.settings {
                Some(_) => None,
                None => Some(SettingsDraft::from_state(&state)),
            };
        }
        if ctx.input(|input| input.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        self.show_counter(ctx, &state);
        self.show_settings_window(ctx);
    }
}

struct SettingsDraft {
    label: String,
    font_family: String,
    font_size: u32,
    font_color: String,
    track_attempts: bool,
    show_buttons: bool,
    inc_success: String,
    inc_attempt: String,
    dec_success: String,
}

impl SettingsDraft {
    fn from_state(state: &CounterState) -> Self {
        Self {
            label: state.label.clone(),
            font_family: state.font_family.clone(),
            font_size: state.font_size,
            font_color: state.font_color.clone(),
            track_attempts: state.track_attempts,
            show_buttons: state.show_buttons,
            inc_success: state.hotkeys.inc_success.clone().unwrap_or_default(),
            inc_attempt: state.hotkeys.inc_attempt.clone().unwrap_or_default(),
            dec_success: state.hotkeys.dec_success.clone().unwrap_or_default(),
        }
    }

    fn bindings(&self) -> HotkeyBindings {
        fn binding(raw: &str) -> Option<String> {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        HotkeyBindings {
            inc_success: binding(&self.inc_success),
            inc_attempt: if self.track_attempts {
                binding(&self.inc_attempt)
            } else {
                None
            },
            dec_success: binding(&self.dec_success),
        }
    }
}

fn font_family_for(name: &str) -> egui::FontFamily {
    let lower = name.to_ascii_lowercase();
    if lower.contains("mono") || lower.contains("courier") {
        egui::FontFamily::Monospace
    } else {
        egui::FontFamily::Proportional
    }
}

/// `#RRGGBB` to a render color; anything unparseable falls back to the
/// stock red rather than failing the frame.
fn parse_font_color(hex: &str) -> egui::Color32 {
    let raw = hex.trim().trim_start_matches('#');
    if raw.len() != 6 || !raw.is_ascii() {
        return egui::Color32::RED;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&raw[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => egui::Color32::from_rgb(r, g, b),
        _ => egui::Color32::RED,
    }
}
