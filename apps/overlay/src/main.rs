use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use eframe::egui;
use shared::domain::{CounterState, HotkeyBindings};
use store::CounterStore;

mod app;
mod hotkeys;

use app::OverlayApp;
use hotkeys::spawn_hotkey_listener;

/// Launch-time setup for the floating counter. Press F2 in the overlay to
/// change any of this while it runs.
#[derive(Parser, Debug)]
struct Args {
    /// Text shown before the counts.
    #[arg(long, default_value = "Mounts Dropped:")]
    label: String,
    #[arg(long, default_value = "Arial")]
    font_family: String,
    #[arg(long, default_value_t = 48)]
    font_size: u32,
    /// #RRGGBB
    #[arg(long, default_value = "#FF0000")]
    font_color: String,
    /// Count successes only, without the attempts denominator.
    #[arg(long)]
    no_track_attempts: bool,
    /// Hide the on-screen buttons.
    #[arg(long)]
    hide_buttons: bool,
    /// Do not start the hotkey listener thread.
    #[arg(long)]
    disable_hotkeys: bool,
    /// Key that counts a success (and an attempt while tracking).
    #[arg(long, default_value = "+")]
    key_inc_success: String,
    /// Key that counts an attempt only.
    #[arg(long, default_value = "|")]
    key_inc_attempt: String,
    /// Key that undoes a success.
    #[arg(long, default_value = "_")]
    key_dec_success: String,
}

fn initial_state(args: &Args) -> CounterState {
    fn binding(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
    CounterState {
        successes: 0,
        attempts: 0,
        track_attempts: !args.no_track_attempts,
        show_buttons: !args.hide_buttons,
        label: args.label.clone(),
        font_family: args.font_family.clone(),
        font_size: args.font_size.max(1),
        font_color: args.font_color.clone(),
        hotkeys: HotkeyBindings {
            inc_success: binding(&args.key_inc_success),
            inc_attempt: if args.no_track_attempts {
                None
            } else {
                binding(&args.key_inc_attempt)
            },
            dec_success: binding(&args.key_dec_success),
        },
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let store = Arc::new(CounterStore::new(initial_state(&args)));
    let (listener_tx, listener_rx) = unbounded();
    if !args.disable_hotkeys {
        spawn_hotkey_listener(Arc::clone(&store), listener_rx)?;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Counter Overlay")
            .with_decorations(false)
            .with_transparent(true)
            .with_window_level(egui::WindowLevel::AlwaysOnTop)
            .with_inner_size([520.0, 200.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Counter Overlay",
        options,
        Box::new(move |_cc| Ok(Box::new(OverlayApp::new(store, listener_tx)))),
    )
    .map_err(|err| anyhow!("overlay window failed: {err}"))
}
