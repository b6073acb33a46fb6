//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (hazard duty cycles, frame deltas)
//! - Haptic feedback
//! - JavaScript bindings (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::Cell;
use std::rc::Rc;

use crate::physics::SessionEvent;
use crate::settings::Settings;

/// Millisecond wall clock
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Host clock: `Date.now()` in the browser, system time natively
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Hand-driven clock for replays and headless runs
///
/// Clones share the same time, so a runner can keep one handle and give
/// another to the session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    pub fn set(&self, now_ms: f64) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.0.set(self.0.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

/// Play haptic feedback for drained events (fire-and-forget)
pub fn play_haptics(events: &[SessionEvent], settings: &Settings) {
    if !settings.haptics_enabled {
        return;
    }
    for event in events {
        vibrate(event.haptic().vibration_ms());
    }
}

#[cfg(target_arch = "wasm32")]
fn vibrate(pattern: &[u32]) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let js_pattern: js_sys::Array = pattern
        .iter()
        .map(|&ms| wasm_bindgen::JsValue::from(ms))
        .collect();
    // Unsupported browsers simply return false
    let _ = window.navigator().vibrate_with_pattern(&js_pattern);
}

#[cfg(not(target_arch = "wasm32"))]
fn vibrate(pattern: &[u32]) {
    log::debug!("Haptic pattern {:?}", pattern);
}
