//! JavaScript bindings for the browser host
//!
//! The host screen owns one `WasmSession` per play-through, feeds it
//! calibrated tilt every animation frame and reads the ball position back.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use super::play_haptics;
use crate::maze::generate;
use crate::physics::{Session, SessionOptions, create_session};
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("Tilt Maze core loaded");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WasmSession {
    session: Session,
    settings: Settings,
    earned: Rc<Cell<u32>>,
}

#[wasm_bindgen]
impl WasmSession {
    /// Generate a maze and bind a session to a `width × height` play area
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: u32, width: f32, height: f32) -> Result<WasmSession, JsValue> {
        let settings = Settings::load();
        let maze = generate(difficulty);
        let options = SessionOptions::from_settings(&settings, width, height);
        let mut session = create_session(&maze, options).map_err(to_js)?;

        let earned = Rc::new(Cell::new(0u32));
        let sink = earned.clone();
        session.set_reward_callback(move |reward| sink.set(sink.get().saturating_add(reward)));

        Ok(Self {
            session,
            settings,
            earned,
        })
    }

    /// Advance one animation frame with a calibrated tilt sample
    pub fn update(&mut self, tilt_x: f32, tilt_y: f32, reset_velocity: bool) {
        let (x, y) = self.settings.scale_tilt(tilt_x, tilt_y);
        self.session.update(x, y, reset_velocity);
        let events = self.session.drain_events();
        play_haptics(&events, &self.settings);
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    #[wasm_bindgen(getter)]
    pub fn ball_x(&self) -> f32 {
        self.session.ball_x()
    }

    #[wasm_bindgen(getter)]
    pub fn ball_y(&self) -> f32 {
        self.session.ball_y()
    }

    #[wasm_bindgen(getter)]
    pub fn goal_reached(&self) -> bool {
        self.session.goal_reached()
    }

    #[wasm_bindgen(getter)]
    pub fn game_over(&self) -> bool {
        self.session.game_over()
    }

    /// Coin reward earned since the last call
    pub fn take_earned_coins(&mut self) -> u32 {
        self.earned.replace(0)
    }

    /// Live maze as JSON for the renderer
    pub fn maze_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.maze()).map_err(to_js)
    }
}
