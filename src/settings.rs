//! Player settings
//!
//! Persisted as JSON in LocalStorage on the web; read by the host to build
//! session options and to scale raw tilt before it reaches the engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Simulation quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Low => "Low",
            QualityTier::Medium => "Medium",
            QualityTier::High => "High",
        }
    }

    /// Fixed simulation step (seconds); lower tiers simulate at a lower rate
    pub fn fixed_step(&self) -> f32 {
        match self {
            QualityTier::Low => 1.0 / 60.0,
            QualityTier::Medium => 1.0 / 90.0,
            QualityTier::High => 1.0 / 120.0,
        }
    }

    /// Ball speed ceiling (world units/s)
    pub fn max_velocity(&self) -> f32 {
        match self {
            QualityTier::Low => 700.0,
            QualityTier::Medium => 800.0,
            QualityTier::High => 900.0,
        }
    }

    /// Fraction of `max_velocity` allowed at full speed before easing kicks in
    pub fn soft_cap_fraction(&self) -> f32 {
        match self {
            // Bigger steps tunnel more easily, start braking earlier
            QualityTier::Low => 0.55,
            QualityTier::Medium => 0.65,
            QualityTier::High => 0.7,
        }
    }
}

impl FromStr for QualityTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityTier::Low),
            "medium" | "med" => Ok(QualityTier::Medium),
            "high" => Ok(QualityTier::High),
            _ => Err(ConfigError::UnknownQualityTier { name: s.to_string() }),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation quality tier
    pub quality: QualityTier,
    /// Multiplier applied to calibrated tilt
    pub tilt_sensitivity: f32,
    /// Vibrate on goal, hazard and coin events
    pub haptics_enabled: bool,
    /// Reward multiplier for special coins
    pub special_coin_multiplier: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityTier::Medium,
            tilt_sensitivity: 1.0,
            haptics_enabled: true,
            special_coin_multiplier: 5,
        }
    }
}

impl Settings {
    /// Sensitivity range exposed to the player
    pub const SENSITIVITY_RANGE: (f32, f32) = (0.1, 3.0);

    /// Create settings from a quality tier (other fields default)
    pub fn from_tier(quality: QualityTier) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    /// Clamp out-of-range values loaded from storage
    pub fn sanitized(mut self) -> Self {
        let (lo, hi) = Self::SENSITIVITY_RANGE;
        self.tilt_sensitivity = if self.tilt_sensitivity.is_finite() {
            self.tilt_sensitivity.clamp(lo, hi)
        } else {
            1.0
        };
        self.special_coin_multiplier = self.special_coin_multiplier.max(1);
        self
    }

    /// Scale a calibrated tilt sample by the player's sensitivity
    pub fn scale_tilt(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.tilt_sensitivity, y * self.tilt_sensitivity)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tilt_maze_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Settings not saved: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
