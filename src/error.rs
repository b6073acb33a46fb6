//! Configuration errors

use core::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// World width/height must be finite and positive
    InvalidDimensions { width: f32, height: f32 },
    /// Gravity scale must be finite and positive
    InvalidGravityScale { scale: f32 },
    /// Ball must be positive and fit through a corridor
    InvalidBallRadius { radius: f32, corridor: f32 },
    /// Quality tier name not recognized
    UnknownQualityTier { name: String },
    /// Persisted settings could not be parsed or written
    Malformed { reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid world dimensions {}x{}", width, height)
            }
            Self::InvalidGravityScale { scale } => {
                write!(f, "invalid gravity scale {}", scale)
            }
            Self::InvalidBallRadius { radius, corridor } => write!(
                f,
                "ball radius {} does not fit corridor width {}",
                radius, corridor
            ),
            Self::UnknownQualityTier { name } => write!(f, "unknown quality tier '{}'", name),
            Self::Malformed { reason } => write!(f, "malformed settings: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            reason: err.to_string(),
        }
    }
}
