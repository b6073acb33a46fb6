//! Output events drained by the host after each update

use serde::{Deserialize, Serialize};

/// Something the host should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Ball touched the goal (fires once per run)
    GoalReached,
    /// Ball touched a lit laser gate (fires once per run)
    HazardHit { gate_id: u32 },
    /// A coin was picked up; `reward` already includes the special multiplier
    CoinCollected {
        coin_id: u32,
        reward: u32,
        special: bool,
    },
}

/// Haptic feedback to play for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticPattern {
    Success,
    Error,
    Light,
    Heavy,
}

impl SessionEvent {
    pub fn haptic(&self) -> HapticPattern {
        match self {
            SessionEvent::GoalReached => HapticPattern::Success,
            SessionEvent::HazardHit { .. } => HapticPattern::Error,
            SessionEvent::CoinCollected { special: true, .. } => HapticPattern::Heavy,
            SessionEvent::CoinCollected { special: false, .. } => HapticPattern::Light,
        }
    }

    /// Ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::GoalReached | SessionEvent::HazardHit { .. }
        )
    }
}

impl HapticPattern {
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn vibration_ms(&self) -> &'static [u32] {
        match self {
            HapticPattern::Success => &[30, 60, 30],
            HapticPattern::Error => &[120, 40, 120],
            HapticPattern::Light => &[10],
            HapticPattern::Heavy => &[40],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haptic_mapping() {
        assert_eq!(SessionEvent::GoalReached.haptic(), HapticPattern::Success);
        assert_eq!(
            SessionEvent::HazardHit { gate_id: 3 }.haptic(),
            HapticPattern::Error
        );
        let coin = |special| SessionEvent::CoinCollected {
            coin_id: 1,
            reward: 1,
            special,
        };
        assert_eq!(coin(false).haptic(), HapticPattern::Light);
        assert_eq!(coin(true).haptic(), HapticPattern::Heavy);
        assert!(!coin(true).is_terminal());
        assert!(SessionEvent::GoalReached.is_terminal());
    }

    #[test]
    fn test_patterns_are_nonempty() {
        for p in [
            HapticPattern::Success,
            HapticPattern::Error,
            HapticPattern::Light,
            HapticPattern::Heavy,
        ] {
            assert!(!p.vibration_ms().is_empty());
        }
    }
}
