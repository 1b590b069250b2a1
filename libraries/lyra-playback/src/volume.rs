//! Volume control
//!
//! Linear 0.0-1.0 level handed straight to the engine, plus a mute flag that
//! keeps the level intact.

use crate::types::DEFAULT_VOLUME;

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// Out-of-range levels are clamped; non-finite ones fall back to the default.
    pub fn new(level: f32) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };

        Self {
            level,
            muted: false,
        }
    }

    /// Set volume level (clamped to 0.0-1.0)
    ///
    /// A positive level unmutes, zero mutes. Returns `false` (and changes
    /// nothing) for NaN or infinite input.
    pub fn set_level(&mut self, level: f32) -> bool {
        if !level.is_finite() {
            return false;
        }

        self.level = level.clamp(0.0, 1.0);
        self.muted = self.level <= 0.0;
        true
    }

    /// Current volume level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state
    ///
    /// Unmuting a zero level restores the default so the toggle is audible.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            if self.level <= 0.0 {
                self.level = DEFAULT_VOLUME;
            }
        } else {
            self.muted = true;
        }
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level the engine should actually use (0.0 when muted)
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::default();
        assert_eq!(vol.level(), 0.7);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.7);
    }

    #[test]
    fn clamps_levels() {
        let mut vol = Volume::new(1.5);
        assert_eq!(vol.level(), 1.0);

        assert!(vol.set_level(-0.2));
        assert_eq!(vol.level(), 0.0);
        assert!(vol.is_muted());
    }

    #[test]
    fn ignores_non_finite() {
        let mut vol = Volume::new(0.4);
        assert!(!vol.set_level(f32::NAN));
        assert!(!vol.set_level(f32::INFINITY));
        assert_eq!(vol.level(), 0.4);

        assert_eq!(Volume::new(f32::NAN).level(), 0.7);
    }

    #[test]
    fn mute_preserves_level() {
        let mut vol = Volume::new(0.5);
        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.5);
        assert_eq!(vol.effective(), 0.0);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.5);
    }

    #[test]
    fn unmute_at_zero_restores_default() {
        let mut vol = Volume::new(0.0);
        vol.toggle_mute();
        vol.toggle_mute();
        assert_eq!(vol.level(), 0.7);
    }

    #[test]
    fn positive_level_unmutes() {
        let mut vol = Volume::new(0.5);
        vol.toggle_mute();
        vol.set_level(0.3);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.3);

        vol.set_level(0.0);
        assert!(vol.is_muted());

        // Unmuting from a zeroed slider comes back audible
        vol.toggle_mute();
        assert_eq!(vol.effective(), 0.7);
    }
}
