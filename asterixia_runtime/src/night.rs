use asterixia_render_bridge::BackgroundState;

pub const DEFAULT_NIGHT_INTENSITY: f32 = 0.3;
const MIN_BRIGHTNESS: f32 = 0.1;
const NIGHT_GLOW_BOOST: f32 = 2.0;

/// Dims the camera feed and strengthens body glow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NightMode {
    pub enabled: bool,
    pub intensity: f32,
}

impl Default for NightMode {
    fn default() -> Self {
        Self {
            enabled: false,
            intensity: DEFAULT_NIGHT_INTENSITY,
        }
    }
}

impl NightMode {
    pub fn set(&mut self, enabled: bool, intensity: f32) {
        self.enabled = enabled;
        if intensity.is_finite() {
            self.intensity = intensity;
        }
    }

    /// RGB multiplier for the camera background.
    pub fn brightness(&self) -> f32 {
        if self.enabled {
            self.intensity.clamp(MIN_BRIGHTNESS, 1.0)
        } else {
            1.0
        }
    }

    pub fn glow_boost(&self) -> f32 {
        if self.enabled { NIGHT_GLOW_BOOST } else { 1.0 }
    }

    pub fn background(&self, uv: [[f32; 2]; 4]) -> BackgroundState {
        BackgroundState {
            uv,
            brightness: self.brightness(),
            night_mode: self.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_neutral() {
        let mut night = NightMode::default();
        night.set(false, 0.05);
        assert_eq!(night.brightness(), 1.0);
        assert_eq!(night.glow_boost(), 1.0);
    }

    #[test]
    fn brightness_is_clamped() {
        let mut night = NightMode::default();
        night.set(true, 0.0);
        assert_eq!(night.brightness(), 0.1);
        night.set(true, 4.0);
        assert_eq!(night.brightness(), 1.0);
        night.set(true, 0.45);
        assert_eq!(night.brightness(), 0.45);
        assert_eq!(night.glow_boost(), 2.0);
    }

    #[test]
    fn nan_intensity_keeps_previous_value() {
        let mut night = NightMode::default();
        night.set(true, 0.6);
        night.set(true, f32::NAN);
        assert_eq!(night.intensity, 0.6);
    }
}
