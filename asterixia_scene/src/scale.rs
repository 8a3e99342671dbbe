use std::fmt;
use std::str::FromStr;

const STAR_MULTIPLIER: f32 = 2.0;
const PLANET_MIN_FACTOR: f32 = 0.3;
const PLANET_MAX_FACTOR: f32 = STAR_MULTIPLIER;

/// Category of a celestial body. Drives the distance scale rule and whether
/// the body takes part in the global spin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Star,
    #[default]
    Planet,
    Moon,
}

impl BodyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
        }
    }

    /// Stars are drawn without the global spin.
    pub const fn spins(self) -> bool {
        !matches!(self, BodyKind::Star)
    }

    /// Apparent scale for a body `real_distance` AU away. A distance of exactly
    /// zero switches the rule off.
    ///
    /// Planets use `2 / ln(d)`, clamped to [0.3, 2.0]. The upper clamp covers
    /// every distance below e AU (about 2.718), not only d <= 1 where the log
    /// is zero: Mars at 1.52 AU gets 2.0 rather than 4.78.
    pub fn scale_for(self, base_scale: f32, real_distance: f64) -> f32 {
        if real_distance == 0.0 {
            return base_scale;
        }
        match self {
            BodyKind::Star => base_scale * STAR_MULTIPLIER,
            BodyKind::Moon => base_scale,
            BodyKind::Planet => {
                let log_scale = real_distance.max(1.0).ln() as f32;
                let factor = 1.0 / (log_scale * 0.5);
                // ln(1) = 0 makes the raw factor infinite; cap it.
                base_scale * factor.clamp(PLANET_MIN_FACTOR, PLANET_MAX_FACTOR)
            }
        }
    }
}

impl FromStr for BodyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "star" => Ok(BodyKind::Star),
            "planet" => Ok(BodyKind::Planet),
            "moon" => Ok(BodyKind::Moon),
            other => Err(format!("unknown body kind '{other}'")),
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_keeps_base_for_every_kind() {
        for kind in [BodyKind::Star, BodyKind::Planet, BodyKind::Moon] {
            assert_eq!(kind.scale_for(0.25, 0.0), 0.25);
        }
    }

    #[test]
    fn stars_double_and_moons_stay() {
        assert_eq!(BodyKind::Star.scale_for(0.5, 4.2), 1.0);
        assert_eq!(BodyKind::Moon.scale_for(0.5, 0.0026), 0.5);
    }

    #[test]
    fn planet_scale_follows_log_rule() {
        // ln(e^4) * 0.5 = 2 -> factor 0.5
        let d = (4.0f64).exp();
        assert!((BodyKind::Planet.scale_for(1.0, d) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn planet_scale_non_increasing_and_floored() {
        let mut last = f32::INFINITY;
        for step in 0..400 {
            let d = 0.1 + step as f64 * 0.75;
            let s = BodyKind::Planet.scale_for(1.0, d);
            assert!(s.is_finite());
            assert!(s <= last, "scale grew at distance {d}");
            assert!(s >= 0.3 - 1e-6);
            last = s;
        }
        assert!((BodyKind::Planet.scale_for(1.0, 1.0e9) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn near_distances_are_capped() {
        assert_eq!(BodyKind::Planet.scale_for(1.0, 0.4), 2.0);
        assert_eq!(BodyKind::Planet.scale_for(1.0, 1.0), 2.0);
        assert_eq!(BodyKind::Planet.scale_for(1.0, 1.52), 2.0);
        let e = std::f64::consts::E;
        assert!((BodyKind::Planet.scale_for(1.0, e * e) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("STAR".parse::<BodyKind>(), Ok(BodyKind::Star));
        assert_eq!(" Moon ".parse::<BodyKind>(), Ok(BodyKind::Moon));
        assert!("comet".parse::<BodyKind>().is_err());
    }

    #[test]
    fn only_stars_skip_spin() {
        assert!(!BodyKind::Star.spins());
        assert!(BodyKind::Planet.spins());
        assert!(BodyKind::Moon.spins());
    }
}
