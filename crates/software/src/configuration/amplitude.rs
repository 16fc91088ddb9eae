use crate::psg::LEVEL_MAX;
use num_derive::{FromPrimitive, ToPrimitive};
use wmidi::Velocity;

/// Determines how loudly a newly allocated voice sounds.
#[derive(Debug, Default, Clone, Copy, ToPrimitive, FromPrimitive, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Amplitude {
    /// Every note sounds at [`LEVEL_MAX`], regardless of how hard it was played.
    #[default]
    Fixed,
    /// The note-on velocity is scaled onto the chip's 15 audible levels. Even the softest note remains audible.
    Velocity,
}

impl Amplitude {
    /// Returns the level register value for a note played with `velocity`.
    pub fn level(&self, velocity: Velocity) -> u8 {
        match self {
            Self::Fixed => LEVEL_MAX,
            // 7-bit velocity onto the 4-bit level
            Self::Velocity => (u8::from(velocity) >> 3).max(1),
        }
    }
}

impl super::CycleConfig for Amplitude {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::CycleConfig;
    use wmidi::U7;

    #[test]
    fn fixed_ignores_velocity() {
        assert_eq!(LEVEL_MAX, Amplitude::Fixed.level(U7::from_u8_lossy(1)));
        assert_eq!(LEVEL_MAX, Amplitude::Fixed.level(U7::from_u8_lossy(127)));
    }

    #[test]
    fn velocity_scales_onto_levels() {
        assert_eq!(15, Amplitude::Velocity.level(U7::from_u8_lossy(127)));
        assert_eq!(8, Amplitude::Velocity.level(U7::from_u8_lossy(64)));
        assert_eq!(
            1,
            Amplitude::Velocity.level(U7::from_u8_lossy(3)),
            "Soft notes should remain audible"
        );
    }

    #[test]
    fn cycles_between_modes() {
        assert_eq!(Amplitude::Velocity, Amplitude::Fixed.cycle());
        assert_eq!(Amplitude::Fixed, Amplitude::Velocity.cycle());
    }
}
