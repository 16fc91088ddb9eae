//! This module contains both user-configurable settings (implemented as enums and plain structs) and traits to make them
//! easier to work with in code.

mod amplitude;
pub use amplitude::*;

mod watchdog_timing;
pub use watchdog_timing::*;

use num_traits::{FromPrimitive, ToPrimitive};

/// A trait which allows infinite cycling of an enum's variants.
///
/// Useful for pushbutton user interfaces, allowing presses to advance from the current to the next variant,
/// cycling back to the beginning when all variants have been exhausted.
pub trait CycleConfig {
    /// Return the next variant, cycling back to the beginning as needed.
    fn cycle(self) -> Self
    where
        Self: FromPrimitive + ToPrimitive + Sized,
    {
        self.to_u8()
            .and_then(|index| <Self as FromPrimitive>::from_u8(index.wrapping_add(1)))
            .or_else(|| <Self as FromPrimitive>::from_u8(0))
            .unwrap_or(self)
    }
}

/// Every setting which alters how the bridge turns MIDI into sound.
///
/// The [`Default`] reproduces the bridge's baseline behavior: fixed maximum volume, and a watchdog which samples every
/// 1000 ticks and releases notes held for 4000 ticks or more.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// Determines how a note-on's velocity affects the level of the voice it lands on.
    pub amplitude: Amplitude,
    /// Determines how often hung notes are looked for and how long a note may be held.
    pub watchdog: WatchdogTiming,
}
