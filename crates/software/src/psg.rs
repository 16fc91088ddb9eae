//! Register map of the YM2149 (and the register-compatible AY-3-8910), plus the [`RegisterSink`] trait through
//! which the rest of the crate programs the chip.

/// Anything that accepts register writes for the sound generator.
///
/// Writes are fire-and-forget: the chip has no way to acknowledge them, so there is no failure to report.
pub trait RegisterSink {
    /// Writes `value` to the register at `address`.
    fn write_register(&mut self, address: u8, value: u8);
}

impl<T: RegisterSink + ?Sized> RegisterSink for &mut T {
    fn write_register(&mut self, address: u8, value: u8) {
        (**self).write_register(address, value);
    }
}

/// Register addresses.
pub mod register {
    /// Channel A tone period, low byte.
    pub const FREQ_A_LSB: u8 = 0x00;
    /// Channel A tone period, high nibble.
    pub const FREQ_A_MSB: u8 = 0x01;
    /// Channel B tone period, low byte.
    pub const FREQ_B_LSB: u8 = 0x02;
    /// Channel B tone period, high nibble.
    pub const FREQ_B_MSB: u8 = 0x03;
    /// Channel C tone period, low byte.
    pub const FREQ_C_LSB: u8 = 0x04;
    /// Channel C tone period, high nibble.
    pub const FREQ_C_MSB: u8 = 0x05;
    /// Noise period.
    pub const FREQ_NOISE: u8 = 0x06;
    /// Tone/noise enables (active low) and I/O port direction.
    pub const MIXER: u8 = 0x07;
    /// Channel A level.
    pub const LEVEL_A: u8 = 0x08;
    /// Channel B level.
    pub const LEVEL_B: u8 = 0x09;
    /// Channel C level.
    pub const LEVEL_C: u8 = 0x0A;
    /// Envelope period, low byte.
    pub const FREQ_ENV_LSB: u8 = 0x0B;
    /// Envelope period, high byte.
    pub const FREQ_ENV_MSB: u8 = 0x0C;
    /// Envelope shape.
    pub const SHAPE_ENV: u8 = 0x0D;
    /// I/O port A data.
    pub const IO_DATA_A: u8 = 0x0E;
    /// I/O port B data.
    pub const IO_DATA_B: u8 = 0x0F;
}

/// Mixer setting with tone enabled on all three channels, noise disabled on all three, and both I/O ports as inputs.
pub const MIXER_TONE_ALL: u8 = 0b0011_1000;

/// Loudest fixed level (envelope mode off).
pub const LEVEL_MAX: u8 = 0x0F;

/// Level which silences a channel.
pub const LEVEL_OFF: u8 = 0x00;

/// Tone periods are 12 bits wide; the upper nibble of the high register is ignored by the chip.
pub const TONE_PERIOD_MASK: u16 = 0x0FFF;

/// Master clock, in hertz, of the chip the [frequency table][crate::frequency_table] was computed for.
pub const CLOCK_HZ: f64 = 1_843_200.0;

/// One of the chip's three square-wave tone generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToneChannel {
    /// Channel A; the left channel when wired for ABC stereo.
    A,
    /// Channel B; the center channel when wired for ABC stereo.
    B,
    /// Channel C; the right channel when wired for ABC stereo.
    C,
}

/// Registers which control a single [`ToneChannel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceRegisters {
    /// Level (amplitude) register.
    pub level: u8,
    /// Low byte of the tone period.
    pub freq_lsb: u8,
    /// High nibble of the tone period.
    pub freq_msb: u8,
}

impl ToneChannel {
    /// Returns the addresses of the registers which control this channel.
    pub const fn registers(self) -> VoiceRegisters {
        match self {
            Self::A => VoiceRegisters {
                level: register::LEVEL_A,
                freq_lsb: register::FREQ_A_LSB,
                freq_msb: register::FREQ_A_MSB,
            },
            Self::B => VoiceRegisters {
                level: register::LEVEL_B,
                freq_lsb: register::FREQ_B_LSB,
                freq_msb: register::FREQ_B_MSB,
            },
            Self::C => VoiceRegisters {
                level: register::LEVEL_C,
                freq_lsb: register::FREQ_C_LSB,
                freq_msb: register::FREQ_C_MSB,
            },
        }
    }
}

/// Splits a tone period into the values for its low and high registers.
pub const fn tone_period_bytes(period: u16) -> (u8, u8) {
    let period = period & TONE_PERIOD_MASK;
    ((period & 0x00FF) as u8, (period >> 8) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_are_distinct_per_channel() {
        let a = ToneChannel::A.registers();
        let b = ToneChannel::B.registers();
        let c = ToneChannel::C.registers();
        assert_eq!((0x08, 0x00, 0x01), (a.level, a.freq_lsb, a.freq_msb));
        assert_eq!((0x09, 0x02, 0x03), (b.level, b.freq_lsb, b.freq_msb));
        assert_eq!((0x0A, 0x04, 0x05), (c.level, c.freq_lsb, c.freq_msb));
    }

    #[test]
    fn tone_period_is_split_into_twelve_bits() {
        assert_eq!((0x72, 0x0F), tone_period_bytes(3954), "Expected left but got right");
        assert_eq!((0x06, 0x01), tone_period_bytes(262), "Expected left but got right");
        // bits beyond the 12-bit period never reach the high register
        assert_eq!((0xFF, 0x0F), tone_period_bytes(0xFFFF), "Expected left but got right");
    }

    #[test]
    fn mixer_enables_tone_only() {
        // tone enables are bits 0-2 and active low
        assert_eq!(0, MIXER_TONE_ALL & 0b0000_0111);
        // noise disables are bits 3-5
        assert_eq!(0b0011_1000, MIXER_TONE_ALL & 0b0011_1000);
    }
}
