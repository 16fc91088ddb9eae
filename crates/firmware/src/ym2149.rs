//! Drives the YM2149 over its parallel bus.
//!
//! Wiring: DA0-DA7 on PE0-PE7, BDIR on PF0, BC1 on PF1, BC2 strapped high, RESET pulled high. The chip is clocked by
//! a 1.8432 MHz oscillator, the frequency the note table is computed for.

use embassy_stm32::gpio::Output;
use psg_bridge_lib::psg::RegisterSink;

/// Busy-wait between bus phases. The chip wants a few hundred nanoseconds; at 216 MHz this is roughly a microsecond.
const SETTLE_CYCLES: u32 = 216;

/// The chip, as seen through GPIO pins.
pub struct Ym2149<'d> {
    data: [Output<'d>; 8],
    bdir: Output<'d>,
    bc1: Output<'d>,
}

impl<'d> Ym2149<'d> {
    /// Constructs a [`Ym2149`], leaving the bus inactive. `data` is ordered from DA0 to DA7.
    pub fn new(data: [Output<'d>; 8], bdir: Output<'d>, bc1: Output<'d>) -> Self {
        let mut ym = Self { data, bdir, bc1 };
        ym.inactive();
        ym
    }

    fn put(&mut self, byte: u8) {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if byte & (1 << bit) != 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
    }

    fn inactive(&mut self) {
        self.bdir.set_low();
        self.bc1.set_low();
    }

    /// Presents the byte on the data pins to the chip: as an address when `address` is true (BDIR and BC1 high),
    /// otherwise as a value for the latched register (BDIR high only).
    fn strobe(&mut self, address: bool) {
        if address {
            self.bc1.set_high();
        }
        self.bdir.set_high();
        cortex_m::asm::delay(SETTLE_CYCLES);
        self.inactive();
        cortex_m::asm::delay(SETTLE_CYCLES);
    }
}

impl RegisterSink for Ym2149<'_> {
    fn write_register(&mut self, address: u8, value: u8) {
        self.put(address);
        self.strobe(true);
        self.put(value);
        self.strobe(false);
    }
}
