//! Test doubles shared across modules.

use crate::psg::RegisterSink;
use tinyvec::ArrayVec;

/// Remembers every register write, in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    writes: ArrayVec<[(u8, u8); 32]>,
}

impl RecordingSink {
    pub(crate) fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Returns the writes recorded so far and starts over.
    pub(crate) fn take(&mut self) -> ArrayVec<[(u8, u8); 32]> {
        core::mem::take(&mut self.writes)
    }
}

impl RegisterSink for RecordingSink {
    fn write_register(&mut self, address: u8, value: u8) {
        self.writes.push((address, value));
    }
}
