//! The input side of the bridge: where wire bytes come from.

/// A source of raw MIDI wire bytes which can be polled without blocking.
pub trait ByteSource {
    /// Indicates whether a byte is waiting to be read.
    fn available(&mut self) -> bool;

    /// Takes the next byte. Only meaningful after [`available`][Self::available] has returned `true`.
    fn read(&mut self) -> u8;
}

/// Replays a captured byte stream, e.g., `[0x90, 60, 127].iter()`.
impl ByteSource for core::slice::Iter<'_, u8> {
    fn available(&mut self) -> bool {
        !self.as_slice().is_empty()
    }

    fn read(&mut self) -> u8 {
        self.next().copied().unwrap_or_default()
    }
}

/// Length of a USB-MIDI Event Packet.
pub const USB_MIDI_PACKET_LEN: usize = 4;

/// Returns the MIDI bytes carried by a single USB-MIDI Event Packet.
///
/// The first byte of the packet is a header whose low nibble, the Code Index Number, tells how many of the three
/// remaining bytes are meaningful; the rest is padding. Packets of the wrong length and reserved code indexes carry
/// nothing.
pub fn usb_midi_payload(packet: &[u8]) -> &[u8] {
    if packet.len() != USB_MIDI_PACKET_LEN {
        return &[];
    }
    let len = match packet[0] & 0x0F {
        // reserved for future extension
        0x0 | 0x1 => 0,
        // single-byte system common, SysEx ending with one byte, and single bytes
        0x5 | 0xF => 1,
        // two-byte system common, SysEx ending with two bytes, program change, channel pressure
        0x2 | 0x6 | 0xC | 0xD => 2,
        _ => 3,
    };
    &packet[1..=len]
}

/// Flattens a buffer of USB-MIDI Event Packets into the MIDI byte stream they carry.
pub fn usb_midi_bytes(data: &[u8]) -> impl Iterator<Item = u8> + '_ {
    data.chunks(USB_MIDI_PACKET_LEN)
        .filter(|potential_packet| {
            let complete = potential_packet.len() == USB_MIDI_PACKET_LEN;
            if !complete {
                warn!("USB-MIDI Event Packets must always be 32 bits long");
            }
            complete
        })
        .flat_map(|packet| usb_midi_payload(packet).iter().copied())
}
