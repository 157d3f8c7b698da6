//! The four-register video RAM access port
//!
//! The CPU never addresses video RAM directly. It writes an address to the offset register, then
//! streams words through the data register; each data write advances the address by the signed
//! modulo register. Reads go through a one-word buffer that is refilled whenever the address
//! changes, so a data read always returns the word at the address as it was after the last access.

use crate::bus::ByteLanes;
use crate::video::timing::DisplayTiming;
use crate::video::{VideoCore, Vram};
use bincode::{Decode, Encode};

/// Auto-increment only affects address bits 0-14; bit 15 selects the upper 32K words
const ADDRESS_STEP_MASK: u16 = 0x7FFF;

#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct VramPort {
    address: u16,
    modulo: i16,
    read_buffer: u16,
}

impl VramPort {
    pub fn set_address(&mut self, vram: &Vram, address: u16) {
        self.address = address;
        self.read_buffer = vram[usize::from(address)];

        log::trace!("VRAM address set to {address:04X}");
    }

    pub fn read_data(&self) -> u16 {
        self.read_buffer
    }

    pub fn write_data(&mut self, vram: &mut Vram, value: u16) {
        vram[usize::from(self.address)] = value;

        log::trace!("VRAM[{:04X}] = {value:04X}", self.address);

        let stepped = self.address.wrapping_add_signed(self.modulo);
        self.address = (self.address & !ADDRESS_STEP_MASK) | (stepped & ADDRESS_STEP_MASK);
        self.read_buffer = vram[usize::from(self.address)];
    }

    pub fn modulo(&self) -> u16 {
        self.modulo as u16
    }

    pub fn set_modulo(&mut self, modulo: u16) {
        self.modulo = modulo as i16;
    }

    pub fn address(&self) -> u16 {
        self.address
    }
}

impl VideoCore {
    /// Read one of the port registers. `register` is the word offset within the port.
    ///
    /// Returns `None` for lower-byte-only accesses, which the chip does not respond to; the caller
    /// should supply its open bus value.
    #[must_use]
    pub fn read_register(&self, register: u32, lanes: ByteLanes) -> Option<u16> {
        if lanes == ByteLanes::Lower {
            return None;
        }

        let value = match register & 3 {
            0 | 1 => self.port.read_data(),
            2 => self.port.modulo(),
            3 => self.read_control(),
            _ => unreachable!("value & 3 is always <= 3"),
        };

        Some(value)
    }

    /// Write one of the port registers. Lower-byte-only writes are ignored and upper-byte-only
    /// writes are mirrored into both bytes.
    pub fn write_register(
        &mut self,
        register: u32,
        value: u16,
        lanes: ByteLanes,
        timing: &mut impl DisplayTiming,
    ) {
        let value = match lanes {
            ByteLanes::Lower => return,
            ByteLanes::Upper => ByteLanes::mirror_upper(value),
            ByteLanes::Word => value,
        };

        match register & 7 {
            0 => self.port.set_address(&self.vram, value),
            1 => self.port.write_data(&mut self.vram, value),
            2 => self.port.set_modulo(value),
            3 => {
                self.auto_animation.write_control(value);
                timing.set_display_position_interrupt_control(value & 0x00F0);
            }
            4 => timing.set_display_counter_msb(value),
            5 => timing.set_display_counter_lsb(value),
            6 => timing.acknowledge_interrupt(value),
            7 => {}
            _ => unreachable!("value & 7 is always <= 7"),
        }
    }

    // Bits 7-15: vertical counter, bits 0-2: auto-animation counter
    fn read_control(&self) -> u16 {
        (self.raster.v_counter() << 7) | u16::from(self.auto_animation.counter() & 0x07)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn address_bit_15_survives_increment() {
        let mut vram = Vram::new();
        let mut port = VramPort::default();

        let cases = [(0x7FFF, 1_i16), (0xFFFF, 1), (0x8000, -1), (0x0000, -1), (0x8123, 0x7FFF)];
        for (start, modulo) in cases {
            port.set_address(&vram, start);
            port.set_modulo(modulo as u16);
            port.write_data(&mut vram, 0x1234);

            let expected = start.wrapping_add_signed(modulo) & ADDRESS_STEP_MASK;
            assert_eq!(port.address() & ADDRESS_STEP_MASK, expected, "{start:04X} {modulo}");
            assert_eq!(port.address() & 0x8000, start & 0x8000, "{start:04X} {modulo}");
        }
    }

    #[test]
    fn read_buffer_tracks_address() {
        let mut vram = Vram::new();
        vram[0x0010] = 0xAAAA;
        vram[0x0011] = 0xBBBB;

        let mut port = VramPort::default();
        port.set_address(&vram, 0x0010);
        assert_eq!(port.read_data(), 0xAAAA);

        // Reads do not advance the address
        assert_eq!(port.read_data(), 0xAAAA);

        port.set_modulo(1);
        port.write_data(&mut vram, 0xCCCC);
        assert_eq!(vram[0x0010], 0xCCCC);
        assert_eq!(port.read_data(), 0xBBBB);
    }
}
