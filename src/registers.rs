/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Register map, bit fields and chip parameter ranges.

pub const PLL_VCO_MIN: u32 = 600_000_000;
pub const PLL_VCO_MAX: u32 = 900_000_000;
pub const PLL_A_MIN: u32 = 15;
pub const PLL_A_MAX: u32 = 90;
pub const PLL_C_MAX: u32 = 1_048_575;
pub const PLL_B_MAX: u32 = PLL_C_MAX - 1;

pub const MULTISYNTH_A_MIN: u32 = 6;
pub const MULTISYNTH_A_MAX: u32 = 1800;
pub const MULTISYNTH67_A_MAX: u32 = 254;
pub const MULTISYNTH_C_MAX: u32 = 1_048_575;
pub const MULTISYNTH_B_MAX: u32 = MULTISYNTH_C_MAX - 1;
pub const MULTISYNTH_MIN_FREQ: u32 = 1_000_000;
pub const MULTISYNTH_MAX_FREQ: u32 = 160_000_000;
pub const MULTISYNTH_DIVBY4_FREQ: u32 = 150_000_000;
pub const MULTISYNTH67_MAX_FREQ: u32 = MULTISYNTH_DIVBY4_FREQ;

/// Scale of the fractional remainder handed to the rational approximator.
pub const FRACTION_DENOMINATOR: u32 = 1_000_000;

/// Largest value of the 7-bit phase offset register.
pub const PHASE_MAX: u32 = 127;

pub const DEFAULT_XTAL_FREQ: u32 = 25_000_000;

/// Length of a full PLL/multisynth parameter block.
pub const PARAMETERS_LENGTH: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Register {
    DeviceStatus = 0,
    OutputEnable = 3,
    Clk0 = 16,
    Clk6 = 22,
    Clk7 = 23,
    PllAParameters = 26,
    PllBParameters = 34,
    Clk0Parameters = 42,
    Clk6Parameters = 90,
    Clk7Parameters = 91,
    Clk0PhaseOffset = 165,
    PLLReset = 177,
    CrystalLoad = 183,
}

impl Register {
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

/// Control byte address of output `ix`.
pub fn clock_control(ix: u8) -> u8 {
    Register::Clk0.addr() + ix
}

/// Phase offset byte address of output `ix`; only outputs 0-5 have one.
pub fn phase_offset(ix: u8) -> Option<u8> {
    if ix < 6 {
        Some(Register::Clk0PhaseOffset.addr() + ix)
    } else {
        None
    }
}

/// Start of the multisynth parameter block of output `ix`.
pub fn multisynth_parameters(ix: u8) -> u8 {
    if ix > 5 {
        Register::Clk6Parameters.addr() + (ix - 6)
    } else {
        Register::Clk0Parameters.addr() + PARAMETERS_LENGTH as u8 * ix
    }
}

bitflags! {
    pub struct DeviceStatusBits: u8 {
        const SYS_INIT = 0b1000_0000;
        const LOL_B = 0b0100_0000;
        const LOL_A = 0b0010_0000;
        const LOS = 0b0001_0000;
    }
}

bitflags! {
    pub struct CrystalLoadBits: u8 {
        const RESERVED = 0b00_010010;
        const CL_MASK = 0b11_000000;
        const CL_6 = 0b01_000000;
        const CL_8 = 0b10_000000;
        const CL_10 = 0b11_000000;
    }
}

bitflags! {
    pub struct ClockControlBits: u8 {
        const CLK_PDN = 0b1000_0000;
        const MS_INT = 0b0100_0000;
        const MS_SRC = 0b0010_0000;
        const CLK_INV = 0b0001_0000;
        const CLK_SRC_MASK = 0b0000_1100;
        const CLK_SRC_XTAL = 0b0000_0000;
        const CLK_SRC_CLKIN = 0b0000_0100;
        const CLK_SRC_MS_ALT = 0b0000_1000;
        const CLK_SRC_MS = 0b0000_1100;
        const CLK_DRV_MASK = 0b0000_0011;
        const CLK_DRV_2 = 0b0000_0000;
        const CLK_DRV_4 = 0b0000_0001;
        const CLK_DRV_6 = 0b0000_0010;
        const CLK_DRV_8 = 0b0000_0011;
    }
}

bitflags! {
    /// Byte 2 of a parameter block: r-divider, divide-by-4 and the top
    /// bits of p1.
    pub struct ParameterByte2Bits: u8 {
        const R_DIV_MASK = 0b0111_0000;
        const DIVBY4 = 0b0000_1100;
        const P1_HIGH_MASK = 0b0000_0011;
    }
}

bitflags! {
    pub struct PLLResetBits: u8 {
        const PLLB_RST = 0b1000_0000;
        const PLLA_RST = 0b0010_0000;
    }
}

/// Replaces the bits selected by `mask` in `current` with those of `value`.
pub fn merge_bits(current: u8, mask: u8, value: u8) -> u8 {
    (current & !mask) | (value & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_unmasked_bits() {
        assert_eq!(merge_bits(0b1010_1010, 0b0000_1111, 0b0101_0101), 0b1010_0101);
        assert_eq!(merge_bits(0xff, ClockControlBits::MS_INT.bits(), 0), 0b1011_1111);
        assert_eq!(merge_bits(0x00, 0, 0xff), 0x00);
    }

    #[test]
    fn merge_ignores_value_bits_outside_mask() {
        assert_eq!(merge_bits(0x00, 0b0000_0011, 0xff), 0b0000_0011);
    }

    #[test]
    fn parameter_block_addresses() {
        assert_eq!(multisynth_parameters(0), 42);
        assert_eq!(multisynth_parameters(5), 82);
        assert_eq!(multisynth_parameters(6), 90);
        assert_eq!(multisynth_parameters(7), 91);
    }

    #[test]
    fn phase_offsets_exist_for_first_six_outputs() {
        assert_eq!(phase_offset(0), Some(165));
        assert_eq!(phase_offset(5), Some(170));
        assert_eq!(phase_offset(6), None);
        assert_eq!(clock_control(7), 23);
    }
}
