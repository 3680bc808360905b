/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Divider triples and their parameter block encoding.

use log::debug;

use crate::port::RegisterPort;
use crate::registers::{ParameterByte2Bits, Register, PARAMETERS_LENGTH};
use crate::Error;

/// The chip's `(p1, p2, p3)` encoding of a divider `a + b / c`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DividerTriple {
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
}

impl DividerTriple {
    /// Encodes `a + b / c`. `a` must be at least 4 and `c` non-zero.
    pub fn from_ratio(a: u32, b: u32, c: u32) -> Self {
        let b = b as u64;
        let c = c as u64;
        let p1 = 128 * a as u64 + 128 * b / c - 512;
        DividerTriple {
            p1: p1 as u32,
            p2: ((128 * b) % c) as u32,
            p3: c as u32,
        }
    }

    /// Multisynth divide-by-4 mode.
    pub fn divide_by_4() -> Self {
        DividerTriple {
            p1: 0,
            p2: 0,
            p3: 1,
        }
    }

    /// Integer-only divider of multisynth 6 and 7.
    pub fn integer_only(a: u32) -> Self {
        DividerTriple {
            p1: a,
            p2: 0,
            p3: 0,
        }
    }

    /// Full 8-byte layout. `reserved` supplies the upper six bits of byte 2.
    pub fn to_bytes(&self, reserved: u8) -> [u8; PARAMETERS_LENGTH] {
        let (p1, p2, p3) = (self.p1, self.p2, self.p3);
        [
            ((p3 & 0x0000_FF00) >> 8) as u8,
            p3 as u8,
            (reserved & !ParameterByte2Bits::P1_HIGH_MASK.bits())
                | ((p1 & 0x0003_0000) >> 16) as u8,
            ((p1 & 0x0000_FF00) >> 8) as u8,
            p1 as u8,
            (((p3 & 0x000F_0000) >> 12) | ((p2 & 0x000F_0000) >> 16)) as u8,
            ((p2 & 0x0000_FF00) >> 8) as u8,
            p2 as u8,
        ]
    }

    /// Inverse of `to_bytes`, ignoring the reserved bits.
    pub fn from_bytes(bytes: &[u8; PARAMETERS_LENGTH]) -> Self {
        let p1 = ((bytes[2] & ParameterByte2Bits::P1_HIGH_MASK.bits()) as u32) << 16
            | (bytes[3] as u32) << 8
            | bytes[4] as u32;
        let p2 = ((bytes[5] & 0x0F) as u32) << 16 | (bytes[6] as u32) << 8 | bytes[7] as u32;
        let p3 = ((bytes[5] & 0xF0) as u32) << 12 | (bytes[0] as u32) << 8 | bytes[1] as u32;
        DividerTriple { p1, p2, p3 }
    }
}

fn is_short_block(start_reg: u8) -> bool {
    start_reg == Register::Clk6Parameters.addr() || start_reg == Register::Clk7Parameters.addr()
}

/// Writes `params` to the parameter block at `start_reg`.
///
/// Multisynth 6 and 7 take a single byte. Every other block is written in
/// full, after reading back byte 2 so the r-divider and divide-by-4 bits
/// stored there survive.
pub fn write_parameters<P: RegisterPort>(
    port: &mut P,
    start_reg: u8,
    params: &DividerTriple,
) -> Result<(), Error> {
    if is_short_block(start_reg) {
        return port.write_byte(start_reg, params.p1 as u8);
    }

    let reserved = port.read_byte(start_reg + 2)?;
    let buf = params.to_bytes(reserved);
    debug!(
        "writing {:02x} {:02x} {:02x} {:02x} {:02x} {:02x} {:02x} {:02x} at reg {}",
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7], start_reg
    );
    port.write_block(start_reg, &buf)
}
