/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Output channels and their control bits.

use log::debug;

use crate::port::RegisterPort;
use crate::registers::{clock_control, ClockControlBits, Register};
use crate::Error;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClockOutput {
    Clk0 = 0,
    Clk1,
    Clk2,
    Clk3,
    Clk4,
    Clk5,
    Clk6,
    Clk7,
}

impl ClockOutput {
    pub fn from_index(ix: u8) -> Option<ClockOutput> {
        match ix {
            0 => Some(ClockOutput::Clk0),
            1 => Some(ClockOutput::Clk1),
            2 => Some(ClockOutput::Clk2),
            3 => Some(ClockOutput::Clk3),
            4 => Some(ClockOutput::Clk4),
            5 => Some(ClockOutput::Clk5),
            6 => Some(ClockOutput::Clk6),
            7 => Some(ClockOutput::Clk7),
            _ => None,
        }
    }

    pub fn ix(&self) -> u8 {
        *self as u8
    }

    /// Multisynth 6 and 7 are integer dividers without a phase register.
    pub fn is_integer_only(&self) -> bool {
        self.ix() >= 6
    }

    pub(crate) fn control(&self) -> u8 {
        clock_control(self.ix())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputSource {
    Xtal,
    ClkIn,
    /// Multisynth 0 (outputs 0-3) or 4 (outputs 4-7).
    MultisynthAlt,
    Multisynth,
}

impl InputSource {
    fn bits(&self) -> ClockControlBits {
        match *self {
            InputSource::Xtal => ClockControlBits::CLK_SRC_XTAL,
            InputSource::ClkIn => ClockControlBits::CLK_SRC_CLKIN,
            InputSource::MultisynthAlt => ClockControlBits::CLK_SRC_MS_ALT,
            InputSource::Multisynth => ClockControlBits::CLK_SRC_MS,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DriveStrength {
    _2mA,
    _4mA,
    _6mA,
    _8mA,
}

impl DriveStrength {
    fn bits(&self) -> ClockControlBits {
        match *self {
            DriveStrength::_2mA => ClockControlBits::CLK_DRV_2,
            DriveStrength::_4mA => ClockControlBits::CLK_DRV_4,
            DriveStrength::_6mA => ClockControlBits::CLK_DRV_6,
            DriveStrength::_8mA => ClockControlBits::CLK_DRV_8,
        }
    }
}

/// Control byte bits owned by `set_output`; everything else is preserved.
fn control_bits(
    enabled: bool,
    source: InputSource,
    strength: DriveStrength,
    inverted: bool,
) -> ClockControlBits {
    let mut bits = source.bits() | strength.bits();
    if inverted {
        bits |= ClockControlBits::CLK_INV;
    }
    if !enabled {
        bits |= ClockControlBits::CLK_PDN;
    }
    bits
}

/// Powers `clk` up or down and sets its source, drive and polarity.
pub fn set_output<P: RegisterPort>(
    port: &mut P,
    clk: ClockOutput,
    enabled: bool,
    source: InputSource,
    strength: DriveStrength,
    inverted: bool,
) -> Result<(), Error> {
    let mask = ClockControlBits::CLK_SRC_MASK
        | ClockControlBits::CLK_DRV_MASK
        | ClockControlBits::CLK_INV
        | ClockControlBits::CLK_PDN;
    let bits = control_bits(enabled, source, strength, inverted);
    let val = port.update_byte(clk.control(), mask.bits(), bits.bits())?;
    debug!("wrote CTRL byte {:02x}", val);

    // output enable is active low
    let bit = 1u8 << clk.ix();
    let val = port.update_byte(
        Register::OutputEnable.addr(),
        bit,
        if enabled { 0 } else { bit },
    )?;
    debug!("wrote OUTPUT ENABLE byte {:02x}", val);

    Ok(())
}
