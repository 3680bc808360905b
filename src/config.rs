/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Device level settings, fixed at attach time.

use core::str::FromStr;

use crate::registers::{CrystalLoadBits, DEFAULT_XTAL_FREQ};
use crate::Error;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ChipVariant {
    /// 3 outputs
    Si5351A,
    /// 8 outputs
    Si5351C,
}

impl ChipVariant {
    pub fn channels(&self) -> u8 {
        match *self {
            ChipVariant::Si5351A => 3,
            ChipVariant::Si5351C => 8,
        }
    }
}

impl FromStr for ChipVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "si5351a" => Ok(ChipVariant::Si5351A),
            "si5351c" => Ok(ChipVariant::Si5351C),
            _ => Err(Error::UnsupportedRequest),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CrystalLoad {
    _6,
    _8,
    _10,
}

impl CrystalLoad {
    pub(crate) fn bits(&self) -> u8 {
        (CrystalLoadBits::RESERVED
            | match *self {
                CrystalLoad::_6 => CrystalLoadBits::CL_6,
                CrystalLoad::_8 => CrystalLoadBits::CL_8,
                CrystalLoad::_10 => CrystalLoadBits::CL_10,
            })
        .bits()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DeviceConfig {
    /// Crystal frequency in Hz.
    pub xtal_freq: u32,
    pub crystal_load: CrystalLoad,
    /// Drive outputs 0 and 1 as a 90 degree pair.
    pub quadrature: bool,
    pub variant: ChipVariant,
    pub name: &'static str,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            xtal_freq: DEFAULT_XTAL_FREQ,
            crystal_load: CrystalLoad::_10,
            quadrature: false,
            variant: ChipVariant::Si5351C,
            name: "si5351",
        }
    }
}

impl DeviceConfig {
    pub fn with_xtal_freq(mut self, xtal_freq: u32) -> Self {
        self.xtal_freq = xtal_freq;
        self
    }

    pub fn with_crystal_load(mut self, crystal_load: CrystalLoad) -> Self {
        self.crystal_load = crystal_load;
        self
    }

    pub fn with_quadrature(mut self, quadrature: bool) -> Self {
        self.quadrature = quadrature;
        self
    }

    pub fn with_variant(mut self, variant: ChipVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}
