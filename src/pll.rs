/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! PLL feedback divider.

use log::debug;

use crate::codec::{write_parameters, DividerTriple};
use crate::port::RegisterPort;
use crate::rational::best_approximation;
use crate::registers::*;
use crate::Error;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PLL {
    A,
    B,
}

impl PLL {
    pub fn parameters(&self) -> u8 {
        match *self {
            PLL::A => Register::PllAParameters.addr(),
            PLL::B => Register::PllBParameters.addr(),
        }
    }

    /// The feedback integer-mode bit lives in the CLK6/CLK7 control byte.
    fn control(&self) -> u8 {
        match *self {
            PLL::A => Register::Clk6.addr(),
            PLL::B => Register::Clk7.addr(),
        }
    }

    fn reset_bits(&self) -> PLLResetBits {
        match *self {
            PLL::A => PLLResetBits::PLLA_RST,
            PLL::B => PLLResetBits::PLLB_RST,
        }
    }
}

/// A derived feedback divider `a + b / c` and the VCO frequency it yields.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PllSettings {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub vco_freq: u32,
}

impl PllSettings {
    /// Derives the divider for `vco_freq` from an `xtal_freq` crystal.
    /// Out of range requests are clamped, never rejected.
    pub fn for_vco(vco_freq: u32, xtal_freq: u32) -> Self {
        let xtal = xtal_freq as u64;
        let mut vco = vco_freq.max(PLL_VCO_MIN).min(PLL_VCO_MAX) as u64;

        let mut a = vco / xtal;
        if a < PLL_A_MIN as u64 {
            a = PLL_A_MIN as u64;
            vco = xtal * a;
        }
        if a > PLL_A_MAX as u64 {
            a = PLL_A_MAX as u64;
            vco = xtal * a;
        }

        let rfrac = (vco % xtal) * FRACTION_DENOMINATOR as u64 / xtal;
        let (b, c) = best_approximation(
            rfrac,
            FRACTION_DENOMINATOR as u64,
            PLL_B_MAX as u64,
            PLL_C_MAX as u64,
        );

        Self::from_ratio(a as u32, b as u32, c as u32, xtal_freq)
    }

    pub(crate) fn from_ratio(a: u32, b: u32, c: u32, xtal_freq: u32) -> Self {
        let xtal = xtal_freq as u64;
        // fractional part first, so truncation stays below one hertz
        let vco_freq = xtal * b as u64 / c as u64 + xtal * a as u64;
        PllSettings {
            a,
            b,
            c,
            vco_freq: vco_freq as u32,
        }
    }

    pub fn triple(&self) -> DividerTriple {
        DividerTriple::from_ratio(self.a, self.b, self.c)
    }

    pub fn integer_mode(&self) -> bool {
        self.b == 0
    }
}

/// Writes the feedback divider and integer-mode bit of `pll`, without a reset.
pub(crate) fn write_settings<P: RegisterPort>(
    port: &mut P,
    pll: PLL,
    settings: &PllSettings,
) -> Result<(), Error> {
    let params = settings.triple();
    debug!("found a={}, b={}, c={}", settings.a, settings.b, settings.c);
    debug!("found p1={}, p2={}, p3={}", params.p1, params.p2, params.p3);

    write_parameters(port, pll.parameters(), &params)?;
    let int_mode = if settings.integer_mode() {
        ClockControlBits::MS_INT
    } else {
        ClockControlBits::empty()
    };
    port.update_byte(pll.control(), ClockControlBits::MS_INT.bits(), int_mode.bits())?;
    Ok(())
}

/// Soft reset of `pll`; latches freshly written dividers.
pub fn reset_pll<P: RegisterPort>(port: &mut P, pll: PLL) -> Result<(), Error> {
    port.write_byte(Register::PLLReset.addr(), pll.reset_bits().bits())
}

/// Tunes `pll` as close to `vco_freq` as the chip allows and resets it.
/// Returns the VCO frequency actually achieved.
pub fn configure<P: RegisterPort>(
    port: &mut P,
    pll: PLL,
    vco_freq: u32,
    xtal_freq: u32,
) -> Result<u32, Error> {
    if xtal_freq == 0 {
        return Err(Error::UnsupportedRequest);
    }

    let settings = PllSettings::for_vco(vco_freq, xtal_freq);
    write_settings(port, pll, &settings)?;
    reset_pll(port, pll)?;

    Ok(settings.vco_freq)
}
