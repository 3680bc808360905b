/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Quadrature outputs.
//!
//! Outputs 0 and 1 share one integer multisynth divider `d` and the
//! PLL does the fine tuning with a fractional feedback divider. Output 1 is
//! delayed by `d` quarter VCO periods, which is exactly a quarter of its own
//! period. This only fits the 7-bit phase register while `d <= 127`; for
//! lower frequencies the offset saturates.

use log::{debug, error, warn};

use crate::codec::{write_parameters, DividerTriple};
use crate::multisynth::{phase_degrees, select_pll, write_fractional_controls};
use crate::output::ClockOutput;
use crate::pll::{reset_pll, write_settings, PllSettings, PLL};
use crate::port::RegisterPort;
use crate::rational::best_approximation;
use crate::registers::*;
use crate::Error;

/// Frequency granularity of the divider search.
pub const TUNE_STEP: u32 = 1_000;

/// Fixed integer part of the PLL feedback divider.
pub const PLL_A: u32 = 32;

pub const OUTPUTS: (ClockOutput, ClockOutput) = (ClockOutput::Clk0, ClockOutput::Clk1);

/// Joint PLL and output divider for one quadrature frequency.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadratureSettings {
    pub pll: PllSettings,
    /// Integer divider shared by both outputs.
    pub d: u32,
    pub phase_val: u8,
    pub freq: u32,
    /// Achieved offset of output 1, in degrees.
    pub phase: u32,
}

fn div_ceil(n: u64, d: u64) -> u64 {
    (n + d - 1) / d
}

impl QuadratureSettings {
    /// Finds the smallest divider `d` for which `freq * d` lands in the VCO
    /// band reachable with `a = 32`, counting in `TUNE_STEP` units.
    pub fn derive(xtal_freq: u32, freq: u32) -> Result<Self, Error> {
        let step = TUNE_STEP as u64;
        if freq < TUNE_STEP || xtal_freq < TUNE_STEP {
            return Err(Error::OutOfRange);
        }

        let fout_steps = freq as u64 / step;
        let c_start = xtal_freq as u64 / step;
        let a = PLL_A as u64;

        let d_min = div_ceil(PLL_VCO_MIN as u64, freq as u64).max(MULTISYNTH_A_MIN as u64);
        let d_max = (PLL_VCO_MAX as u64 / freq as u64).min(MULTISYNTH_A_MAX as u64);

        let found = (d_min..=d_max).find_map(|d| {
            let b_start = fout_steps as i64 * d as i64 - (a * c_start) as i64;
            if b_start >= 0 && b_start <= c_start as i64 - 1 {
                Some((d, b_start as u64))
            } else {
                None
            }
        });
        let (d, b_start) = match found {
            Some(found) => found,
            None => {
                error!("can't tune to {} Hz", freq);
                return Err(Error::OutOfRange);
            }
        };

        let (b, c) = best_approximation(b_start, c_start, PLL_B_MAX as u64, PLL_C_MAX as u64);
        let pll = PllSettings::from_ratio(PLL_A, b as u32, c as u32, xtal_freq);

        let freq = (pll.vco_freq as u64 / d) as u32;
        let mut phase_val = (pll.vco_freq as u64 + freq as u64 / 2) / freq as u64;
        if phase_val > PHASE_MAX as u64 {
            warn!("limiting phase_val from {} to {}", phase_val, PHASE_MAX);
            phase_val = PHASE_MAX as u64;
        }
        let phase_val = phase_val as u8;

        Ok(QuadratureSettings {
            pll,
            d: d as u32,
            phase_val,
            freq,
            phase: phase_degrees(freq, phase_val, pll.vco_freq),
        })
    }

    pub fn output_triple(&self) -> DividerTriple {
        DividerTriple::from_ratio(self.d, 0, 1)
    }
}

/// Retunes `pll` and outputs 0 and 1 to `freq` Hz, 90 degrees apart.
/// Returns the settings written, including the achieved VCO frequency.
pub fn retune<P: RegisterPort>(
    port: &mut P,
    pll: PLL,
    xtal_freq: u32,
    freq: u32,
) -> Result<QuadratureSettings, Error> {
    let settings = QuadratureSettings::derive(xtal_freq, freq)?;

    write_settings(port, pll, &settings.pll)?;
    reset_pll(port, pll)?;

    let params = settings.output_triple();
    debug!("using fVCO={}", settings.pll.vco_freq);
    debug!("found d={}", settings.d);
    debug!("found p1={}, p2={}, p3={}", params.p1, params.p2, params.p3);
    debug!("fout_real={}, phase_val={}", settings.freq, settings.phase_val);

    let (i, q) = OUTPUTS;
    for &(clk, phase_val) in [(i, 0), (q, settings.phase_val)].iter() {
        write_parameters(port, multisynth_parameters(clk.ix()), &params)?;
        // integer mode would disable the phase offset
        write_fractional_controls(port, clk, false, false, phase_val)?;
    }

    // latches the output dividers and their phase relation
    reset_pll(port, pll)?;

    select_pll(port, i, pll)?;
    select_pll(port, q, pll)?;

    Ok(settings)
}
