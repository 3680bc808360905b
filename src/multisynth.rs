/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Output multisynth dividers with phase offset.
//!
//! The chip delays an output by `phase_val / (4 * fVCO)` seconds, which at an
//! output frequency `fout` is a phase of `phase_val * fout * 90 / fVCO`
//! degrees. Since `fVCO / fout = a + b / c`, the register value for a target
//! phase is `(a * c + b) * phase / (c * 90)`.

use log::{debug, warn};

use crate::codec::{write_parameters, DividerTriple};
use crate::output::ClockOutput;
use crate::pll::{reset_pll, PLL};
use crate::port::RegisterPort;
use crate::rational::best_approximation;
use crate::registers::*;
use crate::Error;

/// A derived output divider together with what it will produce.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MultisynthSettings {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub divby4: bool,
    pub integer_mode: bool,
    pub phase_val: u8,
    /// Achieved output frequency in Hz.
    pub freq: u32,
    /// Achieved phase in whole degrees, from the quantised `phase_val`.
    pub phase: u32,
}

/// Clamps a requested output frequency to what `clk` can produce.
fn clamp_frequency(clk: ClockOutput, freq: u32) -> u32 {
    let mut freq = freq;
    if clk.is_integer_only() {
        freq = freq.min(MULTISYNTH67_MAX_FREQ);
    }
    freq.min(MULTISYNTH_MAX_FREQ).max(MULTISYNTH_MIN_FREQ)
}

/// `vco * c / (a * c + b)`, truncated.
pub fn output_frequency(vco_freq: u32, a: u32, b: u32, c: u32) -> u32 {
    let divider = a as u64 * c as u64 + b as u64;
    (vco_freq as u64 * c as u64 / divider) as u32
}

/// Phase offset register value for `phase` degrees, saturating at 127.
/// The flag reports whether saturation happened.
pub fn phase_register(a: u32, b: u32, c: u32, phase: u32) -> (u8, bool) {
    let val = (a as u64 * c as u64 + b as u64) * phase as u64 / (c as u64 * 90);
    if val > PHASE_MAX as u64 {
        (PHASE_MAX as u8, true)
    } else {
        (val as u8, false)
    }
}

/// Phase in degrees produced by `phase_val` at `freq`, rounded to nearest.
pub fn phase_degrees(freq: u32, phase_val: u8, vco_freq: u32) -> u32 {
    let vco = vco_freq as u64;
    (freq as u64 * phase_val as u64 * 90 + vco / 2)
        .checked_div(vco)
        .unwrap_or(0) as u32
}

impl MultisynthSettings {
    /// Derives the divider of `clk` for `freq` Hz at `phase` degrees from a
    /// `vco_freq` VCO. `phase` is expected in `[0, 180)`.
    pub fn derive(clk: ClockOutput, freq: u32, vco_freq: u32, phase: u32) -> Self {
        let mut freq = clamp_frequency(clk, freq);
        let mut divby4 = false;

        let (a, b, c) = if clk.is_integer_only() {
            // nearest integer divider
            let a = (vco_freq as u64 + freq as u64 / 2) / freq as u64;
            let a = a.max(MULTISYNTH_A_MIN as u64).min(MULTISYNTH67_A_MAX as u64);
            (a as u32, 0, 1)
        } else {
            if freq > MULTISYNTH_DIVBY4_FREQ {
                if vco_freq / 4 <= MULTISYNTH_MAX_FREQ {
                    divby4 = true;
                } else {
                    freq = MULTISYNTH_DIVBY4_FREQ;
                }
            }

            if divby4 {
                (4, 0, 1)
            } else {
                let a = vco_freq / freq;
                if a < MULTISYNTH_A_MIN {
                    (MULTISYNTH_A_MIN, 0, 1)
                } else if a > MULTISYNTH_A_MAX {
                    (MULTISYNTH_A_MAX, 0, 1)
                } else {
                    let rfrac =
                        (vco_freq % freq) as u64 * FRACTION_DENOMINATOR as u64 / freq as u64;
                    let (b, c) = best_approximation(
                        rfrac,
                        FRACTION_DENOMINATOR as u64,
                        MULTISYNTH_B_MAX as u64,
                        MULTISYNTH_C_MAX as u64,
                    );
                    (a, b as u32, c as u32)
                }
            }
        };

        // a phase offset only takes effect in fractional mode
        let integer_mode = b == 0 && phase == 0;

        let freq = output_frequency(vco_freq, a, b, c);
        let (phase_val, clamped) = phase_register(a, b, c, phase);
        if clamped {
            warn!("limiting phase_val for {} degrees to {}", phase, PHASE_MAX);
        }

        MultisynthSettings {
            a,
            b,
            c,
            divby4,
            integer_mode,
            phase_val,
            freq,
            phase: phase_degrees(freq, phase_val, vco_freq),
        }
    }

    pub fn triple(&self, clk: ClockOutput) -> DividerTriple {
        if self.divby4 {
            DividerTriple::divide_by_4()
        } else if clk.is_integer_only() {
            DividerTriple::integer_only(self.a)
        } else {
            DividerTriple::from_ratio(self.a, self.b, self.c)
        }
    }
}

/// Points the multisynth of `clk` at `pll`.
pub(crate) fn select_pll<P: RegisterPort>(
    port: &mut P,
    clk: ClockOutput,
    pll: PLL,
) -> Result<(), Error> {
    let src = match pll {
        PLL::A => ClockControlBits::empty(),
        PLL::B => ClockControlBits::MS_SRC,
    };
    let val = port.update_byte(clk.control(), ClockControlBits::MS_SRC.bits(), src.bits())?;
    debug!("wrote CTRL byte {:02x}", val);
    Ok(())
}

/// Writes the divide-by-4, integer mode and phase offset of outputs 0-5.
pub(crate) fn write_fractional_controls<P: RegisterPort>(
    port: &mut P,
    clk: ClockOutput,
    divby4: bool,
    integer_mode: bool,
    phase_val: u8,
) -> Result<(), Error> {
    let start_reg = multisynth_parameters(clk.ix());
    let divby4 = if divby4 {
        ParameterByte2Bits::DIVBY4
    } else {
        ParameterByte2Bits::empty()
    };
    port.update_byte(start_reg + 2, ParameterByte2Bits::DIVBY4.bits(), divby4.bits())?;

    let int_mode = if integer_mode {
        ClockControlBits::MS_INT
    } else {
        ClockControlBits::empty()
    };
    port.update_byte(clk.control(), ClockControlBits::MS_INT.bits(), int_mode.bits())?;

    if let Some(reg) = phase_offset(clk.ix()) {
        // upper bit is reserved
        port.write_byte(reg, phase_val & 0b0111_1111)?;
    }
    Ok(())
}

/// Tunes output `clk`, fed by `pll` running at `vco_freq`, to `freq` Hz
/// delayed by `phase` degrees. Returns the achieved frequency and phase.
///
/// Outputs 6 and 7 have no phase register and reject a non-zero `phase`.
pub fn configure<P: RegisterPort>(
    port: &mut P,
    clk: ClockOutput,
    pll: PLL,
    freq: u32,
    vco_freq: u32,
    phase: u32,
) -> Result<(u32, u32), Error> {
    if clk.is_integer_only() && phase != 0 {
        return Err(Error::UnsupportedRequest);
    }

    let settings = MultisynthSettings::derive(clk, freq, vco_freq, phase);
    let params = settings.triple(clk);

    debug!("target freq={}, phase={}", freq, phase);
    debug!("using fVCO={}", vco_freq);
    debug!("found a={}, b={}, c={}", settings.a, settings.b, settings.c);
    debug!(
        "found p1={}, p2={}, p3={}, divby4={}",
        params.p1, params.p2, params.p3, settings.divby4
    );
    debug!(
        "fout_real={}, phase_val={}, phase_real={}",
        settings.freq, settings.phase_val, settings.phase
    );

    write_parameters(port, multisynth_parameters(clk.ix()), &params)?;
    if !clk.is_integer_only() {
        write_fractional_controls(
            port,
            clk,
            settings.divby4,
            settings.integer_mode,
            settings.phase_val,
        )?;
    }
    reset_pll(port, pll)?;
    select_pll(port, clk, pll)?;

    Ok((settings.freq, settings.phase))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VCO: u32 = 800_000_000;

    #[test]
    fn integer_divider_without_phase() {
        let settings = MultisynthSettings::derive(ClockOutput::Clk0, 10_000_000, VCO, 0);
        assert_eq!((settings.a, settings.b, settings.c), (80, 0, 1));
        assert_eq!(settings.freq, 10_000_000);
        assert!(settings.integer_mode);
        assert!(!settings.divby4);
        assert_eq!(settings.phase_val, 0);
        assert_eq!(settings.phase, 0);
    }

    #[test]
    fn phase_forces_fractional_mode() {
        let settings = MultisynthSettings::derive(ClockOutput::Clk2, 10_000_000, VCO, 45);
        assert_eq!(settings.b, 0);
        assert!(!settings.integer_mode);
        // 80 * 45 / 90
        assert_eq!(settings.phase_val, 40);
        assert_eq!(settings.phase, 45);
    }

    #[test]
    fn fractional_divider() {
        // 800 / 7 = 114 + 2/7
        let settings = MultisynthSettings::derive(ClockOutput::Clk1, 7_000_000, VCO, 0);
        assert_eq!(settings.a, 114);
        assert!(!settings.integer_mode);
        assert!(settings.c > 1);
        assert!((settings.freq as i64 - 7_000_000).abs() <= 1);
    }

    #[test]
    fn phase_register_saturates() {
        // 80 * 179 / 90 = 159
        let settings = MultisynthSettings::derive(ClockOutput::Clk0, 10_000_000, VCO, 179);
        assert_eq!(settings.phase_val, 127);
        assert_eq!(settings.phase, phase_degrees(10_000_000, 127, VCO));
        assert!(settings.phase < 179);
    }

    #[test]
    fn phase_register_never_exceeds_limit() {
        for &(a, b, c) in [(6, 0, 1), (80, 3, 7), (1800, 1_048_574, 1_048_575)].iter() {
            for phase in 0..360 {
                let (val, _) = phase_register(a, b, c, phase);
                assert!((val as u32) <= PHASE_MAX);
            }
        }
    }

    #[test]
    fn unit_divider_passes_vco_through() {
        assert_eq!(output_frequency(VCO, 1, 0, 1), VCO);
    }

    #[test]
    fn frequency_is_clamped() {
        let low = MultisynthSettings::derive(ClockOutput::Clk0, 10, VCO, 0);
        assert_eq!(low.freq, 1_000_000);

        let high = MultisynthSettings::derive(ClockOutput::Clk0, 500_000_000, VCO, 0);
        assert!(!high.divby4);
        assert!(high.a >= MULTISYNTH_A_MIN);
        assert!(high.freq <= MULTISYNTH_DIVBY4_FREQ);
    }

    #[test]
    fn achieved_frequency_stays_in_range() {
        for &vco in [600_000_000u32, 712_345_678, 800_000_000, 900_000_000].iter() {
            for &freq in [0u32, 999_999, 1_000_000, 3_333_333, 48_000_000, 150_000_001, 200_000_000].iter() {
                for ix in 0..8 {
                    let clk = ClockOutput::from_index(ix).unwrap();
                    let settings = MultisynthSettings::derive(clk, freq, vco, 0);
                    assert!(settings.freq >= MULTISYNTH_MIN_FREQ, "{} {} {}", vco, freq, ix);
                    assert!(settings.freq <= MULTISYNTH_MAX_FREQ, "{} {} {}", vco, freq, ix);
                }
            }
        }
    }

    #[test]
    fn divide_by_4_on_low_vco() {
        let settings = MultisynthSettings::derive(ClockOutput::Clk3, 155_000_000, 620_000_000, 0);
        assert!(settings.divby4);
        assert_eq!(settings.freq, 155_000_000);
        assert_eq!(settings.triple(ClockOutput::Clk3), DividerTriple::divide_by_4());
    }

    #[test]
    fn integer_only_outputs_round_to_nearest() {
        // 800 / 3.3 = 242.4
        let settings = MultisynthSettings::derive(ClockOutput::Clk6, 3_300_000, VCO, 0);
        assert_eq!((settings.a, settings.b, settings.c), (242, 0, 1));
        assert_eq!(settings.triple(ClockOutput::Clk6), DividerTriple::integer_only(242));

        // 800 / 1 = 800, beyond what the 8-bit divider holds
        let settings = MultisynthSettings::derive(ClockOutput::Clk7, 1_000_000, VCO, 0);
        assert_eq!(settings.a, MULTISYNTH67_A_MAX);

        let settings = MultisynthSettings::derive(ClockOutput::Clk7, 160_000_000, VCO, 0);
        assert!(!settings.divby4);
        assert_eq!(settings.a, MULTISYNTH_A_MIN);
    }
}
