/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Per-channel frequency and phase control.

use core::str::FromStr;

use log::info;

use crate::config::DeviceConfig;
use crate::output::{set_output, ClockOutput, DriveStrength, InputSource};
use crate::pll::PLL;
use crate::port::RegisterPort;
use crate::quadrature::{self, OUTPUTS};
use crate::registers::{clock_control, ClockControlBits, DeviceStatusBits, Register};
use crate::{multisynth, pll, Error};

const MAX_CHANNELS: usize = 8;

/// Every output is driven from this PLL.
const PLL_SOURCE: PLL = PLL::A;

/// Named per-channel attribute.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Attribute {
    Frequency,
    Phase,
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frequency" => Ok(Attribute::Frequency),
            "phase" => Ok(Attribute::Phase),
            _ => Err(Error::UnsupportedRequest),
        }
    }
}

/// Phases of 180 degrees and more are produced by inverting the output.
fn split_phase(phase: u32) -> (u32, bool) {
    if phase < 180 {
        (phase, false)
    } else {
        (phase - 180, true)
    }
}

/// An attached Si5351 with its last commanded frequency and phase per output.
///
/// Every operation holds `&mut self` across its complete register sequence,
/// so configuration calls on one device never interleave.
pub struct Si5351Synth<P> {
    port: P,
    config: DeviceConfig,
    vco_freq: u32,
    freq_cache: [u32; MAX_CHANNELS],
    phase_cache: [u32; MAX_CHANNELS],
}

impl<P> Si5351Synth<P>
where
    P: RegisterPort,
{
    /// Identifies the chip, puts it into a safe state with all outputs off
    /// and starts PLL A at 32 times the crystal frequency.
    pub fn attach(port: P, config: DeviceConfig) -> Result<Self, Error> {
        if config.xtal_freq == 0 {
            return Err(Error::UnsupportedRequest);
        }

        let mut synth = Si5351Synth {
            port,
            config,
            vco_freq: 0,
            freq_cache: [0; MAX_CHANNELS],
            phase_cache: [0; MAX_CHANNELS],
        };

        synth.read_device_status()?;
        synth.safe_defaults()?;

        let xtal_freq = synth.config.xtal_freq;
        synth.vco_freq = pll::configure(
            &mut synth.port,
            PLL_SOURCE,
            xtal_freq.saturating_mul(32),
            xtal_freq,
        )?;

        if synth.config.quadrature {
            info!("{}: quadrature mode", synth.config.name);
        }
        info!(
            "{}: Si5351 detected, xtal freq = {} MHz, using PLL_A VCO freq = {} MHz",
            synth.config.name,
            xtal_freq / 1_000_000,
            synth.vco_freq / 1_000_000
        );

        Ok(synth)
    }

    /// Gives the register port back.
    pub fn detach(self) -> P {
        self.port
    }

    fn safe_defaults(&mut self) -> Result<(), Error> {
        self.port.write_byte(Register::OutputEnable.addr(), 0xFF)?;
        for ix in 0..MAX_CHANNELS as u8 {
            self.port
                .write_byte(clock_control(ix), ClockControlBits::CLK_PDN.bits())?;
        }
        self.port
            .write_byte(Register::CrystalLoad.addr(), self.config.crystal_load.bits())
    }

    pub fn read_device_status(&mut self) -> Result<DeviceStatusBits, Error> {
        Ok(DeviceStatusBits::from_bits_truncate(
            self.port.read_byte(Register::DeviceStatus.addr())?,
        ))
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Current achieved VCO frequency of the PLL feeding the outputs.
    pub fn vco_freq(&self) -> u32 {
        self.vco_freq
    }

    fn check_channel(&self, clk: ClockOutput) -> Result<(), Error> {
        if clk.ix() < self.config.variant.channels() {
            Ok(())
        } else {
            Err(Error::UnsupportedRequest)
        }
    }

    fn is_quadrature_output(&self, clk: ClockOutput) -> bool {
        self.config.quadrature && (clk == OUTPUTS.0 || clk == OUTPUTS.1)
    }

    /// Tunes `clk` to `freq` Hz, keeping its cached phase, and enables it.
    /// Returns the achieved frequency and phase.
    ///
    /// In quadrature mode outputs 0 and 1 are retuned together.
    pub fn set_frequency(&mut self, clk: ClockOutput, freq: u32) -> Result<(u32, u32), Error> {
        self.check_channel(clk)?;

        if self.is_quadrature_output(clk) {
            return self.set_quadrature_frequency(clk, freq);
        }

        let ix = clk.ix() as usize;
        let (phase, inverted) = split_phase(self.phase_cache[ix]);
        self.tune(clk, freq, phase, inverted)
    }

    fn set_quadrature_frequency(
        &mut self,
        clk: ClockOutput,
        freq: u32,
    ) -> Result<(u32, u32), Error> {
        let settings = quadrature::retune(
            &mut self.port,
            PLL_SOURCE,
            self.config.xtal_freq,
            freq,
        )?;
        self.vco_freq = settings.pll.vco_freq;

        let (i, q) = OUTPUTS;
        for &out in [i, q].iter() {
            set_output(
                &mut self.port,
                out,
                true,
                InputSource::Multisynth,
                DriveStrength::_8mA,
                false,
            )?;
        }

        let (i, q) = (i.ix() as usize, q.ix() as usize);
        self.freq_cache[i] = settings.freq;
        self.freq_cache[q] = settings.freq;
        self.phase_cache[i] = 0;
        self.phase_cache[q] = settings.phase;

        Ok((settings.freq, self.phase_cache[clk.ix() as usize]))
    }

    /// Shifts `clk` by `phase` degrees at its cached frequency.
    /// Returns the achieved frequency and phase.
    pub fn set_phase(&mut self, clk: ClockOutput, phase: u32) -> Result<(u32, u32), Error> {
        self.check_channel(clk)?;
        if self.config.quadrature || clk.is_integer_only() || phase >= 360 {
            return Err(Error::UnsupportedRequest);
        }

        let (phase, inverted) = split_phase(phase);
        let freq = self.freq_cache[clk.ix() as usize];
        self.tune(clk, freq, phase, inverted)
    }

    fn tune(
        &mut self,
        clk: ClockOutput,
        freq: u32,
        phase: u32,
        inverted: bool,
    ) -> Result<(u32, u32), Error> {
        let (freq, mut phase) =
            multisynth::configure(&mut self.port, clk, PLL_SOURCE, freq, self.vco_freq, phase)?;
        set_output(
            &mut self.port,
            clk,
            true,
            InputSource::Multisynth,
            DriveStrength::_8mA,
            inverted,
        )?;
        if inverted {
            phase += 180;
        }

        let ix = clk.ix() as usize;
        self.freq_cache[ix] = freq;
        self.phase_cache[ix] = phase;
        Ok((freq, phase))
    }

    pub fn get_frequency(&self, clk: ClockOutput) -> Result<u32, Error> {
        self.check_channel(clk)?;
        Ok(self.freq_cache[clk.ix() as usize])
    }

    pub fn get_phase(&self, clk: ClockOutput) -> Result<u32, Error> {
        self.check_channel(clk)?;
        Ok(self.phase_cache[clk.ix() as usize])
    }

    /// Powers `clk` up or down and sets its source, drive and polarity.
    /// Frequency and phase are left alone.
    pub fn set_output(
        &mut self,
        clk: ClockOutput,
        enabled: bool,
        source: InputSource,
        strength: DriveStrength,
        inverted: bool,
    ) -> Result<(), Error> {
        self.check_channel(clk)?;
        set_output(&mut self.port, clk, enabled, source, strength, inverted)
    }

    pub fn write_attribute(
        &mut self,
        clk: ClockOutput,
        attr: Attribute,
        value: u32,
    ) -> Result<(u32, u32), Error> {
        match attr {
            Attribute::Frequency => self.set_frequency(clk, value),
            Attribute::Phase => self.set_phase(clk, value),
        }
    }

    pub fn read_attribute(&self, clk: ClockOutput, attr: Attribute) -> Result<u32, Error> {
        match attr {
            Attribute::Frequency => self.get_frequency(clk),
            Attribute::Phase => self.get_phase(clk),
        }
    }
}
