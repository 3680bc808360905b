/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
/*!
A platform agnostic Rust driver for frequency and phase synthesis on the
[Si5351], based on the [`embedded-hal`] traits.

## The Device

The Silicon Labs [Si5351] is an any-frequency CMOS clock generator. A
crystal reference is multiplied up by one of two fractional PLLs to a
600-900 MHz VCO frequency, which up to eight multisynth dividers bring down
to the output frequencies. Outputs 0-5 have fractional dividers and a 7-bit
phase offset; outputs 6 and 7 only divide by an integer.

The device has an I²C interface.

## Usage

Wrap an I²C bus into a register port and attach the device:

```ignore
# extern crate stm32f103xx_hal as hal;
# extern crate si5351_synth;
use si5351_synth::{ClockOutput, DeviceConfig, I2cPort, Si5351Synth};

# fn main() {
let port = I2cPort::new(i2c, false);
let mut clock = Si5351Synth::attach(port, DeviceConfig::default())?;
# }
```

Then set frequency and phase on one of the outputs. Both calls return the
frequency and phase the chip will actually produce:

```ignore
let (freq, phase) = clock.set_frequency(ClockOutput::Clk0, 14_175_000)?;
let (freq, phase) = clock.set_phase(ClockOutput::Clk0, 45)?;
```

Phases of 180 degrees and above are realised by inverting the output.

### Quadrature mode

With `DeviceConfig::with_quadrature(true)`, outputs 0 and 1 are tuned as a
pair that stays exactly 90 degrees apart. The PLL is retuned for every
frequency change and individual phase requests are rejected.

[Si5351]: https://www.silabs.com/documents/public/data-sheets/Si5351-B.pdf
[`embedded-hal`]: https://github.com/japaric/embedded-hal
*/
#![deny(warnings)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate bitflags;
use embedded_hal as hal;

use core::fmt;

pub mod codec;
pub mod config;
pub mod device;
pub mod multisynth;
pub mod output;
pub mod pll;
pub mod port;
pub mod quadrature;
pub mod rational;
pub mod registers;

pub use crate::config::{ChipVariant, CrystalLoad, DeviceConfig};
pub use crate::device::{Attribute, Si5351Synth};
pub use crate::output::{ClockOutput, DriveStrength, InputSource};
pub use crate::pll::PLL;
pub use crate::port::{I2cPort, RegisterPort};
pub use crate::registers::DeviceStatusBits;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// A register read or write failed.
    BusError,
    /// The addressed output or device mode cannot do what was asked.
    UnsupportedRequest,
    /// No divider combination reaches the requested frequency.
    OutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BusError => write!(f, "Bus Error"),
            Error::UnsupportedRequest => write!(f, "Unsupported Request"),
            Error::OutOfRange => write!(f, "Out Of Range"),
        }
    }
}
