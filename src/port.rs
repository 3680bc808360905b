/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Register access.

use crate::hal::blocking::i2c::{Write, WriteRead};
use crate::registers::{merge_bits, PARAMETERS_LENGTH};
use crate::Error;

const ADDRESS: u8 = 0b0110_0000;

/// Byte-wide access to the chip's register space.
///
/// Calls are blocking. Any retry policy belongs to the implementation;
/// a failure is reported as `Error::BusError` and aborts the caller.
pub trait RegisterPort {
    fn read_byte(&mut self, addr: u8) -> Result<u8, Error>;
    fn write_byte(&mut self, addr: u8, byte: u8) -> Result<(), Error>;
    fn write_block(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Error>;

    /// Read-modify-write of the bits selected by `mask`. Returns the byte
    /// that was written.
    fn update_byte(&mut self, addr: u8, mask: u8, value: u8) -> Result<u8, Error> {
        let byte = merge_bits(self.read_byte(addr)?, mask, value);
        self.write_byte(addr, byte)?;
        Ok(byte)
    }
}

fn i2c_error<E>(_: E) -> Error {
    Error::BusError
}

/// Register port over an `embedded-hal` blocking I²C bus.
pub struct I2cPort<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> I2cPort<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
{
    /// `address_bit` is the state of the chip's A0 pin.
    pub fn new(i2c: I2C, address_bit: bool) -> Self {
        I2cPort {
            i2c,
            address: ADDRESS | if address_bit { 1 } else { 0 },
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterPort for I2cPort<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
{
    fn read_byte(&mut self, addr: u8) -> Result<u8, Error> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(self.address, &[addr], &mut buffer)
            .map_err(i2c_error)?;
        Ok(buffer[0])
    }

    fn write_byte(&mut self, addr: u8, byte: u8) -> Result<(), Error> {
        self.i2c
            .write(self.address, &[addr, byte])
            .map_err(i2c_error)
    }

    fn write_block(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > PARAMETERS_LENGTH {
            return Err(Error::UnsupportedRequest);
        }

        let mut buffer = [0u8; PARAMETERS_LENGTH + 1];
        buffer[0] = addr;
        buffer[1..=bytes.len()].copy_from_slice(bytes);
        self.i2c
            .write(self.address, &buffer[..=bytes.len()])
            .map_err(i2c_error)
    }
}
