use embedded_hal::blocking::i2c::{Write, WriteRead};
use si5351_synth::{ClockOutput, DeviceConfig, Error, I2cPort, RegisterPort, Si5351Synth};

/// I²C bus with one register-addressed device behind it.
struct FakeBus {
    regs: [u8; 256],
    transactions: Vec<(u8, Vec<u8>)>,
    broken: bool,
}

impl FakeBus {
    fn new() -> Self {
        FakeBus {
            regs: [0; 256],
            transactions: Vec::new(),
            broken: false,
        }
    }
}

impl Write for FakeBus {
    type Error = ();

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ()> {
        if self.broken {
            return Err(());
        }
        self.transactions.push((address, bytes.to_vec()));
        let start = bytes[0] as usize;
        for (i, byte) in bytes[1..].iter().enumerate() {
            self.regs[start + i] = *byte;
        }
        Ok(())
    }
}

impl WriteRead for FakeBus {
    type Error = ();

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), ()> {
        if self.broken {
            return Err(());
        }
        self.transactions.push((address, bytes.to_vec()));
        let start = bytes[0] as usize;
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = self.regs[start + i];
        }
        Ok(())
    }
}

#[test]
fn single_byte_access() {
    let mut bus = FakeBus::new();
    bus.regs[183] = 0x52;
    let mut port = I2cPort::new(bus, false);

    assert_eq!(port.read_byte(183), Ok(0x52));
    port.write_byte(3, 0xAA).unwrap();

    let bus = port.release();
    assert_eq!(bus.transactions, vec![(0x60, vec![183]), (0x60, vec![3, 0xAA])]);
}

#[test]
fn address_select_bit() {
    let mut port = I2cPort::new(FakeBus::new(), true);
    port.write_byte(0, 0).unwrap();
    assert_eq!(port.release().transactions[0].0, 0x61);
}

#[test]
fn parameter_block_in_one_transaction() {
    let mut port = I2cPort::new(FakeBus::new(), false);
    port.write_block(42, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(
        port.release().transactions,
        vec![(0x60, vec![42, 1, 2, 3, 4, 5, 6, 7, 8])]
    );
}

#[test]
fn oversized_block() {
    let mut port = I2cPort::new(FakeBus::new(), false);
    assert_eq!(port.write_block(42, &[0; 9]), Err(Error::UnsupportedRequest));
}

#[test]
fn bus_failure() {
    let mut bus = FakeBus::new();
    bus.broken = true;
    let mut port = I2cPort::new(bus, false);
    assert_eq!(port.read_byte(0), Err(Error::BusError));
    assert_eq!(port.write_byte(0, 0), Err(Error::BusError));
}

#[test]
fn synthesis_over_i2c() {
    let port = I2cPort::new(FakeBus::new(), false);
    let mut synth = Si5351Synth::attach(port, DeviceConfig::default()).unwrap();
    assert_eq!(synth.set_frequency(ClockOutput::Clk1, 25_000_000), Ok((25_000_000, 0)));

    let bus = synth.detach().release();
    // 800 MHz / 32
    let p1 = 128 * 32 - 512;
    assert_eq!(&bus.regs[50..58], &[0, 1, 0, (p1 >> 8) as u8, p1 as u8, 0, 0, 0]);
    assert_eq!(bus.regs[3], 0xFD);
}
