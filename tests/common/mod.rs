#![allow(dead_code)]

use si5351_synth::{Error, RegisterPort};

/// Register file standing in for the chip, with optional bus failure.
pub struct MemoryPort {
    pub regs: [u8; 256],
    /// Every write in order, as (start address, bytes).
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Fail every access once this many have succeeded.
    pub fail_after: Option<usize>,
    accesses: usize,
}

impl MemoryPort {
    pub fn new() -> Self {
        MemoryPort {
            regs: [0; 256],
            writes: Vec::new(),
            fail_after: None,
            accesses: 0,
        }
    }

    fn access(&mut self) -> Result<(), Error> {
        if let Some(limit) = self.fail_after {
            if self.accesses >= limit {
                return Err(Error::BusError);
            }
        }
        self.accesses += 1;
        Ok(())
    }

    pub fn block(&self, start: u8) -> [u8; 8] {
        let mut block = [0u8; 8];
        block.copy_from_slice(&self.regs[start as usize..start as usize + 8]);
        block
    }

    /// Positions in `writes` that touched `addr`.
    pub fn writes_to(&self, addr: u8) -> Vec<usize> {
        self.writes
            .iter()
            .enumerate()
            .filter(|(_, (start, bytes))| {
                addr >= *start && (addr as usize) < *start as usize + bytes.len()
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
    }
}

impl RegisterPort for MemoryPort {
    fn read_byte(&mut self, addr: u8) -> Result<u8, Error> {
        self.access()?;
        Ok(self.regs[addr as usize])
    }

    fn write_byte(&mut self, addr: u8, byte: u8) -> Result<(), Error> {
        self.access()?;
        self.regs[addr as usize] = byte;
        self.writes.push((addr, vec![byte]));
        Ok(())
    }

    fn write_block(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Error> {
        self.access()?;
        for (i, byte) in bytes.iter().enumerate() {
            self.regs[addr as usize + i] = *byte;
        }
        self.writes.push((addr, bytes.to_vec()));
        Ok(())
    }
}
