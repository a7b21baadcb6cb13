//! Mock implementations for testing
//!
//! This module provides in-memory implementations of the platform traits for
//! unit and integration tests. Both mocks are `heapless`-backed, so they also
//! build for targets without an allocator.

use crate::clock_lines::{ClockLine, ClockLines};
use crate::register_port::{RegisterPort, TransportError};

/// Capacity of the write log. Further writes still land in the register file
/// but are not recorded.
pub const WRITE_LOG_CAPACITY: usize = 256;

/// In-memory register file with a write log and fault injection.
pub struct MockRegisterPort {
    registers: [u8; 256],
    writes: heapless::Vec<(u8, u8), WRITE_LOG_CAPACITY>,
    reads: usize,
    failing_reads: [bool; 256],
    failing_writes: [bool; 256],
    writes_before_failure: Option<usize>,
}

impl MockRegisterPort {
    /// All registers zero, no faults.
    pub fn new() -> Self {
        Self {
            registers: [0; 256],
            writes: heapless::Vec::new(),
            reads: 0,
            failing_reads: [false; 256],
            failing_writes: [false; 256],
            writes_before_failure: None,
        }
    }

    /// Current content of `register`.
    pub fn register(&self, register: u8) -> u8 {
        self.registers
            .get(usize::from(register))
            .copied()
            .unwrap_or_default()
    }

    /// Preload `register` without logging a write.
    pub fn set_register(&mut self, register: u8, value: u8) {
        if let Some(slot) = self.registers.get_mut(usize::from(register)) {
            *slot = value;
        }
    }

    /// Every successful write so far, oldest first, as `(register, value)`.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Registers written so far, oldest first.
    pub fn written_registers(&self) -> impl Iterator<Item = u8> + '_ {
        self.writes.iter().map(|&(register, _)| register)
    }

    /// Number of reads served (including failed ones).
    pub fn read_count(&self) -> usize {
        self.reads
    }

    /// Forget the write log and read count. The register file is kept.
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.reads = 0;
    }

    /// Make every read of `register` fail.
    pub fn fail_reads_of(&mut self, register: u8) {
        if let Some(flag) = self.failing_reads.get_mut(usize::from(register)) {
            *flag = true;
        }
    }

    /// Make every write to `register` fail.
    pub fn fail_writes_to(&mut self, register: u8) {
        if let Some(flag) = self.failing_writes.get_mut(usize::from(register)) {
            *flag = true;
        }
    }

    /// Let the next `count` writes succeed, then fail every write after that.
    pub fn fail_writes_after(&mut self, count: usize) {
        self.writes_before_failure = Some(count);
    }

    /// Remove every injected fault.
    pub fn heal(&mut self) {
        self.failing_reads = [false; 256];
        self.failing_writes = [false; 256];
        self.writes_before_failure = None;
    }

    fn write_fails(&mut self, register: u8) -> bool {
        if self
            .failing_writes
            .get(usize::from(register))
            .copied()
            .unwrap_or(false)
        {
            return true;
        }
        match self.writes_before_failure {
            Some(0) => true,
            Some(remaining) => {
                self.writes_before_failure = Some(remaining.saturating_sub(1));
                false
            }
            None => false,
        }
    }
}

impl Default for MockRegisterPort {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterPort for MockRegisterPort {
    fn read(&mut self, register: u8) -> Result<u8, TransportError> {
        self.reads = self.reads.saturating_add(1);
        if self
            .failing_reads
            .get(usize::from(register))
            .copied()
            .unwrap_or(false)
        {
            return Err(TransportError::read(register));
        }
        Ok(self.register(register))
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), TransportError> {
        if self.write_fails(register) {
            return Err(TransportError::write(register));
        }
        self.set_register(register, value);
        let _ = self.writes.push((register, value));
        Ok(())
    }
}

/// Capacity of the clock-line history.
pub const LINE_HISTORY_CAPACITY: usize = 32;

/// [`ClockLines`] that records every request.
pub struct MockClockLines {
    history: heapless::Vec<(ClockLine, bool), LINE_HISTORY_CAPACITY>,
    failing: Option<ClockLine>,
}

impl MockClockLines {
    /// Empty history, no faults.
    pub fn new() -> Self {
        Self {
            history: heapless::Vec::new(),
            failing: None,
        }
    }

    /// Every successful request so far, oldest first.
    pub fn history(&self) -> &[(ClockLine, bool)] {
        &self.history
    }

    /// Last level driven on `line`, if any.
    pub fn level(&self, line: ClockLine) -> Option<bool> {
        self.history
            .iter()
            .rev()
            .find(|(l, _)| *l == line)
            .map(|&(_, high)| high)
    }

    /// Make requests for `line` fail.
    pub fn fail_on(&mut self, line: ClockLine) {
        self.failing = Some(line);
    }
}

impl Default for MockClockLines {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockLines for MockClockLines {
    /// The line that could not be driven.
    type Error = ClockLine;

    fn set_level(&mut self, line: ClockLine, high: bool) -> Result<(), Self::Error> {
        if self.failing == Some(line) {
            return Err(line);
        }
        let _ = self.history.push((line, high));
        Ok(())
    }
}
