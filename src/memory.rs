// Copyright (c) 2026 elf_to_hex Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{ConvertError, Result};

/// Default capacity bound: 0xD000_0000 bytes.
pub const DEFAULT_CAPACITY: u64 = 0xD000_0000;

/// Inclusive `[min, max]` of every byte touched by a loaded section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressRange {
    bounds: Option<(u64, u64)>,
}

impl AddressRange {
    pub fn new() -> Self {
        Self { bounds: None }
    }

    /// Widen the range to cover `[lo, hi]`. Never shrinks.
    pub fn extend(&mut self, lo: u64, hi: u64) {
        self.bounds = Some(match self.bounds {
            None => (lo, hi),
            Some((min, max)) => (min.min(lo), max.max(hi)),
        });
    }

    pub fn min(&self) -> Option<u64> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<u64> {
        self.bounds.map(|(_, max)| max)
    }

    pub fn bounds(&self) -> Option<(u64, u64)> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }
}

/// Flat byte image addressed by target address.
///
/// Only the span between the lowest and highest written byte is backed by
/// memory; everything else reads as zero. Writes must stay below `capacity`.
pub struct MemoryImage {
    capacity: u64,
    origin: u64,
    bytes: Vec<u8>,
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemoryImage {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            origin: 0,
            bytes: Vec::new(),
        }
    }

    /// Fails unless `addr` lies below the capacity bound.
    pub fn check_bound(&self, addr: u64) -> Result<()> {
        if addr >= self.capacity {
            return Err(ConvertError::CapacityExceeded {
                max_addr: addr,
                capacity: self.capacity,
                overflow: addr - self.capacity + 1,
            });
        }
        Ok(())
    }

    /// Copy `data` to `[addr, addr + data.len())`.
    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let last = addr
            .checked_add(data.len() as u64 - 1)
            .ok_or(ConvertError::CapacityExceeded {
                max_addr: u64::MAX,
                capacity: self.capacity,
                overflow: (u64::MAX - self.capacity).saturating_add(1),
            })?;
        self.check_bound(last)?;

        if self.bytes.is_empty() {
            self.origin = addr;
        } else if addr < self.origin {
            let grow = (self.origin - addr) as usize;
            self.bytes.splice(0..0, std::iter::repeat(0u8).take(grow));
            self.origin = addr;
        }
        let start = (addr - self.origin) as usize;
        let end = start + data.len();
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    pub fn read_byte(&self, addr: u64) -> u8 {
        addr.checked_sub(self.origin)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|offset| self.bytes.get(offset))
            .copied()
            .unwrap_or(0)
    }

    /// The 4 bytes at `[addr, addr + 4)`, in address order.
    pub fn read_word(&self, addr: u64) -> [u8; 4] {
        let mut word = [0u8; 4];
        for (i, b) in word.iter_mut().enumerate() {
            *b = self.read_byte(addr.wrapping_add(i as u64));
        }
        word
    }
}
