// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use parking_lot::Mutex;
use tracing::debug;

/// A call made against the mock controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaCall {
    Start {
        address: usize,
        length: usize,
        slot: Option<u16>,
    },
    Stop(u16),
    GlobalStop,
}

/// A mock slot controller. Doesn't drive any hardware; it tracks slot
/// occupancy and records every call made against it.
pub struct Dma {
    name: String,
    slots: Mutex<Vec<bool>>,
    calls: Mutex<Vec<DmaCall>>,
}

impl Dma {
    /// Gets a mock controller with the given number of slots.
    pub fn get(name: &str, slot_count: u16) -> Dma {
        Dma {
            name: name.to_string(),
            slots: Mutex::new(vec![false; usize::from(slot_count)]),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<DmaCall> {
        self.calls.lock().clone()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Returns the number of occupied slots.
    pub fn active_slots(&self) -> usize {
        self.slots.lock().iter().filter(|busy| **busy).count()
    }

    /// Marks every slot busy without recording a call.
    #[cfg(test)]
    pub fn occupy_all(&self) {
        self.slots.lock().iter_mut().for_each(|busy| *busy = true);
    }
}

impl crate::dma::VoiceDma for Dma {
    fn start_slot(&self, address: usize, length: usize) -> Option<u16> {
        let slot = {
            let mut slots = self.slots.lock();
            let slot = slots.iter().position(|busy| !*busy);
            if let Some(slot) = slot {
                slots[slot] = true;
            }
            slot.map(|slot| slot as u16)
        };
        debug!(device = self.name, address, length, slot, "Start slot (mock)");
        self.calls.lock().push(DmaCall::Start {
            address,
            length,
            slot,
        });
        slot
    }

    fn stop_slot(&self, slot: u16) {
        if let Some(busy) = self.slots.lock().get_mut(usize::from(slot)) {
            *busy = false;
        }
        self.calls.lock().push(DmaCall::Stop(slot));
    }

    fn global_stop(&self) {
        debug!(device = self.name, "Global stop (mock)");
        self.slots.lock().iter_mut().for_each(|busy| *busy = false);
        self.calls.lock().push(DmaCall::GlobalStop);
    }

    fn slot_count(&self) -> u16 {
        self.slots.lock().len() as u16
    }
}

impl fmt::Display for Dma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
