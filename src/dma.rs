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
//! The hardware voice-slot collaborator.
//!
//! Implementations drive the audio peripheral: a transfer is started at an
//! address for a length and runs on a slot until it is stopped.

use std::fmt;

pub mod mock;

/// The slot id hardware reports when no slot is free. Never a valid slot.
pub const SLOT_NONE: u16 = 0xffff;

pub trait VoiceDma: fmt::Display + Send + Sync {
    /// Starts playback of `length` bytes at `address`. Returns the slot the
    /// transfer runs on, or `None` if every slot is busy.
    fn start_slot(&self, address: usize, length: usize) -> Option<u16>;

    /// Stops the transfer on the given slot. Stopping an idle slot is a no-op.
    fn stop_slot(&self, slot: u16);

    /// Halts the playback engine as a whole.
    fn global_stop(&self);

    /// The number of slots the hardware provides.
    fn slot_count(&self) -> u16;
}
