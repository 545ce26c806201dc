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
use thiserror::Error;

/// Failures reported by a single playback call. None of them disturbs the
/// state of other voices.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no instrument is loaded")]
    NoInstrument,

    #[error("note {0} has no samples mapped")]
    UnknownKey(u8),

    #[error("voice is already playing on slot {slot}")]
    VoiceBusy { slot: u16 },

    #[error("voice has no sample loaded")]
    NoSample,

    #[error("no voice slot is available")]
    NoSlotAvailable,
}
