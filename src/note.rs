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

//! Note-name resolution.
//!
//! A note token is a letter, a single octave digit and an optional sharp
//! marker: `A0`, `C1#`, `C1_S`. Letters and the `S` marker are matched
//! case-insensitively everywhere a token is resolved.

/// One row of the note table.
#[derive(Debug, Clone, Copy)]
pub struct NoteTableEntry {
    /// The note letter (upper case).
    pub letter: char,
    /// Whether this row names the sharp of `letter`.
    pub sharp: bool,
    /// The MIDI note number of this row at its anchor octave.
    pub base: u8,
    /// The octave the base number belongs to. A and B rows start at octave 0,
    /// C through G rows start at octave 1.
    pub anchor_octave: u8,
}

const fn row(letter: char, sharp: bool, base: u8, anchor_octave: u8) -> NoteTableEntry {
    NoteTableEntry {
        letter,
        sharp,
        base,
        anchor_octave,
    }
}

/// The note table. Lookup takes the first row whose letter matches, so the
/// sharp rows are never selected directly; the sharp marker adds one instead.
/// The order is significant and must not change.
pub static NOTE_TABLE: [NoteTableEntry; 12] = [
    row('A', false, 21, 0),
    row('A', true, 22, 0),
    row('B', false, 23, 0),
    row('C', false, 12, 1),
    row('C', true, 13, 1),
    row('D', false, 14, 1),
    row('D', true, 15, 1),
    row('E', false, 16, 1),
    row('F', false, 17, 1),
    row('F', true, 18, 1),
    row('G', false, 19, 1),
    row('G', true, 20, 1),
];

/// Resolves a note token to a MIDI note number.
///
/// Returns `None` when the letter is not in the table, the octave is not a
/// decimal digit, the suffix is not a recognized sharp marker, or the octave
/// lies below the row's anchor. The result is not range checked against the
/// key map; callers compare it with [`crate::patch::MAX_NUM_OF_KEYS`].
pub fn resolve_note(token: &str) -> Option<u16> {
    let mut chars = token.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let octave = chars.next()?.to_digit(10)? as u16;
    let sharp = match chars.as_str() {
        "" => false,
        "#" => true,
        suffix if suffix.eq_ignore_ascii_case("_s") => true,
        _ => return None,
    };

    let entry = NOTE_TABLE.iter().find(|entry| entry.letter == letter)?;
    let octave = octave.checked_sub(u16::from(entry.anchor_octave))?;
    let note = u16::from(entry.base) + 12 * octave;

    Some(if sharp { note + 1 } else { note })
}
