// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Identifiers and board-state value types: seats, colors, pawn positions,
//! and the pawns themselves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A seat's fixed color, assigned by seat index at game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Yellow, Color::Green];

    pub fn of_seat(seat: SeatIndex) -> Self {
        Self::ALL[seat.as_u8() as usize]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Green => "green",
        };
        write!(f, "{name}")
    }
}

/// A seat index in `[0, 4)`. Kept as a distinct type rather than a bare
/// `u8` so a stray array index can't silently stand in for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatIndex(u8);

impl SeatIndex {
    pub const fn new(value: u8) -> Self {
        debug_assert!(value < 4);
        Self(value)
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }

    /// The next seat in cyclic turn order, modulo `max_seats`.
    pub fn next(&self, max_seats: u8) -> Self {
        Self((self.0 + 1) % max_seats)
    }
}

impl fmt::Display for SeatIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pawn's stable identifier, unique within a single game. Assigned as
/// `seat * 4 + slot` when the game starts and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PawnId(u8);

impl PawnId {
    pub const fn new(seat: SeatIndex, slot: u8) -> Self {
        debug_assert!(slot < 4);
        Self(seat.0 * 4 + slot)
    }

    pub const fn seat(&self) -> SeatIndex {
        SeatIndex::new(self.0 / 4)
    }
}

impl fmt::Display for PawnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Tagged position of a pawn: off-board, on the shared track, in a seat's
/// private Safety lane, or Home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Start,
    Track(u8),
    Safety(u8),
    Home,
}

/// The tag of a [`Position`] without its index, used by [`super::moves::Move`]
/// to describe a resolved destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    Start,
    Track,
    Safety,
    Home,
}

impl Position {
    pub fn kind(&self) -> PositionKind {
        match self {
            Position::Start => PositionKind::Start,
            Position::Track(_) => PositionKind::Track,
            Position::Safety(_) => PositionKind::Safety,
            Position::Home => PositionKind::Home,
        }
    }

    pub fn index(&self) -> Option<u8> {
        match self {
            Position::Track(i) | Position::Safety(i) => Some(*i),
            Position::Start | Position::Home => None,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Position::Track(_) | Position::Safety(_))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Start => write!(f, "Start"),
            Position::Track(i) => write!(f, "Track[{i}]"),
            Position::Safety(i) => write!(f, "Safety[{i}]"),
            Position::Home => write!(f, "Home"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pawn {
    pub id: PawnId,
    pub seat: SeatIndex,
    pub pos: Position,
}

impl Pawn {
    pub fn new(id: PawnId, seat: SeatIndex) -> Self {
        Self {
            id,
            seat,
            pos: Position::Start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pawn_id_recovers_seat() {
        let seat = SeatIndex::new(2);
        let pid = PawnId::new(seat, 3);
        assert_eq!(pid.seat(), seat);
    }

    #[test]
    fn seat_next_wraps_modulo_max_seats() {
        let seat = SeatIndex::new(3);
        assert_eq!(seat.next(4), SeatIndex::new(0));
        let seat = SeatIndex::new(2);
        assert_eq!(seat.next(3), SeatIndex::new(0));
    }
}
