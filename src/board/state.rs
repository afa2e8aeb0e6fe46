// Copyright 2023 Tobin Edwards
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

//! `GameState`: the mutable board for one active game — deck, discard,
//! pawns, whose turn it is, and the result.

use serde::{Deserialize, Serialize};

use super::deck::Deck;
use super::pawn::{Pawn, PawnId, SeatIndex};

/// Outcome of a game once it leaves `active`. A `lobby`/`finished`/`aborted`
/// distinction at the phase level belongs to [`crate::game::GameRecord`];
/// this is strictly the rules-engine-visible result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStateResult {
    Active,
    Win,
    Aborted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub turn_number: u64,
    pub current_seat_index: SeatIndex,
    pub deck: Deck,
    pub board: Vec<Pawn>,
    pub winner_seat_index: Option<SeatIndex>,
    pub result: GameStateResult,
    pub max_seats: u8,
}

impl GameState {
    /// Sets up the board for a fresh game: four Start pawns per seat and a
    /// freshly shuffled deck. `max_seats` pins the turn-advance modulus.
    pub fn new(max_seats: u8, deck_seed: Option<u64>) -> Self {
        let mut board = Vec::with_capacity(max_seats as usize * 4);
        for raw in 0..max_seats {
            let seat = SeatIndex::new(raw);
            for slot in 0..4 {
                board.push(Pawn::new(PawnId::new(seat, slot), seat));
            }
        }
        Self {
            turn_number: 0,
            current_seat_index: SeatIndex::new(0),
            deck: Deck::new(deck_seed),
            board,
            winner_seat_index: None,
            result: GameStateResult::Active,
            max_seats,
        }
    }

    pub fn pawns_of(&self, seat: SeatIndex) -> impl Iterator<Item = &Pawn> {
        self.board.iter().filter(move |p| p.seat == seat)
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.board.iter().find(|p| p.id == id)
    }

    pub fn pawn_mut(&mut self, id: PawnId) -> Option<&mut Pawn> {
        self.board.iter_mut().find(|p| p.id == id)
    }

    pub fn seat_has_won(&self, seat: SeatIndex) -> bool {
        use super::pawn::Position;
        self.pawns_of(seat).all(|p| p.pos == Position::Home)
    }

    pub fn advance_turn(&mut self) {
        self.current_seat_index = self.current_seat_index.next(self.max_seats);
        self.turn_number += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_four_pawns_per_seat_in_start() {
        let state = GameState::new(4, Some(1));
        assert_eq!(state.board.len(), 16);
        for seat_raw in 0..4u8 {
            let seat = SeatIndex::new(seat_raw);
            assert_eq!(state.pawns_of(seat).count(), 4);
        }
    }

    #[test]
    fn advance_turn_wraps_and_increments() {
        let mut state = GameState::new(3, Some(1));
        state.current_seat_index = SeatIndex::new(2);
        state.advance_turn();
        assert_eq!(state.current_seat_index, SeatIndex::new(0));
        assert_eq!(state.turn_number, 1);
    }
}
