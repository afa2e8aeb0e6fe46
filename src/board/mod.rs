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

//! Pure board geometry, pawns, the deck, and the rules engine.
//!
//! Nothing in this module depends on a lobby, a user, or a store — that
//! layer lives in [`crate::game`]. Some of the key abstractions:
//!
//! * [`geometry`] holds pure functions mapping `(seat, position, steps)` to
//!   the next position across the 60-space track, a seat's Safety Zone, and
//!   Home. It knows nothing about pawns or turns.
//! * [`Position`] is a tagged variant (`Start` / `Track` / `Safety` / `Home`)
//!   identifying where a single pawn sits; [`Pawn`] pairs one with an owning
//!   seat and a stable [`PawnId`].
//! * [`Deck`] owns the 45-card multiset, seeded shuffling, and the
//!   rebuild-on-exhaust rule.
//! * [`moves::legal_moves`] enumerates every distinct [`Move`] a seat may
//!   make with a drawn card; [`moves::apply_move`] applies one, recomputing
//!   (never trusting) its destination and bump consequences against the
//!   current board.

pub mod deck;
pub mod geometry;
pub mod moves;
pub mod pawn;
pub mod state;

pub use deck::{Card, Deck};
pub use moves::{apply_move, legal_moves, Direction, Move, RulesError};
pub use pawn::{Color, Pawn, PawnId, Position, PositionKind, SeatIndex};
pub use state::{GameState, GameStateResult};
