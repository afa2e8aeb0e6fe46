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

//! Read-only views built from a [`GameRecord`] for a specific viewer. Board
//! state is public in this game — the only thing a client never sees is the
//! deck's card order, so [`ClientView`] exposes a count, never the cards.

use serde::{Deserialize, Serialize};

use crate::board::{self, Card, GameStateResult, Move, Pawn};

use super::error::CoreError;
use super::{GameId, GameRecord, MoveRecord, Phase, SeatStatus, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSeat {
    pub status: SeatStatus,
    pub display_name: Option<String>,
    pub is_you: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientView {
    pub game_id: GameId,
    pub phase: Phase,
    pub seats: Vec<ClientSeat>,
    pub your_seat_index: Option<board::SeatIndex>,
    pub turn_number: Option<u64>,
    pub current_seat_index: Option<board::SeatIndex>,
    pub deck_remaining: Option<usize>,
    pub discard_pile: Vec<Card>,
    pub board: Vec<Pawn>,
    pub result: Option<GameStateResult>,
    pub winner_seat_index: Option<board::SeatIndex>,
    pub history: Vec<MoveRecord>,
}

/// Builds the view a given user is allowed to see of `record`. `viewer`
/// being seated only changes `your_seat_index`; nothing else is hidden from
/// a seated vs. unseated viewer since the board itself carries no secrets.
pub fn to_client(record: &GameRecord, viewer: UserId) -> ClientView {
    let your_seat_index = record
        .seats
        .iter()
        .position(|s| s.player_id == Some(viewer))
        .map(|idx| board::SeatIndex::new(idx as u8));

    let seats = record
        .seats
        .iter()
        .map(|seat| ClientSeat {
            status: seat.status,
            display_name: seat.display_name.clone(),
            is_you: seat.player_id == Some(viewer),
        })
        .collect();

    let state = record.state.as_ref();
    ClientView {
        game_id: record.game_id,
        phase: record.phase,
        seats,
        your_seat_index,
        turn_number: state.map(|s| s.turn_number),
        current_seat_index: state.map(|s| s.current_seat_index),
        deck_remaining: state.map(|s| s.deck.remaining()),
        discard_pile: state.map(|s| s.deck.discard_pile().to_vec()).unwrap_or_default(),
        board: state.map(|s| s.board.clone()).unwrap_or_default(),
        result: state.map(|s| s.result),
        winner_seat_index: state.and_then(|s| s.winner_seat_index),
        history: record.history.clone(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalMoversPreview {
    pub card: Card,
    pub pawn_ids: Vec<board::PawnId>,
    pub moves: Vec<Move>,
}

/// Simulates the next draw without mutating stored state, so a client can
/// preview which pawns are about to become movable. Deterministic for a
/// given `(gameId, turnNumber, discardLen)`: it clones the deck's RNG
/// continuation rather than consuming from the real one.
pub fn legal_movers_preview(record: &GameRecord, viewer: UserId) -> Result<LegalMoversPreview, CoreError> {
    let state = record.state.as_ref().ok_or(CoreError::GameNotStarted)?;
    let seat_index = record
        .seats
        .iter()
        .position(|s| s.player_id == Some(viewer))
        .map(|idx| board::SeatIndex::new(idx as u8))
        .ok_or(CoreError::NotInGame)?;
    if state.current_seat_index != seat_index {
        return Ok(LegalMoversPreview {
            card: Card::One,
            pawn_ids: Vec::new(),
            moves: Vec::new(),
        });
    }

    let mut preview_state = state.clone();
    let card = preview_state.deck.draw();
    let moves = board::legal_moves(&preview_state, seat_index, card);
    let mut pawn_ids: Vec<board::PawnId> = moves.iter().map(|m| m.pawn_id).collect();
    pawn_ids.sort();
    pawn_ids.dedup();

    Ok(LegalMoversPreview { card, pawn_ids, moves })
}
