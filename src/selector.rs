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

//! Resolves a client's move payload against the legal moves the Rules Engine
//! enumerated, the way [`crate::board::moves::legal_moves`] hands the Turn
//! Coordinator candidates and something downstream has to pick one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Direction, Move, PawnId};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorError {
    #[error("no legal moves for this card")]
    NoLegalMoves,
    #[error("a move selection is required")]
    MoveSelectionRequired,
    #[error("client move payload matched no legal move")]
    NoMatch,
    #[error("client move payload matched more than one legal move")]
    Ambiguous,
}

/// A partial move description a client submits when more than one legal move
/// exists and no index was given. Every field is optional; [`select_move`]
/// matches against whichever ones are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub pawn_id: Option<PawnId>,
    pub target_pawn_id: Option<PawnId>,
    pub secondary_pawn_id: Option<PawnId>,
    pub direction: Option<Direction>,
    pub steps: Option<u8>,
    pub secondary_direction: Option<Direction>,
    pub secondary_steps: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMovePayload {
    pub move_index: Option<usize>,
    pub r#move: Option<MoveDescriptor>,
}

fn descriptor_matches(d: &MoveDescriptor, m: &Move) -> bool {
    if let Some(v) = d.pawn_id {
        if m.pawn_id != v {
            return false;
        }
    }
    if let Some(v) = d.target_pawn_id {
        if m.target_pawn_id != Some(v) {
            return false;
        }
    }
    if let Some(v) = d.secondary_pawn_id {
        if m.secondary_pawn_id != Some(v) {
            return false;
        }
    }
    if let Some(v) = d.direction {
        if m.direction != v {
            return false;
        }
    }
    if let Some(v) = d.steps {
        if m.steps != v {
            return false;
        }
    }
    if let Some(v) = d.secondary_direction {
        if m.secondary_direction != Some(v) {
            return false;
        }
    }
    if let Some(v) = d.secondary_steps {
        if m.secondary_steps != Some(v) {
            return false;
        }
    }
    true
}

/// Picks exactly one of `moves` for `payload`, returning its index.
///
/// Evaluated in order: empty set rejects outright; an empty payload against
/// a single candidate picks it; a valid `moveIndex` picks directly; a
/// descriptor filters by every field it sets; otherwise, more than one
/// candidate with nothing to disambiguate requires a selection.
pub fn select_move(moves: &[Move], payload: &ClientMovePayload) -> Result<usize, SelectorError> {
    if moves.is_empty() {
        return Err(SelectorError::NoLegalMoves);
    }

    let payload_is_empty = payload.move_index.is_none() && payload.r#move.is_none();
    if payload_is_empty && moves.len() == 1 {
        return Ok(0);
    }

    if let Some(idx) = payload.move_index {
        if idx < moves.len() {
            return Ok(idx);
        }
    }

    if let Some(descriptor) = &payload.r#move {
        let matches: Vec<usize> = moves
            .iter()
            .enumerate()
            .filter(|(_, m)| descriptor_matches(descriptor, m))
            .map(|(i, _)| i)
            .collect();
        return match matches.len() {
            0 => Err(SelectorError::NoMatch),
            1 => Ok(matches[0]),
            _ => Err(SelectorError::Ambiguous),
        };
    }

    if moves.len() > 1 {
        return Err(SelectorError::MoveSelectionRequired);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Card, PositionKind, SeatIndex};

    fn sample_move(pawn_id: PawnId, steps: u8) -> Move {
        Move {
            card: Card::One,
            seat: SeatIndex::new(0),
            pawn_id,
            direction: Direction::Forward,
            steps,
            target_pawn_id: None,
            secondary_pawn_id: None,
            secondary_direction: None,
            secondary_steps: None,
            dest_type: PositionKind::Track,
            dest_index: Some(5),
            secondary_dest_type: None,
            secondary_dest_index: None,
        }
    }

    #[test]
    fn empty_moves_rejects_regardless_of_payload() {
        let err = select_move(&[], &ClientMovePayload::default()).unwrap_err();
        assert_eq!(err, SelectorError::NoLegalMoves);
    }

    #[test]
    fn empty_payload_with_single_move_picks_it() {
        let moves = vec![sample_move(PawnId::new(SeatIndex::new(0), 0), 1)];
        assert_eq!(select_move(&moves, &ClientMovePayload::default()), Ok(0));
    }

    #[test]
    fn empty_payload_with_multiple_moves_requires_selection() {
        let moves = vec![
            sample_move(PawnId::new(SeatIndex::new(0), 0), 1),
            sample_move(PawnId::new(SeatIndex::new(0), 1), 1),
        ];
        let err = select_move(&moves, &ClientMovePayload::default()).unwrap_err();
        assert_eq!(err, SelectorError::MoveSelectionRequired);
    }

    #[test]
    fn move_index_selects_directly() {
        let moves = vec![
            sample_move(PawnId::new(SeatIndex::new(0), 0), 1),
            sample_move(PawnId::new(SeatIndex::new(0), 1), 1),
        ];
        let payload = ClientMovePayload {
            move_index: Some(1),
            r#move: None,
        };
        assert_eq!(select_move(&moves, &payload), Ok(1));
    }

    #[test]
    fn descriptor_narrows_to_single_match() {
        let target = PawnId::new(SeatIndex::new(0), 1);
        let moves = vec![
            sample_move(PawnId::new(SeatIndex::new(0), 0), 1),
            sample_move(target, 1),
        ];
        let payload = ClientMovePayload {
            move_index: None,
            r#move: Some(MoveDescriptor {
                pawn_id: Some(target),
                ..Default::default()
            }),
        };
        assert_eq!(select_move(&moves, &payload), Ok(1));
    }

    #[test]
    fn descriptor_matching_nothing_is_rejected() {
        let moves = vec![sample_move(PawnId::new(SeatIndex::new(0), 0), 1)];
        let payload = ClientMovePayload {
            move_index: None,
            r#move: Some(MoveDescriptor {
                pawn_id: Some(PawnId::new(SeatIndex::new(0), 3)),
                ..Default::default()
            }),
        };
        assert_eq!(select_move(&moves, &payload).unwrap_err(), SelectorError::NoMatch);
    }

    #[test]
    fn descriptor_matching_several_is_ambiguous() {
        let moves = vec![
            sample_move(PawnId::new(SeatIndex::new(0), 0), 1),
            sample_move(PawnId::new(SeatIndex::new(0), 0), 1),
        ];
        let payload = ClientMovePayload {
            move_index: None,
            r#move: Some(MoveDescriptor {
                pawn_id: Some(PawnId::new(SeatIndex::new(0), 0)),
                ..Default::default()
            }),
        };
        assert_eq!(select_move(&moves, &payload).unwrap_err(), SelectorError::Ambiguous);
    }
}
