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

//! The Rules Engine: legal-move enumeration and move application.
//!
//! [`legal_moves`] enumerates every distinct [`Move`] a seat may make with a
//! drawn [`Card`]. [`apply_move`] applies one — it never trusts the
//! destination/bump fields carried on the [`Move`] itself, recomputing them
//! fresh against the current board, the same way `LegalMoves::validate_move`
//! re-derives a chess move from `(from, to)` rather than trusting a client's
//! claimed outcome.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::deck::Card;
use super::geometry;
use super::pawn::{Pawn, PawnId, Position, PositionKind, SeatIndex};
use super::state::{GameState, GameStateResult};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RulesError {
    #[error("no legal moves for this card")]
    NoLegalMoves,
    #[error("illegal move")]
    IllegalMove,
    #[error("invalid game state")]
    InvalidState,
}
use RulesError::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

/// A complete description of how one or two pawns transition under a drawn
/// card, with destinations/bumps already resolved hypothetically by
/// [`legal_moves`]. [`apply_move`] recomputes rather than trusts these
/// fields; they exist so a client and the [`crate::selector`] can identify
/// which of several legal moves is meant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub card: Card,
    pub seat: SeatIndex,
    pub pawn_id: PawnId,
    pub direction: Direction,
    pub steps: u8,
    pub target_pawn_id: Option<PawnId>,
    pub secondary_pawn_id: Option<PawnId>,
    pub secondary_direction: Option<Direction>,
    pub secondary_steps: Option<u8>,
    pub dest_type: PositionKind,
    pub dest_index: Option<u8>,
    pub secondary_dest_type: Option<PositionKind>,
    pub secondary_dest_index: Option<u8>,
}

impl Move {
    fn simple(
        card: Card,
        seat: SeatIndex,
        pawn_id: PawnId,
        direction: Direction,
        steps: u8,
        outcome: &LandingOutcome,
    ) -> Self {
        Self {
            card,
            seat,
            pawn_id,
            direction,
            steps,
            target_pawn_id: None,
            secondary_pawn_id: None,
            secondary_direction: None,
            secondary_steps: None,
            dest_type: outcome.dest.kind(),
            dest_index: outcome.dest.index(),
            secondary_dest_type: None,
            secondary_dest_index: None,
        }
    }
}

#[derive(Debug, Clone)]
struct LandingOutcome {
    dest: Position,
    bumped: Vec<PawnId>,
}

fn find<'a>(board: &'a [Pawn], id: PawnId) -> Option<&'a Pawn> {
    board.iter().find(|p| p.id == id)
}

fn occupant_at(board: &[Pawn], pos: Position, exclude: PawnId) -> Option<&Pawn> {
    board.iter().find(|p| p.id != exclude && p.pos == pos)
}

/// Resolves a forward-walk candidate into a legal landing, or `None` if the
/// landing is illegal (self-bump). Handles the "any color, including own"
/// slide house rule and the own-first-slide-dives-into-safety rule.
fn resolve_forward_landing(
    board: &[Pawn],
    acting_seat: SeatIndex,
    acting_pawn: PawnId,
    candidate: Position,
) -> Option<LandingOutcome> {
    match candidate {
        Position::Track(t) => {
            if geometry::is_slide_start(t).is_some() {
                let spaces = geometry::spaces_on_slide(t);
                let bumped: Vec<PawnId> = board
                    .iter()
                    .filter(|p| {
                        p.id != acting_pawn
                            && matches!(p.pos, Position::Track(s) if spaces.contains(&s))
                    })
                    .map(|p| p.id)
                    .collect();
                if geometry::is_safety_entry_slide_end(acting_seat, t) {
                    let dest = Position::Safety(0);
                    if occupant_at(board, dest, acting_pawn).is_some() {
                        return None;
                    }
                    Some(LandingOutcome { dest, bumped })
                } else {
                    let end = geometry::slide_end_from_start(t);
                    Some(LandingOutcome {
                        dest: Position::Track(end),
                        bumped,
                    })
                }
            } else {
                match occupant_at(board, candidate, acting_pawn) {
                    Some(other) if other.seat == acting_seat => None,
                    Some(other) => Some(LandingOutcome {
                        dest: candidate,
                        bumped: vec![other.id],
                    }),
                    None => Some(LandingOutcome {
                        dest: candidate,
                        bumped: vec![],
                    }),
                }
            }
        }
        Position::Safety(_) | Position::Home => {
            if occupant_at(board, candidate, acting_pawn).is_some() {
                None
            } else {
                Some(LandingOutcome {
                    dest: candidate,
                    bumped: vec![],
                })
            }
        }
        Position::Start => None,
    }
}

/// Resolves a backward-walk candidate. No slide extension applies to
/// backward movement.
fn resolve_simple_landing(
    board: &[Pawn],
    acting_seat: SeatIndex,
    acting_pawn: PawnId,
    candidate: Position,
) -> Option<LandingOutcome> {
    match occupant_at(board, candidate, acting_pawn) {
        Some(other) if other.seat == acting_seat => None,
        Some(other) => Some(LandingOutcome {
            dest: candidate,
            bumped: vec![other.id],
        }),
        None => Some(LandingOutcome {
            dest: candidate,
            bumped: vec![],
        }),
    }
}

fn attempt_forward(board: &[Pawn], seat: SeatIndex, pawn_id: PawnId, k: u8) -> Vec<LandingOutcome> {
    let Some(pawn) = find(board, pawn_id) else {
        return Vec::new();
    };
    geometry::forward(seat, pawn.pos, k)
        .into_iter()
        .filter_map(|raw| resolve_forward_landing(board, seat, pawn_id, raw))
        .collect()
}

fn attempt_leave_start(board: &[Pawn], seat: SeatIndex, pawn_id: PawnId) -> Option<LandingOutcome> {
    let exit = geometry::start_exit(seat);
    resolve_forward_landing(board, seat, pawn_id, Position::Track(exit))
}

fn attempt_backward(board: &[Pawn], seat: SeatIndex, pawn_id: PawnId, k: u8) -> Option<LandingOutcome> {
    let pawn = find(board, pawn_id)?;
    let raw = geometry::backward(seat, pawn.pos, k)?;
    resolve_simple_landing(board, seat, pawn_id, raw)
}

fn apply_outcome(board: &mut [Pawn], pawn_id: PawnId, outcome: &LandingOutcome) {
    for bumped_id in &outcome.bumped {
        if let Some(p) = board.iter_mut().find(|p| p.id == *bumped_id) {
            p.pos = Position::Start;
        }
    }
    if let Some(p) = board.iter_mut().find(|p| p.id == pawn_id) {
        p.pos = outcome.dest;
    }
}

/// Enumerates every distinct legal move the seat may make with `card`.
pub fn legal_moves(state: &GameState, seat: SeatIndex, card: Card) -> Vec<Move> {
    match card {
        Card::One => enumerate_small_advance(state, seat, card, 1),
        Card::Two => enumerate_small_advance(state, seat, card, 2),
        Card::Three => enumerate_in_play_forward(state, seat, card, 3),
        Card::Five => enumerate_in_play_forward(state, seat, card, 5),
        Card::Eight => enumerate_in_play_forward(state, seat, card, 8),
        Card::Twelve => enumerate_in_play_forward(state, seat, card, 12),
        Card::Four => enumerate_backward(state, seat, card, 4),
        Card::Ten => enumerate_ten(state, seat, card),
        Card::Eleven => enumerate_eleven(state, seat, card),
        Card::Seven => enumerate_seven(state, seat, card),
        Card::Sorry => enumerate_sorry(state, seat, card),
    }
}

fn enumerate_small_advance(state: &GameState, seat: SeatIndex, card: Card, k: u8) -> Vec<Move> {
    let mut out = Vec::new();
    for pawn in state.pawns_of(seat) {
        match pawn.pos {
            Position::Start => {
                if let Some(outcome) = attempt_leave_start(&state.board, seat, pawn.id) {
                    out.push(Move::simple(card, seat, pawn.id, Direction::Forward, k, &outcome));
                }
            }
            Position::Track(_) | Position::Safety(_) => {
                for outcome in attempt_forward(&state.board, seat, pawn.id, k) {
                    out.push(Move::simple(card, seat, pawn.id, Direction::Forward, k, &outcome));
                }
            }
            Position::Home => {}
        }
    }
    out
}

fn eligible_in_play(state: &GameState, seat: SeatIndex) -> impl Iterator<Item = &Pawn> {
    state.pawns_of(seat).filter(|p| p.pos.is_mobile())
}

fn enumerate_in_play_forward(state: &GameState, seat: SeatIndex, card: Card, k: u8) -> Vec<Move> {
    let mut out = Vec::new();
    for pawn in eligible_in_play(state, seat) {
        for outcome in attempt_forward(&state.board, seat, pawn.id, k) {
            out.push(Move::simple(card, seat, pawn.id, Direction::Forward, k, &outcome));
        }
    }
    out
}

fn enumerate_backward(state: &GameState, seat: SeatIndex, card: Card, k: u8) -> Vec<Move> {
    let mut out = Vec::new();
    for pawn in eligible_in_play(state, seat) {
        if let Some(outcome) = attempt_backward(&state.board, seat, pawn.id, k) {
            out.push(Move::simple(card, seat, pawn.id, Direction::Backward, k, &outcome));
        }
    }
    out
}

fn enumerate_ten(state: &GameState, seat: SeatIndex, card: Card) -> Vec<Move> {
    let forward10 = enumerate_in_play_forward(state, seat, card, 10);
    if !forward10.is_empty() {
        return forward10;
    }
    enumerate_backward(state, seat, card, 1)
}

fn enumerate_eleven(state: &GameState, seat: SeatIndex, card: Card) -> Vec<Move> {
    let mut out = enumerate_in_play_forward(state, seat, card, 11);
    for p in state.pawns_of(seat) {
        if !matches!(p.pos, Position::Track(_)) {
            continue;
        }
        for q in state.board.iter().filter(|q| q.seat != seat && matches!(q.pos, Position::Track(_))) {
            out.push(Move {
                card,
                seat,
                pawn_id: p.id,
                direction: Direction::Forward,
                steps: 0,
                target_pawn_id: Some(q.id),
                secondary_pawn_id: None,
                secondary_direction: None,
                secondary_steps: None,
                dest_type: q.pos.kind(),
                dest_index: q.pos.index(),
                secondary_dest_type: None,
                secondary_dest_index: None,
            });
        }
    }
    out
}

fn enumerate_sorry(state: &GameState, seat: SeatIndex, card: Card) -> Vec<Move> {
    let mut out = Vec::new();
    for p in state.pawns_of(seat) {
        if p.pos != Position::Start {
            continue;
        }
        for q in state.board.iter().filter(|q| q.seat != seat && matches!(q.pos, Position::Track(_))) {
            out.push(Move {
                card,
                seat,
                pawn_id: p.id,
                direction: Direction::Forward,
                steps: 0,
                target_pawn_id: Some(q.id),
                secondary_pawn_id: None,
                secondary_direction: None,
                secondary_steps: None,
                dest_type: q.pos.kind(),
                dest_index: q.pos.index(),
                secondary_dest_type: None,
                secondary_dest_index: None,
            });
        }
    }
    out
}

fn enumerate_seven(state: &GameState, seat: SeatIndex, card: Card) -> Vec<Move> {
    let mut out = enumerate_in_play_forward(state, seat, card, 7);
    let mut seen: HashSet<(PawnId, u8, PawnId, u8, Position, Position)> = HashSet::new();

    let movers: Vec<PawnId> = eligible_in_play(state, seat).map(|p| p.id).collect();
    for &p_id in &movers {
        for &q_id in &movers {
            if p_id == q_id {
                continue;
            }
            for a in 1..=6u8 {
                let b = 7 - a;
                for outcome1 in attempt_forward(&state.board, seat, p_id, a) {
                    let mut working = state.board.clone();
                    apply_outcome(&mut working, p_id, &outcome1);
                    for outcome2 in attempt_forward(&working, seat, q_id, b) {
                        let key = (p_id, a, q_id, b, outcome1.dest, outcome2.dest);
                        if !seen.insert(key) {
                            continue;
                        }
                        out.push(Move {
                            card,
                            seat,
                            pawn_id: p_id,
                            direction: Direction::Forward,
                            steps: a,
                            target_pawn_id: None,
                            secondary_pawn_id: Some(q_id),
                            secondary_direction: Some(Direction::Forward),
                            secondary_steps: Some(b),
                            dest_type: outcome1.dest.kind(),
                            dest_index: outcome1.dest.index(),
                            secondary_dest_type: Some(outcome2.dest.kind()),
                            secondary_dest_index: outcome2.dest.index(),
                        });
                    }
                }
            }
        }
    }
    out
}

/// Applies `mv` to `state`. Never trusts `mv`'s destination/bump fields —
/// only the identifiers and steps are used to re-derive the actual outcome
/// against the current board. `advance` controls whether the turn moves to
/// the next seat; the Turn Coordinator passes `false` for the first half of
/// a card-`2` extra draw.
pub fn apply_move(state: &mut GameState, mv: &Move, advance: bool) -> Result<(), RulesError> {
    if state.result != GameStateResult::Active {
        return Err(InvalidState);
    }
    if mv.seat != state.current_seat_index {
        return Err(InvalidState);
    }

    match mv.card {
        Card::Sorry => apply_sorry(state, mv)?,
        Card::Eleven if mv.target_pawn_id.is_some() => apply_switch(state, mv)?,
        Card::Seven if mv.secondary_pawn_id.is_some() => apply_split(state, mv)?,
        _ => apply_single_leg(state, mv)?,
    }

    state.deck.discard(mv.card);

    if state.seat_has_won(mv.seat) {
        state.winner_seat_index = Some(mv.seat);
        state.result = GameStateResult::Win;
    } else if advance {
        state.advance_turn();
    }
    Ok(())
}

fn apply_single_leg(state: &mut GameState, mv: &Move) -> Result<(), RulesError> {
    let pawn = state.pawn(mv.pawn_id).ok_or(InvalidState)?;
    if pawn.seat != mv.seat {
        return Err(InvalidState);
    }
    let outcome = match mv.direction {
        Direction::Forward => {
            if pawn.pos == Position::Start {
                attempt_leave_start(&state.board, mv.seat, mv.pawn_id)
            } else {
                attempt_forward(&state.board, mv.seat, mv.pawn_id, mv.steps)
                    .into_iter()
                    .find(|o| o.dest.kind() == mv.dest_type && o.dest.index() == mv.dest_index)
            }
        }
        Direction::Backward => attempt_backward(&state.board, mv.seat, mv.pawn_id, mv.steps),
    }
    .ok_or(IllegalMove)?;
    apply_outcome(&mut state.board, mv.pawn_id, &outcome);
    Ok(())
}

fn apply_switch(state: &mut GameState, mv: &Move) -> Result<(), RulesError> {
    let target = mv.target_pawn_id.ok_or(InvalidState)?;
    let p = state.pawn(mv.pawn_id).ok_or(InvalidState)?;
    let q = state.pawn(target).ok_or(InvalidState)?;
    if p.seat != mv.seat || q.seat == mv.seat {
        return Err(IllegalMove);
    }
    if !matches!(p.pos, Position::Track(_)) || !matches!(q.pos, Position::Track(_)) {
        return Err(IllegalMove);
    }
    let (p_pos, q_pos) = (p.pos, q.pos);
    state.pawn_mut(mv.pawn_id).unwrap().pos = q_pos;
    state.pawn_mut(target).unwrap().pos = p_pos;
    Ok(())
}

fn apply_sorry(state: &mut GameState, mv: &Move) -> Result<(), RulesError> {
    let target = mv.target_pawn_id.ok_or(InvalidState)?;
    let p = state.pawn(mv.pawn_id).ok_or(InvalidState)?;
    let q = state.pawn(target).ok_or(InvalidState)?;
    if p.seat != mv.seat || p.pos != Position::Start || q.seat == mv.seat {
        return Err(IllegalMove);
    }
    if !matches!(q.pos, Position::Track(_)) {
        return Err(IllegalMove);
    }
    let q_pos = q.pos;
    state.pawn_mut(target).unwrap().pos = Position::Start;
    state.pawn_mut(mv.pawn_id).unwrap().pos = q_pos;
    Ok(())
}

fn apply_split(state: &mut GameState, mv: &Move) -> Result<(), RulesError> {
    let secondary_id = mv.secondary_pawn_id.ok_or(InvalidState)?;
    let secondary_steps = mv.secondary_steps.ok_or(InvalidState)?;

    let outcome1 = attempt_forward(&state.board, mv.seat, mv.pawn_id, mv.steps)
        .into_iter()
        .find(|o| o.dest.kind() == mv.dest_type && o.dest.index() == mv.dest_index)
        .ok_or(IllegalMove)?;

    let mut working = state.board.clone();
    apply_outcome(&mut working, mv.pawn_id, &outcome1);

    let outcome2 = attempt_forward(&working, mv.seat, secondary_id, secondary_steps)
        .into_iter()
        .find(|o| {
            Some(o.dest.kind()) == mv.secondary_dest_type
                && o.dest.index() == mv.secondary_dest_index
        })
        .ok_or(IllegalMove)?;

    apply_outcome(&mut state.board, mv.pawn_id, &outcome1);
    apply_outcome(&mut state.board, secondary_id, &outcome2);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(max_seats: u8) -> GameState {
        GameState::new(max_seats, Some(42))
    }

    #[test]
    fn leaving_start_with_one_offers_four_identical_destinations() {
        let state = fresh(4);
        let moves = legal_moves(&state, SeatIndex::new(0), Card::One);
        assert_eq!(moves.len(), 4);
        for mv in &moves {
            assert_eq!(mv.dest_type, PositionKind::Track);
            assert_eq!(mv.dest_index, Some(geometry::start_exit(SeatIndex::new(0))));
        }
    }

    #[test]
    fn applying_leave_start_move_lands_on_exit_space() {
        let mut state = fresh(4);
        let moves = legal_moves(&state, SeatIndex::new(0), Card::One);
        apply_move(&mut state, &moves[0], true).unwrap();
        let pawn = state.pawn(moves[0].pawn_id).unwrap();
        assert_eq!(pawn.pos, Position::Track(geometry::start_exit(SeatIndex::new(0))));
        assert_eq!(state.current_seat_index, SeatIndex::new(1));
        assert_eq!(state.turn_number, 1);
    }

    #[test]
    fn slide_bumps_opponents_and_own_pawns_on_the_segment() {
        let mut state = fresh(4);
        let seat0 = SeatIndex::new(0);
        let seat1 = SeatIndex::new(1);
        let slide_start = geometry::first_slide_start(seat1);
        let slide_spaces = geometry::spaces_on_slide(slide_start);

        state.pawn_mut(PawnId::new(seat0, 0)).unwrap().pos = Position::Track(wrap_back(slide_start, 1));
        state.pawn_mut(PawnId::new(seat1, 1)).unwrap().pos = Position::Track(slide_spaces[2]);

        let moves = legal_moves(&state, seat0, Card::One);
        let mv = moves
            .iter()
            .find(|m| m.pawn_id == PawnId::new(seat0, 0))
            .unwrap()
            .clone();
        apply_move(&mut state, &mv, true).unwrap();

        let acting = state.pawn(PawnId::new(seat0, 0)).unwrap();
        assert_eq!(acting.pos, Position::Track(geometry::first_slide_end(seat1)));
        let bumped = state.pawn(PawnId::new(seat1, 1)).unwrap();
        assert_eq!(bumped.pos, Position::Start);
    }

    #[test]
    fn own_first_slide_dives_pawn_into_safety() {
        let mut state = fresh(4);
        let seat0 = SeatIndex::new(0);
        let slide_start = geometry::first_slide_start(seat0);
        state.pawn_mut(PawnId::new(seat0, 0)).unwrap().pos = Position::Track(wrap_back(slide_start, 1));

        let moves = legal_moves(&state, seat0, Card::One);
        let mv = moves[0].clone();
        apply_move(&mut state, &mv, true).unwrap();
        assert_eq!(state.pawn(PawnId::new(seat0, 0)).unwrap().pos, Position::Safety(0));
    }

    #[test]
    fn seven_split_must_total_seven_and_never_emits_zero_or_seven_leg() {
        let state = fresh(4);
        let seat0 = SeatIndex::new(0);
        let moves = enumerate_seven(&state, seat0, Card::Seven);
        for mv in moves.iter().filter(|m| m.secondary_pawn_id.is_some()) {
            let b = mv.secondary_steps.unwrap();
            assert_eq!(mv.steps + b, 7);
            assert_ne!(mv.steps, 0);
            assert_ne!(b, 0);
        }
    }

    #[test]
    fn sorry_with_no_start_pawn_yields_no_moves() {
        let mut state = fresh(4);
        let seat1 = SeatIndex::new(1);
        for (i, pawn) in state.pawns_of(seat1).map(|p| p.id).collect::<Vec<_>>().into_iter().enumerate() {
            state.pawn_mut(pawn).unwrap().pos = Position::Track(i as u8);
        }
        let moves = legal_moves(&state, seat1, Card::Sorry);
        assert!(moves.is_empty());
    }

    #[test]
    fn eleven_switch_swaps_positions() {
        let mut state = fresh(4);
        let seat0 = SeatIndex::new(0);
        let seat1 = SeatIndex::new(1);
        let p = PawnId::new(seat0, 0);
        let q = PawnId::new(seat1, 0);
        state.pawn_mut(p).unwrap().pos = Position::Track(10);
        state.pawn_mut(q).unwrap().pos = Position::Track(20);

        let moves = legal_moves(&state, seat0, Card::Eleven);
        let switch = moves
            .iter()
            .find(|m| m.target_pawn_id == Some(q))
            .unwrap()
            .clone();
        apply_move(&mut state, &switch, true).unwrap();
        assert_eq!(state.pawn(p).unwrap().pos, Position::Track(20));
        assert_eq!(state.pawn(q).unwrap().pos, Position::Track(10));
    }

    #[test]
    fn ten_offers_backward_one_only_when_forward_ten_impossible() {
        let mut state = fresh(4);
        let seat0 = SeatIndex::new(0);
        // Put every pawn in Safety near the end so forward 10 overshoots Home.
        for (i, pawn) in state.pawns_of(seat0).map(|p| p.id).collect::<Vec<_>>().into_iter().enumerate() {
            state.pawn_mut(pawn).unwrap().pos = Position::Safety(i as u8 % 4);
        }
        let moves = legal_moves(&state, seat0, Card::Ten);
        assert!(moves.iter().all(|m| m.direction == Direction::Backward && m.steps == 1));
    }

    #[test]
    fn win_sets_result_and_does_not_advance_turn() {
        let mut state = fresh(2);
        let seat0 = SeatIndex::new(0);
        let pawns: Vec<PawnId> = state.pawns_of(seat0).map(|p| p.id).collect();
        for id in &pawns[0..3] {
            state.pawn_mut(*id).unwrap().pos = Position::Home;
        }
        state.pawn_mut(pawns[3]).unwrap().pos = Position::Safety(4);

        let moves = legal_moves(&state, seat0, Card::Two);
        let winning = moves.iter().find(|m| m.pawn_id == pawns[3]).unwrap().clone();
        apply_move(&mut state, &winning, true).unwrap();

        assert_eq!(state.result, GameStateResult::Win);
        assert_eq!(state.winner_seat_index, Some(seat0));
        assert_eq!(state.current_seat_index, seat0);
    }

    fn wrap_back(space: u8, back: u8) -> u8 {
        ((space as i32 - back as i32).rem_euclid(60)) as u8
    }
}
