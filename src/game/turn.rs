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

//! Drives one turn: draw, pick a legal move, apply it, advance. The only
//! caller of [`crate::board::moves::legal_moves`] and
//! [`crate::board::moves::apply_move`]; everything runs inside one
//! [`GameStore::update_game`] transaction so a rejected move never leaves a
//! card half-drawn.

use crate::board::{self, Card, GameStateResult};
use crate::selector::{self, ClientMovePayload};

use super::error::CoreError;
use super::store::{with_retries, GameStore};
use super::{now_seconds, GameId, GameRecord, MoveRecord, Phase, UserId};

/// Bots wait at least this long between turns so a human watching the board
/// can follow what happened.
pub const BOT_MIN_DELAY_SECS: u64 = 1;

pub struct TurnCoordinator<'s, S: GameStore> {
    store: &'s S,
}

impl<'s, S: GameStore> TurnCoordinator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Plays the current seat's turn for a human player. Draws a card,
    /// computes the legal moves for it, resolves `payload` against them, and
    /// applies the chosen move. `NoLegalMoves` still commits the draw and
    /// advances the turn; every other selection failure aborts the whole
    /// transaction so the card is never consumed.
    pub fn play_human(
        &self,
        user_id: UserId,
        game_id: GameId,
        payload: ClientMovePayload,
    ) -> anyhow::Result<GameRecord> {
        let record = with_retries(|| {
            self.store.update_game(game_id, |record| {
                let seat_index = current_human_seat(record, user_id)?;
                play_turn(record, seat_index, Some(user_id), &payload)
            })
        })?;
        Ok(record)
    }

    /// Plays one bot turn if the current seat is a bot and the rate-limit
    /// gate has cleared. Returns `Ok(None)` without mutating anything when
    /// it isn't a bot's turn yet or the gate hasn't cleared.
    pub fn bot_step(&self, game_id: GameId) -> anyhow::Result<Option<GameRecord>> {
        let record = self.store.get_game(game_id)?;
        if !matches!(record.phase, Phase::Active) {
            return Ok(None);
        }
        let state = record.state.as_ref().ok_or(CoreError::GameNotStarted)?;
        let seat = state.current_seat_index;
        let is_bot = record
            .seats
            .get(seat.as_usize())
            .map(|s| s.is_bot())
            .unwrap_or(false);
        if !is_bot {
            return Ok(None);
        }
        if now_seconds().saturating_sub(record.updated_at) < BOT_MIN_DELAY_SECS {
            log::debug!("bot step for game {:?} skipped, rate limit not cleared", game_id);
            return Ok(None);
        }

        let updated = with_retries(|| {
            self.store.update_game(game_id, |record| {
                let state = record.state.as_ref().ok_or(CoreError::GameNotStarted)?;
                let seat = state.current_seat_index;
                play_turn(record, seat, None, &ClientMovePayload::default())
            })
        })?;
        Ok(Some(updated))
    }
}

fn current_human_seat(record: &GameRecord, user_id: UserId) -> Result<board::SeatIndex, CoreError> {
    if !matches!(record.phase, Phase::Active) {
        return Err(CoreError::GameNotStarted);
    }
    let state = record.state.as_ref().ok_or(CoreError::InvalidState)?;
    let seat_index = state.current_seat_index;
    let seat = record.seats.get(seat_index.as_usize()).ok_or(CoreError::InvalidState)?;
    if seat.player_id != Some(user_id) {
        return Err(CoreError::NotYourTurn);
    }
    Ok(seat_index)
}

/// Shared core of `play_human` and `bot_step`, run inside the store
/// transaction closure. `actor` is `None` for a bot-driven turn.
fn play_turn(
    record: &mut GameRecord,
    seat_index: board::SeatIndex,
    actor: Option<UserId>,
    payload: &ClientMovePayload,
) -> Result<(), CoreError> {
    if !matches!(record.phase, Phase::Active) {
        return Err(CoreError::GameNotStarted);
    }
    let state = record.state.as_mut().ok_or(CoreError::InvalidState)?;
    if state.result != GameStateResult::Active {
        return Err(CoreError::GameOver);
    }
    if state.current_seat_index != seat_index {
        return Err(CoreError::NotYourTurn);
    }

    let card = state.deck.draw();
    let moves = board::legal_moves(state, seat_index, card);

    if moves.is_empty() {
        state.deck.discard(card);
        state.advance_turn();
        record.history.push(MoveRecord {
            index: record.history.len() as u64,
            seat_index,
            player_id: actor,
            card,
            chosen: None,
        });
        record.updated_at = now_seconds();
        return Ok(());
    }

    let chosen_index = if actor.is_some() {
        selector::select_move(&moves, payload)?
    } else {
        bot_choice(moves.len())
    };
    let chosen = moves[chosen_index].clone();

    board::apply_move(state, &chosen, false)?;
    state.deck.discard(card);

    if matches!(card, Card::Two) && state.result == GameStateResult::Active {
        play_extra_draw(state, seat_index, actor, payload)?;
    }
    if state.result == GameStateResult::Active {
        state.advance_turn();
    }

    record.history.push(MoveRecord {
        index: record.history.len() as u64,
        seat_index,
        player_id: actor,
        card,
        chosen: Some(chosen),
    });
    record.updated_at = now_seconds();
    Ok(())
}

/// Card 2 draws again and, if the second card has a legal move, applies it
/// too; the extra card is discarded either way. A card-2 drawn as the extra
/// card does not chain further — the fallback-only reading of the rules.
fn play_extra_draw(
    state: &mut board::GameState,
    seat_index: board::SeatIndex,
    actor: Option<UserId>,
    payload: &ClientMovePayload,
) -> Result<(), CoreError> {
    let card = state.deck.draw();
    let moves = board::legal_moves(state, seat_index, card);
    if moves.is_empty() {
        state.deck.discard(card);
        return Ok(());
    }
    let chosen_index = if actor.is_some() {
        match selector::select_move(&moves, payload) {
            Ok(idx) => idx,
            Err(_) => 0,
        }
    } else {
        bot_choice(moves.len())
    };
    let chosen = moves[chosen_index].clone();
    board::apply_move(state, &chosen, false)?;
    state.deck.discard(card);
    Ok(())
}

fn bot_choice(len: usize) -> usize {
    use rand::Rng;
    if len <= 1 {
        0
    } else {
        rand::thread_rng().gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::store::InMemoryGameStore;
    use crate::game::{GameSettings, SeatStatus};

    fn started_game(store: &InMemoryGameStore) -> (GameId, UserId, UserId) {
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let settings = GameSettings {
            max_seats: 2,
            deck_seed: Some(42),
        };
        let mut record = GameRecord::new(GameId::new(1), host, "host".into(), settings, 0);
        record.seats[1] = super::super::Seat::joined(joiner, "joiner".into());
        record.state = Some(board::GameState::new(2, Some(42)));
        record.phase = Phase::Active;
        store.create_game(record).unwrap();
        (GameId::new(1), host, joiner)
    }

    #[test]
    fn non_current_seat_cannot_play() {
        let store = InMemoryGameStore::new();
        let (game_id, _host, joiner) = started_game(&store);
        let coordinator = TurnCoordinator::new(&store);
        let err = coordinator
            .play_human(joiner, game_id, ClientMovePayload::default())
            .unwrap_err();
        assert_eq!(err.downcast::<CoreError>().unwrap(), CoreError::NotYourTurn);
    }

    #[test]
    fn current_seat_can_play_a_turn_and_history_grows() {
        let store = InMemoryGameStore::new();
        let (game_id, host, _joiner) = started_game(&store);
        let coordinator = TurnCoordinator::new(&store);
        let updated = coordinator.play_human(host, game_id, ClientMovePayload::default()).unwrap();
        assert_eq!(updated.history.len(), 1);
    }

    #[test]
    fn bot_step_is_noop_when_current_seat_is_human() {
        let store = InMemoryGameStore::new();
        let (game_id, _host, _joiner) = started_game(&store);
        let coordinator = TurnCoordinator::new(&store);
        assert!(coordinator.bot_step(game_id).unwrap().is_none());
    }

    #[test]
    fn bot_step_plays_for_a_bot_seat_once_rate_limit_clears() {
        let store = InMemoryGameStore::new();
        let (game_id, _host, _joiner) = started_game(&store);
        store
            .update_game(game_id, |record| {
                record.seats[0].status = SeatStatus::Bot;
                record.updated_at = 0;
                Ok(())
            })
            .unwrap();
        let coordinator = TurnCoordinator::new(&store);
        let result = coordinator.bot_step(game_id).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().history.len(), 1);
    }
}
