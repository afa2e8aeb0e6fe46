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

//! Lobby lifecycle: hosting, joining, seat configuration, kicks, leaves,
//! starting, and rejoin rebinding. Every mutation goes through a
//! [`GameStore`] transaction; `SessionManager` holds no state of its own.

use crate::board::GameState;

use super::error::CoreError;
use super::store::{with_retries, GameStore};
use super::{GameId, GameRecord, GameSettings, Phase, Seat, SeatIndex, SeatStatus, UserId};

pub struct SessionManager<'s, S: GameStore> {
    store: &'s S,
}

impl<'s, S: GameStore> SessionManager<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn host(&self, user_id: UserId, display_name: String, max_seats: u8) -> anyhow::Result<GameRecord> {
        if !(2..=4).contains(&max_seats) {
            return Err(CoreError::InvalidSettings.into());
        }
        if self.store.get_active_game(user_id)?.is_some() {
            return Err(CoreError::AlreadyInGame.into());
        }
        let settings = GameSettings {
            max_seats,
            deck_seed: None,
        };
        let record = GameRecord::new(GameId::random(), user_id, display_name, settings, super::now_seconds());
        self.store.create_game(record.clone())?;
        self.store.set_active_game(user_id, Some(record.game_id))?;
        log::info!("game {:?} hosted by {:?}", record.game_id, user_id);
        Ok(record)
    }

    pub fn list_joinable(&self) -> anyhow::Result<Vec<GameRecord>> {
        let games = self.store.list_games()?;
        Ok(games
            .into_iter()
            .filter(|g| matches!(g.phase, Phase::Lobby) && g.open_seats() > 0)
            .collect())
    }

    pub fn join(&self, user_id: UserId, game_id: GameId, display_name: String) -> anyhow::Result<GameRecord> {
        if self.store.get_active_game(user_id)?.is_some() {
            return Err(CoreError::AlreadyInGame.into());
        }
        let record = with_retries(|| {
            self.store.update_game(game_id, |record| {
                if !matches!(record.phase, Phase::Lobby) {
                    return Err(CoreError::LobbyOnly);
                }
                let seat = record
                    .seats
                    .iter_mut()
                    .find(|s| matches!(s.status, SeatStatus::Open))
                    .ok_or(CoreError::SeatNotOpen)?;
                *seat = Seat::joined(user_id, display_name.clone());
                Ok(())
            })
        })?;
        self.store.set_active_game(user_id, Some(game_id))?;
        Ok(record)
    }

    pub fn configure_seat(
        &self,
        user_id: UserId,
        game_id: GameId,
        seat_index: SeatIndex,
        is_bot: bool,
    ) -> anyhow::Result<GameRecord> {
        let mut cleared_user = None;
        let record = with_retries(|| {
            cleared_user = None;
            self.store.update_game(game_id, |record| {
                if record.host_id != user_id {
                    return Err(CoreError::NotHost);
                }
                if !matches!(record.phase, Phase::Lobby) {
                    return Err(CoreError::LobbyOnly);
                }
                let idx = seat_index.as_usize();
                if idx == 0 {
                    return Err(CoreError::CannotToggleHostSeat);
                }
                let seat = record.seats.get_mut(idx).ok_or(CoreError::InvalidSeat)?;
                if is_bot {
                    cleared_user = seat.player_id.take();
                    seat.status = SeatStatus::Bot;
                } else {
                    seat.player_id = None;
                    seat.last_player_id = None;
                    seat.display_name = None;
                    seat.status = SeatStatus::Open;
                }
                Ok(())
            })
        })?;
        if let Some(uid) = cleared_user {
            self.store.set_active_game(uid, None)?;
        }
        Ok(record)
    }

    pub fn kick(&self, user_id: UserId, game_id: GameId, seat_index: SeatIndex) -> anyhow::Result<GameRecord> {
        let mut cleared_user = None;
        let record = with_retries(|| {
            cleared_user = None;
            self.store.update_game(game_id, |record| {
                if record.host_id != user_id {
                    return Err(CoreError::NotHost);
                }
                if !matches!(record.phase, Phase::Lobby | Phase::Active) {
                    return Err(CoreError::GameOver);
                }
                let idx = seat_index.as_usize();
                let seat = record.seats.get_mut(idx).ok_or(CoreError::InvalidSeat)?;
                cleared_user = seat.player_id.take();
                seat.status = SeatStatus::Bot;
                Ok(())
            })
        })?;
        if let Some(uid) = cleared_user {
            self.store.set_active_game(uid, None)?;
        }
        Ok(record)
    }

    pub fn leave(&self, user_id: UserId, game_id: GameId) -> anyhow::Result<GameRecord> {
        let mut cleared_users: Vec<UserId> = Vec::new();
        let record = with_retries(|| {
            cleared_users.clear();
            self.store.update_game(game_id, |record| {
                if record.host_id == user_id {
                    for seat in &mut record.seats {
                        if let Some(uid) = seat.player_id.take() {
                            cleared_users.push(uid);
                        }
                    }
                    record.phase = Phase::Aborted;
                    record.aborted_reason = Some("host left".into());
                    if let Some(state) = &mut record.state {
                        state.result = crate::board::GameStateResult::Aborted;
                    }
                    log::warn!("game {:?} aborted: host {:?} left", record.game_id, user_id);
                    Ok(())
                } else {
                    let seat = record
                        .seats
                        .iter_mut()
                        .find(|s| s.player_id == Some(user_id))
                        .ok_or(CoreError::NotInGame)?;
                    seat.player_id = None;
                    seat.status = SeatStatus::Bot;
                    cleared_users.push(user_id);
                    Ok(())
                }
            })
        })?;
        for uid in cleared_users {
            self.store.set_active_game(uid, None)?;
        }
        Ok(record)
    }

    /// Moves a lobby game to `active`. Any seat still `Open` becomes a bot
    /// seat first — the turn cycle walks every seat in `0..maxSeats`
    /// regardless of status, so an unconverted open seat would stall the
    /// game on a seat nothing ever plays for.
    pub fn start(&self, user_id: UserId, game_id: GameId) -> anyhow::Result<GameRecord> {
        let record = with_retries(|| {
            self.store.update_game(game_id, |record| {
                if record.host_id != user_id {
                    return Err(CoreError::NotHost);
                }
                if !matches!(record.phase, Phase::Lobby) {
                    return Err(CoreError::LobbyOnly);
                }
                if record.occupied_seats() < 2 {
                    return Err(CoreError::InsufficientPlayers);
                }
                if record.human_seats() < 1 {
                    return Err(CoreError::NoHumans);
                }
                for seat in &mut record.seats {
                    if matches!(seat.status, SeatStatus::Open) {
                        seat.status = SeatStatus::Bot;
                    }
                }
                record.state = Some(GameState::new(record.settings.max_seats, record.settings.deck_seed));
                record.phase = Phase::Active;
                Ok(())
            })
        })?;
        Ok(record)
    }

    /// Finds an active game where `user_id` previously held a seat now
    /// marked bot, and rebinds them to it. The active-game mapping is
    /// cleared on every bot conversion, so lookup goes through
    /// [`GameStore::list_games`] matching on `Seat::last_player_id` rather
    /// than `getActiveGame` — see `DESIGN.md` for why.
    pub fn rejoin(&self, user_id: UserId) -> anyhow::Result<GameRecord> {
        let target_id = self
            .store
            .list_games()?
            .into_iter()
            .find(|g| {
                matches!(g.phase, Phase::Active)
                    && g.seats.iter().any(|s| s.is_bot() && s.last_player_id == Some(user_id))
            })
            .map(|g| g.game_id)
            .ok_or(CoreError::NoActiveGame)?;

        let record = with_retries(|| {
            self.store.update_game(target_id, |record| {
                let seat = record
                    .seats
                    .iter_mut()
                    .find(|s| s.is_bot() && s.last_player_id == Some(user_id))
                    .ok_or(CoreError::NoActiveGame)?;
                seat.status = SeatStatus::Joined;
                seat.player_id = Some(user_id);
                Ok(())
            })
        })?;
        self.store.set_active_game(user_id, Some(target_id))?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::store::InMemoryGameStore;

    fn manager(store: &InMemoryGameStore) -> SessionManager<'_, InMemoryGameStore> {
        SessionManager::new(store)
    }

    #[test]
    fn host_then_second_host_attempt_rejected_while_active_game_exists() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let user = UserId::new(1);
        mgr.host(user, "alice".into(), 4).unwrap();
        let err = mgr.host(user, "alice-again".into(), 4).unwrap_err();
        assert_eq!(err.downcast::<CoreError>().unwrap(), CoreError::AlreadyInGame);
    }

    #[test]
    fn host_rejects_max_seats_outside_two_to_four() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let err = mgr.host(UserId::new(1), "alice".into(), 0).unwrap_err();
        assert_eq!(err.downcast::<CoreError>().unwrap(), CoreError::InvalidSettings);
        let err = mgr.host(UserId::new(2), "bob".into(), 5).unwrap_err();
        assert_eq!(err.downcast::<CoreError>().unwrap(), CoreError::InvalidSettings);
    }

    #[test]
    fn join_claims_lowest_open_seat() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        let joined = mgr.join(joiner, record.game_id, "joiner".into()).unwrap();
        assert_eq!(joined.seats[1].player_id, Some(joiner));
    }

    #[test]
    fn start_requires_two_occupied_seats() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        let err = mgr.start(host, record.game_id).unwrap_err();
        assert_eq!(err.downcast::<CoreError>().unwrap(), CoreError::InsufficientPlayers);
    }

    #[test]
    fn start_succeeds_with_host_and_one_joiner() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        mgr.join(joiner, record.game_id, "joiner".into()).unwrap();
        let started = mgr.start(host, record.game_id).unwrap();
        assert!(matches!(started.phase, Phase::Active));
        assert!(started.state.is_some());
    }

    #[test]
    fn start_converts_leftover_open_seats_to_bots() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        mgr.join(joiner, record.game_id, "joiner".into()).unwrap();
        let started = mgr.start(host, record.game_id).unwrap();
        assert!(started.seats[2].is_bot());
        assert!(started.seats[3].is_bot());
    }

    #[test]
    fn kick_after_game_finishes_is_rejected() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        mgr.join(joiner, record.game_id, "joiner".into()).unwrap();
        mgr.start(host, record.game_id).unwrap();
        store
            .update_game(record.game_id, |r| {
                r.phase = Phase::Finished;
                Ok(())
            })
            .unwrap();
        let err = mgr.kick(host, record.game_id, SeatIndex::new(1)).unwrap_err();
        assert_eq!(err.downcast::<CoreError>().unwrap(), CoreError::GameOver);
    }

    #[test]
    fn leave_as_non_host_converts_seat_to_bot_and_clears_mapping() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        mgr.join(joiner, record.game_id, "joiner".into()).unwrap();
        let after = mgr.leave(joiner, record.game_id).unwrap();
        assert!(after.seats[1].is_bot());
        assert_eq!(store.get_active_game(joiner).unwrap(), None);
    }

    #[test]
    fn host_leaving_active_game_aborts_it_for_everyone() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        mgr.join(joiner, record.game_id, "joiner".into()).unwrap();
        mgr.start(host, record.game_id).unwrap();
        let after = mgr.leave(host, record.game_id).unwrap();
        assert!(matches!(after.phase, Phase::Aborted));
        assert_eq!(store.get_active_game(joiner).unwrap(), None);
    }

    #[test]
    fn rejoin_rebinds_a_previously_kicked_seat() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let host = UserId::new(1);
        let joiner = UserId::new(2);
        let record = mgr.host(host, "host".into(), 4).unwrap();
        mgr.join(joiner, record.game_id, "joiner".into()).unwrap();
        mgr.start(host, record.game_id).unwrap();
        mgr.kick(host, record.game_id, SeatIndex::new(1)).unwrap();

        let rejoined = mgr.rejoin(joiner).unwrap();
        assert_eq!(rejoined.seats[1].player_id, Some(joiner));
        assert_eq!(store.get_active_game(joiner).unwrap(), Some(record.game_id));
    }

    #[test]
    fn rejoin_with_no_eligible_seat_fails() {
        let store = InMemoryGameStore::new();
        let mgr = manager(&store);
        let err = mgr.rejoin(UserId::new(999)).unwrap_err();
        assert_eq!(err.downcast::<CoreError>().unwrap(), CoreError::NoActiveGame);
    }
}
