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

//! The persistence contract the Session Manager and Turn Coordinator run
//! against, plus an in-memory reference implementation. A replicated or
//! document-store backend can implement [`GameStore`] directly; only
//! [`InMemoryGameStore`] ships here.

use std::collections::HashMap;
use std::sync::Mutex;

use super::error::CoreError;
use super::{GameId, GameRecord, MoveRecord, UserId};

pub trait GameStore: Send + Sync {
    fn create_game(&self, record: GameRecord) -> Result<(), CoreError>;
    fn get_game(&self, game_id: GameId) -> Result<GameRecord, CoreError>;

    /// Applies `f` to the current record and persists the result atomically.
    /// Implementations backed by a real transaction should retry internally
    /// on a lost compare-and-set before giving up; callers additionally wrap
    /// their own call sites with [`with_retries`] for the bounded-retry
    /// contract described in the error handling design.
    fn update_game<F>(&self, game_id: GameId, f: F) -> Result<GameRecord, CoreError>
    where
        F: FnMut(&mut GameRecord) -> Result<(), CoreError>;

    fn append_move(&self, game_id: GameId, record: MoveRecord) -> Result<(), CoreError>;
    fn set_active_game(&self, user_id: UserId, game_id: Option<GameId>) -> Result<(), CoreError>;
    fn get_active_game(&self, user_id: UserId) -> Result<Option<GameId>, CoreError>;

    /// Enumerates every stored game. Needed by `listJoinable` and `rejoin`,
    /// neither of which is keyed by a single `gameId`.
    fn list_games(&self) -> Result<Vec<GameRecord>, CoreError>;
}

/// Number of times a caller should retry a [`GameStore::update_game`] call
/// that reports [`CoreError::Conflict`] before surfacing it to the client.
pub const MAX_UPDATE_RETRIES: u32 = 3;

/// Runs `op` up to [`MAX_UPDATE_RETRIES`] times, retrying only on
/// `CoreError::Conflict`. Any other error, or final exhaustion, is returned
/// immediately.
pub fn with_retries<T>(mut op: impl FnMut() -> Result<T, CoreError>) -> Result<T, CoreError> {
    let mut last_err = CoreError::Conflict;
    for attempt in 0..MAX_UPDATE_RETRIES {
        match op() {
            Ok(value) => return Ok(value),
            Err(CoreError::Conflict) => {
                log::warn!("store update conflict, attempt {}/{}", attempt + 1, MAX_UPDATE_RETRIES);
                last_err = CoreError::Conflict;
            }
            Err(other) => return Err(other),
        }
    }
    log::warn!("store update giving up after {} attempts", MAX_UPDATE_RETRIES);
    Err(last_err)
}

#[derive(Default)]
pub struct InMemoryGameStore {
    games: Mutex<HashMap<GameId, GameRecord>>,
    active: Mutex<HashMap<UserId, GameId>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryGameStore {
    fn create_game(&self, record: GameRecord) -> Result<(), CoreError> {
        let mut games = self.games.lock().unwrap();
        games.insert(record.game_id, record);
        Ok(())
    }

    fn get_game(&self, game_id: GameId) -> Result<GameRecord, CoreError> {
        let games = self.games.lock().unwrap();
        games.get(&game_id).cloned().ok_or(CoreError::NotFound)
    }

    fn update_game<F>(&self, game_id: GameId, mut f: F) -> Result<GameRecord, CoreError>
    where
        F: FnMut(&mut GameRecord) -> Result<(), CoreError>,
    {
        let mut games = self.games.lock().unwrap();
        let mut candidate = games.get(&game_id).ok_or(CoreError::NotFound)?.clone();
        f(&mut candidate)?;
        candidate.version += 1;
        games.insert(game_id, candidate.clone());
        Ok(candidate)
    }

    fn append_move(&self, game_id: GameId, move_record: MoveRecord) -> Result<(), CoreError> {
        let mut games = self.games.lock().unwrap();
        let record = games.get_mut(&game_id).ok_or(CoreError::NotFound)?;
        record.history.push(move_record);
        Ok(())
    }

    fn set_active_game(&self, user_id: UserId, game_id: Option<GameId>) -> Result<(), CoreError> {
        let mut active = self.active.lock().unwrap();
        match game_id {
            Some(id) => {
                active.insert(user_id, id);
            }
            None => {
                active.remove(&user_id);
            }
        }
        Ok(())
    }

    fn get_active_game(&self, user_id: UserId) -> Result<Option<GameId>, CoreError> {
        let active = self.active.lock().unwrap();
        Ok(active.get(&user_id).copied())
    }

    fn list_games(&self) -> Result<Vec<GameRecord>, CoreError> {
        let games = self.games.lock().unwrap();
        Ok(games.values().cloned().collect())
    }
}
