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

//! Lobby and session state layered on top of [`crate::board`]: who hosts a
//! game, which seats are open/joined/bot, and the record a client is shown.
//!
//! Nothing here runs rules logic directly — [`turn::TurnCoordinator`] is the
//! only caller of [`crate::board::moves`], and always through a
//! [`store::GameStore`] transaction.

pub mod error;
pub mod projection;
pub mod session;
pub mod store;
pub mod turn;

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use error::CoreError;

use crate::board::{Card, GameState, Move, SeatIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(u64);

impl GameId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn random() -> Self {
        use rand::Rng;
        Self(rand::thread_rng().gen())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    Active,
    Finished,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatStatus {
    Open,
    Joined,
    Bot,
}

/// One of a game's `maxSeats` slots. `last_player_id` survives a human →
/// bot conversion so [`session::rejoin`] can rebind the same user to the
/// same seat later, per the recorded-on-the-seat resolution of the rejoin
/// ambiguity (see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub status: SeatStatus,
    pub player_id: Option<UserId>,
    pub last_player_id: Option<UserId>,
    pub display_name: Option<String>,
}

impl Seat {
    pub fn open() -> Self {
        Self {
            status: SeatStatus::Open,
            player_id: None,
            last_player_id: None,
            display_name: None,
        }
    }

    pub fn joined(player_id: UserId, display_name: String) -> Self {
        Self {
            status: SeatStatus::Joined,
            player_id: Some(player_id),
            last_player_id: Some(player_id),
            display_name: Some(display_name),
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.status, SeatStatus::Bot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub max_seats: u8,
    pub deck_seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_seats: 4,
            deck_seed: None,
        }
    }
}

/// One completed or in-flight turn, appended to a game's history by
/// [`turn::TurnCoordinator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub index: u64,
    pub seat_index: SeatIndex,
    pub player_id: Option<UserId>,
    pub card: Card,
    pub chosen: Option<Move>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: GameId,
    pub host_id: UserId,
    pub host_name: String,
    pub created_at: u64,
    pub updated_at: u64,
    pub phase: Phase,
    pub settings: GameSettings,
    pub seats: Vec<Seat>,
    pub state: Option<GameState>,
    pub history: Vec<MoveRecord>,
    pub aborted_reason: Option<String>,
    /// Storage-layer optimistic-concurrency token; bumped on every
    /// successful `updateGame`.
    pub version: u64,
}

impl GameRecord {
    pub fn new(game_id: GameId, host_id: UserId, host_name: String, settings: GameSettings, now: u64) -> Self {
        let mut seats = vec![Seat::open(); settings.max_seats as usize];
        seats[0] = Seat::joined(host_id, host_name.clone());
        Self {
            game_id,
            host_id,
            host_name,
            created_at: now,
            updated_at: now,
            phase: Phase::Lobby,
            settings,
            seats,
            state: None,
            history: Vec::new(),
            aborted_reason: None,
            version: 0,
        }
    }

    pub fn occupied_seats(&self) -> usize {
        self.seats.iter().filter(|s| !matches!(s.status, SeatStatus::Open)).count()
    }

    pub fn human_seats(&self) -> usize {
        self.seats.iter().filter(|s| matches!(s.status, SeatStatus::Joined)).count()
    }

    pub fn open_seats(&self) -> usize {
        self.seats.iter().filter(|s| matches!(s.status, SeatStatus::Open)).count()
    }
}

/// Wall-clock seconds since the epoch, injected rather than read directly so
/// the rate-limit gate in [`turn::TurnCoordinator::bot_step`] stays testable.
pub fn now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_record_seats_host_at_zero_and_opens_the_rest() {
        let settings = GameSettings {
            max_seats: 3,
            deck_seed: None,
        };
        let record = GameRecord::new(GameId::new(1), UserId::new(7), "host".into(), settings, 0);
        assert_eq!(record.seats.len(), 3);
        assert_eq!(record.seats[0].player_id, Some(UserId::new(7)));
        assert_eq!(record.open_seats(), 2);
        assert_eq!(record.occupied_seats(), 1);
    }
}
