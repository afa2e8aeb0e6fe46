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

//! Stable, transport-mappable error kinds for the Session Manager, Turn
//! Coordinator, and Game Store. [`RulesError`](crate::board::RulesError) and
//! [`SelectorError`](crate::selector::SelectorError) are typed failures
//! internal to their layers; this is what those get converted into once they
//! cross into session/turn territory, alongside the lobby- and
//! store-specific kinds that only make sense at this level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::RulesError;
use crate::selector::SelectorError;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreError {
    #[error("no active game for this user")]
    NoActiveGame,
    #[error("user already has an active game")]
    AlreadyInGame,
    #[error("game settings are out of range")]
    InvalidSettings,
    #[error("caller is not the host")]
    NotHost,
    #[error("user is not seated in this game")]
    NotInGame,
    #[error("it is not this seat's turn")]
    NotYourTurn,
    #[error("game has not started")]
    GameNotStarted,
    #[error("game is already over")]
    GameOver,
    #[error("seat is not open")]
    SeatNotOpen,
    #[error("seat index is out of range")]
    InvalidSeat,
    #[error("seat 0 cannot be toggled")]
    CannotToggleHostSeat,
    #[error("fewer than two seats are occupied")]
    InsufficientPlayers,
    #[error("at least one human seat is required")]
    NoHumans,
    #[error("operation is only valid in the lobby phase")]
    LobbyOnly,
    #[error("operation is only valid while the game is active")]
    ActiveOnly,
    #[error("illegal move")]
    IllegalMove,
    #[error("no legal moves for this card")]
    NoLegalMoves,
    #[error("invalid game state")]
    InvalidState,
    #[error("a move selection is required")]
    MoveSelectionRequired,
    #[error("client move payload matched no legal move")]
    InvalidMoveSelectionNoMatch,
    #[error("client move payload matched more than one legal move")]
    InvalidMoveSelectionAmbiguous,
    #[error("transactional update conflict")]
    Conflict,
    #[error("not found")]
    NotFound,
}

impl CoreError {
    /// The stable, wire-facing error kind string.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NoActiveGame => "no_active_game",
            CoreError::AlreadyInGame => "already_in_game",
            CoreError::InvalidSettings => "invalid_settings",
            CoreError::NotHost => "not_host",
            CoreError::NotInGame => "not_in_game",
            CoreError::NotYourTurn => "not_your_turn",
            CoreError::GameNotStarted => "game_not_started",
            CoreError::GameOver => "game_over",
            CoreError::SeatNotOpen => "seat_not_open",
            CoreError::InvalidSeat => "invalid_seat",
            CoreError::CannotToggleHostSeat => "cannot_toggle_host_seat",
            CoreError::InsufficientPlayers => "insufficient_players",
            CoreError::NoHumans => "no_humans",
            CoreError::LobbyOnly => "lobby_only",
            CoreError::ActiveOnly => "active_only",
            CoreError::IllegalMove => "illegal_move",
            CoreError::NoLegalMoves => "no_legal_moves",
            CoreError::InvalidState => "invalid_state",
            CoreError::MoveSelectionRequired => "move_selection_required",
            CoreError::InvalidMoveSelectionNoMatch => "invalid_move_selection_no_match",
            CoreError::InvalidMoveSelectionAmbiguous => "invalid_move_selection_ambiguous",
            CoreError::Conflict => "conflict",
            CoreError::NotFound => "not_found",
        }
    }
}

impl From<RulesError> for CoreError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::NoLegalMoves => CoreError::NoLegalMoves,
            RulesError::IllegalMove => CoreError::IllegalMove,
            RulesError::InvalidState => CoreError::InvalidState,
        }
    }
}

impl From<SelectorError> for CoreError {
    fn from(err: SelectorError) -> Self {
        match err {
            SelectorError::NoLegalMoves => CoreError::NoLegalMoves,
            SelectorError::MoveSelectionRequired => CoreError::MoveSelectionRequired,
            SelectorError::NoMatch => CoreError::InvalidMoveSelectionNoMatch,
            SelectorError::Ambiguous => CoreError::InvalidMoveSelectionAmbiguous,
        }
    }
}

/// Maps an `anyhow::Error` bubbled up from a Session Manager or Turn
/// Coordinator entry point back to the stable kind string of §7, for a
/// transport layer to translate into an HTTP status. Any error that isn't
/// one of this crate's own typed failures reports as `"internal"`.
pub fn core_error_kind(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<CoreError>().map(CoreError::kind).unwrap_or("internal")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_match_the_stable_contract() {
        assert_eq!(CoreError::NoActiveGame.kind(), "no_active_game");
        assert_eq!(CoreError::InvalidMoveSelectionAmbiguous.kind(), "invalid_move_selection_ambiguous");
        assert_eq!(CoreError::Conflict.kind(), "conflict");
    }

    #[test]
    fn rules_errors_convert_to_the_matching_kind() {
        let err: CoreError = RulesError::IllegalMove.into();
        assert_eq!(err.kind(), "illegal_move");
    }

    #[test]
    fn core_error_kind_downcasts_an_anyhow_error() {
        let err: anyhow::Error = CoreError::NotYourTurn.into();
        assert_eq!(core_error_kind(&err), "not_your_turn");
    }

    #[test]
    fn core_error_kind_falls_back_to_internal_for_foreign_errors() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(core_error_kind(&err), "internal");
    }
}
