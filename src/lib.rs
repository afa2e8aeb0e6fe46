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

//! A server-authoritative engine for a four-seat Sorry!-style race game:
//! board geometry and rules in [`board`], client move resolution in
//! [`selector`], and the lobby/session/turn layer on top of both in
//! [`game`].
//!
//! [`game`] never touches [`board::moves`] directly except through
//! [`game::turn::TurnCoordinator`], and every mutation of a stored game goes
//! through a [`game::store::GameStore`] transaction — nothing here holds a
//! `GameRecord` outside of one.

pub mod board;
pub mod game;
pub mod selector;
