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

//! Pure functions mapping `(seat, position)` to the next position across the
//! shared 60-space track, the per-seat Safety Zones, and Home.
//!
//! Nothing in this module touches a [`GameState`](super::state::GameState) —
//! it only knows about indices. The Rules Engine ([`super::moves`]) is the
//! only caller; keeping this layer pure makes the movement arithmetic
//! testable in isolation from bumps, turns, or the deck.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pawn::{Position, SeatIndex};

/// Length of the shared track loop.
pub const TRACK_LEN: u8 = 60;
/// Number of track spaces a single seat's segment spans before the next
/// seat's segment begins.
pub const SEGMENT_LEN: u8 = 15;
/// Number of spaces in a first slide.
pub const FIRST_SLIDE_LEN: u8 = 4;
/// Number of spaces in a second slide.
pub const SECOND_SLIDE_LEN: u8 = 5;
/// Number of Safety slots per seat.
pub const SAFETY_LEN: u8 = 5;

#[inline]
fn wrap(index: i32) -> u8 {
    (index.rem_euclid(TRACK_LEN as i32)) as u8
}

/// First track index of seat `s`'s first slide.
#[inline]
pub fn first_slide_start(seat: SeatIndex) -> u8 {
    wrap(SEGMENT_LEN as i32 * seat.as_u8() as i32 + 1)
}

/// Last track index of seat `s`'s first slide (inclusive).
#[inline]
pub fn first_slide_end(seat: SeatIndex) -> u8 {
    wrap(first_slide_start(seat) as i32 + FIRST_SLIDE_LEN as i32 - 1)
}

/// First track index of seat `s`'s second slide.
#[inline]
pub fn second_slide_start(seat: SeatIndex) -> u8 {
    wrap(first_slide_start(seat) as i32 + FIRST_SLIDE_LEN as i32 + 5)
}

/// Last track index of seat `s`'s second slide (inclusive).
#[inline]
pub fn second_slide_end(seat: SeatIndex) -> u8 {
    wrap(second_slide_start(seat) as i32 + SECOND_SLIDE_LEN as i32 - 1)
}

/// Track space where a pawn exits Start and first enters the track.
#[inline]
pub fn start_exit(seat: SeatIndex) -> u8 {
    wrap(first_slide_end(seat) as i32 + 1)
}

/// Track space at which a forward move may divert into seat `s`'s Safety
/// Zone — the second space of `s`'s first slide.
#[inline]
pub fn safety_entry(seat: SeatIndex) -> u8 {
    wrap(first_slide_start(seat) as i32 + 1)
}

fn slide_spaces(start: u8, len: u8) -> Vec<u8> {
    (0..len).map(|i| wrap(start as i32 + i as i32)).collect()
}

/// All track spaces covered by seat `s`'s first slide.
pub fn first_slide_spaces(seat: SeatIndex) -> Vec<u8> {
    slide_spaces(first_slide_start(seat), FIRST_SLIDE_LEN)
}

/// All track spaces covered by seat `s`'s second slide.
pub fn second_slide_spaces(seat: SeatIndex) -> Vec<u8> {
    slide_spaces(second_slide_start(seat), SECOND_SLIDE_LEN)
}

/// Identifies which slide (if any) starts at `space`, and for which seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideRef {
    pub owner: SeatIndex,
    pub kind: SlideKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideKind {
    First,
    Second,
}

/// All seats the board is laid out for, regardless of how many are seated —
/// slide geometry is fixed at 4 colors; the house rule lets a pawn slide on
/// any of them, not just seats currently occupied.
fn all_seats() -> [SeatIndex; 4] {
    [
        SeatIndex::new(0),
        SeatIndex::new(1),
        SeatIndex::new(2),
        SeatIndex::new(3),
    ]
}

/// Returns the slide starting at `space`, if any.
pub fn is_slide_start(space: u8) -> Option<SlideRef> {
    for seat in all_seats() {
        if first_slide_start(seat) == space {
            return Some(SlideRef {
                owner: seat,
                kind: SlideKind::First,
            });
        }
        if second_slide_start(seat) == space {
            return Some(SlideRef {
                owner: seat,
                kind: SlideKind::Second,
            });
        }
    }
    None
}

/// Last track space of the slide starting at `space`. Panics if `space` is
/// not a slide start; callers must check with [`is_slide_start`] first.
pub fn slide_end_from_start(space: u8) -> u8 {
    match is_slide_start(space) {
        Some(SlideRef {
            owner,
            kind: SlideKind::First,
        }) => first_slide_end(owner),
        Some(SlideRef {
            owner,
            kind: SlideKind::Second,
        }) => second_slide_end(owner),
        None => panic!("slide_end_from_start called on a non-slide-start space"),
    }
}

/// All track spaces on the slide starting at `space`.
pub fn spaces_on_slide(slide_start: u8) -> Vec<u8> {
    match is_slide_start(slide_start) {
        Some(SlideRef {
            owner,
            kind: SlideKind::First,
        }) => first_slide_spaces(owner),
        Some(SlideRef {
            owner,
            kind: SlideKind::Second,
        }) => second_slide_spaces(owner),
        None => Vec::new(),
    }
}

/// True when landing on `slide_start` triggers seat `seat`'s own house-ruled
/// slide-into-safety: `slide_start` is the start of `seat`'s own first slide,
/// which houses that seat's safety entry as its second space. Rather than
/// sliding through to the first slide's literal end, the house rule carries
/// the pawn straight into `seat`'s Safety[0].
pub fn is_safety_entry_slide_end(seat: SeatIndex, slide_start: u8) -> bool {
    matches!(
        is_slide_start(slide_start),
        Some(SlideRef {
            owner,
            kind: SlideKind::First,
        }) if owner == seat
    )
}

/// Candidate forward landing spots for a pawn at `pos` moving `k` spaces.
///
/// Returns zero, one, or two positions:
/// * Zero means the move overshoots Home and is illegal.
/// * One is the ordinary case.
/// * Two happens only when the walk passes seat `seat`'s own safety entry
///   with at least one step remaining afterward — the pawn may choose to
///   stay on the track or divert into Safety. Both hypothetical outcomes
///   are returned; the Rules Engine decides which (if either) is legal once
///   bumps and occupancy are considered.
pub fn forward(seat: SeatIndex, pos: Position, k: u8) -> Vec<Position> {
    match pos {
        Position::Start | Position::Home => Vec::new(),
        Position::Track(idx) => {
            let entry = safety_entry(seat);
            let j = wrap(entry as i32 - idx as i32);
            let track_result = Position::Track(wrap(idx as i32 + k as i32));
            if j as u32 <= k as u32 {
                let remaining = k - j;
                if remaining == 0 {
                    vec![track_result]
                } else {
                    let mut out = vec![track_result];
                    if let Some(divert) = safety_offset(remaining) {
                        out.push(divert);
                    }
                    out
                }
            } else {
                vec![track_result]
            }
        }
        Position::Safety(i) => match safety_offset(i + k) {
            Some(p) => vec![p],
            None => Vec::new(),
        },
    }
}

fn safety_offset(remaining: u8) -> Option<Position> {
    match remaining {
        1..=SAFETY_LEN => Some(Position::Safety(remaining - 1)),
        n if n == SAFETY_LEN + 1 => Some(Position::Home),
        _ => None,
    }
}

/// Candidate backward landing spot for a pawn at `pos` moving `k` spaces.
/// `None` means the move is illegal (Start or Home can't move backward).
pub fn backward(seat: SeatIndex, pos: Position, k: u8) -> Option<Position> {
    match pos {
        Position::Start | Position::Home => None,
        Position::Track(idx) => Some(Position::Track(wrap(idx as i32 - k as i32))),
        Position::Safety(i) => {
            if k <= i {
                Some(Position::Safety(i - k))
            } else {
                let exit_point = wrap(safety_entry(seat) as i32 - 1);
                let remaining_after_exit = k - i - 1;
                Some(Position::Track(wrap(
                    exit_point as i32 - remaining_after_exit as i32,
                )))
            }
        }
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlideKind::First => write!(f, "first"),
            SlideKind::Second => write!(f, "second"),
        }
    }
}
