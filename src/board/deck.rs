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

//! Card composition, seeded shuffling, and draw/discard/rebuild semantics.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Card {
    One,
    Two,
    Three,
    Four,
    Five,
    Seven,
    Eight,
    Ten,
    Eleven,
    Twelve,
    Sorry,
}

impl Card {
    /// How many copies of this card are in a fresh 45-card deck.
    pub fn count_in_fresh_deck(&self) -> usize {
        match self {
            Card::One => 5,
            _ => 4,
        }
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            Card::One => Some(1),
            Card::Two => Some(2),
            Card::Three => Some(3),
            Card::Four => Some(4),
            Card::Five => Some(5),
            Card::Seven => Some(7),
            Card::Eight => Some(8),
            Card::Ten => Some(10),
            Card::Eleven => Some(11),
            Card::Twelve => Some(12),
            Card::Sorry => None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Card::One => "1",
            Card::Two => "2",
            Card::Three => "3",
            Card::Four => "4",
            Card::Five => "5",
            Card::Seven => "7",
            Card::Eight => "8",
            Card::Ten => "10",
            Card::Eleven => "11",
            Card::Twelve => "12",
            Card::Sorry => "Sorry!",
        };
        write!(f, "{name}")
    }
}

fn fresh_multiset() -> Vec<Card> {
    use strum::IntoEnumIterator;
    let mut cards = Vec::with_capacity(45);
    for card in Card::iter() {
        for _ in 0..card.count_in_fresh_deck() {
            cards.push(card);
        }
    }
    cards
}

/// The deck and discard pile for one game. Owns the RNG continuation so a
/// rebuild-on-exhaust reshuffles deterministically when a seed was given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    discard: Vec<Card>,
    seed: Option<u64>,
    rng_state: u64,
}

impl Deck {
    /// Builds and shuffles a fresh 45-card deck. `seed`, if given, makes the
    /// shuffle (and every subsequent rebuild) deterministic.
    pub fn new(seed: Option<u64>) -> Self {
        let mut deck = Self {
            cards: Vec::new(),
            discard: Vec::new(),
            seed,
            rng_state: seed.unwrap_or(0),
        };
        let mut cards = fresh_multiset();
        deck.shuffle(&mut cards);
        deck.cards = cards;
        deck
    }

    fn shuffle(&mut self, cards: &mut Vec<Card>) {
        match self.seed {
            Some(_) => {
                let mut rng = StdRng::seed_from_u64(self.rng_state);
                cards.shuffle(&mut rng);
                self.rng_state = self.rng_state.wrapping_add(1);
            }
            None => {
                let mut rng = rand::thread_rng();
                cards.shuffle(&mut rng);
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    /// The discard pile in play order. Unlike the draw pile, discards are
    /// face-up and public.
    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    /// Pops the top card, rebuilding from the discard pile first if the deck
    /// is empty.
    pub fn draw(&mut self) -> Card {
        if self.cards.is_empty() {
            self.rebuild();
        }
        self.cards
            .pop()
            .expect("deck rebuild guarantees at least one card when discard is non-empty")
    }

    pub fn discard(&mut self, card: Card) {
        self.discard.push(card);
    }

    fn rebuild(&mut self) {
        let mut cards = std::mem::take(&mut self.discard);
        self.shuffle(&mut cards);
        self.cards = cards;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn fresh_deck_has_exactly_45_cards_with_spec_composition() {
        let deck = Deck::new(None);
        assert_eq!(deck.remaining(), 45);
        let mut counts: HashMap<Card, usize> = HashMap::new();
        for card in &deck.cards {
            *counts.entry(*card).or_insert(0) += 1;
        }
        assert_eq!(counts[&Card::One], 5);
        for card in [
            Card::Sorry,
            Card::Two,
            Card::Three,
            Card::Four,
            Card::Five,
            Card::Seven,
            Card::Eight,
            Card::Ten,
            Card::Eleven,
            Card::Twelve,
        ] {
            assert_eq!(counts[&card], 4);
        }
    }

    #[test]
    fn seeded_shuffle_is_deterministic() {
        let a = Deck::new(Some(7));
        let b = Deck::new(Some(7));
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    fn draw_rebuilds_from_discard_when_empty() {
        let mut deck = Deck::new(Some(1));
        while deck.remaining() > 0 {
            let c = deck.draw();
            deck.discard(c);
        }
        assert_eq!(deck.remaining(), 0);
        assert_eq!(deck.discard_len(), 45);
        let next = deck.draw();
        assert_eq!(deck.remaining(), 44);
        assert_eq!(deck.discard_len(), 0);
        deck.discard(next);
        assert_eq!(deck.remaining() + deck.discard_len(), 45);
    }
}
