//! RoundContext — состояние раунда вне state machine
//!
//! Колода цветов (seeded shuffle) и счётчики слотов букета по рукам.
//! Сбрасывается в начале каждого раунда.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{FlowerKind, HandSide};

#[derive(Resource, Debug, Clone, Default)]
pub struct RoundContext {
    deck: Vec<FlowerKind>,
    deck_index: usize,
    bouquet_left: u32,
    bouquet_right: u32,
}

impl RoundContext {
    /// Новый раунд: свежая перемешанная колода, пустые букеты
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shuffle_deck(rng);
        self.bouquet_left = 0;
        self.bouquet_right = 0;
    }

    fn shuffle_deck<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck.clear();
        self.deck.extend_from_slice(&FlowerKind::ALL);
        self.deck.shuffle(rng);
        self.deck_index = 0;
    }

    /// Следующий цветок; исчерпанная колода перемешивается заново
    pub fn next_flower<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FlowerKind {
        if self.deck_index >= self.deck.len() {
            self.shuffle_deck(rng);
        }

        let flower = self.deck[self.deck_index];
        self.deck_index += 1;
        flower
    }

    /// Слот в букете руки (0, 1, 2, ...)
    pub fn next_bouquet_slot(&mut self, side: HandSide) -> u32 {
        let counter = match side {
            HandSide::Left => &mut self.bouquet_left,
            HandSide::Right => &mut self.bouquet_right,
        };
        let slot = *counter;
        *counter += 1;
        slot
    }

    pub fn bouquet_count(&self, side: HandSide) -> u32 {
        match side {
            HandSide::Left => self.bouquet_left,
            HandSide::Right => self.bouquet_right,
        }
    }
}
