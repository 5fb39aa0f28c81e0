//! Цветы: вид цветка и dwell-сбор рукой (Harvesting)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::hand::HandSide;

/// Вид цветка (выдаётся из колоды при успешном поливе)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum FlowerKind {
    RedRose,
    BlackRose,
    Dandelion,
    Hyacinth,
    Daisy,
}

impl FlowerKind {
    pub const ALL: [FlowerKind; 5] = [
        FlowerKind::RedRose,
        FlowerKind::BlackRose,
        FlowerKind::Dandelion,
        FlowerKind::Hyacinth,
        FlowerKind::Daisy,
    ];
}

/// Касание цветка рукой (начало dwell)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FlowerTouchState {
    pub hand: Entity,
    pub side: HandSide,
    /// elapsed_secs fixed clock в момент касания
    pub touched_at: f32,
}

/// FlowerPick — состояние сбора цветка на горшке
///
/// Lifecycle:
/// - `flower` назначается при поливе (один раз за раунд)
/// - касание → удержание `hold_secs` → harvest
/// - `done` после успешного сбора, `bouquet_slot` = позиция в букете руки
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FlowerPick {
    pub flower: Option<FlowerKind>,
    pub touching: Option<FlowerTouchState>,
    pub done: bool,
    pub bouquet_slot: Option<u32>,
}

impl FlowerPick {
    /// Начать касание. Повторное касание другой рукой перехватывает dwell.
    pub fn begin_touch(&mut self, hand: Entity, side: HandSide, now: f32) -> bool {
        if self.done {
            return false;
        }

        self.touching = Some(FlowerTouchState {
            hand,
            side,
            touched_at: now,
        });
        true
    }

    /// Конец касания (только той же рукой)
    pub fn end_touch(&mut self, hand: Entity) -> bool {
        match self.touching {
            Some(touch) if touch.hand == hand => {
                self.touching = None;
                true
            }
            _ => false,
        }
    }

    /// Рука держится достаточно долго
    pub fn ready_to_pick(&self, now: f32, hold_secs: f32) -> Option<FlowerTouchState> {
        if self.done {
            return None;
        }

        self.touching
            .filter(|touch| now - touch.touched_at >= hold_secs)
    }

    pub fn mark_picked(&mut self, slot: u32) {
        self.done = true;
        self.bouquet_slot = Some(slot);
        self.touching = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
