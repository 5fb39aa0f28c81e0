//! Компоненты горшков: PlantSpot, DormantSpot

use bevy::prelude::*;

use crate::garden::events::GardenAction;

/// Место посадки (горшок на столе)
///
/// Инварианты:
/// - watered ⇒ planted, harvested ⇒ watered
/// - каждый флаг выставляется максимум один раз за раунд
///
/// Мутируется только через `try_*`; сбрасывается в начале раунда.
/// Визуал (рост цветка, семена) — забота вызывающего при успехе.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct PlantSpot {
    /// Стабильный индекс в саду (0..MAX_SPOTS)
    pub index: usize,
    pub planted: bool,
    pub watered: bool,
    pub harvested: bool,
}

impl PlantSpot {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn try_plant(&mut self) -> bool {
        if self.planted {
            crate::log(&format!("[PlantSpot #{}] Already planted", self.index));
            return false;
        }

        self.planted = true;
        crate::log(&format!("[PlantSpot #{}] Planted OK", self.index));
        true
    }

    pub fn try_water(&mut self) -> bool {
        if !self.planted {
            crate::log(&format!("[PlantSpot #{}] Cannot water: not planted yet", self.index));
            return false;
        }

        if self.watered {
            crate::log(&format!("[PlantSpot #{}] Already watered", self.index));
            return false;
        }

        self.watered = true;
        crate::log(&format!("[PlantSpot #{}] Watered OK", self.index));
        true
    }

    pub fn try_harvest(&mut self) -> bool {
        if !self.watered {
            crate::log(&format!("[PlantSpot #{}] Cannot harvest: not watered", self.index));
            return false;
        }

        if self.harvested {
            crate::log(&format!("[PlantSpot #{}] Already harvested", self.index));
            return false;
        }

        self.harvested = true;
        crate::log(&format!("[PlantSpot #{}] Harvested OK", self.index));
        true
    }

    /// Диспетчер по действию (SeedBag → Plant, WateringCan → Water, рука → Harvest)
    pub fn try_action(&mut self, action: GardenAction) -> bool {
        match action {
            GardenAction::Plant => self.try_plant(),
            GardenAction::Water => self.try_water(),
            GardenAction::Harvest => self.try_harvest(),
        }
    }

    /// Действие уже выполнено в этом раунде
    pub fn is_done(&self, action: GardenAction) -> bool {
        match action {
            GardenAction::Plant => self.planted,
            GardenAction::Water => self.watered,
            GardenAction::Harvest => self.harvested,
        }
    }

    pub fn reset(&mut self) {
        self.planted = false;
        self.watered = false;
        self.harvested = false;
    }
}

/// Маркер: горшок не участвует в текущем раунде (index >= target)
///
/// Proximity router такие горшки не видит.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct DormantSpot;
