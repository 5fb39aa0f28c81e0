//! Компоненты рук: Hand, HandPose, SpotDetector
//!
//! Host (VR tracking) каждый тик пишет HandPose.
//! SpotDetector — proximity router для инструмента в этой руке.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Сторона конкретной руки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandSide::Left => "left",
            HandSide::Right => "right",
        }
    }
}

/// Рука пациента
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(HandPose)]
pub struct Hand {
    pub side: HandSide,
}

/// Поза руки (tracking host authoritative)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HandPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for HandPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Пара (инструмент, горшок), которую detector сейчас сообщил
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct SpotOccupancy {
    pub tool: Entity,
    pub spot: Entity,
}

/// Результат перенацеливания detector'а за один тик
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProximityChange {
    pub exited: Option<SpotOccupancy>,
    pub entered: Option<SpotOccupancy>,
}

/// Proximity detector на руке
///
/// `held_tool` выставляется при grab, очищается при release/return home.
/// `occupied` — последнее сообщённое состояние (для enter/exit diff).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SpotDetector {
    pub held_tool: Option<Entity>,
    /// Радиус поиска горшка вокруг probe инструмента (метры)
    pub probe_radius: f32,
    pub occupied: Option<SpotOccupancy>,
}

impl SpotDetector {
    pub fn new(probe_radius: f32) -> Self {
        Self {
            held_tool: None,
            probe_radius,
            occupied: None,
        }
    }

    /// Сменить занятый горшок: сначала exit старого, потом enter нового.
    ///
    /// Смена инструмента при том же горшке — тоже exit + enter
    /// (старый инструмент должен сбросить своё состояние).
    pub fn retarget(&mut self, next: Option<SpotOccupancy>) -> ProximityChange {
        if self.occupied == next {
            return ProximityChange::default();
        }

        let exited = self.occupied.take();
        self.occupied = next;

        ProximityChange {
            exited,
            entered: next,
        }
    }
}
