//! Garden events
//!
//! Host → ECS:
//! - GardenCommand: Configure / Start / Stop (контракт session container ↔ сад)
//! - GrabToolIntent: рука коснулась инструмента
//! - FlowerTouch: рука коснулась цветка / убрала руку
//!
//! ECS → host (fire-and-forget):
//! - StageChanged / ProgressChanged / StageCleared / GardenFinished (UI)
//! - GardenActionSucceeded / PlantGrown / WateringFx (визуал)
//! - ToolGrabbed / ToolReleased / ToolReturnedHome (attach/detach в движке)

use bevy::prelude::*;

use crate::components::{FlowerKind, ToolKind};
use super::config::{ExergameUseType, GardenInput};
use super::session::{GardenProgress, GardenStage};

// ---------------------------------------------------------------------------
// Host → ECS
// ---------------------------------------------------------------------------

/// Команда session container'а
#[derive(Event, Debug, Clone)]
pub enum GardenCommand {
    /// Входные данные раунда (раскладка + пороги + сторона)
    Configure(GardenInput),
    /// StartFlow: новый раунд
    Start,
    /// StopFlow: остановка, инструменты отпускаются
    Stop,
}

/// Рука коснулась инструмента (host trigger)
#[derive(Event, Debug, Clone, Copy)]
pub struct GrabToolIntent {
    pub hand: Entity,
    pub tool: Entity,
}

/// Касание цветка на горшке
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowerTouch {
    Began { hand: Entity, spot: Entity },
    Ended { hand: Entity, spot: Entity },
}

// ---------------------------------------------------------------------------
// Internal (router → tool sessions)
// ---------------------------------------------------------------------------

/// Смена горшка под инструментом
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotProximityEvent {
    Entered { tool: Entity, spot: Entity },
    Exited { tool: Entity, spot: Entity },
}

// ---------------------------------------------------------------------------
// ECS → host
// ---------------------------------------------------------------------------

/// Стадия сменилась (или раунд начался)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChanged {
    pub progress: GardenProgress,
}

/// Счётчик изменился
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressChanged {
    pub progress: GardenProgress,
}

/// Стадия завершена ("stage cleared" баннер)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageCleared {
    pub stage: GardenStage,
}

/// Раунд завершён. Host выбирает финальную панель по `use_type`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GardenFinished {
    pub target: u32,
    pub use_type: ExergameUseType,
}

/// Действие над горшком
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum GardenAction {
    Plant,
    Water,
    Harvest,
}

/// Горшок принял действие (seed drop / drops / цветок в руку)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GardenActionSucceeded {
    /// Инструмент (Plant/Water) или рука (Harvest)
    pub actor: Entity,
    pub spot: Entity,
    pub action: GardenAction,
}

/// Полив вырастил цветок
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantGrown {
    pub spot: Entity,
    pub flower: FlowerKind,
}

/// Лейка "доливает" визуально перед возвратом домой
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WateringFx {
    pub tool: Entity,
    pub seconds: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolGrabbed {
    pub tool: Entity,
    pub kind: ToolKind,
    pub hand: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolReleased {
    pub tool: Entity,
    pub hand: Entity,
}

/// Инструмент вернулся на домашнюю позицию
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ToolReturnedHome {
    pub tool: Entity,
    pub home: Vec3,
}
