//! Конфигурация раунда: клинический payload (GardenInput) + тайминги (GardenSettings)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{HandSide, ToolKind, ToolTuning};
use super::layout::LayoutTuning;
use super::session::TransitionTiming;

/// Максимум горшков на столе
pub const MAX_SPOTS: usize = 7;

/// Цель по умолчанию (нет pot_count во входных данных)
pub const DEFAULT_TARGET: u32 = 5;

pub const DEFAULT_PLANT_ANGLE_DEG: f32 = 30.0;
pub const DEFAULT_WATER_ANGLE_DEG: f32 = 20.0;

/// Какой рукой пациент работает
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum BodySide {
    #[default]
    #[serde(alias = "BODY_SIDE_LEFT", alias = "left")]
    Left,
    #[serde(alias = "BODY_SIDE_RIGHT", alias = "right")]
    Right,
    #[serde(alias = "BODY_SIDE_BOTH", alias = "both")]
    Both,
}

impl BodySide {
    /// Both → любая рука, иначе точное совпадение
    pub fn allows(&self, hand: HandSide) -> bool {
        match self {
            BodySide::Both => true,
            BodySide::Left => hand == HandSide::Left,
            BodySide::Right => hand == HandSide::Right,
        }
    }
}

/// Где проходит сессия (выбор финальной панели на host'е)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum ExergameUseType {
    #[default]
    #[serde(alias = "clinical")]
    ClinicalUse,
    #[serde(alias = "home")]
    HomeUse,
}

/// Входные данные раунда (от терапевта / home-use launcher'а)
///
/// Отсутствующие поля → значения по умолчанию.
/// Невалидные значения санируются при применении, не отвергаются.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GardenInput {
    pub body_side: BodySide,
    /// Количество горшков (<= 0 → игнорируется)
    pub pot_count: Option<i32>,
    /// Порог жеста посадки (< 0 → игнорируется, 0 допустим = auto mode)
    pub plant_angle_deg: Option<f32>,
    pub water_angle_deg: Option<f32>,
    /// Рабочая ширина стола (сантиметры)
    pub working_distance_cm: Option<f32>,
    pub use_type: ExergameUseType,
}

/// Ошибка разбора входных данных
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("garden input payload is empty")]
    Empty,

    #[error("malformed garden input: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl GardenInput {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Err(ConfigError::Empty);
        }

        Ok(serde_json::from_str(json)?)
    }

    /// Цель раунда: clamp(pot_count, 1, 7); без pot_count — None
    pub fn target(&self) -> Option<u32> {
        match self.pot_count {
            Some(count) if count > 0 => Some((count as u32).clamp(1, MAX_SPOTS as u32)),
            _ => None,
        }
    }

    /// Рабочая ширина в метрах (только положительные значения)
    pub fn working_distance_m(&self) -> Option<f32> {
        self.working_distance_cm
            .filter(|cm| cm.is_finite() && *cm > 0.0)
            .map(|cm| cm / 100.0)
    }
}

/// Тайминги и тюнинг сада (resource)
///
/// Сессия, инструменты и руки перечитывают его на каждом `GardenCommand::Configure`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GardenSettings {
    /// Пауза "stage cleared" перед сменой стадии (секунды)
    pub clear_delay_secs: f32,
    /// Блокировка действий после смены стадии
    pub stage_lock_secs: f32,
    pub tool_return_delay_secs: f32,
    /// Радиус поиска горшка вокруг probe инструмента (метры)
    pub probe_radius_m: f32,
    /// Сколько держать руку на цветке для сбора
    pub harvest_hold_secs: f32,
    pub seed_bag: ToolTuning,
    pub watering_can: ToolTuning,
    pub layout: LayoutTuning,
}

impl Default for GardenSettings {
    fn default() -> Self {
        Self {
            clear_delay_secs: 1.5,
            stage_lock_secs: 0.3,
            tool_return_delay_secs: 1.0,
            probe_radius_m: 0.08,
            harvest_hold_secs: 0.2,
            seed_bag: ToolTuning::seed_bag(),
            watering_can: ToolTuning::watering_can(),
            layout: LayoutTuning::default(),
        }
    }
}

impl GardenSettings {
    pub fn transition_timing(&self) -> TransitionTiming {
        TransitionTiming {
            clear_delay_secs: self.clear_delay_secs,
            stage_lock_secs: self.stage_lock_secs,
            tool_return_delay_secs: self.tool_return_delay_secs,
        }
    }

    pub fn tuning(&self, kind: ToolKind) -> ToolTuning {
        match kind {
            ToolKind::SeedBag => self.seed_bag,
            ToolKind::WateringCan => self.watering_can,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let input = GardenInput::from_json(
            r#"{
                "bodySide": "BODY_SIDE_RIGHT",
                "potCount": 9,
                "plantAngleDeg": 0,
                "waterAngleDeg": 15.5,
                "workingDistanceCm": 75,
                "useType": "HomeUse"
            }"#,
        )
        .unwrap();

        assert_eq!(input.body_side, BodySide::Right);
        assert_eq!(input.target(), Some(7)); // clamp до 7
        assert_eq!(input.plant_angle_deg, Some(0.0));
        assert_eq!(input.water_angle_deg, Some(15.5));
        assert_eq!(input.working_distance_m(), Some(0.75));
        assert_eq!(input.use_type, ExergameUseType::HomeUse);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let input = GardenInput::from_json("{}").unwrap();

        assert_eq!(input.body_side, BodySide::Left);
        assert_eq!(input.target(), None);
        assert_eq!(input.working_distance_m(), None);
        assert_eq!(input.use_type, ExergameUseType::ClinicalUse);
    }

    #[test]
    fn test_non_positive_pot_count_ignored() {
        let input = GardenInput {
            pot_count: Some(0),
            ..Default::default()
        };
        assert_eq!(input.target(), None);

        let input = GardenInput {
            pot_count: Some(-3),
            ..Default::default()
        };
        assert_eq!(input.target(), None);
    }

    #[test]
    fn test_empty_and_malformed_payload() {
        assert!(matches!(GardenInput::from_json("   "), Err(ConfigError::Empty)));
        assert!(matches!(
            GardenInput::from_json("{ potCount: "),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn test_body_side_allows() {
        assert!(BodySide::Both.allows(HandSide::Left));
        assert!(BodySide::Both.allows(HandSide::Right));
        assert!(BodySide::Left.allows(HandSide::Left));
        assert!(!BodySide::Left.allows(HandSide::Right));
        assert!(!BodySide::Right.allows(HandSide::Left));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = GardenSettings::default();
        assert_eq!(settings.clear_delay_secs, 1.5);
        assert_eq!(settings.stage_lock_secs, 0.3);
        assert_eq!(settings.tool_return_delay_secs, 1.0);
        assert_eq!(settings.probe_radius_m, 0.08);
        assert_eq!(settings.tuning(ToolKind::WateringCan).cooldown_secs, 0.6);
    }
}
