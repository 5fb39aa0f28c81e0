//! GardenSession — state machine раунда сада
//!
//! Planting → Watering → Harvesting → Finished.
//! Единственный владелец счётчиков: инструменты и руки сообщают успехи
//! через `on_*_success`, сессия решает, принять ли их.
//!
//! Переход между стадиями — явный таймер (`StageTransition`), тикается
//! системой `advance_stage_transition` в FixedUpdate.
//! Побочные эффекты (UI, возврат инструментов) уходят в outbox `notices`,
//! который системы превращают в events.

use bevy::prelude::*;

use crate::components::{HandSide, ToolKind};
use super::config::{
    BodySide, ExergameUseType, GardenInput, DEFAULT_PLANT_ANGLE_DEG, DEFAULT_TARGET,
    DEFAULT_WATER_ANGLE_DEG,
};

/// Стадия раунда (порядок объявления = порядок прохождения)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub enum GardenStage {
    #[default]
    Planting,
    Watering,
    Harvesting,
    Finished,
}

impl GardenStage {
    pub fn next(&self) -> GardenStage {
        match self {
            GardenStage::Planting => GardenStage::Watering,
            GardenStage::Watering => GardenStage::Harvesting,
            GardenStage::Harvesting | GardenStage::Finished => GardenStage::Finished,
        }
    }

    /// Инструмент стадии (Harvesting — руками)
    pub fn tool(&self) -> Option<ToolKind> {
        match self {
            GardenStage::Planting => Some(ToolKind::SeedBag),
            GardenStage::Watering => Some(ToolKind::WateringCan),
            GardenStage::Harvesting | GardenStage::Finished => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GardenStage::Planting => "Planting",
            GardenStage::Watering => "Watering",
            GardenStage::Harvesting => "Harvesting",
            GardenStage::Finished => "Finished",
        }
    }
}

/// Снимок прогресса для UI host'а
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GardenProgress {
    pub stage: GardenStage,
    pub target: u32,
    pub planted: u32,
    pub watered: u32,
    pub harvested: u32,
}

/// Фаза перехода
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// "Stage cleared" пауза, стадия ещё старая
    Clearing,
    /// Стадия уже новая, действия заблокированы
    Locking,
}

/// Переход в процессе
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTransition {
    pub from: GardenStage,
    pub to: GardenStage,
    pub phase: TransitionPhase,
    /// Остаток текущей фазы (секунды)
    pub remaining: f32,
}

/// Исходящие уведомления сессии (outbox → events)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GardenNotice {
    StageChanged(GardenProgress),
    ProgressChanged(GardenProgress),
    StageCleared(GardenStage),
    Finished {
        target: u32,
        use_type: ExergameUseType,
    },
    /// Вернуть инструмент стадии домой через `delay_secs`
    ReturnToolHome {
        kind: ToolKind,
        delay_secs: f32,
    },
    /// StopFlow: отпустить все инструменты
    ReleaseAllTools,
}

/// Тайминги перехода (копируются из GardenSettings)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    pub clear_delay_secs: f32,
    pub stage_lock_secs: f32,
    pub tool_return_delay_secs: f32,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            clear_delay_secs: 1.5,
            stage_lock_secs: 0.3,
            tool_return_delay_secs: 1.0,
        }
    }
}

/// GardenSession resource
#[derive(Resource, Debug, Clone)]
pub struct GardenSession {
    stage: GardenStage,
    running: bool,
    in_transition: bool,
    target: u32,
    planted: u32,
    watered: u32,
    harvested: u32,
    plant_angle_deg: f32,
    water_angle_deg: f32,
    body_side: BodySide,
    use_type: ExergameUseType,
    transition: Option<StageTransition>,
    timing: TransitionTiming,
    notices: Vec<GardenNotice>,
}

impl Default for GardenSession {
    fn default() -> Self {
        Self::new(TransitionTiming::default())
    }
}

impl GardenSession {
    pub fn new(timing: TransitionTiming) -> Self {
        Self {
            stage: GardenStage::Planting,
            running: false,
            in_transition: false,
            target: DEFAULT_TARGET,
            planted: 0,
            watered: 0,
            harvested: 0,
            plant_angle_deg: DEFAULT_PLANT_ANGLE_DEG,
            water_angle_deg: DEFAULT_WATER_ANGLE_DEG,
            body_side: BodySide::Left,
            use_type: ExergameUseType::ClinicalUse,
            transition: None,
            timing,
            notices: Vec::new(),
        }
    }

    // ---- accessors ----

    pub fn stage(&self) -> GardenStage {
        self.stage
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn in_transition(&self) -> bool {
        self.in_transition
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn plant_angle_deg(&self) -> f32 {
        self.plant_angle_deg
    }

    pub fn water_angle_deg(&self) -> f32 {
        self.water_angle_deg
    }

    pub fn body_side(&self) -> BodySide {
        self.body_side
    }

    pub fn use_type(&self) -> ExergameUseType {
        self.use_type
    }

    pub fn transition(&self) -> Option<&StageTransition> {
        self.transition.as_ref()
    }

    pub fn timing(&self) -> TransitionTiming {
        self.timing
    }

    pub fn set_timing(&mut self, timing: TransitionTiming) {
        self.timing = timing;
    }

    pub fn progress(&self) -> GardenProgress {
        GardenProgress {
            stage: self.stage,
            target: self.target,
            planted: self.planted,
            watered: self.watered,
            harvested: self.harvested,
        }
    }

    // ---- lifecycle ----

    /// Применить входные данные раунда (InitFromInput)
    pub fn configure(&mut self, input: &GardenInput) {
        if let Some(target) = input.target() {
            self.target = target;
        }

        // 0 допустим (auto mode), отрицательные игнорируются
        if let Some(angle) = input.plant_angle_deg.filter(|a| *a >= 0.0) {
            self.plant_angle_deg = angle;
        }
        if let Some(angle) = input.water_angle_deg.filter(|a| *a >= 0.0) {
            self.water_angle_deg = angle;
        }

        self.body_side = input.body_side;
        self.use_type = input.use_type;

        crate::log_info(&format!(
            "🌱 Garden configured: target={}, plant={}°, water={}°, side={:?}, use={:?}",
            self.target, self.plant_angle_deg, self.water_angle_deg, self.body_side, self.use_type
        ));
    }

    /// Начать раунд. Горшки/цветы сбрасывает командная система (ECS сторона).
    pub fn start_flow(&mut self) {
        self.running = true;
        self.stage = GardenStage::Planting;
        self.in_transition = false;
        self.transition = None;
        self.planted = 0;
        self.watered = 0;
        self.harvested = 0;

        crate::log_info(&format!("▶️ Garden flow started (target={})", self.target));

        let progress = self.progress();
        self.notices.push(GardenNotice::StageChanged(progress));
        self.notices.push(GardenNotice::ProgressChanged(progress));
    }

    /// Остановить раунд. Переход в процессе не отменяется (досчитается).
    pub fn stop_flow(&mut self) {
        self.running = false;
        self.notices.push(GardenNotice::ReleaseAllTools);
        crate::log_info("⏹️ Garden flow stopped");
    }

    // ---- gates ----

    pub fn can_plant_now(&self) -> bool {
        self.gate_open(GardenStage::Planting)
    }

    pub fn can_water_now(&self) -> bool {
        self.gate_open(GardenStage::Watering)
    }

    pub fn can_harvest_now(&self) -> bool {
        self.gate_open(GardenStage::Harvesting)
    }

    /// Gate стадии инструмента
    pub fn gate_open_for(&self, kind: ToolKind) -> bool {
        self.gate_open(kind.stage())
    }

    fn gate_open(&self, stage: GardenStage) -> bool {
        self.running && !self.in_transition && self.stage == stage
    }

    /// Порог жеста для инструмента
    pub fn angle_for(&self, kind: ToolKind) -> f32 {
        match kind {
            ToolKind::SeedBag => self.plant_angle_deg,
            ToolKind::WateringCan => self.water_angle_deg,
        }
    }

    /// Both → любая рука, иначе только настроенная
    pub fn is_allowed_hand(&self, side: HandSide) -> bool {
        self.body_side.allows(side)
    }

    /// Рука, чья ориентация считается жестом
    ///
    /// Both → рука, держащая инструмент (нет такой → левая).
    pub fn gesture_hand(&self, holder_side: Option<HandSide>) -> HandSide {
        match self.body_side {
            BodySide::Left => HandSide::Left,
            BodySide::Right => HandSide::Right,
            BodySide::Both => holder_side.unwrap_or(HandSide::Left),
        }
    }

    // ---- success callbacks ----

    pub fn on_planted_success(&mut self) -> bool {
        self.record_success(GardenStage::Planting)
    }

    pub fn on_watered_success(&mut self) -> bool {
        self.record_success(GardenStage::Watering)
    }

    pub fn on_harvested_success(&mut self) -> bool {
        self.record_success(GardenStage::Harvesting)
    }

    /// Общий путь для on_*_success. false → отклонено (поздний/чужой успех).
    fn record_success(&mut self, stage: GardenStage) -> bool {
        if !self.gate_open(stage) {
            return false;
        }

        let target = self.target;
        let counter = match stage {
            GardenStage::Planting => &mut self.planted,
            GardenStage::Watering => &mut self.watered,
            GardenStage::Harvesting => &mut self.harvested,
            GardenStage::Finished => return false,
        };
        *counter = (*counter + 1).min(target);
        let reached = *counter >= target;

        self.notices.push(GardenNotice::ProgressChanged(self.progress()));

        if reached {
            self.begin_transition();
        }

        true
    }

    // ---- transition ----

    /// Начать переход на следующую стадию. Повторный запрос во время перехода — no-op.
    fn begin_transition(&mut self) {
        if self.in_transition {
            return;
        }

        let from = self.stage;
        let to = from.next();
        self.in_transition = true;

        crate::log_info(&format!("✅ Stage cleared: {} → {}", from.as_str(), to.as_str()));

        self.notices.push(GardenNotice::StageCleared(from));

        if let Some(kind) = from.tool() {
            self.notices.push(GardenNotice::ReturnToolHome {
                kind,
                delay_secs: self.timing.tool_return_delay_secs,
            });
        }

        self.transition = Some(StageTransition {
            from,
            to,
            phase: TransitionPhase::Clearing,
            remaining: self.timing.clear_delay_secs,
        });
    }

    /// Тик перехода (FixedUpdate delta)
    pub fn advance_transition(&mut self, delta: f32) {
        let Some(mut transition) = self.transition else {
            return;
        };

        transition.remaining -= delta;
        if transition.remaining > 0.0 {
            self.transition = Some(transition);
            return;
        }

        match transition.phase {
            TransitionPhase::Clearing => {
                self.stage = transition.to;

                crate::log_info(&format!("🔄 Stage changed → {}", self.stage.as_str()));

                let progress = self.progress();
                self.notices.push(GardenNotice::StageChanged(progress));
                self.notices.push(GardenNotice::ProgressChanged(progress));

                // Перебег Clearing уходит в lock, без дрейфа на тик
                self.transition = Some(StageTransition {
                    phase: TransitionPhase::Locking,
                    remaining: self.timing.stage_lock_secs + transition.remaining,
                    ..transition
                });
            }
            TransitionPhase::Locking => {
                self.transition = None;
                self.in_transition = false;

                if self.stage == GardenStage::Finished {
                    crate::log_info(&format!("🏁 Garden finished (target={})", self.target));
                    self.notices.push(GardenNotice::Finished {
                        target: self.target,
                        use_type: self.use_type,
                    });
                }
            }
        }
    }

    /// Забрать накопленные уведомления
    pub fn drain_notices(&mut self) -> Vec<GardenNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }
}
