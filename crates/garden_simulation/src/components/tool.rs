//! Инструменты сада: ToolSession (gesture/auto gating), ToolHolder, ToolProbe
//!
//! Архитектура:
//! - ToolSession: чистый state machine жеста, без доступа к World
//! - Системы (garden::systems::tools) кормят его позой руки и временем
//! - ToolHolder: кто держит инструмент + отложенный возврат домой

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::garden::events::GardenAction;
use crate::garden::session::GardenStage;

/// Тип инструмента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum ToolKind {
    /// Мешок с семенами (Planting)
    SeedBag,
    /// Лейка (Watering)
    WateringCan,
}

impl ToolKind {
    /// Действие, которое инструмент выполняет над горшком
    pub fn action(&self) -> GardenAction {
        match self {
            ToolKind::SeedBag => GardenAction::Plant,
            ToolKind::WateringCan => GardenAction::Water,
        }
    }

    /// Стадия, в которой инструмент активен
    pub fn stage(&self) -> GardenStage {
        match self {
            ToolKind::SeedBag => GardenStage::Planting,
            ToolKind::WateringCan => GardenStage::Watering,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::SeedBag => "SeedBag",
            ToolKind::WateringCan => "WateringCan",
        }
    }
}

/// Как считается отклонение запястья от neutral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum GestureAxis {
    /// Полный угол между ориентациями (любая ось)
    AnyAxis,
    /// Поворот вокруг neutral up (наклон лейки)
    YawAroundNeutralUp,
}

/// Настройки инструмента
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct ToolTuning {
    /// Минимальный интервал между успешными действиями (секунды)
    pub cooldown_secs: f32,
    /// Запас для re-arm: deviation <= threshold - hysteresis
    pub hysteresis_deg: f32,
    /// threshold <= этого значения → auto mode
    pub auto_angle_threshold_deg: f32,
    pub auto_delay_secs: f32,
    /// Максимальная дистанция probe → центр горшка в auto mode (метры)
    pub auto_max_distance_m: f32,
    pub gesture_axis: GestureAxis,
}

impl ToolTuning {
    pub fn seed_bag() -> Self {
        Self {
            cooldown_secs: 1.0,
            hysteresis_deg: 5.0,
            auto_angle_threshold_deg: 5.0,
            auto_delay_secs: 0.2,
            auto_max_distance_m: 0.07,
            gesture_axis: GestureAxis::AnyAxis,
        }
    }

    pub fn watering_can() -> Self {
        Self {
            cooldown_secs: 0.6,
            hysteresis_deg: 5.0,
            auto_angle_threshold_deg: 5.0,
            auto_delay_secs: 0.2,
            auto_max_distance_m: 0.08,
            gesture_axis: GestureAxis::YawAroundNeutralUp,
        }
    }

    pub fn for_kind(kind: ToolKind) -> Self {
        match kind {
            ToolKind::SeedBag => Self::seed_bag(),
            ToolKind::WateringCan => Self::watering_can(),
        }
    }
}

/// Чем вызвано срабатывание
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTrigger {
    /// Поворот запястья пересёк threshold
    Gesture,
    /// Auto mode: задержка прошла, probe у центра горшка
    Auto,
}

/// ToolSession — состояние жеста инструмента над горшком
///
/// Gesture mode: primed latch + hysteresis (одно срабатывание на жест).
/// Auto mode: dwell `auto_delay_secs` + дистанция probe.
/// Cooldown: `next_action_at` (абсолютное время fixed clock).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ToolSession {
    pub kind: ToolKind,
    pub tuning: ToolTuning,

    /// Горшок, над которым сейчас инструмент
    pub current_spot: Option<Entity>,

    /// Ориентация руки при входе в горшок
    pub neutral: Option<Quat>,

    pub primed: bool,
    pub auto_armed_at: Option<f32>,
    pub next_action_at: f32,
}

impl ToolSession {
    pub fn new(kind: ToolKind) -> Self {
        Self::with_tuning(kind, ToolTuning::for_kind(kind))
    }

    pub fn with_tuning(kind: ToolKind, tuning: ToolTuning) -> Self {
        Self {
            kind,
            tuning,
            current_spot: None,
            neutral: None,
            primed: false,
            auto_armed_at: None,
            next_action_at: 0.0,
        }
    }

    /// Auto mode при маленьком пороге (пациенту не нужен жест)
    pub fn is_auto_mode(&self, threshold_deg: f32) -> bool {
        threshold_deg <= self.tuning.auto_angle_threshold_deg
    }

    /// Отклонение текущей ориентации от neutral (градусы, без знака)
    ///
    /// Без neutral → 0.
    pub fn deviation_deg(&self, rotation: Quat) -> f32 {
        let Some(neutral) = self.neutral else {
            return 0.0;
        };

        match self.tuning.gesture_axis {
            GestureAxis::AnyAxis => neutral.angle_between(rotation).to_degrees(),
            GestureAxis::YawAroundNeutralUp => yaw_deviation_deg(neutral, rotation),
        }
    }

    /// Инструмент вошёл в горшок: захват neutral + начальное состояние latch
    pub fn enter_spot(&mut self, spot: Entity, rotation: Quat, now: f32, threshold_deg: f32) {
        self.current_spot = Some(spot);
        self.neutral = Some(rotation);

        if self.is_auto_mode(threshold_deg) {
            self.primed = true;
            self.auto_armed_at = Some(now);
            return;
        }

        self.auto_armed_at = None;
        // Уже повёрнутая рука не должна сработать сразу при входе
        self.primed = self.deviation_deg(rotation) <= threshold_deg - self.tuning.hysteresis_deg;
    }

    /// Выход из горшка (чужой горшок игнорируется)
    pub fn leave_spot(&mut self, spot: Entity) -> bool {
        if self.current_spot != Some(spot) {
            return false;
        }

        self.current_spot = None;
        self.neutral = None;
        self.primed = false;
        self.auto_armed_at = None;
        true
    }

    /// Полный сброс (возврат домой / остановка полива)
    pub fn clear(&mut self) {
        self.current_spot = None;
        self.neutral = None;
        self.primed = false;
        self.auto_armed_at = None;
    }

    pub fn in_cooldown(&self, now: f32) -> bool {
        now < self.next_action_at
    }

    /// Один тик оценки. Вызывать только при открытом gate стадии.
    ///
    /// `probe_distance` — дистанция probe → центр текущего горшка (auto mode).
    /// Возвращает Some, если нужно попытаться выполнить действие.
    pub fn evaluate(
        &mut self,
        now: f32,
        rotation: Quat,
        probe_distance: Option<f32>,
        threshold_deg: f32,
    ) -> Option<ToolTrigger> {
        self.current_spot?;
        self.neutral?;

        if self.in_cooldown(now) {
            return None;
        }

        if self.is_auto_mode(threshold_deg) {
            if let Some(armed_at) = self.auto_armed_at {
                if now - armed_at < self.tuning.auto_delay_secs {
                    return None;
                }
            }

            let distance = probe_distance?;
            if distance > self.tuning.auto_max_distance_m {
                return None;
            }

            return Some(ToolTrigger::Auto);
        }

        let deviation = self.deviation_deg(rotation);

        if !self.primed {
            // Re-arm только после возврата запястья ближе к neutral
            if deviation <= threshold_deg - self.tuning.hysteresis_deg {
                self.primed = true;
            }
            return None;
        }

        if deviation >= threshold_deg {
            // Latch сбрасывается даже если горшок откажет
            self.primed = false;
            return Some(ToolTrigger::Gesture);
        }

        None
    }

    /// Горшок принял действие → cooldown
    pub fn record_success(&mut self, now: f32) {
        self.next_action_at = now + self.tuning.cooldown_secs;
    }
}

/// Угол между "right" векторами в плоскости, ортогональной neutral up
fn yaw_deviation_deg(neutral: Quat, rotation: Quat) -> f32 {
    let up = neutral * Vec3::Y;
    let axis = if up.length_squared() > 1e-4 {
        up.normalize()
    } else {
        Vec3::Y
    };

    let project = |v: Vec3| v - axis * v.dot(axis);
    let v0 = project(neutral * Vec3::X);
    let v1 = project(rotation * Vec3::X);

    if v0.length_squared() < 1e-4 || v1.length_squared() < 1e-4 {
        return 0.0;
    }

    v0.angle_between(v1).to_degrees()
}

/// Отложенный возврат инструмента домой
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ReturnHome {
    pub remaining: f32,
    /// Поколение запроса (новый запрос вытесняет старый)
    pub generation: u32,
}

/// Владение инструментом + домашняя позиция на столе
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ToolHolder {
    /// Hand entity, которая держит инструмент
    pub held_by: Option<Entity>,
    pub home: Vec3,
    pub return_home: Option<ReturnHome>,
    pub generation: u32,
}

impl ToolHolder {
    pub fn new(home: Vec3) -> Self {
        Self {
            held_by: None,
            home,
            return_home: None,
            generation: 0,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held_by.is_some()
    }

    /// Взять инструмент. false если уже в руке.
    pub fn grab(&mut self, hand: Entity) -> bool {
        if self.held_by.is_some() {
            return false;
        }
        self.held_by = Some(hand);
        true
    }

    /// Отпустить; возвращает руку, которая держала
    pub fn release(&mut self) -> Option<Entity> {
        self.held_by.take()
    }

    /// Запланировать возврат (последний запрос побеждает: старый таймер перезаписан)
    pub fn schedule_return(&mut self, delay_secs: f32) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.return_home = Some(ReturnHome {
            remaining: delay_secs.max(0.0),
            generation: self.generation,
        });
        self.generation
    }

    /// Снять запланированный возврат (новый раунд). Поколение сдвигается.
    pub fn cancel_return(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.return_home = None;
    }

    /// Тик таймера возврата. true → пора вернуть (таймер снят).
    pub fn tick_return(&mut self, delta: f32) -> bool {
        let Some(pending) = self.return_home.as_mut() else {
            return false;
        };

        pending.remaining -= delta;
        if pending.remaining > 0.0 {
            return false;
        }

        self.return_home = None;
        true
    }
}

/// Точка инструмента, которой он "касается" горшка (носик лейки, горлышко мешка)
///
/// Host пишет мировую позицию каждый тик.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ToolProbe {
    pub position: Vec3,
}
