//! Garden exergame module
//!
//! ECS ответственность:
//! - Game state: стадии раунда, счётчики, горшки, владение инструментами
//! - Правила: gating действий, жест/auto срабатывание, тайминги переходов
//! - Events: уведомления для UI и визуала host'а
//!
//! Host ответственность (VR движок):
//! - Tracking: позы рук, позиции probe инструментов
//! - Triggers: касание инструмента/цветка → intent events
//! - Рендер, анимации, панели, звук

use bevy::prelude::*;

pub mod config;
pub mod events;
pub mod layout;
pub mod round;
pub mod scene;
pub mod session;
pub mod systems;


pub use config::{
    BodySide, ConfigError, ExergameUseType, GardenInput, GardenSettings, DEFAULT_PLANT_ANGLE_DEG,
    DEFAULT_TARGET, DEFAULT_WATER_ANGLE_DEG, MAX_SPOTS,
};
pub use events::*;
pub use layout::{compute_pot_layout, LayoutTuning, PotLayout};
pub use round::RoundContext;
pub use scene::{spawn_garden_scene, GardenScene};
pub use session::{
    GardenNotice, GardenProgress, GardenSession, GardenStage, StageTransition, TransitionPhase,
    TransitionTiming,
};

use crate::DeterministicRng;

/// Garden Plugin
///
/// Регистрирует garden системы в FixedUpdate (60Hz).
///
/// Порядок выполнения (chain):
/// 1. process_garden_commands — Configure / Start / Stop
/// 2. advance_stage_transition — Clearing → Locking → done
/// 3. tick_tool_returns — возврат инструментов домой
/// 4. process_grab_intents — руки берут инструменты
/// 5. route_tool_proximity — probe → ближайший горшок
/// 6. apply_spot_proximity — enter/exit → ToolSession
/// 7. evaluate_tool_sessions — жест/auto → посадка/полив
/// 8. track_flower_touches — касания цветов
/// 9. harvest_picked_flowers — удержание → сбор
/// 10. relay_garden_notices — outbox сессии → events host'у
pub struct GardenPlugin;

impl Plugin for GardenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GardenSettings>();

        let timing = app.world().resource::<GardenSettings>().transition_timing();

        app.insert_resource(GardenSession::new(timing))
            .init_resource::<RoundContext>();

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        // Регистрация событий
        app.add_event::<GardenCommand>()
            .add_event::<GrabToolIntent>()
            .add_event::<FlowerTouch>()
            .add_event::<SpotProximityEvent>()
            .add_event::<StageChanged>()
            .add_event::<ProgressChanged>()
            .add_event::<StageCleared>()
            .add_event::<GardenFinished>()
            .add_event::<GardenActionSucceeded>()
            .add_event::<PlantGrown>()
            .add_event::<WateringFx>()
            .add_event::<ToolGrabbed>()
            .add_event::<ToolReleased>()
            .add_event::<ToolReturnedHome>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: команды host'а и таймеры
                systems::process_garden_commands,
                systems::advance_stage_transition,
                systems::tick_tool_returns,
                // Фаза 2: владение инструментами
                systems::process_grab_intents,
                // Фаза 3: proximity routing
                systems::route_tool_proximity,
                systems::apply_spot_proximity,
                // Фаза 4: действия
                systems::evaluate_tool_sessions,
                systems::track_flower_touches,
                systems::harvest_picked_flowers,
                // Фаза 5: уведомления
                systems::relay_garden_notices,
            )
                .chain(),
        );
    }
}
