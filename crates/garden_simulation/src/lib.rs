//! Garden Simulation Core
//!
//! ECS-симуляция сада на Bevy 0.16 (strategic layer) для VR реабилитации.
//! Раунд: Planting → Watering → Harvesting → Finished.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (стадии, счётчики, gating, жесты)
//! - VR host = tactical layer (tracking, триггеры, рендер, панели)

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod garden;
pub mod logger;

// Re-export базовых компонентов для удобства
pub use components::*;
pub use garden::*;
pub use logger::{
    init_logger, log, log_error, log_info, log_level, log_warning, log_with_level, set_log_level,
    set_logger, set_logger_if_needed, ConsoleLogger, LogLevel, LogPrinter,
};

/// Частота симуляции (FixedUpdate)
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz (совпадает с частотой tracking'а host'а)
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .add_plugins(GardenPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ)); // 60Hz FixedUpdate

    app
}

/// Headless app сада с ручным временем: один `app.update()` = один fixed тик
///
/// Первый update только "заводит" часы (нулевая delta), поэтому делается здесь.
pub fn create_garden_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / SIMULATION_HZ,
    )))
    .add_plugins(SimulationPlugin);

    app.update();
    app
}

/// События текущего update (то, что host прочитал бы в этом кадре)
pub fn current_events<E: Event + Clone>(world: &World) -> Vec<E> {
    world
        .get_resource::<Events<E>>()
        .map(|events| events.iter_current_update_events().cloned().collect())
        .unwrap_or_default()
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
