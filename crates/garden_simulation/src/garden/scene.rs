//! Сцена сада + host bridge
//!
//! `spawn_garden_scene` создаёт entity: 7 горшков, 2 инструмента, 2 руки.
//! `GardenScene` хранит их Entity и даёт host'у (VR движок, headless runner,
//! тесты) методы для записи поз и отправки intent events.
//!
//! Flow host → ECS:
//! 1. Tracking: `set_hand_pose` / `move_tool_probe` каждый кадр
//! 2. Triggers: `grab_tool`, `touch_flower`, `release_flower`
//! 3. Session container: `send_command` (Configure / Start / Stop)

use bevy::prelude::*;

use crate::components::{
    DormantSpot, FlowerPick, Hand, HandPose, HandSide, PlantSpot, SpotDetector, ToolHolder,
    ToolKind, ToolProbe, ToolSession,
};
use super::config::{GardenSettings, DEFAULT_TARGET, MAX_SPOTS};
use super::events::{FlowerTouch, GardenCommand, GrabToolIntent};
use super::layout::compute_pot_layout;

/// Entity сцены сада (resource)
#[derive(Resource, Debug, Clone)]
pub struct GardenScene {
    /// Горшки по индексу (0..MAX_SPOTS)
    pub spots: Vec<Entity>,
    pub seed_bag: Entity,
    pub watering_can: Entity,
    pub left_hand: Entity,
    pub right_hand: Entity,
}

impl GardenScene {
    pub fn spot(&self, index: usize) -> Option<Entity> {
        self.spots.get(index).copied()
    }

    pub fn tool(&self, kind: ToolKind) -> Entity {
        match kind {
            ToolKind::SeedBag => self.seed_bag,
            ToolKind::WateringCan => self.watering_can,
        }
    }

    pub fn hand(&self, side: HandSide) -> Entity {
        match side {
            HandSide::Left => self.left_hand,
            HandSide::Right => self.right_hand,
        }
    }

    /// Позиция центра горшка (Transform)
    pub fn spot_position(&self, world: &World, index: usize) -> Option<Vec3> {
        let entity = self.spot(index)?;
        world.get::<Transform>(entity).map(|t| t.translation)
    }

    /// Домашняя позиция инструмента
    pub fn tool_home(&self, world: &World, kind: ToolKind) -> Option<Vec3> {
        world.get::<ToolHolder>(self.tool(kind)).map(|h| h.home)
    }

    // ---- tracking (host authoritative) ----

    pub fn set_hand_pose(&self, world: &mut World, side: HandSide, position: Vec3, rotation: Quat) {
        if let Some(mut pose) = world.get_mut::<HandPose>(self.hand(side)) {
            pose.position = position;
            pose.rotation = rotation;
        }
    }

    pub fn set_hand_rotation(&self, world: &mut World, side: HandSide, rotation: Quat) {
        if let Some(mut pose) = world.get_mut::<HandPose>(self.hand(side)) {
            pose.rotation = rotation;
        }
    }

    /// Мировая позиция probe инструмента (носик лейки / горлышко мешка)
    pub fn move_tool_probe(&self, world: &mut World, kind: ToolKind, position: Vec3) {
        if let Some(mut probe) = world.get_mut::<ToolProbe>(self.tool(kind)) {
            probe.position = position;
        }
    }

    // ---- intents ----

    pub fn send_command(&self, world: &mut World, command: GardenCommand) {
        world.send_event(command);
    }

    pub fn grab_tool(&self, world: &mut World, side: HandSide, kind: ToolKind) {
        world.send_event(GrabToolIntent {
            hand: self.hand(side),
            tool: self.tool(kind),
        });
    }

    pub fn touch_flower(&self, world: &mut World, side: HandSide, spot_index: usize) {
        let Some(spot) = self.spot(spot_index) else {
            crate::log_warning(&format!("touch_flower: no spot #{}", spot_index));
            return;
        };

        world.send_event(FlowerTouch::Began {
            hand: self.hand(side),
            spot,
        });
    }

    pub fn release_flower(&self, world: &mut World, side: HandSide, spot_index: usize) {
        let Some(spot) = self.spot(spot_index) else {
            return;
        };

        world.send_event(FlowerTouch::Ended {
            hand: self.hand(side),
            spot,
        });
    }
}

/// Создать сцену сада и вставить `GardenScene` resource
///
/// Горшки раскладываются под цель по умолчанию; `GardenCommand::Configure`
/// перекладывает их под реальный pot_count.
pub fn spawn_garden_scene(world: &mut World) -> GardenScene {
    let settings = world
        .get_resource::<GardenSettings>()
        .cloned()
        .unwrap_or_default();

    let layout = compute_pot_layout(DEFAULT_TARGET, settings.layout.working_distance_m, &settings.layout);

    let spots: Vec<Entity> = (0..MAX_SPOTS)
        .map(|index| {
            let position = layout
                .spot_position(index)
                .unwrap_or(settings.layout.table_center);

            let mut spot = world.spawn((
                PlantSpot::new(index),
                FlowerPick::default(),
                Transform::from_translation(position),
            ));

            if index >= layout.pots.len() {
                spot.insert(DormantSpot);
            }

            spot.id()
        })
        .collect();

    let mut spawn_tool = |kind: ToolKind, home: Vec3| {
        world
            .spawn((
                ToolSession::with_tuning(kind, settings.tuning(kind)),
                ToolHolder::new(home),
                ToolProbe { position: home },
            ))
            .id()
    };

    let seed_bag = spawn_tool(ToolKind::SeedBag, layout.seed_bag_home);
    let watering_can = spawn_tool(ToolKind::WateringCan, layout.watering_can_home);

    let mut spawn_hand = |side: HandSide| {
        world
            .spawn((Hand { side }, SpotDetector::new(settings.probe_radius_m)))
            .id()
    };

    let left_hand = spawn_hand(HandSide::Left);
    let right_hand = spawn_hand(HandSide::Right);

    let scene = GardenScene {
        spots,
        seed_bag,
        watering_can,
        left_hand,
        right_hand,
    };

    crate::log(&format!(
        "🪴 Garden scene spawned: {} spots, seed bag {:?}, watering can {:?}",
        scene.spots.len(),
        seed_bag,
        watering_can
    ));

    world.insert_resource(scene.clone());
    scene
}
