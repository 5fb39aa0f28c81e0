//! Headless симуляция сада
//!
//! Прогоняет scripted пациента через полный раунд без VR host'а.
//! Использование: `garden_simulation [input.json]` (GardenInput, camelCase).

use bevy::prelude::*;
use garden_simulation::{
    create_garden_app, current_events, set_log_level, spawn_garden_scene, BodySide,
    GardenActionSucceeded, GardenCommand, GardenFinished, GardenInput, GardenScene, GardenSession,
    GardenSettings, GardenStage, HandSide, LogLevel, PlantGrown, ProgressChanged, StageChanged,
    StageCleared, ToolKind, ToolReturnedHome,
};

/// Предел тиков ожидания перехода (≈ 5 секунд)
const MAX_WAIT_TICKS: usize = 300;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seed = 42;
    println!("Starting Garden headless simulation (seed: {})", seed);

    let input = match std::env::args().nth(1) {
        Some(path) => GardenInput::from_json(&std::fs::read_to_string(&path)?)?,
        None => GardenInput {
            pot_count: Some(3),
            ..Default::default()
        },
    };

    let mut app = create_garden_app(seed);
    set_log_level(LogLevel::Info);

    let scene = spawn_garden_scene(app.world_mut());
    let side = match input.body_side {
        BodySide::Right => HandSide::Right,
        BodySide::Left | BodySide::Both => HandSide::Left,
    };

    scene.send_command(app.world_mut(), GardenCommand::Configure(input));
    scene.send_command(app.world_mut(), GardenCommand::Start);
    let mut tick = 0;
    pump(&mut app, &mut tick, 2);

    work_tool_stage(&mut app, &scene, &mut tick, side, ToolKind::SeedBag);
    wait_for_stage(&mut app, &mut tick, GardenStage::Watering);

    work_tool_stage(&mut app, &scene, &mut tick, side, ToolKind::WateringCan);
    wait_for_stage(&mut app, &mut tick, GardenStage::Harvesting);

    let target = app.world().resource::<GardenSession>().target() as usize;
    for index in 0..target {
        scene.touch_flower(app.world_mut(), side, index);
        pump(&mut app, &mut tick, 15);
        scene.release_flower(app.world_mut(), side, index);
        pump(&mut app, &mut tick, 1);
    }
    wait_for_stage(&mut app, &mut tick, GardenStage::Finished);

    println!("Simulation complete after {} ticks", tick);
    Ok(())
}

/// Взять инструмент и отработать им каждый активный горшок
fn work_tool_stage(app: &mut App, scene: &GardenScene, tick: &mut usize, side: HandSide, kind: ToolKind) {
    let (target, angle) = {
        let session = app.world().resource::<GardenSession>();
        (session.target() as usize, session.angle_for(kind))
    };
    let cooldown_ticks = {
        let settings = app.world().resource::<GardenSettings>();
        (settings.tuning(kind).cooldown_secs * 60.0).ceil() as usize + 2
    };

    scene.grab_tool(app.world_mut(), side, kind);
    pump(app, tick, 1);

    for index in 0..target {
        let Some(center) = scene.spot_position(app.world(), index) else {
            continue;
        };

        // Над горшком с нейтральным запястьем (neutral захватывается при входе)
        scene.set_hand_rotation(app.world_mut(), side, Quat::IDENTITY);
        scene.move_tool_probe(app.world_mut(), kind, center);
        pump(app, tick, 3);

        // Поворот запястья за порог (auto mode просто ждёт над центром)
        let tilt = Quat::from_rotation_y((angle + 5.0).to_radians());
        scene.set_hand_rotation(app.world_mut(), side, tilt);
        pump(app, tick, 3);

        scene.set_hand_rotation(app.world_mut(), side, Quat::IDENTITY);
        pump(app, tick, cooldown_ticks);
    }
}

fn wait_for_stage(app: &mut App, tick: &mut usize, stage: GardenStage) {
    for _ in 0..MAX_WAIT_TICKS {
        let session = app.world().resource::<GardenSession>();
        if session.stage() == stage && !session.in_transition() {
            return;
        }
        pump(app, tick, 1);
    }

    println!("⚠️ Stage {} not reached in {} ticks", stage.as_str(), MAX_WAIT_TICKS);
}

/// N fixed тиков + печать уведомлений
fn pump(app: &mut App, tick: &mut usize, ticks: usize) {
    for _ in 0..ticks {
        app.update();
        *tick += 1;
        print_notifications(app.world(), *tick);
    }
}

fn print_notifications(world: &World, tick: usize) {
    for event in current_events::<StageChanged>(world) {
        println!("[tick {}] Stage → {:?}", tick, event.progress.stage);
    }
    for event in current_events::<ProgressChanged>(world) {
        let p = event.progress;
        println!(
            "[tick {}] Progress: planted {}/{}, watered {}/{}, harvested {}/{}",
            tick, p.planted, p.target, p.watered, p.target, p.harvested, p.target
        );
    }
    for event in current_events::<StageCleared>(world) {
        println!("[tick {}] Stage cleared: {:?}", tick, event.stage);
    }
    for event in current_events::<GardenActionSucceeded>(world) {
        println!("[tick {}] {:?} on {:?}", tick, event.action, event.spot);
    }
    for event in current_events::<PlantGrown>(world) {
        println!("[tick {}] {:?} grew on {:?}", tick, event.flower, event.spot);
    }
    for event in current_events::<ToolReturnedHome>(world) {
        println!("[tick {}] Tool {:?} back home at {:?}", tick, event.tool, event.home);
    }
    for event in current_events::<GardenFinished>(world) {
        println!(
            "[tick {}] 🏁 Finished: target {}, panel {:?}",
            tick, event.target, event.use_type
        );
    }
}
