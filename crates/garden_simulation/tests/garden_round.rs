//! Garden round integration test
//!
//! Scripted пациент проходит раунд через ECS app (как VR host):
//! позы рук / probe инструментов → intents → уведомления.
//!
//! Проверяем:
//! - Порядок стадий и финал с use type
//! - Gating: стадия, переход, рука
//! - Auto mode, hysteresis, dormant горшки
//! - Возврат инструментов домой, StopFlow
//! - Сбор цветов с удержанием

use bevy::prelude::*;
use garden_simulation::*;

/// События, собранные за прогон
#[derive(Default)]
struct Recorder {
    stages: Vec<GardenStage>,
    progress: Vec<GardenProgress>,
    cleared: Vec<GardenStage>,
    finished: Vec<GardenFinished>,
    actions: Vec<GardenActionSucceeded>,
    grown: Vec<PlantGrown>,
    grabbed: Vec<ToolGrabbed>,
    released: Vec<ToolReleased>,
    returned: Vec<ToolReturnedHome>,
    watering_fx: Vec<WateringFx>,
}

impl Recorder {
    fn collect(&mut self, world: &World) {
        self.stages
            .extend(current_events::<StageChanged>(world).iter().map(|e| e.progress.stage));
        self.progress
            .extend(current_events::<ProgressChanged>(world).iter().map(|e| e.progress));
        self.cleared
            .extend(current_events::<StageCleared>(world).iter().map(|e| e.stage));
        self.finished.extend(current_events::<GardenFinished>(world));
        self.actions.extend(current_events::<GardenActionSucceeded>(world));
        self.grown.extend(current_events::<PlantGrown>(world));
        self.grabbed.extend(current_events::<ToolGrabbed>(world));
        self.released.extend(current_events::<ToolReleased>(world));
        self.returned.extend(current_events::<ToolReturnedHome>(world));
        self.watering_fx.extend(current_events::<WateringFx>(world));
    }
}

/// Helper: ECS app + сцена + recorder
struct Harness {
    app: App,
    scene: GardenScene,
    events: Recorder,
}

impl Harness {
    fn new(input: GardenInput) -> Self {
        Self::with_settings(GardenSettings::default(), input)
    }

    /// Settings подменяются после сборки plugin'а (как это делает host)
    fn with_settings(settings: GardenSettings, input: GardenInput) -> Self {
        let mut app = create_garden_app(42);
        app.insert_resource(settings);
        let scene = spawn_garden_scene(app.world_mut());

        let mut harness = Self {
            app,
            scene,
            events: Recorder::default(),
        };

        harness.command(GardenCommand::Configure(input));
        harness.command(GardenCommand::Start);
        harness.ticks(1);
        harness
    }

    fn with_pots(pot_count: i32) -> Self {
        Self::new(GardenInput {
            pot_count: Some(pot_count),
            ..Default::default()
        })
    }

    fn command(&mut self, command: GardenCommand) {
        self.scene.send_command(self.app.world_mut(), command);
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.app.update();
            self.events.collect(self.app.world());
        }
    }

    fn session(&self) -> &GardenSession {
        self.app.world().resource::<GardenSession>()
    }

    fn spot(&self, index: usize) -> PlantSpot {
        let entity = self.scene.spot(index).unwrap();
        self.app.world().get::<PlantSpot>(entity).unwrap().clone()
    }

    fn holder(&self, kind: ToolKind) -> ToolHolder {
        let tool = self.scene.tool(kind);
        self.app.world().get::<ToolHolder>(tool).unwrap().clone()
    }

    fn tool_session(&self, kind: ToolKind) -> ToolSession {
        let tool = self.scene.tool(kind);
        self.app.world().get::<ToolSession>(tool).unwrap().clone()
    }

    fn grab(&mut self, side: HandSide, kind: ToolKind) {
        self.scene.grab_tool(self.app.world_mut(), side, kind);
        self.ticks(1);
    }

    fn probe_to_spot(&mut self, kind: ToolKind, index: usize) {
        let center = self.scene.spot_position(self.app.world(), index).unwrap();
        self.scene.move_tool_probe(self.app.world_mut(), kind, center);
    }

    fn probe_to(&mut self, kind: ToolKind, position: Vec3) {
        self.scene.move_tool_probe(self.app.world_mut(), kind, position);
    }

    /// Поворот запястья вокруг вертикали (засчитывается обоими видами жеста)
    fn wrist(&mut self, side: HandSide, deg: f32) {
        let rotation = Quat::from_rotation_y(deg.to_radians());
        self.scene.set_hand_rotation(self.app.world_mut(), side, rotation);
    }

    /// Один жест над горшком: вход с нейтральной рукой → поворот → возврат + cooldown
    fn gesture_over(&mut self, side: HandSide, kind: ToolKind, index: usize) {
        let angle = self.session().angle_for(kind);

        self.wrist(side, 0.0);
        self.probe_to_spot(kind, index);
        self.ticks(3);

        self.wrist(side, angle + 5.0);
        self.ticks(3);

        self.wrist(side, 0.0);
        self.ticks(70);
    }

    fn work_stage(&mut self, side: HandSide, kind: ToolKind) {
        self.grab(side, kind);
        let target = self.session().target() as usize;
        for index in 0..target {
            self.gesture_over(side, kind, index);
        }
    }

    fn harvest(&mut self, side: HandSide, index: usize) {
        self.scene.touch_flower(self.app.world_mut(), side, index);
        self.ticks(20);
        self.scene.release_flower(self.app.world_mut(), side, index);
        self.ticks(1);
    }

    /// Тикать до стадии без перехода (не больше ~5 секунд)
    fn wait_for_stage(&mut self, stage: GardenStage) {
        for _ in 0..300 {
            if self.session().stage() == stage && !self.session().in_transition() {
                return;
            }
            self.ticks(1);
        }
        panic!("stage {:?} not reached", stage);
    }
}

/// Test: полный раунд target=2 → Finished с use type
#[test]
fn test_full_round_two_pots() {
    let mut h = Harness::new(GardenInput {
        pot_count: Some(2),
        use_type: ExergameUseType::HomeUse,
        ..Default::default()
    });

    h.work_stage(HandSide::Left, ToolKind::SeedBag);
    h.wait_for_stage(GardenStage::Watering);

    h.work_stage(HandSide::Left, ToolKind::WateringCan);
    h.wait_for_stage(GardenStage::Harvesting);

    h.harvest(HandSide::Left, 0);
    h.harvest(HandSide::Left, 1);
    h.wait_for_stage(GardenStage::Finished);

    assert_eq!(
        h.events.stages,
        vec![
            GardenStage::Planting,
            GardenStage::Watering,
            GardenStage::Harvesting,
            GardenStage::Finished
        ]
    );
    assert_eq!(
        h.events.cleared,
        vec![GardenStage::Planting, GardenStage::Watering, GardenStage::Harvesting]
    );
    assert_eq!(
        h.events.finished,
        vec![GardenFinished {
            target: 2,
            use_type: ExergameUseType::HomeUse
        }]
    );

    // По цветку на горшок
    assert_eq!(h.events.grown.len(), 2);
    assert_eq!(h.events.actions.len(), 6);

    for index in 0..2 {
        let spot = h.spot(index);
        assert!(spot.planted && spot.watered && spot.harvested, "spot {} = {:?}", index, spot);
    }

    // Счётчики монотонны внутри стадии и не превышают target
    for p in &h.events.progress {
        assert!(p.planted <= 2 && p.watered <= 2 && p.harvested <= 2);
    }
    let final_progress = h.session().progress();
    assert_eq!((final_progress.planted, final_progress.watered, final_progress.harvested), (2, 2, 2));
}

/// Test: лейка в Planting не берётся, полить без посадки нельзя
#[test]
fn test_watering_can_rejected_during_planting() {
    let mut h = Harness::with_pots(2);

    h.grab(HandSide::Left, ToolKind::WateringCan);
    assert!(h.holder(ToolKind::WateringCan).held_by.is_none());
    assert!(h.events.grabbed.is_empty());

    // Даже если probe лейки над горшком — ничего не происходит
    h.probe_to_spot(ToolKind::WateringCan, 0);
    h.ticks(30);
    assert!(!h.spot(0).watered);
    assert_eq!(h.session().progress().watered, 0);
}

/// Test: рука не той стороны отвергается
#[test]
fn test_wrong_hand_rejected() {
    let mut h = Harness::new(GardenInput {
        pot_count: Some(2),
        body_side: BodySide::Left,
        ..Default::default()
    });

    h.grab(HandSide::Right, ToolKind::SeedBag);
    assert!(h.holder(ToolKind::SeedBag).held_by.is_none());

    h.grab(HandSide::Left, ToolKind::SeedBag);
    assert_eq!(h.holder(ToolKind::SeedBag).held_by, Some(h.scene.hand(HandSide::Left)));
    assert_eq!(h.events.grabbed.len(), 1);
}

/// Test: BodySide::Both — жест считается по руке, держащей инструмент
#[test]
fn test_both_sides_uses_holding_hand() {
    let mut h = Harness::new(GardenInput {
        pot_count: Some(2),
        body_side: BodySide::Both,
        ..Default::default()
    });

    h.grab(HandSide::Right, ToolKind::SeedBag);
    assert_eq!(h.holder(ToolKind::SeedBag).held_by, Some(h.scene.hand(HandSide::Right)));

    h.wrist(HandSide::Right, 0.0);
    h.wrist(HandSide::Left, 0.0);
    h.probe_to_spot(ToolKind::SeedBag, 0);
    h.ticks(3);

    // Левая рука не держит мешок — её поворот не жест
    h.wrist(HandSide::Left, 60.0);
    h.ticks(5);
    assert!(!h.spot(0).planted);

    h.wrist(HandSide::Right, 35.0);
    h.ticks(3);
    assert!(h.spot(0).planted);
}

/// Test: hysteresis в ECS — 20° → 10° → 31° сажает один раз
#[test]
fn test_gesture_threshold_in_scene() {
    let mut h = Harness::with_pots(2);
    h.grab(HandSide::Left, ToolKind::SeedBag);

    h.wrist(HandSide::Left, 0.0);
    h.probe_to_spot(ToolKind::SeedBag, 0);
    h.ticks(2);

    h.wrist(HandSide::Left, 20.0);
    h.ticks(2);
    h.wrist(HandSide::Left, 10.0);
    h.ticks(2);
    assert!(!h.spot(0).planted);

    h.wrist(HandSide::Left, 31.0);
    h.ticks(2);
    assert!(h.spot(0).planted);
    assert_eq!(h.session().progress().planted, 1);
    assert!(!h.tool_session(ToolKind::SeedBag).primed);
}

/// Test: auto mode (угол 0) — сажает по удержанию над центром
#[test]
fn test_auto_mode_plants_on_dwell() {
    let mut h = Harness::new(GardenInput {
        pot_count: Some(2),
        plant_angle_deg: Some(0.0),
        ..Default::default()
    });
    h.grab(HandSide::Left, ToolKind::SeedBag);

    // В радиусе router'а (0.08), но дальше auto max (0.07)
    let center = h.scene.spot_position(h.app.world(), 0).unwrap();
    h.probe_to(ToolKind::SeedBag, center + Vec3::new(0.075, 0.0, 0.0));
    h.ticks(30);
    assert_eq!(h.tool_session(ToolKind::SeedBag).current_spot, h.scene.spot(0));
    assert!(!h.spot(0).planted);

    // Ближе к центру, без поворота запястья
    h.probe_to(ToolKind::SeedBag, center + Vec3::new(0.02, 0.0, 0.0));
    h.ticks(2);
    assert!(h.spot(0).planted);
}

/// Test: auto mode ждёт задержку после входа
#[test]
fn test_auto_mode_respects_delay() {
    let mut h = Harness::new(GardenInput {
        pot_count: Some(2),
        plant_angle_deg: Some(0.0),
        ..Default::default()
    });
    h.grab(HandSide::Left, ToolKind::SeedBag);

    h.probe_to_spot(ToolKind::SeedBag, 0);
    h.ticks(5); // ~0.08 s < 0.2 s
    assert!(!h.spot(0).planted);

    h.ticks(20);
    assert!(h.spot(0).planted);
}

/// Test: горшки сверх target неактивны для routing'а
#[test]
fn test_dormant_spots_ignored() {
    let mut h = Harness::with_pots(2);
    h.grab(HandSide::Left, ToolKind::SeedBag);

    let dormant = h.scene.spot(4).unwrap();
    assert!(h.app.world().get::<DormantSpot>(dormant).is_some());
    assert!(h.app.world().get::<DormantSpot>(h.scene.spot(1).unwrap()).is_none());

    h.probe_to_spot(ToolKind::SeedBag, 4);
    h.ticks(3);
    assert_eq!(h.tool_session(ToolKind::SeedBag).current_spot, None);

    h.wrist(HandSide::Left, 45.0);
    h.ticks(3);
    assert!(!h.spot(4).planted);
    assert_eq!(h.session().progress().planted, 0);
}

/// Test: уход из горшка сбрасывает сессию инструмента
#[test]
fn test_probe_leaving_spot_clears_session() {
    let mut h = Harness::with_pots(2);
    h.grab(HandSide::Left, ToolKind::SeedBag);

    h.probe_to_spot(ToolKind::SeedBag, 0);
    h.ticks(2);
    assert_eq!(h.tool_session(ToolKind::SeedBag).current_spot, h.scene.spot(0));

    h.probe_to(ToolKind::SeedBag, Vec3::new(5.0, 0.0, 5.0));
    h.ticks(2);
    let session = h.tool_session(ToolKind::SeedBag);
    assert_eq!(session.current_spot, None);
    assert_eq!(session.neutral, None);
}

/// Test: во время перехода действия и захваты заблокированы
#[test]
fn test_transition_blocks_grab() {
    let mut h = Harness::with_pots(1);

    h.grab(HandSide::Left, ToolKind::SeedBag);
    h.wrist(HandSide::Left, 0.0);
    h.probe_to_spot(ToolKind::SeedBag, 0);
    h.ticks(3);
    h.wrist(HandSide::Left, 40.0);
    h.ticks(2);
    assert!(h.session().in_transition());

    // Clearing: стадия ещё Planting, лейку не взять
    h.grab(HandSide::Right, ToolKind::WateringCan);
    assert!(h.holder(ToolKind::WateringCan).held_by.is_none());

    // Ждём смены стадии, но lock ещё идёт (1.5 s + немного)
    for _ in 0..200 {
        if h.session().stage() == GardenStage::Watering {
            break;
        }
        h.ticks(1);
    }
    assert!(h.session().in_transition());
    h.grab(HandSide::Left, ToolKind::WateringCan);
    assert!(h.holder(ToolKind::WateringCan).held_by.is_none());

    h.wait_for_stage(GardenStage::Watering);
    h.grab(HandSide::Left, ToolKind::WateringCan);
    assert_eq!(h.holder(ToolKind::WateringCan).held_by, Some(h.scene.hand(HandSide::Left)));
}

/// Test: мешок возвращается домой через ~1 s после завершения посадки
#[test]
fn test_tool_returns_home_after_stage() {
    let mut h = Harness::with_pots(1);
    let home = h.scene.tool_home(h.app.world(), ToolKind::SeedBag).unwrap();

    h.work_stage(HandSide::Left, ToolKind::SeedBag);

    assert_eq!(h.events.returned.len(), 1);
    assert_eq!(h.events.returned[0].tool, h.scene.tool(ToolKind::SeedBag));
    assert_eq!(h.events.returned[0].home, home);
    assert_eq!(h.events.released.len(), 1);

    assert!(h.holder(ToolKind::SeedBag).held_by.is_none());
    let probe = h.app.world().get::<ToolProbe>(h.scene.tool(ToolKind::SeedBag)).unwrap();
    assert_eq!(probe.position, home);
    assert_eq!(h.tool_session(ToolKind::SeedBag).current_spot, None);

    // Рука снова пустая — может взять лейку
    h.wait_for_stage(GardenStage::Watering);
    h.grab(HandSide::Left, ToolKind::WateringCan);
    assert_eq!(h.events.grabbed.len(), 2);
}

/// Test: лейка "доливает" перед возвратом
#[test]
fn test_watering_can_fx_before_return() {
    let mut h = Harness::with_pots(1);
    h.work_stage(HandSide::Left, ToolKind::SeedBag);
    h.wait_for_stage(GardenStage::Watering);
    h.work_stage(HandSide::Left, ToolKind::WateringCan);

    assert_eq!(h.events.watering_fx.len(), 1);
    assert_eq!(h.events.watering_fx[0].tool, h.scene.tool(ToolKind::WateringCan));
    assert_eq!(h.events.watering_fx[0].seconds, 1.0);
    assert_eq!(h.events.grown.len(), 1);
    assert!(h.holder(ToolKind::WateringCan).held_by.is_none());
}

/// Test: StopFlow отпускает инструменты и закрывает gates
#[test]
fn test_stop_flow_releases_tools() {
    let mut h = Harness::with_pots(3);
    h.grab(HandSide::Left, ToolKind::SeedBag);
    assert!(h.holder(ToolKind::SeedBag).is_held());

    h.command(GardenCommand::Stop);
    h.ticks(1);

    assert!(!h.session().is_running());
    assert!(!h.holder(ToolKind::SeedBag).is_held());
    assert_eq!(h.events.released.len(), 1);

    // Остановленный сад не принимает действия
    h.grab(HandSide::Left, ToolKind::SeedBag);
    assert!(!h.holder(ToolKind::SeedBag).is_held());
}

/// Test: сбор цветка требует удержания руки
#[test]
fn test_harvest_requires_hold() {
    let mut h = Harness::with_pots(2);
    h.work_stage(HandSide::Left, ToolKind::SeedBag);
    h.wait_for_stage(GardenStage::Watering);
    h.work_stage(HandSide::Left, ToolKind::WateringCan);
    h.wait_for_stage(GardenStage::Harvesting);

    // Короткое касание (~0.05 s) — не считается
    h.scene.touch_flower(h.app.world_mut(), HandSide::Left, 0);
    h.ticks(3);
    h.scene.release_flower(h.app.world_mut(), HandSide::Left, 0);
    h.ticks(20);
    assert!(!h.spot(0).harvested);

    // Правая рука запрещена (BodySide::Left)
    h.scene.touch_flower(h.app.world_mut(), HandSide::Right, 0);
    h.ticks(30);
    assert!(!h.spot(0).harvested);

    h.harvest(HandSide::Left, 0);
    h.harvest(HandSide::Left, 1);
    assert!(h.spot(0).harvested && h.spot(1).harvested);

    // Букет левой руки: слоты 0 и 1
    let slots: Vec<_> = (0..2)
        .map(|i| {
            let entity = h.scene.spot(i).unwrap();
            h.app.world().get::<FlowerPick>(entity).unwrap().bouquet_slot
        })
        .collect();
    assert_eq!(slots, vec![Some(0), Some(1)]);
}

/// Test: Configure перекладывает горшки под pot_count
#[test]
fn test_configure_single_pot_layout() {
    let h = Harness::with_pots(1);
    let settings = GardenSettings::default();

    let position = h.scene.spot_position(h.app.world(), 0).unwrap();
    let expected = settings.layout.table_center + Vec3::new(0.0, 0.0, -settings.layout.row_depth_m * 0.5);
    assert!(position.distance(expected) < 1e-4);

    for index in 1..MAX_SPOTS {
        let entity = h.scene.spot(index).unwrap();
        assert!(h.app.world().get::<DormantSpot>(entity).is_some(), "spot {}", index);
    }
    assert_eq!(h.session().target(), 1);
}

/// Test: новый раунд сбрасывает горшки и цветы
#[test]
fn test_restart_resets_round() {
    let mut h = Harness::with_pots(1);
    h.work_stage(HandSide::Left, ToolKind::SeedBag);
    assert!(h.spot(0).planted);

    h.command(GardenCommand::Start);
    h.ticks(1);

    assert_eq!(h.session().stage(), GardenStage::Planting);
    assert!(!h.spot(0).planted);
    assert_eq!(h.session().progress().planted, 0);
}

/// Test: возврат домой из прошлого раунда не выбивает мешок в новом
#[test]
fn test_restart_cancels_pending_tool_return() {
    let mut h = Harness::with_pots(1);
    h.grab(HandSide::Left, ToolKind::SeedBag);

    h.wrist(HandSide::Left, 0.0);
    h.probe_to_spot(ToolKind::SeedBag, 0);
    h.ticks(3);
    h.wrist(HandSide::Left, 40.0);
    h.ticks(2);
    assert!(h.session().in_transition());
    assert!(h.holder(ToolKind::SeedBag).return_home.is_some());

    // Новый раунд прямо во время Clearing
    h.wrist(HandSide::Left, 0.0);
    h.command(GardenCommand::Start);
    h.ticks(1);
    assert!(h.holder(ToolKind::SeedBag).return_home.is_none());

    // Дольше, чем tool_return_delay
    h.ticks(90);
    assert_eq!(h.session().stage(), GardenStage::Planting);
    assert_eq!(h.holder(ToolKind::SeedBag).held_by, Some(h.scene.hand(HandSide::Left)));
    assert!(h.events.returned.is_empty());
    assert!(h.events.released.is_empty());
}

/// Test: settings, вставленные после plugin'а, применяются на Configure
#[test]
fn test_configure_picks_up_replaced_settings() {
    let settings = GardenSettings {
        clear_delay_secs: 0.5,
        stage_lock_secs: 0.1,
        probe_radius_m: 0.05,
        ..Default::default()
    };
    let mut h = Harness::with_settings(settings, GardenInput {
        pot_count: Some(1),
        ..Default::default()
    });

    let timing = h.session().timing();
    assert_eq!(timing.clear_delay_secs, 0.5);
    assert_eq!(timing.stage_lock_secs, 0.1);

    let detector = h.app.world().get::<SpotDetector>(h.scene.hand(HandSide::Left)).unwrap();
    assert_eq!(detector.probe_radius, 0.05);

    h.grab(HandSide::Left, ToolKind::SeedBag);
    h.wrist(HandSide::Left, 0.0);
    h.probe_to_spot(ToolKind::SeedBag, 0);
    h.ticks(3);
    h.wrist(HandSide::Left, 40.0);
    h.ticks(2);
    assert!(h.session().in_transition());

    // 0.5 s + 0.1 s вместо 1.5 s + 0.3 s
    h.ticks(45);
    assert_eq!(h.session().stage(), GardenStage::Watering);
    assert!(!h.session().in_transition());
}
