//! Команды session container'а: Configure / Start / Stop

use bevy::prelude::*;

use crate::components::{
    DormantSpot, FlowerPick, PlantSpot, SpotDetector, ToolHolder, ToolKind, ToolProbe, ToolSession,
};
use crate::garden::config::GardenSettings;
use crate::garden::events::GardenCommand;
use crate::garden::layout::compute_pot_layout;
use crate::garden::round::RoundContext;
use crate::garden::session::GardenSession;
use crate::DeterministicRng;

/// System: обработка GardenCommand
///
/// - Configure: текущие GardenSettings (тайминги, тюнинг, радиус) → сессия/инструменты/руки,
///   session.configure + раскладка горшков/инструментов, лишние горшки → DormantSpot
/// - Start: сброс горшков, цветов, колоды, состояния и таймеров возврата инструментов;
///   session.start_flow
/// - Stop: session.stop_flow (release инструментов делает relay_garden_notices)
pub fn process_garden_commands(
    mut garden_commands: EventReader<GardenCommand>,
    mut session: ResMut<GardenSession>,
    settings: Res<GardenSettings>,
    mut round: ResMut<RoundContext>,
    mut rng: ResMut<DeterministicRng>,
    mut spots: Query<(Entity, &mut PlantSpot, &mut FlowerPick, &mut Transform)>,
    mut tools: Query<(&mut ToolSession, &mut ToolHolder, &mut ToolProbe)>,
    mut detectors: Query<&mut SpotDetector>,
    mut commands: Commands,
) {
    for command in garden_commands.read() {
        match command {
            GardenCommand::Configure(input) => {
                // Settings могли смениться после сборки plugin'а
                session.set_timing(settings.transition_timing());
                session.configure(input);

                let working = input
                    .working_distance_m()
                    .unwrap_or(settings.layout.working_distance_m);
                let layout = compute_pot_layout(session.target(), working, &settings.layout);

                for (entity, spot, _, mut transform) in spots.iter_mut() {
                    match layout.spot_position(spot.index) {
                        Some(position) => {
                            transform.translation = position;
                            commands.entity(entity).remove::<DormantSpot>();
                        }
                        None => {
                            commands.entity(entity).insert(DormantSpot);
                        }
                    }
                }

                for mut detector in detectors.iter_mut() {
                    detector.probe_radius = settings.probe_radius_m;
                }

                for (mut tool_session, mut holder, mut probe) in tools.iter_mut() {
                    tool_session.tuning = settings.tuning(tool_session.kind);
                    holder.home = match tool_session.kind {
                        ToolKind::SeedBag => layout.seed_bag_home,
                        ToolKind::WateringCan => layout.watering_can_home,
                    };

                    if !holder.is_held() {
                        probe.position = holder.home;
                    }
                }
            }
            GardenCommand::Start => {
                for (_, mut spot, mut pick, _) in spots.iter_mut() {
                    spot.reset();
                    pick.reset();
                }

                round.reset(&mut rng.rng);

                // Возврат, запланированный прошлым раундом, не должен выбить инструмент из руки
                for (mut tool_session, mut holder, _) in tools.iter_mut() {
                    tool_session.clear();
                    tool_session.next_action_at = 0.0;
                    holder.cancel_return();
                }

                // Held инструменты заново войдут в горшок на следующем routing
                for mut detector in detectors.iter_mut() {
                    detector.occupied = None;
                }

                session.start_flow();
            }
            GardenCommand::Stop => {
                session.stop_flow();
            }
        }
    }
}
