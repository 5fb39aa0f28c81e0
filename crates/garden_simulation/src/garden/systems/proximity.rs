//! Proximity router: probe инструмента → ближайший горшок → enter/exit
//!
//! Физики нет: host пишет ToolProbe.position, здесь только radius test.

use bevy::prelude::*;

use crate::components::{
    DormantSpot, Hand, HandPose, HandSide, PlantSpot, SpotDetector, SpotOccupancy, ToolHolder,
    ToolProbe, ToolSession,
};
use crate::garden::events::SpotProximityEvent;
use crate::garden::session::GardenSession;

/// Ближайший горшок в радиусе (включительно)
///
/// Кандидаты: (entity, index, центр). При равной дистанции побеждает меньший index.
pub fn nearest_spot_in_range(
    probe: Vec3,
    radius: f32,
    candidates: impl IntoIterator<Item = (Entity, usize, Vec3)>,
) -> Option<Entity> {
    let mut candidates: Vec<_> = candidates.into_iter().collect();
    candidates.sort_by_key(|(_, index, _)| *index);

    let mut best: Option<(Entity, f32)> = None;
    for (entity, _, center) in candidates {
        let distance = probe.distance(center);
        if distance > radius {
            continue;
        }

        // Строгое `<`: первый найденный сохраняется при равенстве
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((entity, distance));
        }
    }

    best.map(|(entity, _)| entity)
}

/// System: detector каждой руки ищет горшок для своего инструмента
///
/// Нет инструмента / нет probe → Exited для прежней пары.
/// Смена горшка или инструмента → Exited(old), затем Entered(new).
pub fn route_tool_proximity(
    mut detectors: Query<&mut SpotDetector, With<Hand>>,
    probes: Query<&ToolProbe>,
    spots: Query<(Entity, &PlantSpot, &Transform), Without<DormantSpot>>,
    mut proximity: EventWriter<SpotProximityEvent>,
) {
    for mut detector in detectors.iter_mut() {
        let radius = detector.probe_radius;

        let next = detector.held_tool.and_then(|tool| {
            let probe = probes.get(tool).ok()?;
            let spot = nearest_spot_in_range(
                probe.position,
                radius,
                spots
                    .iter()
                    .map(|(entity, spot, transform)| (entity, spot.index, transform.translation)),
            )?;
            Some(SpotOccupancy { tool, spot })
        });

        let change = detector.retarget(next);

        if let Some(old) = change.exited {
            proximity.write(SpotProximityEvent::Exited {
                tool: old.tool,
                spot: old.spot,
            });
        }

        if let Some(new) = change.entered {
            proximity.write(SpotProximityEvent::Entered {
                tool: new.tool,
                spot: new.spot,
            });
        }
    }
}

/// Ориентация руки, которая считается жестом для инструмента
pub fn gesture_rotation(
    session: &GardenSession,
    holder: &ToolHolder,
    hands: &Query<(&Hand, &HandPose)>,
) -> Quat {
    let holder_side = holder
        .held_by
        .and_then(|hand| hands.get(hand).ok())
        .map(|(hand, _)| hand.side);

    let side: HandSide = session.gesture_hand(holder_side);

    hands
        .iter()
        .find(|(hand, _)| hand.side == side)
        .map(|(_, pose)| pose.rotation)
        .unwrap_or(Quat::IDENTITY)
}

/// System: SpotProximityEvent → ToolSession enter/leave
pub fn apply_spot_proximity(
    mut proximity: EventReader<SpotProximityEvent>,
    session: Res<GardenSession>,
    time: Res<Time<Fixed>>,
    mut tools: Query<(&mut ToolSession, &ToolHolder)>,
    hands: Query<(&Hand, &HandPose)>,
) {
    let now = time.elapsed_secs();

    for event in proximity.read() {
        match *event {
            SpotProximityEvent::Entered { tool, spot } => {
                let Ok((mut tool_session, holder)) = tools.get_mut(tool) else {
                    crate::log_warning(&format!("SpotProximity: {:?} has no ToolSession", tool));
                    continue;
                };

                let rotation = gesture_rotation(&session, holder, &hands);
                let threshold = session.angle_for(tool_session.kind);
                tool_session.enter_spot(spot, rotation, now, threshold);

                crate::log(&format!(
                    "{} entered spot {:?} (primed={}, auto={})",
                    tool_session.kind.as_str(),
                    spot,
                    tool_session.primed,
                    tool_session.is_auto_mode(threshold)
                ));
            }
            SpotProximityEvent::Exited { tool, spot } => {
                let Ok((mut tool_session, _)) = tools.get_mut(tool) else {
                    continue;
                };

                if tool_session.leave_spot(spot) {
                    crate::log(&format!("{} left spot {:?}", tool_session.kind.as_str(), spot));
                }
            }
        }
    }
}
