//! Оценка жестов инструментов над горшками

use bevy::prelude::*;

use crate::components::{FlowerPick, Hand, HandPose, PlantSpot, ToolHolder, ToolKind, ToolProbe, ToolSession};
use crate::garden::events::{GardenAction, GardenActionSucceeded, PlantGrown};
use crate::garden::round::RoundContext;
use crate::garden::session::GardenSession;
use crate::DeterministicRng;

use super::proximity::gesture_rotation;

/// System: gesture/auto оценка каждого инструмента в горшке
///
/// Срабатывание → PlantSpot::try_* → GardenSession::on_*_success.
/// Полив назначает цветок из колоды раунда (PlantGrown).
pub fn evaluate_tool_sessions(
    time: Res<Time<Fixed>>,
    mut session: ResMut<GardenSession>,
    mut round: ResMut<RoundContext>,
    mut rng: ResMut<DeterministicRng>,
    mut tools: Query<(Entity, &mut ToolSession, &ToolHolder, &ToolProbe)>,
    hands: Query<(&Hand, &HandPose)>,
    mut spots: Query<(&mut PlantSpot, &mut FlowerPick, &Transform)>,
    mut succeeded: EventWriter<GardenActionSucceeded>,
    mut grown: EventWriter<PlantGrown>,
) {
    let now = time.elapsed_secs();

    for (tool, mut tool_session, holder, probe) in tools.iter_mut() {
        let kind = tool_session.kind;
        if !session.gate_open_for(kind) {
            continue;
        }

        let Some(spot_entity) = tool_session.current_spot else {
            continue;
        };

        let Ok((mut spot, mut pick, transform)) = spots.get_mut(spot_entity) else {
            crate::log_warning(&format!("{} points at missing spot {:?}", kind.as_str(), spot_entity));
            continue;
        };

        let action = kind.action();
        if spot.is_done(action) {
            continue;
        }

        let rotation = gesture_rotation(&session, holder, &hands);
        let distance = probe.position.distance(transform.translation);
        let threshold = session.angle_for(kind);

        let Some(trigger) = tool_session.evaluate(now, rotation, Some(distance), threshold) else {
            continue;
        };

        if !spot.try_action(action) {
            continue;
        }

        tool_session.record_success(now);

        let accepted = match kind {
            ToolKind::SeedBag => session.on_planted_success(),
            ToolKind::WateringCan => session.on_watered_success(),
        };

        crate::log(&format!(
            "🌿 {} {:?} spot #{} ({:?}, accepted={})",
            kind.as_str(),
            action,
            spot.index,
            trigger,
            accepted
        ));

        succeeded.write(GardenActionSucceeded {
            actor: tool,
            spot: spot_entity,
            action,
        });

        // Цветок назначается один раз за раунд
        if action == GardenAction::Water && pick.flower.is_none() {
            let flower = round.next_flower(&mut rng.rng);
            pick.flower = Some(flower);
            grown.write(PlantGrown {
                spot: spot_entity,
                flower,
            });
        }
    }
}
