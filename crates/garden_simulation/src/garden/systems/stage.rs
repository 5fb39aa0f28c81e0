//! Стадии: тик перехода + relay outbox'а сессии в events

use bevy::prelude::*;

use crate::components::{SpotDetector, ToolHolder, ToolKind, ToolSession};
use crate::garden::events::{
    GardenFinished, ProgressChanged, StageChanged, StageCleared, ToolReleased, WateringFx,
};
use crate::garden::session::{GardenNotice, GardenSession};

use super::handling::release_tool;

/// System: тик StageTransition (Clearing → Locking → done)
pub fn advance_stage_transition(mut session: ResMut<GardenSession>, time: Res<Time<Fixed>>) {
    if session.transition().is_none() {
        return;
    }

    session.advance_transition(time.delta_secs());
}

/// System: GardenNotice → typed events + запросы к инструментам
///
/// Последний в цепочке: всё, что сессия накопила за тик, уходит host'у в этом же тике.
pub fn relay_garden_notices(
    mut session: ResMut<GardenSession>,
    mut tools: Query<(Entity, &ToolSession, &mut ToolHolder)>,
    mut detectors: Query<&mut SpotDetector>,
    mut stage_changed: EventWriter<StageChanged>,
    mut progress_changed: EventWriter<ProgressChanged>,
    mut stage_cleared: EventWriter<StageCleared>,
    mut finished: EventWriter<GardenFinished>,
    mut watering_fx: EventWriter<WateringFx>,
    mut released: EventWriter<ToolReleased>,
) {
    if !session.has_notices() {
        return;
    }

    for notice in session.drain_notices() {
        match notice {
            GardenNotice::StageChanged(progress) => {
                stage_changed.write(StageChanged { progress });
            }
            GardenNotice::ProgressChanged(progress) => {
                progress_changed.write(ProgressChanged { progress });
            }
            GardenNotice::StageCleared(stage) => {
                stage_cleared.write(StageCleared { stage });
            }
            GardenNotice::Finished { target, use_type } => {
                finished.write(GardenFinished { target, use_type });
            }
            GardenNotice::ReturnToolHome { kind, delay_secs } => {
                let Some((tool, _, mut holder)) = tools
                    .iter_mut()
                    .find(|(_, tool_session, _)| tool_session.kind == kind)
                else {
                    crate::log_warning(&format!("ReturnToolHome: no {} in scene", kind.as_str()));
                    continue;
                };

                let generation = holder.schedule_return(delay_secs);
                crate::log(&format!(
                    "🏠 {} returns home in {:.1}s (gen {})",
                    kind.as_str(),
                    delay_secs,
                    generation
                ));

                // Лейка "доливает" до самого возврата
                if kind == ToolKind::WateringCan {
                    watering_fx.write(WateringFx {
                        tool,
                        seconds: delay_secs,
                    });
                }
            }
            GardenNotice::ReleaseAllTools => {
                for (tool, _, mut holder) in tools.iter_mut() {
                    release_tool(tool, &mut holder, &mut detectors, &mut released);
                }
            }
        }
    }
}
