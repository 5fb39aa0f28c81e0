//! Владение инструментами: grab, force release, возврат домой

use bevy::prelude::*;

use crate::components::{Hand, SpotDetector, ToolHolder, ToolProbe, ToolSession};
use crate::garden::events::{GrabToolIntent, ToolGrabbed, ToolReleased, ToolReturnedHome};
use crate::garden::session::GardenSession;

/// Отпустить инструмент и снять его со всех detector'ов
///
/// Возвращает true, если инструмент был в руке.
pub fn release_tool(
    tool: Entity,
    holder: &mut ToolHolder,
    detectors: &mut Query<&mut SpotDetector>,
    released: &mut EventWriter<ToolReleased>,
) -> bool {
    for mut detector in detectors.iter_mut() {
        if detector.held_tool == Some(tool) {
            detector.held_tool = None;
        }
    }

    let Some(hand) = holder.release() else {
        return false;
    };

    crate::log(&format!("✋ Tool {:?} released from hand {:?}", tool, hand));
    released.write(ToolReleased { tool, hand });
    true
}

/// System: GrabToolIntent → ToolHolder + SpotDetector
///
/// Принимается только если:
/// - сессия идёт, нет перехода, инструмент соответствует стадии
/// - рука разрешена (body side)
/// - инструмент свободен и рука пустая
pub fn process_grab_intents(
    mut intents: EventReader<GrabToolIntent>,
    session: Res<GardenSession>,
    mut tools: Query<(&ToolSession, &mut ToolHolder)>,
    mut hands: Query<(&Hand, &mut SpotDetector)>,
    mut grabbed: EventWriter<ToolGrabbed>,
) {
    for intent in intents.read() {
        let Ok((tool_session, mut holder)) = tools.get_mut(intent.tool) else {
            crate::log_warning(&format!("GrabToolIntent: {:?} is not a tool", intent.tool));
            continue;
        };

        let Ok((hand, mut detector)) = hands.get_mut(intent.hand) else {
            crate::log_warning(&format!("GrabToolIntent: {:?} is not a hand", intent.hand));
            continue;
        };

        let kind = tool_session.kind;

        if !session.gate_open_for(kind) {
            crate::log(&format!(
                "Grab {} rejected: not allowed now (stage {}, transition {})",
                kind.as_str(),
                session.stage().as_str(),
                session.in_transition()
            ));
            continue;
        }

        if !session.is_allowed_hand(hand.side) {
            crate::log(&format!(
                "Grab {} rejected: {} hand not allowed",
                kind.as_str(),
                hand.side.as_str()
            ));
            continue;
        }

        if detector.held_tool.is_some() {
            crate::log(&format!("Grab {} rejected: hand already holds a tool", kind.as_str()));
            continue;
        }

        if !holder.grab(intent.hand) {
            continue;
        }

        detector.held_tool = Some(intent.tool);

        crate::log_info(&format!("🤚 {} grabbed by {} hand", kind.as_str(), hand.side.as_str()));
        grabbed.write(ToolGrabbed {
            tool: intent.tool,
            kind,
            hand: intent.hand,
        });
    }
}

/// System: тик таймеров возврата домой
///
/// По истечении: сброс сессии инструмента (stop pouring), force release,
/// probe на домашнюю позицию, ToolReturnedHome.
pub fn tick_tool_returns(
    time: Res<Time<Fixed>>,
    mut tools: Query<(Entity, &mut ToolSession, &mut ToolHolder, &mut ToolProbe)>,
    mut detectors: Query<&mut SpotDetector>,
    mut released: EventWriter<ToolReleased>,
    mut returned: EventWriter<ToolReturnedHome>,
) {
    let delta = time.delta_secs();

    for (tool, mut tool_session, mut holder, mut probe) in tools.iter_mut() {
        if !holder.tick_return(delta) {
            continue;
        }

        tool_session.clear();
        release_tool(tool, &mut holder, &mut detectors, &mut released);
        probe.position = holder.home;

        crate::log_info(&format!("🏠 {} back home", tool_session.kind.as_str()));
        returned.write(ToolReturnedHome {
            tool,
            home: holder.home,
        });
    }
}
