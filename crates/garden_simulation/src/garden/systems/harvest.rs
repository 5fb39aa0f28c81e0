//! Сбор цветов рукой (Harvesting)
//!
//! Host сообщает касание цветка (FlowerTouch), ECS считает удержание.

use bevy::prelude::*;

use crate::components::{FlowerPick, Hand, PlantSpot};
use crate::garden::config::GardenSettings;
use crate::garden::events::{FlowerTouch, GardenAction, GardenActionSucceeded};
use crate::garden::round::RoundContext;
use crate::garden::session::GardenSession;

/// System: FlowerTouch → FlowerPick.touching
///
/// Began принимается только при открытом gate сбора, разрешённой руке
/// и распустившемся (политом) цветке.
pub fn track_flower_touches(
    mut touches: EventReader<FlowerTouch>,
    session: Res<GardenSession>,
    time: Res<Time<Fixed>>,
    hands: Query<&Hand>,
    mut picks: Query<(&PlantSpot, &mut FlowerPick)>,
) {
    let now = time.elapsed_secs();

    for touch in touches.read() {
        match *touch {
            FlowerTouch::Began { hand, spot } => {
                if !session.can_harvest_now() {
                    continue;
                }

                let Ok(hand_component) = hands.get(hand) else {
                    crate::log_warning(&format!("FlowerTouch: {:?} is not a hand", hand));
                    continue;
                };

                if !session.is_allowed_hand(hand_component.side) {
                    continue;
                }

                let Ok((plant_spot, mut pick)) = picks.get_mut(spot) else {
                    continue;
                };

                if !plant_spot.watered {
                    continue;
                }

                if pick.begin_touch(hand, hand_component.side, now) {
                    crate::log(&format!(
                        "🌸 Flower #{} touched by {} hand",
                        plant_spot.index,
                        hand_component.side.as_str()
                    ));
                }
            }
            FlowerTouch::Ended { hand, spot } => {
                if let Ok((_, mut pick)) = picks.get_mut(spot) {
                    pick.end_touch(hand);
                }
            }
        }
    }
}

/// System: удержание >= harvest_hold_secs → try_harvest
///
/// Неудачный try_harvest сбрасывает касание (нужно коснуться заново).
pub fn harvest_picked_flowers(
    time: Res<Time<Fixed>>,
    settings: Res<GardenSettings>,
    mut session: ResMut<GardenSession>,
    mut round: ResMut<RoundContext>,
    mut spots: Query<(Entity, &mut PlantSpot, &mut FlowerPick)>,
    mut succeeded: EventWriter<GardenActionSucceeded>,
) {
    if !session.can_harvest_now() {
        return;
    }

    let now = time.elapsed_secs();

    for (spot_entity, mut spot, mut pick) in spots.iter_mut() {
        let Some(touch) = pick.ready_to_pick(now, settings.harvest_hold_secs) else {
            continue;
        };

        // Переход мог начаться на предыдущем цветке этого же тика
        if !session.can_harvest_now() {
            break;
        }

        if !spot.try_harvest() {
            pick.touching = None;
            continue;
        }

        session.on_harvested_success();

        let slot = round.next_bouquet_slot(touch.side);
        pick.mark_picked(slot);

        crate::log_info(&format!(
            "💐 Flower #{} picked ({:?}) → {} bouquet slot {}",
            spot.index,
            pick.flower,
            touch.side.as_str(),
            slot
        ));

        succeeded.write(GardenActionSucceeded {
            actor: touch.hand,
            spot: spot_entity,
            action: GardenAction::Harvest,
        });
    }
}
