//! Shotdown system: counts down the delay between full failure and the
//! body being marked destroyed, and attributes the kill.

use hecs::World;

use wreck_core::components::BodyInfo;
use wreck_core::events::SimEvent;

use crate::body::{Damage, Destroyed, ShotdownTimer};

/// Advance every running shotdown timer by `dt`.
pub fn run(world: &mut World, dt: f64, events: &mut Vec<SimEvent>) {
    let mut finished = Vec::new();
    for (entity, (info, timer, damage)) in
        world.query_mut::<(&BodyInfo, &mut ShotdownTimer, &Damage)>()
    {
        timer.remaining_secs -= dt;
        if timer.remaining_secs <= 0.0 {
            let credit = if damage.state.control_out {
                damage.state.last_attacker
            } else {
                None
            };
            finished.push((entity, info.id, info.name.clone(), credit));
        }
    }
    finished.sort_by_key(|(_, body, _, _)| *body);

    for (entity, body, name, credit) in finished {
        // Removing the timer makes shotdown and kill credit fire once.
        let _ = world.remove_one::<ShotdownTimer>(entity);
        let _ = world.insert_one(entity, Destroyed);
        log::info!("{} ({:?}): shotdown", name, body);
        events.push(SimEvent::Shotdown { body });
        if let Some(attacker) = credit {
            events.push(SimEvent::KillCredited { body, attacker });
        }
    }
}
