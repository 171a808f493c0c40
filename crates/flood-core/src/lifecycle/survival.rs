//! Stranding, injury onset and death

use flood_events::{DeathCause, LifecycleEventKind};

use super::step::{PersonMut, TickContext};
use crate::allocator::request_shelter;

/// One stranded hour. Injury sets in after the onset threshold, a shelter
/// request goes out every hour, and an unrescued individual dies once the
/// survivability threshold is passed.
pub fn stranded_behavior(ctx: &mut TickContext, person: &mut PersonMut) {
    let timestamp = ctx.clock.timestamp();
    let condition = &mut *person.condition;

    if !condition.stranded {
        ctx.events.record(timestamp, person.id, LifecycleEventKind::Stranded);
    }
    condition.stranded = true;
    condition.time_stranded += 1;

    if condition.time_stranded > condition.injury_duration {
        if !condition.injured {
            ctx.events.record(timestamp, person.id, LifecycleEventKind::Injured);
        }
        condition.injured = true;
        condition.time_injured += 1;
    }

    if request_shelter(ctx.shelter, ctx.policy, person.entity, condition) {
        if let Some(site) = ctx.town.shelter_site {
            person.position.move_to(site.random_point(ctx.rng));
        }
        ctx.events.record(timestamp, person.id, LifecycleEventKind::Sheltered);
        return;
    }

    if !ctx.shelter.contains(person.entity)
        && condition.time_stranded > condition.survivability_duration
    {
        condition.kill();
        person.decisions.coping_implemented = false;
        ctx.events.record(
            timestamp,
            person.id,
            LifecycleEventKind::Died {
                cause: DeathCause::Stranded,
            },
        );
        tracing::debug!(person = person.id.0, hour = timestamp.tick, "died while stranded");
    }
}
