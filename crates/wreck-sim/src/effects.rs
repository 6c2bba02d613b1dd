//! Effects collaborator: hands out effect handles and reports spawns and
//! releases as events. Fire-and-forget.

use wreck_core::enums::EffectProfile;
use wreck_core::events::SimEvent;
use wreck_core::types::{DVec3, EffectHandle};

#[derive(Debug, Default)]
pub struct EffectLedger {
    next_handle: u32,
}

impl EffectLedger {
    pub fn spawn(
        &mut self,
        profile: EffectProfile,
        position: DVec3,
        events: &mut Vec<SimEvent>,
    ) -> EffectHandle {
        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;
        events.push(SimEvent::EffectSpawned {
            handle,
            profile,
            position,
        });
        handle
    }

    pub fn release(&mut self, handle: EffectHandle, events: &mut Vec<SimEvent>) {
        events.push(SimEvent::EffectReleased { handle });
    }
}
