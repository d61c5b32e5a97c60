use std::collections::HashMap;
use std::mem::{discriminant, Discriminant};
use std::vec::Vec;

use uuid::Uuid;

use crate::pose::Pose;

#[derive(Debug, Clone, PartialEq)]
pub enum AvatarEvent {
    BeforeSpawn(Pose),
    AfterSpawn(Uuid),
    Unspawned(Uuid),
}

pub type Hook = Box<dyn FnMut(&AvatarEvent)>;

// Callbacks keyed by event kind; the payload of the event passed to `add` is
// only used to pick the kind
pub struct HookManager {
    stored_funcs: HashMap<Discriminant<AvatarEvent>, Vec<Hook>>,
}

impl HookManager {
    pub fn new() -> Self {
        Self {
            stored_funcs: HashMap::new(),
        }
    }

    pub fn add(&mut self, kind: &AvatarEvent, f: Hook) {
        self.stored_funcs
            .entry(discriminant(kind))
            .or_insert_with(Vec::new)
            .push(f);
    }

    pub fn call(&mut self, event: &AvatarEvent) {
        if let Some(watchers) = self.stored_funcs.get_mut(&discriminant(event)) {
            for f in watchers.iter_mut() {
                f(event);
            }
        }
    }
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn hooks_only_fire_for_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = HookManager::new();

        let log = seen.clone();
        hooks.add(
            &AvatarEvent::Unspawned(Uuid::nil()),
            Box::new(move |event: &AvatarEvent| log.borrow_mut().push(event.clone())),
        );

        let id = Uuid::new_v4();
        hooks.call(&AvatarEvent::AfterSpawn(id));
        hooks.call(&AvatarEvent::Unspawned(id));
        assert_eq!(seen.borrow().as_slice(), &[AvatarEvent::Unspawned(id)]);
    }
}
