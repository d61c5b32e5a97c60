use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::RigError;
use crate::hook::{AvatarEvent, Hook, HookManager};
use crate::pose::Pose;

// What gets spawned for the local player
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AvatarData {
    pub name: String,
    pub avatar_prefab: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpawnedAvatar {
    pub id: Uuid,
    pub prefab: String,
    pub spawn_pose: Pose,
}

// Owns the local player's avatar: at most one is spawned at a time
#[derive(Default)]
pub struct AvatarRegistry {
    avatar_data: Option<AvatarData>,
    local_avatar: Option<SpawnedAvatar>,
    hooks: HookManager,
}

impl AvatarRegistry {
    pub fn new(avatar_data: Option<AvatarData>) -> Self {
        AvatarRegistry {
            avatar_data,
            local_avatar: None,
            hooks: HookManager::new(),
        }
    }

    pub fn set_avatar_data(&mut self, avatar_data: Option<AvatarData>) {
        self.avatar_data = avatar_data;
    }

    pub fn local_avatar(&self) -> Option<&SpawnedAvatar> {
        self.local_avatar.as_ref()
    }

    pub fn is_avatar_spawned(&self) -> bool {
        self.local_avatar.is_some()
    }

    pub fn on_before_spawn(&mut self, f: impl FnMut(&Pose) + 'static) {
        let mut f = f;
        self.add_hook(
            AvatarEvent::BeforeSpawn(Pose::IDENTITY),
            Box::new(move |event: &AvatarEvent| {
                if let AvatarEvent::BeforeSpawn(pose) = event {
                    f(pose)
                }
            }),
        );
    }

    pub fn on_after_spawn(&mut self, f: impl FnMut(Uuid) + 'static) {
        let mut f = f;
        self.add_hook(
            AvatarEvent::AfterSpawn(Uuid::nil()),
            Box::new(move |event: &AvatarEvent| {
                if let AvatarEvent::AfterSpawn(id) = event {
                    f(*id)
                }
            }),
        );
    }

    pub fn on_unspawned(&mut self, f: impl FnMut(Uuid) + 'static) {
        let mut f = f;
        self.add_hook(
            AvatarEvent::Unspawned(Uuid::nil()),
            Box::new(move |event: &AvatarEvent| {
                if let AvatarEvent::Unspawned(id) = event {
                    f(*id)
                }
            }),
        );
    }

    fn add_hook(&mut self, kind: AvatarEvent, hook: Hook) {
        self.hooks.add(&kind, hook);
    }

    pub fn spawn(&mut self, spawn_pose: Pose) -> Result<Uuid, RigError> {
        if let Some(avatar) = &self.local_avatar {
            warn!(id = %avatar.id, "will not spawn avatar, one is already spawned");
            return Err(RigError::AvatarAlreadySpawned(avatar.id));
        }
        let data = self.avatar_data.as_ref().ok_or(RigError::MissingAvatarData)?;
        let prefab = data
            .avatar_prefab
            .clone()
            .ok_or_else(|| RigError::MissingAvatarPrefab(data.name.clone()))?;

        self.hooks.call(&AvatarEvent::BeforeSpawn(spawn_pose));

        let id = Uuid::new_v4();
        info!(%id, prefab = %prefab, "avatar spawned");
        self.local_avatar = Some(SpawnedAvatar {
            id,
            prefab,
            spawn_pose,
        });

        self.hooks.call(&AvatarEvent::AfterSpawn(id));
        Ok(id)
    }

    pub fn unspawn(&mut self) -> Result<SpawnedAvatar, RigError> {
        let avatar = self.local_avatar.take().ok_or_else(|| {
            warn!("cannot unspawn avatar, it is not spawned");
            RigError::AvatarNotSpawned
        })?;

        info!(id = %avatar.id, "avatar unspawned");
        self.hooks.call(&AvatarEvent::Unspawned(avatar.id));
        Ok(avatar)
    }
}
