use thiserror::Error;

#[derive(Debug, Error)]
pub enum RigError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("character pose cannot be applied to the player: pose sink is not set")]
    MissingPoseSink,

    #[error("local player avatar is already spawned ({0})")]
    AvatarAlreadySpawned(uuid::Uuid),

    #[error("avatar is not spawned")]
    AvatarNotSpawned,

    #[error("avatar data is not set")]
    MissingAvatarData,

    #[error("avatar data '{0}' has no avatar prefab")]
    MissingAvatarPrefab(String),
}
