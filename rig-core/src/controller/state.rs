use serde::Serialize;

// Locomotion states of the character. Only walking around on the tracked rig
// exists for now; every phase of the controller matches on this exhaustively
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CharacterState {
    Default,
}

impl Default for CharacterState {
    fn default() -> Self {
        CharacterState::Default
    }
}
