use glam::DVec3;
use serde::Serialize;

use crate::motion::ClassifiedMotion;
use crate::pose::Pose;
use crate::reconciliation::{CollinearCase, ReconciliationMode};

// What reconciliation decided on the last tick
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub mode: ReconciliationMode,
    pub case: Option<CollinearCase>, // graceful only
    pub classified: ClassifiedMotion,
    pub lateral_correction: DVec3,
    pub vertical_correction: DVec3,
    // pose the player root was moved to
    pub pose: Pose,
    // headset position on the character's floor plane, relative to the character
    pub headset_offset: DVec3,
}
