use crate::model::PalGender;

/// Values a parsed pal falls back to when its save parameter omits a node.
#[derive(Debug, Clone, Copy)]
pub struct PalDefaults {
    pub level: i32,
    /// Also used for `stomach` when `FullStomach` is absent.
    pub max_stomach: f32,
    pub sanity: f32,
    pub gender: PalGender,
}

impl Default for PalDefaults {
    fn default() -> Self {
        Self {
            level: 1,
            max_stomach: 150.0,
            sanity: 100.0,
            gender: PalGender::Female,
        }
    }
}
