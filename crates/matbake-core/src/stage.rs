//! Pipeline stages of a single bake.

use std::fmt;

/// States a bake moves through, in order.
///
/// A failure at any point ends the bake; there is no explicit failed state
/// because the error itself carries the stage (see [`crate::BakeError::stage`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BakeStage {
    Configured,
    Captured,
    ReadBack,
    PostProcessed,
    Encoded,
    Persisted,
    Done,
}

impl BakeStage {
    /// Number of user-visible progress steps in one bake.
    pub const TOTAL_STEPS: u32 = 5;

    /// 1-based progress step for this stage.
    ///
    /// Encoding a file and persisting an asset are alternative terminal sinks
    /// and share the same step.
    pub fn step(self) -> u32 {
        match self {
            Self::Configured => 1,
            Self::Captured => 2,
            Self::ReadBack | Self::PostProcessed => 3,
            Self::Encoded | Self::Persisted => 4,
            Self::Done => Self::TOTAL_STEPS,
        }
    }

    /// Short label used in log output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Configured => "creating render target",
            Self::Captured => "drawing material",
            Self::ReadBack => "reading pixels",
            Self::PostProcessed => "post-processing channels",
            Self::Encoded => "exporting image",
            Self::Persisted => "saving texture asset",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for BakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}/{}: {}",
            self.step(),
            Self::TOTAL_STEPS,
            self.label()
        )
    }
}
