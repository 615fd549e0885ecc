//! Root configuration.

/// Default bound on back-to-back update cycles triggered by state changes.
pub const DEFAULT_MAX_UPDATE_PASSES: usize = 50;

/// Per-root settings, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootConfig {
    /// Cycles one update may chain before failing with
    /// [`Error::UpdateLoop`](crate::Error::UpdateLoop).
    pub max_update_passes: usize,
    /// Emit a trace event for every applied diff entry.
    pub trace_patches: bool,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            max_update_passes: DEFAULT_MAX_UPDATE_PASSES,
            trace_patches: false,
        }
    }
}

impl RootConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_update_passes(mut self, passes: usize) -> Self {
        self.max_update_passes = passes.max(1);
        self
    }

    pub fn trace_patches(mut self, enabled: bool) -> Self {
        self.trace_patches = enabled;
        self
    }
}
