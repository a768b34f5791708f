use std::path::Path;
use tracing::debug;

/// Decides whether a stage output can be reused instead of recomputed.
///
/// This is an existence check, not a lock: two runs producing the same output at the
/// same time may both compute it.
#[derive(Debug, Clone, Copy)]
pub struct OutputCache {
    enabled: bool,
}

impl OutputCache {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_cached(&self, output_path: &Path) -> bool {
        let cached = self.enabled && output_path.is_file();
        if cached {
            debug!(path = %output_path.display(), "Output already present, skipping.");
        }
        cached
    }
}
