//! Error types for the voxel world subsystem

use thiserror::Error;

/// Recoverable failures.
///
/// Broken invariants (out-of-range voxel access, duplicate cache inserts,
/// double pool claims, missing neighborhood chunks at snapshot time) panic
/// instead of returning a variant here; continuing past them would corrupt
/// the sparse store or silently produce a wrong mesh.
#[derive(Debug, Error)]
pub enum Error {
    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error("invalid config: {0}")]
    Config(String),
}
