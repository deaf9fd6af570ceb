use thiserror::Error;

/// Faults raised inside grid routing. They never reach callers of
/// [`compute_path`](super::compute_path); the orchestrator logs them and draws the
/// simple path instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("grid cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    #[error("routing bounds are not finite")]
    NonFiniteBounds,

    #[error("routing grid of {cols}x{rows} cells exceeds the limit of {max} cells")]
    GridTooLarge { cols: usize, rows: usize, max: usize },
}
