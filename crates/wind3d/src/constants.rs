//! Solver constants.
//!
//! The block size and the persistence threshold together control how
//! aggressively quiet regions of the grid are culled from the per-step
//! sweeps; the remaining values are the solver's fixed tuning.

/// Edge length of a scheduling block, in cells.
///
/// The active bitmap partitions the grid into `BLOCK_SIZE`³ cuboids; a block
/// is the unit of work for every parallel sweep.
pub const BLOCK_SIZE: usize = 16;

/// Minimum cell speed that keeps a block alive once its sources move away.
///
/// Blocks whose every cell is slower than this are dropped from the
/// schedule (unless re-seeded by a source or a dilated neighbor). 0.05 is
/// high enough to cull wind that no longer reads visually.
pub const PERSISTENCE_THRESHOLD: f32 = 0.05;

/// Global damping multiplier applied during advection.
pub const ADVECTION_DAMPING: f32 = 0.99;

/// Default red-black Gauss-Seidel iteration count for the projection.
pub const DEFAULT_PRESSURE_ITERATIONS: usize = 8;

/// Below this distance from a radial volume's center the outward direction
/// is undefined and the contribution is dropped.
pub const RADIAL_CENTER_EPSILON: f32 = 1e-5;
