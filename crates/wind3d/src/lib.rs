//! Real-time Eulerian wind-field solver.
//!
//! Maintains a uniform 3D velocity grid driven by directional and radial
//! force volumes, advects the field along itself, and projects it toward
//! zero divergence each step. Work is scheduled sparsely: the grid is
//! partitioned into 16³ blocks and only blocks near sources or lingering
//! wind are swept, so large mostly-calm fields stay cheap. The resulting
//! field is meant to drive particles, foliage, or cloth at interactive
//! rates on 32³-128³ grids.
//!
//! # Example
//!
//! ```
//! use wind3d::{Vec3, WindSimulation, WindVolume};
//!
//! let mut sim = WindSimulation::new(32, 32, 32, 1.0);
//!
//! let fan = WindVolume::directional(
//!     Vec3::new(16.0, 16.0, 16.0),
//!     Vec3::new(6.0, 6.0, 6.0),
//!     Vec3::X,
//!     5.0,
//! );
//!
//! // Per frame: inject forces, then advance the field.
//! sim.apply_forces(0.1, &[fan]);
//! sim.step(0.1);
//!
//! assert!(sim.active_block_count() > 0);
//! let velocities = sim.velocity_data();
//! assert_eq!(velocities.len(), 32 * 32 * 32);
//! ```

pub mod aabb;
pub mod advection;
pub mod boundary;
pub mod constants;
pub mod forces;
pub mod grid;
pub mod pressure;
pub mod scheduler;
pub mod serde_utils;
pub mod volume;

pub use aabb::{Aabb, AabbTree, Ray};
pub use glam::{Vec3, Vec4};
pub use grid::WindGrid;
pub use volume::{rotate_direction, WindVolume};

use constants::DEFAULT_PRESSURE_ITERATIONS;

/// Widest SIMD tier this build was compiled for.
///
/// The kernels are written as scalar loops over SoA fields and rely on the
/// compiler vectorizing them with whatever the target provides; this string
/// is a diagnostic for benchmarks and bug reports.
pub fn simd_tier() -> &'static str {
    if cfg!(target_feature = "avx2") {
        "AVX2"
    } else if cfg!(target_feature = "sse4.1") {
        "SSE4.1"
    } else {
        "Scalar"
    }
}

/// A wind field and its per-step pipeline.
///
/// One owner at a time: the per-step entry points take `&mut self` and must
/// not be called concurrently on the same simulation. Volumes are read-only
/// for the duration of a call.
pub struct WindSimulation {
    /// Grid state. Public for tests and advanced readers; most callers only
    /// need the accessors below.
    pub grid: WindGrid,
    /// Red-black Gauss-Seidel iterations per projection.
    pub pressure_iterations: usize,
    /// Steps taken since creation.
    pub frame: u64,
}

impl WindSimulation {
    /// Create a simulation over a `width x height x depth` grid of
    /// `cell_size`-sized cells.
    ///
    /// Dimensions below 2 or a non-positive cell size produce an empty
    /// simulation on which every call is a no-op.
    pub fn new(width: usize, height: usize, depth: usize, cell_size: f32) -> Self {
        let grid = WindGrid::new(width, height, depth, cell_size);
        log::info!(
            "wind simulation initialized: {}x{}x{} cells, {} blocks, SIMD tier {}",
            grid.width,
            grid.height,
            grid.depth,
            grid.total_block_count(),
            simd_tier()
        );
        Self {
            grid,
            pressure_iterations: DEFAULT_PRESSURE_ITERATIONS,
            frame: 0,
        }
    }

    /// Refresh the active-block schedule from `volumes`, then integrate
    /// their forces into the velocity field.
    ///
    /// Call every frame even with no volumes: the schedule must be rebuilt
    /// so blocks whose wind has died out are retired.
    pub fn apply_forces(&mut self, dt: f32, volumes: &[WindVolume]) {
        scheduler::update_active_blocks(&mut self.grid, volumes);
        if volumes.is_empty() {
            return;
        }
        forces::accumulate(&mut self.grid, dt, volumes);
    }

    /// Advance the field one step: self-advection along the previous
    /// velocities, then pressure projection.
    pub fn step(&mut self, dt: f32) {
        if self.grid.total_cells() == 0 {
            return;
        }
        self.grid.store_prev_velocities();
        advection::advect(&mut self.grid, dt);
        pressure::project(&mut self.grid, self.pressure_iterations);
        self.frame += 1;
    }

    /// AoS velocity view: one `Vec4(x, y, z, 0)` per cell, x fastest.
    pub fn velocity_data(&mut self) -> &[Vec4] {
        self.grid.velocity_data()
    }

    /// The AoS view as raw bytes, 16 per cell, ready for a mapped buffer.
    pub fn velocity_bytes(&mut self) -> &[u8] {
        self.grid.velocity_bytes()
    }

    /// Byte size of the AoS velocity view.
    pub fn velocity_data_size(&self) -> usize {
        self.grid.velocity_data_size()
    }

    /// Grid dimensions in cells.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.grid.dimensions()
    }

    /// Blocks scheduled for the current step.
    pub fn active_block_count(&self) -> usize {
        self.grid.active_block_count()
    }

    /// Total blocks in the grid partition.
    pub fn total_block_count(&self) -> usize {
        self.grid.total_block_count()
    }
}
