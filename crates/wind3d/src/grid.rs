//! Velocity-grid state: SoA scalar fields, the coarse block bitmap, and the
//! AoS readout snapshot.
//!
//! Velocity lives in three structure-of-arrays fields so the per-cell sweeps
//! stream each component contiguously; external readers get an
//! array-of-structures `Vec4` view materialized on demand. Cells linearize
//! x-fastest: `idx(x, y, z) = x + width * (y + height * z)`.

use glam::Vec4;
use rayon::prelude::*;

use crate::constants::BLOCK_SIZE;

/// Uniform 3D wind grid.
///
/// All arrays are `width * height * depth` floats except `active_blocks`,
/// which holds one byte per `BLOCK_SIZE`³ block. `vx_prev/vy_prev/vz_prev`
/// only carry meaningful data between the copy at the start of a step and
/// the end of advection; `pressure` and `divergence` are reinitialized by
/// every projection.
pub struct WindGrid {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub cell_size: f32,

    pub blocks_x: usize,
    pub blocks_y: usize,
    pub blocks_z: usize,
    /// One byte per block: 1 when the block is scheduled this step.
    pub active_blocks: Vec<u8>,
    /// Pre-dilation seed flags, reused across scheduler rebuilds.
    pub(crate) seed_blocks: Vec<u8>,

    pub vx: Vec<f32>,
    pub vy: Vec<f32>,
    pub vz: Vec<f32>,
    pub vx_prev: Vec<f32>,
    pub vy_prev: Vec<f32>,
    pub vz_prev: Vec<f32>,

    pub pressure: Vec<f32>,
    pub divergence: Vec<f32>,
    /// Read-side copy for the color half-sweeps of the projection.
    pub(crate) pressure_scratch: Vec<f32>,

    aos_cache: Vec<Vec4>,
}

impl WindGrid {
    /// Create a zero-filled grid with no active blocks.
    ///
    /// Any dimension below 2 or a non-positive cell size produces the empty
    /// grid: zero cells, zero blocks, and every solver pass a no-op.
    pub fn new(width: usize, height: usize, depth: usize, cell_size: f32) -> Self {
        let valid = width >= 2 && height >= 2 && depth >= 2 && cell_size > 0.0;
        if !valid {
            log::warn!(
                "rejecting wind grid config {}x{}x{} (cell size {}); falling back to an empty grid",
                width,
                height,
                depth,
                cell_size
            );
        }
        let (width, height, depth) = if valid { (width, height, depth) } else { (0, 0, 0) };

        let cells = width * height * depth;
        let blocks_x = (width + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let blocks_y = (height + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let blocks_z = (depth + BLOCK_SIZE - 1) / BLOCK_SIZE;

        Self {
            width,
            height,
            depth,
            cell_size,
            blocks_x,
            blocks_y,
            blocks_z,
            active_blocks: vec![0; blocks_x * blocks_y * blocks_z],
            seed_blocks: vec![0; blocks_x * blocks_y * blocks_z],
            vx: vec![0.0; cells],
            vy: vec![0.0; cells],
            vz: vec![0.0; cells],
            vx_prev: vec![0.0; cells],
            vy_prev: vec![0.0; cells],
            vz_prev: vec![0.0; cells],
            pressure: vec![0.0; cells],
            divergence: vec![0.0; cells],
            pressure_scratch: vec![0.0; cells],
            aos_cache: vec![Vec4::ZERO; cells],
        }
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Index into the cell-centered arrays.
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.width * (y + self.height * z)
    }

    #[inline]
    pub fn block_index(&self, bx: usize, by: usize, bz: usize) -> usize {
        bx + self.blocks_x * (by + self.blocks_y * bz)
    }

    #[inline]
    pub fn block_active(&self, bx: usize, by: usize, bz: usize) -> bool {
        self.active_blocks[self.block_index(bx, by, bz)] != 0
    }

    /// Cell range `[start, end)` covered by block coordinate `b` on an axis
    /// of `dim` cells, clipped to the grid.
    #[inline]
    pub fn block_cells(b: usize, dim: usize) -> (usize, usize) {
        let start = b * BLOCK_SIZE;
        (start, (start + BLOCK_SIZE).min(dim))
    }

    /// Like [`Self::block_cells`] but additionally clipped to the interior
    /// `[1, dim - 1)` used by advection and projection.
    #[inline]
    pub fn block_interior_cells(b: usize, dim: usize) -> (usize, usize) {
        let (start, end) = Self::block_cells(b, dim);
        (start.max(1), end.min(dim - 1))
    }

    pub fn active_block_count(&self) -> usize {
        self.active_blocks.iter().filter(|&&b| b != 0).count()
    }

    pub fn total_block_count(&self) -> usize {
        self.active_blocks.len()
    }

    /// Snapshot `v` into `v_prev` ahead of advection.
    pub fn store_prev_velocities(&mut self) {
        self.vx_prev.copy_from_slice(&self.vx);
        self.vy_prev.copy_from_slice(&self.vy);
        self.vz_prev.copy_from_slice(&self.vz);
    }

    /// Materialize and return the AoS view: one `Vec4(x, y, z, 0)` per cell,
    /// x fastest, then y, then z.
    ///
    /// Takes `&mut self` so the cache can never be refreshed concurrently
    /// with a running step.
    pub fn velocity_data(&mut self) -> &[Vec4] {
        let slab = self.width * self.height;
        if slab > 0 {
            let (vx, vy, vz) = (&self.vx, &self.vy, &self.vz);
            self.aos_cache
                .par_chunks_mut(slab)
                .enumerate()
                .for_each(|(z, cache_slab)| {
                    let base = z * slab;
                    for (i, out) in cache_slab.iter_mut().enumerate() {
                        let idx = base + i;
                        *out = Vec4::new(vx[idx], vy[idx], vz[idx], 0.0);
                    }
                });
        }
        &self.aos_cache
    }

    /// The AoS view as raw bytes: 16 bytes per cell, no header or padding.
    pub fn velocity_bytes(&mut self) -> &[u8] {
        bytemuck::cast_slice(self.velocity_data())
    }

    /// Byte size of the AoS view.
    pub fn velocity_data_size(&self) -> usize {
        self.total_cells() * std::mem::size_of::<Vec4>()
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = WindGrid::new(32, 16, 48, 1.0);
        assert_eq!(grid.dimensions(), (32, 16, 48));
        assert_eq!(grid.vx.len(), 32 * 16 * 48);
        assert_eq!(grid.blocks_x, 2);
        assert_eq!(grid.blocks_y, 1);
        assert_eq!(grid.blocks_z, 3);
        assert_eq!(grid.total_block_count(), 6);
        assert_eq!(grid.active_block_count(), 0);
    }

    #[test]
    fn test_non_multiple_dimensions_round_up_blocks() {
        let grid = WindGrid::new(17, 16, 33, 1.0);
        assert_eq!(grid.blocks_x, 2);
        assert_eq!(grid.blocks_y, 1);
        assert_eq!(grid.blocks_z, 3);
    }

    #[test]
    fn test_invalid_config_yields_empty_grid() {
        for grid in [
            WindGrid::new(0, 16, 16, 1.0),
            WindGrid::new(16, 1, 16, 1.0),
            WindGrid::new(16, 16, 16, 0.0),
            WindGrid::new(16, 16, 16, -1.0),
        ] {
            assert_eq!(grid.total_cells(), 0);
            assert_eq!(grid.total_block_count(), 0);
            assert_eq!(grid.velocity_data_size(), 0);
        }
    }

    #[test]
    fn test_index_is_x_fastest() {
        let grid = WindGrid::new(4, 5, 6, 1.0);
        assert_eq!(grid.idx(0, 0, 0), 0);
        assert_eq!(grid.idx(1, 0, 0), 1);
        assert_eq!(grid.idx(0, 1, 0), 4);
        assert_eq!(grid.idx(0, 0, 1), 20);
        assert_eq!(grid.idx(3, 4, 5), 3 + 4 * 4 + 5 * 20);
    }

    #[test]
    fn test_block_cells_clip_to_grid() {
        assert_eq!(WindGrid::block_cells(0, 20), (0, 16));
        assert_eq!(WindGrid::block_cells(1, 20), (16, 20));
        assert_eq!(WindGrid::block_interior_cells(0, 20), (1, 16));
        assert_eq!(WindGrid::block_interior_cells(1, 20), (16, 19));
    }

    #[test]
    fn test_velocity_data_layout() {
        let mut grid = WindGrid::new(4, 4, 4, 1.0);
        let idx = grid.idx(2, 1, 3);
        grid.vx[idx] = 1.0;
        grid.vy[idx] = 2.0;
        grid.vz[idx] = 3.0;

        let data = grid.velocity_data();
        assert_eq!(data[idx], Vec4::new(1.0, 2.0, 3.0, 0.0));
        assert_eq!(data[0], Vec4::ZERO);
        assert_eq!(grid.velocity_data_size(), 4 * 4 * 4 * 16);
    }

    #[test]
    fn test_velocity_bytes_are_packed_floats() {
        let mut grid = WindGrid::new(2, 2, 2, 1.0);
        grid.vx[3] = 2.5;
        let bytes = grid.velocity_bytes();
        assert_eq!(bytes.len(), 8 * 16);
        let x = f32::from_le_bytes(bytes[3 * 16..3 * 16 + 4].try_into().unwrap());
        assert_eq!(x, 2.5);
    }
}
