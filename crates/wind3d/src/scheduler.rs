//! Active-block scheduling.
//!
//! Rebuilds the block bitmap each step in two passes. The seed pass marks a
//! block when a source volume's bounding box touches it or when any of its
//! cells still carries meaningful speed. The dilation pass then widens the
//! seed set by one block in every direction so that wind can cross into a
//! previously quiet neighbor within a single step.

use glam::Vec3;
use rayon::prelude::*;

use crate::aabb::{Aabb, AabbTree};
use crate::constants::{BLOCK_SIZE, PERSISTENCE_THRESHOLD};
use crate::grid::WindGrid;
use crate::volume::WindVolume;

/// Overwrite `grid.active_blocks` from the current velocity field and the
/// source volumes.
pub fn update_active_blocks(grid: &mut WindGrid, volumes: &[WindVolume]) {
    if grid.total_cells() == 0 {
        return;
    }

    let boxes: Vec<Aabb> = volumes.iter().map(WindVolume::bounds).collect();
    let mut tree = AabbTree::new();
    tree.build(&boxes);
    let has_sources = !boxes.is_empty();

    let (w, h, d) = (grid.width, grid.height, grid.depth);
    let (bxn, byn, bzn) = (grid.blocks_x, grid.blocks_y, grid.blocks_z);
    let block_world = BLOCK_SIZE as f32 * grid.cell_size;
    let threshold_sq = PERSISTENCE_THRESHOLD * PERSISTENCE_THRESHOLD;

    // Seed pass. Each block byte is owned by one task; the velocity fields
    // are only read.
    let mut seeds = std::mem::take(&mut grid.seed_blocks);
    {
        let (vx, vy, vz) = (&grid.vx, &grid.vy, &grid.vz);
        seeds.par_iter_mut().enumerate().for_each(|(bidx, seed)| {
            let bx = bidx % bxn;
            let by = (bidx / bxn) % byn;
            let bz = bidx / (bxn * byn);

            if has_sources {
                let lo = Vec3::new(bx as f32, by as f32, bz as f32) * block_world;
                let block_box = Aabb::new(lo, lo + Vec3::splat(block_world));
                if tree.query_overlap(&block_box) {
                    *seed = 1;
                    return;
                }
            }

            let (x0, x1) = WindGrid::block_cells(bx, w);
            let (y0, y1) = WindGrid::block_cells(by, h);
            let (z0, z1) = WindGrid::block_cells(bz, d);

            let mut lingering = false;
            'scan: for z in z0..z1 {
                for y in y0..y1 {
                    let base = w * (y + h * z);
                    for x in x0..x1 {
                        let i = base + x;
                        let speed_sq = vx[i] * vx[i] + vy[i] * vy[i] + vz[i] * vz[i];
                        if speed_sq > threshold_sq {
                            lingering = true;
                            break 'scan;
                        }
                    }
                }
            }
            *seed = u8::from(lingering);
        });
    }

    // Dilation pass: a block survives iff it or any of its 26 neighbors is
    // seeded. Edge blocks clip the neighborhood to the grid.
    grid.active_blocks
        .par_iter_mut()
        .enumerate()
        .for_each(|(bidx, active)| {
            if seeds[bidx] != 0 {
                *active = 1;
                return;
            }

            let bx = (bidx % bxn) as isize;
            let by = ((bidx / bxn) % byn) as isize;
            let bz = (bidx / (bxn * byn)) as isize;

            let mut neighbor_seeded = false;
            'neighbors: for dz in -1..=1 {
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if dx == 0 && dy == 0 && dz == 0 {
                            continue;
                        }
                        let (nx, ny, nz) = (bx + dx, by + dy, bz + dz);
                        if nx < 0
                            || nx >= bxn as isize
                            || ny < 0
                            || ny >= byn as isize
                            || nz < 0
                            || nz >= bzn as isize
                        {
                            continue;
                        }
                        let nidx = nx as usize + bxn * (ny as usize + byn * nz as usize);
                        if seeds[nidx] != 0 {
                            neighbor_seeded = true;
                            break 'neighbors;
                        }
                    }
                }
            }
            *active = u8::from(neighbor_seeded);
        });
    grid.seed_blocks = seeds;

    log::trace!(
        "active blocks: {}/{}",
        grid.active_block_count(),
        grid.total_block_count()
    );
}
