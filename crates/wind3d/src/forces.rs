//! Per-cell force injection from source volumes.
//!
//! Every cell of every active block accumulates the contributions of all
//! volumes, then integrates `v += f * dt`. Directional volumes contribute a
//! rotated constant inside their box; radial volumes push outward with a
//! linear falloff that reaches zero at the radius. Contributions commute,
//! so volume order never matters.

use glam::Vec3;
use rayon::prelude::*;

use crate::constants::{BLOCK_SIZE, RADIAL_CENTER_EPSILON};
use crate::grid::WindGrid;
use crate::volume::{rotate_direction, WindVolume};

/// Accumulate volume forces into the velocity field over active blocks.
///
/// The active bitmap must already be up to date; `WindSimulation`
/// refreshes it before calling in.
pub fn accumulate(grid: &mut WindGrid, dt: f32, volumes: &[WindVolume]) {
    if grid.total_cells() == 0 || volumes.is_empty() {
        return;
    }

    let (w, h) = (grid.width, grid.height);
    let slab = w * h;
    let cell_size = grid.cell_size;
    let (bxn, byn) = (grid.blocks_x, grid.blocks_y);

    let WindGrid {
        ref mut vx,
        ref mut vy,
        ref mut vz,
        ref active_blocks,
        ..
    } = *grid;

    vx.par_chunks_mut(slab)
        .zip(vy.par_chunks_mut(slab))
        .zip(vz.par_chunks_mut(slab))
        .enumerate()
        .for_each(|(z, ((slab_x, slab_y), slab_z))| {
            let bz = z / BLOCK_SIZE;
            let world_z = z as f32 * cell_size;

            for by in 0..byn {
                let (y0, y1) = WindGrid::block_cells(by, h);
                for bx in 0..bxn {
                    if active_blocks[bx + bxn * (by + byn * bz)] == 0 {
                        continue;
                    }
                    let (x0, x1) = WindGrid::block_cells(bx, w);

                    for y in y0..y1 {
                        let row = w * y;
                        let world_y = y as f32 * cell_size;
                        for x in x0..x1 {
                            let p = Vec3::new(x as f32 * cell_size, world_y, world_z);
                            let mut force = Vec3::ZERO;

                            for vol in volumes {
                                match *vol {
                                    WindVolume::Directional {
                                        center,
                                        half_extents,
                                        direction,
                                        rotation,
                                        strength,
                                    } => {
                                        let delta = (p - center).abs();
                                        if delta.x <= half_extents.x
                                            && delta.y <= half_extents.y
                                            && delta.z <= half_extents.z
                                        {
                                            force +=
                                                rotate_direction(direction, rotation) * strength;
                                        }
                                    }
                                    WindVolume::Radial {
                                        center,
                                        radius,
                                        strength,
                                        ..
                                    } => {
                                        let r = p - center;
                                        let dist_sq = r.length_squared();
                                        if dist_sq < radius * radius {
                                            let dist = dist_sq.sqrt();
                                            // The outward direction is undefined
                                            // at the center itself.
                                            let inv = if dist > RADIAL_CENTER_EPSILON {
                                                1.0 / dist
                                            } else {
                                                0.0
                                            };
                                            let falloff = 1.0 - dist / radius;
                                            force += r * (strength * falloff * inv);
                                        }
                                    }
                                }
                            }

                            let i = row + x;
                            slab_x[i] += force.x * dt;
                            slab_y[i] += force.y * dt;
                            slab_z[i] += force.z * dt;
                        }
                    }
                }
            }
        });
}
