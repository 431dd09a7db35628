//! Semi-Lagrangian self-advection.
//!
//! Each interior cell of an active block traces back along the previous
//! velocity field and trilinearly samples that same field at the traced
//! position. The trace works in cell-index units: the backtraced position is
//! `(x, y, z) - dt * v_prev`, with no division by the cell size. Sampled
//! values are damped by a fixed factor on write-back; forces are never
//! damped, only the advected field.

use rayon::prelude::*;

use crate::boundary;
use crate::constants::{ADVECTION_DAMPING, BLOCK_SIZE};
use crate::grid::WindGrid;

/// Trilinearly sample the three scalar fields at `(px, py, pz)` in cell
/// units. Coordinates clamp to `[0, dim - 1.001]`, so the eight gathered
/// corners always stay in bounds.
#[inline]
pub(crate) fn sample_prev(
    vx: &[f32],
    vy: &[f32],
    vz: &[f32],
    dims: (usize, usize, usize),
    px: f32,
    py: f32,
    pz: f32,
) -> (f32, f32, f32) {
    let (w, h, d) = dims;

    let fx = px.clamp(0.0, w as f32 - 1.001);
    let fy = py.clamp(0.0, h as f32 - 1.001);
    let fz = pz.clamp(0.0, d as f32 - 1.001);

    let i0 = fx as usize;
    let j0 = fy as usize;
    let k0 = fz as usize;

    let s1 = fx - i0 as f32;
    let s0 = 1.0 - s1;
    let t1 = fy - j0 as f32;
    let t0 = 1.0 - t1;
    let u1 = fz - k0 as f32;
    let u0 = 1.0 - u1;

    let row0 = w * j0;
    let row1 = row0 + w;
    let slice0 = w * h * k0;
    let slice1 = slice0 + w * h;
    let i1 = i0 + 1;

    let trilerp = |f: &[f32]| {
        ((f[i0 + row0 + slice0] * s0 + f[i1 + row0 + slice0] * s1) * t0
            + (f[i0 + row1 + slice0] * s0 + f[i1 + row1 + slice0] * s1) * t1)
            * u0
            + ((f[i0 + row0 + slice1] * s0 + f[i1 + row0 + slice1] * s1) * t0
                + (f[i0 + row1 + slice1] * s0 + f[i1 + row1 + slice1] * s1) * t1)
                * u1
    };

    (trilerp(vx), trilerp(vy), trilerp(vz))
}

/// Advect the velocity field along itself.
///
/// Expects `v_prev` to hold the pre-step snapshot. Only interior cells of
/// active blocks are rewritten; the boundary faces are zeroed afterwards.
pub fn advect(grid: &mut WindGrid, dt: f32) {
    if grid.total_cells() == 0 {
        return;
    }

    let (w, h, d) = (grid.width, grid.height, grid.depth);
    let slab = w * h;
    let (bxn, byn) = (grid.blocks_x, grid.blocks_y);

    {
        let WindGrid {
            ref mut vx,
            ref mut vy,
            ref mut vz,
            ref vx_prev,
            ref vy_prev,
            ref vz_prev,
            ref active_blocks,
            ..
        } = *grid;

        vx.par_chunks_mut(slab)
            .zip(vy.par_chunks_mut(slab))
            .zip(vz.par_chunks_mut(slab))
            .enumerate()
            .for_each(|(z, ((slab_x, slab_y), slab_z))| {
                if z < 1 || z >= d - 1 {
                    return;
                }
                let bz = z / BLOCK_SIZE;

                for by in 0..byn {
                    let (y0, y1) = WindGrid::block_interior_cells(by, h);
                    for bx in 0..bxn {
                        if active_blocks[bx + bxn * (by + byn * bz)] == 0 {
                            continue;
                        }
                        let (x0, x1) = WindGrid::block_interior_cells(bx, w);

                        for y in y0..y1 {
                            let row = w * y;
                            for x in x0..x1 {
                                let i = row + x;
                                let gi = z * slab + i;

                                let px = x as f32 - dt * vx_prev[gi];
                                let py = y as f32 - dt * vy_prev[gi];
                                let pz = z as f32 - dt * vz_prev[gi];

                                let (sx, sy, sz) =
                                    sample_prev(vx_prev, vy_prev, vz_prev, (w, h, d), px, py, pz);

                                slab_x[i] = sx * ADVECTION_DAMPING;
                                slab_y[i] = sy * ADVECTION_DAMPING;
                                slab_z[i] = sz * ADVECTION_DAMPING;
                            }
                        }
                    }
                }
            });
    }

    boundary::set_velocity_bounds(grid);
}
