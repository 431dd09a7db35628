//! Pressure projection.
//!
//! Removes most of the divergence from the velocity field: build the
//! divergence right-hand side, relax a 7-point Poisson problem for pressure
//! with red-black Gauss-Seidel, then subtract the pressure gradient.
//! Convergence is iterative; the output is only approximately
//! divergence-free, with the iteration count trading accuracy for
//! throughput.
//!
//! The two color half-sweeps run block-parallel. A half-sweep writes one
//! checkerboard color while its stencil only ever reads the other color, so
//! reading from a pre-sweep copy of the field produces bit-identical results
//! to a sequential in-place sweep.

use rayon::prelude::*;

use crate::boundary;
use crate::constants::BLOCK_SIZE;
use crate::grid::WindGrid;

/// Project the velocity field toward zero divergence.
pub fn project(grid: &mut WindGrid, iterations: usize) {
    if grid.total_cells() == 0 {
        return;
    }

    let (w, h, d) = (grid.width, grid.height, grid.depth);
    let slab = w * h;
    let (bxn, byn) = (grid.blocks_x, grid.blocks_y);

    // Divergence right-hand side and pressure guess over the interior of
    // every active block.
    {
        let WindGrid {
            ref mut divergence,
            ref mut pressure,
            ref vx,
            ref vy,
            ref vz,
            ref active_blocks,
            ..
        } = *grid;

        divergence
            .par_chunks_mut(slab)
            .zip(pressure.par_chunks_mut(slab))
            .enumerate()
            .for_each(|(z, (div_slab, p_slab))| {
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
                                div_slab[i] = -0.5
                                    * (vx[gi + 1] - vx[gi - 1] + vy[gi + w] - vy[gi - w]
                                        + vz[gi + slab]
                                        - vz[gi - slab]);
                                p_slab[i] = 0.0;
                            }
                        }
                    }
                }
            });
    }

    boundary::mirror_scalar_bounds(&mut grid.divergence, w, h, d);
    boundary::mirror_scalar_bounds(&mut grid.pressure, w, h, d);

    // Red-black Gauss-Seidel on the 7-point stencil. Cells with
    // (x + y + z + rb) even update in half-sweep rb, reading only odd
    // neighbors out of the scratch copy.
    let inv_six = 1.0 / 6.0;
    for _ in 0..iterations {
        for rb in 0..2usize {
            grid.pressure_scratch.copy_from_slice(&grid.pressure);

            let WindGrid {
                ref mut pressure,
                ref pressure_scratch,
                ref divergence,
                ref active_blocks,
                ..
            } = *grid;

            pressure
                .par_chunks_mut(slab)
                .enumerate()
                .for_each(|(z, p_slab)| {
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
                                let start = x0 + ((x0 + y + z + rb) & 1);
                                for x in (start..x1).step_by(2) {
                                    let i = w * y + x;
                                    let gi = z * slab + i;
                                    p_slab[i] = (divergence[gi]
                                        + pressure_scratch[gi - 1]
                                        + pressure_scratch[gi + 1]
                                        + pressure_scratch[gi - w]
                                        + pressure_scratch[gi + w]
                                        + pressure_scratch[gi - slab]
                                        + pressure_scratch[gi + slab])
                                        * inv_six;
                                }
                            }
                        }
                    }
                });
        }
        boundary::mirror_scalar_bounds(&mut grid.pressure, w, h, d);
    }

    // Subtract the pressure gradient from velocity.
    {
        let WindGrid {
            ref mut vx,
            ref mut vy,
            ref mut vz,
            ref pressure,
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
                                slab_x[i] -= 0.5 * (pressure[gi + 1] - pressure[gi - 1]);
                                slab_y[i] -= 0.5 * (pressure[gi + w] - pressure[gi - w]);
                                slab_z[i] -= 0.5 * (pressure[gi + slab] - pressure[gi - slab]);
                            }
                        }
                    }
                }
            });
    }

    boundary::set_velocity_bounds(grid);
}
