//! Grid-face handling.
//!
//! Velocity gets a no-slip wall: all three components are zeroed on the six
//! outer faces. Scalars (pressure, divergence) instead mirror the adjacent
//! interior cell so the Poisson stencil sees a zero normal gradient at the
//! wall. The asymmetry is intentional.

use crate::grid::WindGrid;

/// Zero all velocity components on the six grid faces.
pub fn set_velocity_bounds(grid: &mut WindGrid) {
    if grid.total_cells() == 0 {
        return;
    }
    let (w, h, d) = (grid.width, grid.height, grid.depth);
    let slab = w * h;

    let WindGrid {
        ref mut vx,
        ref mut vy,
        ref mut vz,
        ..
    } = *grid;

    let mut zero = |i: usize| {
        vx[i] = 0.0;
        vy[i] = 0.0;
        vz[i] = 0.0;
    };

    // z = 0 and z = d-1 faces.
    for y in 0..h {
        for x in 0..w {
            zero(x + w * y);
            zero(x + w * y + slab * (d - 1));
        }
    }
    // y = 0 and y = h-1 faces.
    for z in 0..d {
        for x in 0..w {
            zero(x + slab * z);
            zero(x + w * (h - 1) + slab * z);
        }
    }
    // x = 0 and x = w-1 faces.
    for z in 0..d {
        for y in 0..h {
            zero(w * y + slab * z);
            zero((w - 1) + w * y + slab * z);
        }
    }
}

/// Mirror a cell-centered scalar field at the six faces: each face cell
/// copies its adjacent interior neighbor.
pub fn mirror_scalar_bounds(f: &mut [f32], w: usize, h: usize, d: usize) {
    if w == 0 || h == 0 || d == 0 {
        return;
    }
    let slab = w * h;

    for y in 0..h {
        for x in 0..w {
            f[x + w * y] = f[x + w * y + slab];
            f[x + w * y + slab * (d - 1)] = f[x + w * y + slab * (d - 2)];
        }
    }
    for z in 0..d {
        for x in 0..w {
            f[x + slab * z] = f[x + w + slab * z];
            f[x + w * (h - 1) + slab * z] = f[x + w * (h - 2) + slab * z];
        }
    }
    for z in 0..d {
        for y in 0..h {
            f[w * y + slab * z] = f[1 + w * y + slab * z];
            f[(w - 1) + w * y + slab * z] = f[(w - 2) + w * y + slab * z];
        }
    }
}
