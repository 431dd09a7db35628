//! End-to-end solver scenarios.
//!
//! Literal-value checks of the full pipeline: empty stepping, single
//! radial/directional sources, rotation handling, and block scheduling.

use wind3d::{Vec3, WindSimulation, WindVolume};

fn velocity_at(sim: &WindSimulation, x: usize, y: usize, z: usize) -> Vec3 {
    let i = sim.grid.idx(x, y, z);
    Vec3::new(sim.grid.vx[i], sim.grid.vy[i], sim.grid.vz[i])
}

/// S1: stepping an empty field does nothing, forever.
#[test]
fn test_empty_steps_stay_exactly_zero() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);

    for _ in 0..100 {
        sim.apply_forces(0.1, &[]);
        sim.step(0.1);
    }

    assert_eq!(sim.active_block_count(), 0);
    assert!(sim.grid.vx.iter().all(|&v| v == 0.0));
    assert!(sim.grid.vy.iter().all(|&v| v == 0.0));
    assert!(sim.grid.vz.iter().all(|&v| v == 0.0));
}

/// S2: a radial impulse activates blocks, leaves its own center still, and
/// pushes mirrored cells with equal speed.
#[test]
fn test_single_radial_impulse() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);
    let burst = [WindVolume::radial(Vec3::splat(16.0), 8.0, 20.0, 1.0)];

    sim.apply_forces(0.1, &burst);
    sim.step(0.1);

    assert!(sim.active_block_count() > 0);

    let center = velocity_at(&sim, 16, 16, 16);
    assert!(center.length() < 1e-5, "center moved: {center}");

    let right = velocity_at(&sim, 20, 16, 16);
    let left = velocity_at(&sim, 12, 16, 16);
    assert!(right.length() > 0.0);
    assert!(
        (right.length() - left.length()).abs() < 1e-4,
        "mirrored speeds diverged: {} vs {}",
        right.length(),
        left.length()
    );
}

/// S3: a directional volume fills exactly its box with strength * dt.
#[test]
fn test_single_directional_fill() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);
    let fan = [WindVolume::directional(
        Vec3::splat(16.0),
        Vec3::splat(6.0),
        Vec3::X,
        5.0,
    )];

    sim.apply_forces(0.1, &fan);

    let center = velocity_at(&sim, 16, 16, 16);
    assert!((center.x - 0.5).abs() < 1e-6);
    assert_eq!(center.y, 0.0);
    assert_eq!(center.z, 0.0);

    for z in 0..32 {
        for y in 0..32 {
            for x in 0..32 {
                if (x as i32 - 16).abs() > 6 {
                    let v = velocity_at(&sim, x, y, z);
                    assert_eq!(v, Vec3::ZERO, "leak at ({x},{y},{z})");
                }
            }
        }
    }
}

/// S4: a quarter turn about Y redirects a +X fan to -Z.
#[test]
fn test_directional_rotation_quarter_turn() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);
    let fan = [WindVolume::directional(
        Vec3::splat(16.0),
        Vec3::splat(6.0),
        Vec3::X,
        5.0,
    )
    .with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0))];

    sim.apply_forces(0.1, &fan);

    let center = velocity_at(&sim, 16, 16, 16);
    assert!(center.x.abs() < 1e-6, "vx was {}", center.x);
    assert!((center.z + 0.5).abs() < 1e-6, "vz was {}", center.z);
}

/// S5: a point source inside block (1,1,1) activates that block's 3x3x3
/// dilated neighborhood on a grid large enough to hold it.
#[test]
fn test_point_source_dilates_to_27_blocks() {
    let mut sim = WindSimulation::new(64, 64, 64, 1.0);
    let spark = [WindVolume::radial(Vec3::splat(16.0), 1.0, 5.0, 1.0)];

    sim.apply_forces(0.1, &spark);

    assert_eq!(sim.active_block_count(), 27);
    for bz in 0..sim.grid.blocks_z {
        for by in 0..sim.grid.blocks_y {
            for bx in 0..sim.grid.blocks_x {
                let expected = bx <= 2 && by <= 2 && bz <= 2;
                assert_eq!(
                    sim.grid.block_active(bx, by, bz),
                    expected,
                    "block ({bx},{by},{bz})"
                );
            }
        }
    }
}

/// S5 on 32³: only 2 blocks per axis exist, so the dilated neighborhood
/// clips to the full partition.
#[test]
fn test_point_source_dilation_clips_on_small_grid() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);
    let spark = [WindVolume::radial(Vec3::splat(16.0), 1.0, 5.0, 1.0)];

    sim.apply_forces(0.1, &spark);
    assert_eq!(sim.active_block_count(), 8);
    assert_eq!(sim.total_block_count(), 8);
}

/// S6: lingering velocity alone keeps its block and the dilated
/// neighborhood scheduled.
#[test]
fn test_velocity_persistence_carries_over() {
    let mut sim = WindSimulation::new(64, 64, 64, 1.0);
    let idx = sim.grid.idx(16, 16, 16);
    sim.grid.vx[idx] = 1.0;

    sim.apply_forces(0.1, &[]);

    assert_eq!(sim.active_block_count(), 27);
    assert!(sim.grid.block_active(1, 1, 1));
    assert!(sim.grid.block_active(0, 0, 0));
    assert!(sim.grid.block_active(2, 2, 2));
    assert!(!sim.grid.block_active(3, 0, 0));
}

/// Radial forces are mirror-symmetric through the volume center on an
/// odd-sized grid: reflecting the offset flips the matching component and
/// preserves the other two.
#[test]
fn test_radial_force_reflection_symmetry() {
    let mut sim = WindSimulation::new(33, 33, 33, 1.0);
    let burst = [WindVolume::radial(Vec3::splat(16.0), 8.0, 20.0, 1.0)];

    sim.apply_forces(0.1, &burst);

    let offsets = [(3i32, 2i32, 1i32), (5, 0, 0), (1, 4, 2), (0, 0, 6)];
    for (rx, ry, rz) in offsets {
        let at = |dx: i32, dy: i32, dz: i32| {
            velocity_at(
                &sim,
                (16 + dx) as usize,
                (16 + dy) as usize,
                (16 + dz) as usize,
            )
        };
        let v = at(rx, ry, rz);

        let mx = at(-rx, ry, rz);
        assert!((v.x + mx.x).abs() < 1e-4 && (v.y - mx.y).abs() < 1e-4);

        let my = at(rx, -ry, rz);
        assert!((v.y + my.y).abs() < 1e-4 && (v.x - my.x).abs() < 1e-4);

        let mz = at(rx, ry, -rz);
        assert!((v.z + mz.z).abs() < 1e-4 && (v.x - mz.x).abs() < 1e-4);
    }
}
