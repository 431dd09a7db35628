//! Quantified solver invariants: quiet fields stay quiet, walls stay
//! no-slip, and projection never increases divergence.

use wind3d::{pressure, Vec3, WindSimulation, WindVolume};

/// Central-difference divergence magnitude summed over the interior.
fn divergence_l1(sim: &WindSimulation) -> f32 {
    let (w, h, d) = sim.dimensions();
    let slab = w * h;
    let grid = &sim.grid;
    let mut sum = 0.0;
    for z in 1..d - 1 {
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let gi = grid.idx(x, y, z);
                let div = 0.5
                    * (grid.vx[gi + 1] - grid.vx[gi - 1] + grid.vy[gi + w] - grid.vy[gi - w]
                        + grid.vz[gi + slab]
                        - grid.vz[gi - slab]);
                sum += div.abs();
            }
        }
    }
    sum
}

#[test]
fn test_zero_input_zero_output_across_sizes() {
    for (w, h, d) in [(4, 4, 4), (8, 16, 8), (20, 20, 20)] {
        let mut sim = WindSimulation::new(w, h, d, 1.0);
        for _ in 0..5 {
            sim.apply_forces(0.25, &[]);
            sim.step(0.25);
        }
        assert_eq!(sim.active_block_count(), 0, "{w}x{h}x{d}");
        assert!(sim.grid.vx.iter().all(|&v| v == 0.0));
        assert!(sim.grid.vy.iter().all(|&v| v == 0.0));
        assert!(sim.grid.vz.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_faces_are_no_slip_after_any_step() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);
    let volumes = [
        WindVolume::radial(Vec3::new(8.0, 16.0, 16.0), 10.0, 30.0, 1.0),
        WindVolume::directional(Vec3::new(24.0, 16.0, 16.0), Vec3::splat(7.0), Vec3::Y, 12.0),
    ];

    for _ in 0..10 {
        sim.apply_forces(0.1, &volumes);
        sim.step(0.1);

        let (w, h, d) = sim.dimensions();
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    if x == 0 || x == w - 1 || y == 0 || y == h - 1 || z == 0 || z == d - 1 {
                        let i = sim.grid.idx(x, y, z);
                        assert_eq!(sim.grid.vx[i], 0.0, "vx at face ({x},{y},{z})");
                        assert_eq!(sim.grid.vy[i], 0.0, "vy at face ({x},{y},{z})");
                        assert_eq!(sim.grid.vz[i], 0.0, "vz at face ({x},{y},{z})");
                    }
                }
            }
        }
    }
}

#[test]
fn test_projection_reduces_divergence_of_forced_field() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);
    let burst = [WindVolume::radial(Vec3::splat(16.0), 10.0, 25.0, 1.0)];

    // A radial burst is strongly divergent.
    sim.apply_forces(0.1, &burst);
    let before = divergence_l1(&sim);
    assert!(before > 0.0);

    pressure::project(&mut sim.grid, 1);
    let after_one = divergence_l1(&sim);
    assert!(
        after_one <= before,
        "one iteration grew divergence: {before} -> {after_one}"
    );

    pressure::project(&mut sim.grid, 8);
    let after_more = divergence_l1(&sim);
    assert!(
        after_more <= after_one,
        "more iterations grew divergence: {after_one} -> {after_more}"
    );
}

#[test]
fn test_impulse_decays_and_schedule_retires() {
    let mut sim = WindSimulation::new(32, 32, 32, 1.0);
    let burst = [WindVolume::radial(Vec3::splat(16.0), 6.0, 10.0, 1.0)];

    sim.apply_forces(0.1, &burst);
    sim.step(0.1);
    assert!(sim.active_block_count() > 0);

    // Let the field decay with no sources. Damping multiplies 0.99 per
    // step and projection keeps removing energy, so the persistence test
    // eventually drops every block.
    let mut retired = false;
    for _ in 0..2000 {
        sim.apply_forces(0.1, &[]);
        sim.step(0.1);
        if sim.active_block_count() == 0 {
            retired = true;
            break;
        }
    }
    assert!(retired, "schedule never retired a decayed field");
}
