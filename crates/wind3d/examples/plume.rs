//! Headless demo: a fan and a burst stirring a 64³ field.
//!
//! Run with `RUST_LOG=debug cargo run --example plume` to see the solver's
//! own logging alongside the printed diagnostics.

use wind3d::{simd_tier, Vec3, WindSimulation, WindVolume};

fn main() {
    env_logger::init();

    let mut sim = WindSimulation::new(64, 64, 64, 1.0);
    println!(
        "grid {:?}, {} blocks, SIMD tier {}",
        sim.dimensions(),
        sim.total_block_count(),
        simd_tier()
    );

    let fan = WindVolume::directional(
        Vec3::new(16.0, 32.0, 32.0),
        Vec3::new(8.0, 12.0, 12.0),
        Vec3::X,
        6.0,
    )
    .with_rotation(Vec3::new(0.0, 0.0, 0.35));
    let burst = WindVolume::radial(Vec3::new(44.0, 32.0, 32.0), 10.0, 18.0, 1.0);
    let volumes = [fan, burst];

    let dt = 0.1;
    for frame in 0..120u32 {
        sim.apply_forces(dt, &volumes);
        sim.step(dt);

        if frame % 30 == 0 {
            println!(
                "frame {:3}: {:3}/{} blocks active, velocity buffer {} bytes",
                frame,
                sim.active_block_count(),
                sim.total_block_count(),
                sim.velocity_data_size(),
            );
        }
    }

    let peak = sim
        .velocity_data()
        .iter()
        .map(|v| v.truncate().length())
        .fold(0.0f32, f32::max);
    println!("peak speed after 120 frames: {peak:.3}");
}
