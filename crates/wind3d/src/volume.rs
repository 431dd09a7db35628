//! Force-source descriptors.
//!
//! A wind field is driven by a set of immutable volumes: oriented boxes
//! that push air in a fixed direction, and spheres that push air outward
//! from their center with a linear falloff. The solver never mutates a
//! volume; authoring tools construct new ones each edit.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::serde_utils::vec3_array;

/// A force source feeding the velocity field.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum WindVolume {
    /// Axis-aligned box (before rotation) pushing air along one direction.
    Directional {
        /// Box center, world units.
        #[serde(with = "vec3_array")]
        center: Vec3,
        /// Half-extents of the box on each axis.
        #[serde(with = "vec3_array")]
        half_extents: Vec3,
        /// Unit force direction before rotation.
        #[serde(with = "vec3_array")]
        direction: Vec3,
        /// XYZ Euler angles in radians, applied X then Y then Z.
        #[serde(with = "vec3_array")]
        rotation: Vec3,
        /// Force magnitude.
        strength: f32,
    },
    /// Sphere pushing air outward from its center.
    Radial {
        /// Sphere center, world units.
        #[serde(with = "vec3_array")]
        center: Vec3,
        /// Sphere radius.
        radius: f32,
        /// Reserved falloff shaping parameter; the kernel currently
        /// hard-codes linear falloff.
        falloff: f32,
        /// Outward speed at the center.
        strength: f32,
    },
}

impl WindVolume {
    /// Directional volume with zero rotation. `direction` is normalized;
    /// a zero direction collapses to a volume that contributes nothing.
    pub fn directional(center: Vec3, half_extents: Vec3, direction: Vec3, strength: f32) -> Self {
        Self::Directional {
            center,
            half_extents,
            direction: direction.normalize_or_zero(),
            rotation: Vec3::ZERO,
            strength,
        }
    }

    /// Radial volume. Rotation does not apply to spheres.
    pub fn radial(center: Vec3, radius: f32, strength: f32, falloff: f32) -> Self {
        Self::Radial {
            center,
            radius,
            falloff,
            strength,
        }
    }

    /// Replace the Euler rotation of a directional volume. No-op for
    /// radial volumes.
    pub fn with_rotation(self, euler: Vec3) -> Self {
        match self {
            Self::Directional {
                center,
                half_extents,
                direction,
                strength,
                ..
            } => Self::Directional {
                center,
                half_extents,
                direction,
                rotation: euler,
                strength,
            },
            radial @ Self::Radial { .. } => radial,
        }
    }

    /// World-space bounding box, used to seed the block scheduler.
    pub fn bounds(&self) -> Aabb {
        match *self {
            Self::Directional {
                center,
                half_extents,
                ..
            } => Aabb::from_center_half_extents(center, half_extents),
            Self::Radial { center, radius, .. } => {
                Aabb::from_center_half_extents(center, Vec3::splat(radius))
            }
        }
    }
}

/// Rotate `v` by XYZ Euler angles, applying the elementary rotations in
/// the fixed order X, then Y, then Z.
///
/// Source authors orient directional volumes with these angles, so the
/// composition order is part of the public contract and is spelled out
/// rather than delegated to a matrix constructor.
pub fn rotate_direction(v: Vec3, euler: Vec3) -> Vec3 {
    let (sx, cx) = euler.x.sin_cos();
    let (sy, cy) = euler.y.sin_cos();
    let (sz, cz) = euler.z.sin_cos();

    let Vec3 { x, y, z } = v;

    let y1 = y * cx - z * sx;
    let z1 = y * sx + z * cx;

    let x2 = x * cy + z1 * sy;
    let z2 = -x * sy + z1 * cy;

    let x3 = x2 * cz - y1 * sz;
    let y3 = x2 * sz + y1 * cz;

    Vec3::new(x3, y3, z2)
}
