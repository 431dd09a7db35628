//! Serde bridges for glam vector fields.
//!
//! glam is built without its serde feature, so volume fields go through a
//! `#[serde(with = ...)]` module that persists a `Vec3` as a plain
//! three-float array.

pub mod vec3_array {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(v: &Vec3, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        v.to_array().serialize(s)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec3, D::Error>
    where
        D: Deserializer<'de>,
    {
        <[f32; 3]>::deserialize(d).map(Vec3::from_array)
    }
}
