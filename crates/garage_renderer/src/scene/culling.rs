//! Per-object visibility test against a view volume
//!
//! An object is skipped only when none of its eight AABB corners lands inside
//! the normalized device cube after the perspective divide. A box that fully
//! encloses the view volume therefore has every corner outside and is culled
//! even though it is visible; callers must not run enclosing geometry (the
//! garage box) through this test.

use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::bounds::Aabb;

/// Returns `true` when the box with local corners `min`/`max` can be skipped
/// under `model_view_projection`
pub fn frustum_cull_aabb(min: Vec3, max: Vec3, model_view_projection: &Mat4) -> bool {
    !Aabb::new(min, max)
        .corners()
        .iter()
        .any(|corner| corner_is_visible(corner, model_view_projection))
}

fn corner_is_visible(corner: &Vec3, model_view_projection: &Mat4) -> bool {
    let clip = model_view_projection * Vec4::new(corner.x, corner.y, corner.z, 1.0);
    let ndc = clip.xyz() / clip.w;
    let inside = |v: f32| (-1.0..=1.0).contains(&v);
    inside(ndc.x) && inside(ndc.y) && inside(ndc.z)
}
