//! Pointer picking of photo leaves
//!
//! Only photo leaves are candidates; crown leaves and roots are never hit.

use crate::core::camera::Camera;
use crate::core::types::{Mat4, Vec2};
use crate::gallery::tree::TreeState;
use crate::growth::photo_leaf::PhotoLeaf;
use crate::math::Ray;

/// Slack added around a leaf's bounds so flat leaves still have volume.
const BOUNDS_PADDING: f32 = 1e-3;

/// Convert a pointer position in pixels (origin top-left) to normalized device
/// coordinates (x right, y up, both in [-1, 1]).
pub fn pointer_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        x / width.max(1.0) * 2.0 - 1.0,
        -(y / height.max(1.0)) * 2.0 + 1.0,
    )
}

/// A leaf under the pointer.
#[derive(Clone, Copy, Debug)]
pub struct PickHit<'a> {
    pub leaf: &'a PhotoLeaf,
    /// Distance from the camera along the pick ray
    pub distance: f32,
}

/// Resolves pointer positions to photo leaves by ray casting.
#[derive(Clone, Copy, Debug, Default)]
pub struct PickingService;

impl PickingService {
    pub fn new() -> Self {
        Self
    }

    /// Nearest photo leaf of `tree` under the pointer at `ndc`.
    pub fn pick<'a>(&self, ndc: Vec2, camera: &Camera, tree: &'a TreeState) -> Option<PickHit<'a>> {
        let ray = camera.screen_ray(ndc);
        self.pick_ray(&ray, &tree.tree_matrix(), tree.photo_leaves())
    }

    /// Nearest of `leaves` hit by `ray`, with leaves placed under `tree_matrix`.
    pub fn pick_ray<'a>(&self, ray: &Ray, tree_matrix: &Mat4, leaves: &'a [PhotoLeaf]) -> Option<PickHit<'a>> {
        leaves
            .iter()
            .filter_map(|leaf| {
                intersect_leaf(ray, leaf, tree_matrix).map(|distance| PickHit { leaf, distance })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Ray parameter of the nearest hit on `leaf`, if any.
pub fn intersect_leaf(ray: &Ray, leaf: &PhotoLeaf, tree_matrix: &Mat4) -> Option<f32> {
    let world = leaf.world_matrix(tree_matrix);

    let bounds = leaf.shape.bounds.transformed(&world).padded(BOUNDS_PADDING);
    ray.intersects_aabb(&bounds)?;

    // Degenerate scale cannot be hit
    if world.determinant().abs() < 1e-12 {
        return None;
    }
    let local_ray = ray.transform(&world.inverse());
    leaf.shape
        .triangles()
        .filter_map(|[a, b, c]| local_ray.intersects_triangle(a, b, c))
        .min_by(f32::total_cmp)
}
