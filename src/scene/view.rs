//! What the renderer sees each frame
//!
//! The renderer is an external collaborator. Each frame it receives a
//! [`SceneView`] borrowing the current tree, camera, and the static light rig,
//! and draws it however it likes.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::core::camera::Camera;
use crate::gallery::tree::TreeState;
use crate::growth::crown::CrownLeaf;
use crate::growth::leaf_shape::LeafShape;
use crate::growth::material::Material;
use crate::growth::photo_leaf::PhotoLeaf;
use crate::growth::root_mesh::TubeMesh;

/// A light with a colour, intensity, and (for positioned lights) a position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
    pub casts_shadow: bool,
}

/// Static environment: sky, ground plane, and light rig.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLighting {
    pub background: u32,
    pub ambient: Light,
    pub sun: Light,
    /// Shadow map resolution for the sun
    pub shadow_map_size: u32,
    /// Warm light inside the crown
    pub crown_glow: Light,
    /// Falloff distance of the crown glow
    pub crown_glow_distance: f32,
    /// Side length of the square ground plane at y = 0
    pub ground_size: f32,
    pub ground_color: u32,
    pub ground_opacity: f32,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            background: 0x87CEEB,
            ambient: Light {
                color: 0x404040,
                intensity: 0.7,
                position: Vec3::ZERO,
                casts_shadow: false,
            },
            sun: Light {
                color: 0xFFFFFF,
                intensity: 0.9,
                position: Vec3::new(10.0, 15.0, 8.0),
                casts_shadow: true,
            },
            shadow_map_size: 2048,
            crown_glow: Light {
                color: 0xFFA500,
                intensity: 0.5,
                position: Vec3::new(0.0, 12.0, 0.0),
                casts_shadow: false,
            },
            crown_glow_distance: 100.0,
            ground_size: 50.0,
            ground_color: 0x90EE90,
            ground_opacity: 0.8,
        }
    }
}

/// Snapshot of one frame for the renderer.
pub struct SceneView<'a> {
    pub camera: &'a Camera,
    pub tree: &'a TreeState,
    pub lighting: &'a SceneLighting,
    /// World matrix of the tree group
    pub tree_matrix: Mat4,
}

impl<'a> SceneView<'a> {
    pub fn new(camera: &'a Camera, tree: &'a TreeState, lighting: &'a SceneLighting) -> Self {
        Self {
            camera,
            tree,
            lighting,
            tree_matrix: tree.tree_matrix(),
        }
    }

    /// Root meshes with their world matrices.
    pub fn roots(&self) -> impl Iterator<Item = (Mat4, &'a TubeMesh)> + '_ {
        self.tree
            .roots()
            .iter()
            .map(|root| (root.world_matrix(&self.tree_matrix), root.mesh()))
    }

    /// Crown leaves with their world matrices and material.
    pub fn crown_leaves(&self) -> impl Iterator<Item = (Mat4, Material, &'a CrownLeaf)> + '_ {
        self.tree
            .crown_leaves()
            .iter()
            .map(|leaf| (self.tree_matrix * leaf.transform.to_mat4(), leaf.material(), leaf))
    }

    /// Photo leaves with their world matrices.
    pub fn photo_leaves(&self) -> impl Iterator<Item = (Mat4, &'a PhotoLeaf)> + '_ {
        self.tree
            .photo_leaves()
            .iter()
            .map(|leaf| (leaf.world_matrix(&self.tree_matrix), leaf))
    }

    /// Geometry shared by every leaf.
    pub fn leaf_shape(&self) -> &'a Arc<LeafShape> {
        self.tree.leaf_shape()
    }
}

/// External renderer.
pub trait Renderer {
    /// Draw one frame. Must not block.
    fn render(&mut self, view: &SceneView<'_>);
}

/// Renderer that draws nothing and logs what it was given.
#[derive(Debug, Default)]
pub struct LoggingRenderer {
    pub frames: u64,
}

impl Renderer for LoggingRenderer {
    fn render(&mut self, view: &SceneView<'_>) {
        self.frames += 1;
        log::trace!(
            "Frame {}: {} roots, {} crown leaves, {} photo leaves",
            self.frames,
            view.roots().count(),
            view.crown_leaves().count(),
            view.photo_leaves().count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CameraConfig;

    #[test]
    fn test_view_lists_scene_contents() {
        let mut tree = TreeState::with_seed(1).unwrap();
        tree.yaw = 0.5;
        let camera = Camera::from_config(&CameraConfig::default(), 1.0);
        let lighting = SceneLighting::default();
        let view = SceneView::new(&camera, &tree, &lighting);

        assert_eq!(view.roots().count(), 3);
        assert_eq!(view.crown_leaves().count(), 24);
        assert!(view.crown_leaves().all(|(_, material, _)| material == Material::CROWN_LEAF));
        assert_eq!(view.photo_leaves().count(), 0);
        assert_eq!(view.tree_matrix, Mat4::from_rotation_y(0.5));

        let mut renderer = LoggingRenderer::default();
        renderer.render(&view);
        assert_eq!(renderer.frames, 1);
    }

    #[test]
    fn test_default_lighting() {
        let lighting = SceneLighting::default();
        assert_eq!(lighting.background, 0x87CEEB);
        assert!(lighting.sun.casts_shadow);
        assert_eq!(lighting.shadow_map_size, 2048);
    }
}
