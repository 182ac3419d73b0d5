//! Photo leaves: one per uploaded photo, placed at random in the crown

use std::f32::consts::TAU;
use std::ops::Range;
use std::sync::Arc;

use rand::Rng;

use crate::core::types::{Mat4, Vec3};
use crate::gallery::photo::{Photo, PhotoId};
use crate::gallery::texture::LeafTexture;
use crate::growth::leaf_shape::LeafShape;
use crate::growth::material::Material;
use crate::scene::LocalTransform;

/// Identifier of a photo leaf, stable for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId(pub u64);

/// A pickable leaf bound to one photo.
#[derive(Clone, Debug)]
pub struct PhotoLeaf {
    pub id: LeafId,
    pub photo: PhotoId,
    pub transform: LocalTransform,
    /// Uniform scale chosen at creation; the texture aspect stretches X from it
    pub base_scale: f32,
    pub material: Material,
    pub shape: Arc<LeafShape>,
    texture: Option<LeafTexture>,
}

impl PhotoLeaf {
    pub fn texture(&self) -> Option<&LeafTexture> {
        self.texture.as_ref()
    }

    pub fn is_textured(&self) -> bool {
        self.texture.is_some()
    }

    /// Attach a decoded photo and stretch the leaf horizontally to the photo's
    /// aspect ratio, keeping its height.
    pub(crate) fn attach_texture(&mut self, texture: LeafTexture) {
        if let Some(aspect) = texture.aspect() {
            let s = self.base_scale;
            self.transform.scale = Vec3::new(s * aspect, s, s);
        }
        self.texture = Some(texture);
    }

    /// Leaf-to-world matrix given the tree group's matrix.
    pub fn world_matrix(&self, tree: &Mat4) -> Mat4 {
        *tree * self.transform.to_mat4()
    }
}

/// Placement ranges for new photo leaves.
#[derive(Clone, Debug)]
pub struct PhotoLeafFactory {
    /// Horizontal distance from the trunk axis
    pub radial: Range<f32>,
    pub height: Range<f32>,
    /// Maximum tilt on the X and Z axes (radians)
    pub tilt: f32,
    pub scale: Range<f32>,
    shape: Arc<LeafShape>,
}

impl Default for PhotoLeafFactory {
    fn default() -> Self {
        Self::new(LeafShape::shared())
    }
}

impl PhotoLeafFactory {
    pub fn new(shape: Arc<LeafShape>) -> Self {
        Self {
            radial: 1.5..4.0,
            height: 8.0..11.0,
            tilt: 0.3,
            scale: 0.8..1.2,
            shape,
        }
    }

    pub fn shape(&self) -> &Arc<LeafShape> {
        &self.shape
    }

    /// An untextured leaf for `photo` at a random spot in the crown.
    pub fn create_leaf(&self, id: LeafId, photo: &Photo, rng: &mut impl Rng) -> PhotoLeaf {
        let angle = rng.gen_range(0.0..TAU);
        let radius = rng.gen_range(self.radial.clone());
        let height = rng.gen_range(self.height.clone());
        let position = Vec3::new(angle.cos() * radius, height, angle.sin() * radius);

        let rotation = Vec3::new(
            rng.gen_range(-self.tilt..self.tilt),
            rng.gen_range(0.0..TAU),
            rng.gen_range(-self.tilt..self.tilt),
        );
        let scale = rng.gen_range(self.scale.clone());

        PhotoLeaf {
            id,
            photo: photo.id,
            transform: LocalTransform {
                position,
                rotation,
                scale: Vec3::splat(scale),
            },
            base_scale: scale,
            material: Material::PHOTO_LEAF,
            shape: Arc::clone(&self.shape),
            texture: None,
        }
    }
}
