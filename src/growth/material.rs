//! Surface materials handed to the renderer

use serde::Serialize;

/// Flat-shaded material description.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Material {
    /// sRGB colour as 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
    /// Render both faces (photo leaves are visible from behind)
    pub double_sided: bool,
    /// Unlit materials ignore the light rig
    pub lit: bool,
    pub casts_shadow: bool,
}

impl Material {
    /// Saddle brown bark shared by every root.
    pub const ROOT_BARK: Material = Material {
        color: 0x8B4513,
        opacity: 0.9,
        double_sided: false,
        lit: true,
        casts_shadow: true,
    };

    /// Forest green for the ambient crown.
    pub const CROWN_LEAF: Material = Material {
        color: 0x228B22,
        opacity: 0.8,
        double_sided: false,
        lit: true,
        casts_shadow: true,
    };

    /// White unlit placeholder a photo texture is drawn onto.
    pub const PHOTO_LEAF: Material = Material {
        color: 0xFFFFFF,
        opacity: 1.0,
        double_sided: true,
        lit: false,
        casts_shadow: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_photo_leaves_are_unlit_and_double_sided() {
        for m in [Material::ROOT_BARK, Material::CROWN_LEAF] {
            assert!(m.lit && m.casts_shadow && !m.double_sided);
            assert!(m.opacity < 1.0);
        }
        let photo = Material::PHOTO_LEAF;
        assert!(!photo.lit && photo.double_sided);
        assert_eq!(photo.color, 0xFFFFFF);
    }
}
