//! Tube meshes for roots
//!
//! A root's path is smoothed with a Catmull-Rom curve and a circle is swept
//! along it. Thickness depends only on the total number of roots.

use bytemuck::{Pod, Zeroable};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::growth::curve::CatmullRomCurve;
use crate::growth::material::Material;
use crate::growth::path::{generate_root_path, BASE_ROOT_COUNT};
use crate::math::Aabb;

const BASE_TUBE_RADIUS: f32 = 0.15;

/// Tube radius for every root when `total` roots exist.
pub fn tube_radius(total: usize) -> f32 {
    BASE_TUBE_RADIUS * (1.0 + 0.1 * (total as f32 - BASE_ROOT_COUNT as f32))
}

/// Vertex layout shared with the renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh for one root.
///
/// Owned by exactly one [`Root`](crate::gallery::tree::Root); dropping it
/// releases the geometry.
#[derive(Debug, PartialEq)]
pub struct TubeMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
    pub material: Material,
    /// Curve control points the tube was swept along
    pub path: Vec<Vec3>,
    pub radius: f32,
}

impl TubeMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl Drop for TubeMesh {
    fn drop(&mut self) {
        log::trace!(
            "Releasing root mesh ({} vertices, radius {:.3})",
            self.vertices.len(),
            self.radius
        );
    }
}

/// Sweeps tubes along root paths.
#[derive(Clone, Debug)]
pub struct RootMeshBuilder {
    /// Segments along the curve
    pub tubular_segments: usize,
    /// Segments around the circumference
    pub radial_segments: usize,
}

impl Default for RootMeshBuilder {
    fn default() -> Self {
        Self {
            tubular_segments: 20,
            radial_segments: 8,
        }
    }
}

impl RootMeshBuilder {
    /// Build the mesh for root `index` out of `total`.
    pub fn build_root(&self, index: usize, total: usize) -> Result<TubeMesh> {
        let path = generate_root_path(index, total)?;
        self.build(path, total)
    }

    /// Sweep a tube along `path` with the thickness for `total` roots.
    pub fn build(&self, path: Vec<Vec3>, total: usize) -> Result<TubeMesh> {
        if self.radial_segments < 3 {
            return Err(Error::Geometry(format!(
                "tube needs at least 3 radial segments, got {}",
                self.radial_segments
            )));
        }
        let radius = tube_radius(total);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::Geometry(format!(
                "invalid tube radius {radius} for {total} roots"
            )));
        }

        let curve = CatmullRomCurve::new(path)?;
        let frames = curve.frames(self.tubular_segments)?;

        let ring = self.radial_segments + 1;
        let mut vertices = Vec::with_capacity(frames.len() * ring);
        for (i, frame) in frames.iter().enumerate() {
            let u = i as f32 / self.tubular_segments as f32;
            for j in 0..ring {
                let v = j as f32 / self.radial_segments as f32;
                let angle = v * std::f32::consts::TAU;
                let normal = (frame.normal * -angle.cos() + frame.binormal * angle.sin()).normalize();
                let position = frame.point + normal * radius;
                vertices.push(MeshVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [u, v],
                });
            }
        }

        let mut indices = Vec::with_capacity(self.tubular_segments * self.radial_segments * 6);
        for j in 1..=self.tubular_segments {
            for i in 1..=self.radial_segments {
                let a = (ring * (j - 1) + (i - 1)) as u32;
                let b = (ring * j + (i - 1)) as u32;
                let c = (ring * j + i) as u32;
                let d = (ring * (j - 1) + i) as u32;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let bounds = Aabb::from_points(vertices.iter().map(|v| Vec3::from_array(v.position)))
            .ok_or_else(|| Error::Geometry("tube produced no vertices".into()))?;

        Ok(TubeMesh {
            vertices,
            indices,
            bounds,
            material: Material::ROOT_BARK,
            path: curve.control_points().to_vec(),
            radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::path::ROOT_HEIGHT;

    #[test]
    fn test_mesh_sizes() {
        let mesh = RootMeshBuilder::default().build_root(0, 3).unwrap();
        assert_eq!(mesh.vertices.len(), 21 * 9);
        assert_eq!(mesh.indices.len(), 20 * 8 * 6);
        assert_eq!(mesh.triangle_count(), 320);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.vertex_bytes().len(), mesh.vertices.len() * 32);
        assert_eq!(mesh.index_bytes().len(), mesh.indices.len() * 4);
    }

    #[test]
    fn test_vertices_sit_on_tube_surface() {
        let builder = RootMeshBuilder::default();
        let mesh = builder.build_root(1, 5).unwrap();
        let ring = builder.radial_segments + 1;
        let curve = CatmullRomCurve::new(mesh.path.clone()).unwrap();
        for (i, chunk) in mesh.vertices.chunks(ring).enumerate() {
            let center = curve.point_at(i as f32 / builder.tubular_segments as f32);
            for v in chunk {
                let d = (Vec3::from_array(v.position) - center).length();
                assert!((d - mesh.radius).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_bounds_span_root_height() {
        let mesh = RootMeshBuilder::default().build_root(2, 4).unwrap();
        assert!(mesh.bounds.min.y < 0.5);
        assert!(mesh.bounds.max.y > ROOT_HEIGHT - 0.5);
    }

    #[test]
    fn test_tube_radius_grows_with_total() {
        assert!((tube_radius(3) - 0.15).abs() < 1e-6);
        for total in 1..40 {
            assert!(tube_radius(total + 1) >= tube_radius(total));
        }
        let thin = RootMeshBuilder::default().build_root(0, 3).unwrap();
        let thick = RootMeshBuilder::default().build_root(0, 8).unwrap();
        assert!(thick.radius > thin.radius);
    }

    #[test]
    fn test_material_is_bark() {
        let mesh = RootMeshBuilder::default().build_root(0, 3).unwrap();
        assert_eq!(mesh.material, Material::ROOT_BARK);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let builder = RootMeshBuilder { radial_segments: 2, ..Default::default() };
        assert!(matches!(builder.build_root(0, 3), Err(Error::Geometry(_))));
        let builder = RootMeshBuilder::default();
        assert!(builder.build(vec![Vec3::ZERO], 3).is_err());
        assert!(builder.build_root(5, 3).is_err());
    }
}
