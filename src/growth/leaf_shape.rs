//! Flat leaf outline shared by crown and photo leaves

use std::sync::Arc;

use crate::core::types::{Vec2, Vec3};
use crate::growth::root_mesh::MeshVertex;
use crate::math::Aabb;

/// Divisions per quadratic arc of the outline.
const ARC_DIVISIONS: usize = 12;

/// Leaf outline in the local XY plane (facing +Z), one unit tall and wide,
/// triangulated as a fan around the origin.
#[derive(Debug, PartialEq)]
pub struct LeafShape {
    /// Closed outline, counter-clockwise, first point not repeated
    pub outline: Vec<Vec2>,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl LeafShape {
    /// The standard pointed-oval leaf: four quadratic arcs through the tips
    /// (0, 0.5), (0.5, 0), (0, -0.5), (-0.5, 0).
    pub fn standard() -> Self {
        let arcs = [
            (Vec2::new(0.0, 0.5), Vec2::new(0.3, 0.3), Vec2::new(0.5, 0.0)),
            (Vec2::new(0.5, 0.0), Vec2::new(0.3, -0.3), Vec2::new(0.0, -0.5)),
            (Vec2::new(0.0, -0.5), Vec2::new(-0.3, -0.3), Vec2::new(-0.5, 0.0)),
            (Vec2::new(-0.5, 0.0), Vec2::new(-0.3, 0.3), Vec2::new(0.0, 0.5)),
        ];

        let mut outline = Vec::with_capacity(arcs.len() * ARC_DIVISIONS);
        for (start, control, end) in arcs {
            // Last sample of each arc is the first of the next
            for i in 0..ARC_DIVISIONS {
                let t = i as f32 / ARC_DIVISIONS as f32;
                outline.push(quadratic(start, control, end, t));
            }
        }
        // Arcs run clockwise; flip so triangles face +Z
        outline.reverse();

        let vertex = |p: Vec2| MeshVertex {
            position: [p.x, p.y, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [p.x + 0.5, p.y + 0.5],
        };
        let mut vertices = Vec::with_capacity(outline.len() + 1);
        vertices.push(vertex(Vec2::ZERO));
        vertices.extend(outline.iter().copied().map(vertex));

        let n = outline.len() as u32;
        let mut indices = Vec::with_capacity(outline.len() * 3);
        for i in 0..n {
            indices.extend_from_slice(&[0, 1 + i, 1 + (i + 1) % n]);
        }

        let bounds = Aabb::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, 0.5, 0.0));
        Self { outline, vertices, indices, bounds }
    }

    /// Shared handle to the standard shape.
    pub fn shared() -> Arc<LeafShape> {
        Arc::new(Self::standard())
    }

    /// Triangles in local space.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let at = |i: u32| Vec3::from_array(self.vertices[i as usize].position);
        self.indices
            .chunks_exact(3)
            .map(move |tri| [at(tri[0]), at(tri[1]), at(tri[2])])
    }
}

fn quadratic(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}
