//! Catmull-Rom interpolation and rotation-minimising frames for tube sweeps

use crate::core::error::Error;
use crate::core::types::{Quat, Result, Vec3};

/// Smooth curve through a sequence of control points.
///
/// Uniform Catmull-Rom with the end points duplicated, so the curve starts at
/// the first control point and ends at the last.
#[derive(Clone, Debug)]
pub struct CatmullRomCurve {
    points: Vec<Vec3>,
}

/// Orthonormal frame at a point on a curve.
#[derive(Clone, Copy, Debug)]
pub struct CurveFrame {
    pub point: Vec3,
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

impl CatmullRomCurve {
    /// Create a curve; needs at least two finite points.
    pub fn new(points: Vec<Vec3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::Geometry(format!(
                "curve needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(Error::Geometry(format!("non-finite curve point {bad}")));
        }
        Ok(Self { points })
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Segment index and local parameter for a global parameter `u` in [0, 1].
    fn locate(&self, u: f32) -> (usize, usize, usize, usize, f32) {
        let u = u.clamp(0.0, 1.0);
        let last = self.points.len() - 1;
        let scaled = u * last as f32;
        let i1 = (scaled.floor() as usize).min(last - 1);
        let t = scaled - i1 as f32;
        let i0 = i1.saturating_sub(1);
        let i2 = i1 + 1;
        let i3 = (i1 + 2).min(last);
        (i0, i1, i2, i3, t)
    }

    /// Point on the curve at `u` in [0, 1].
    pub fn point_at(&self, u: f32) -> Vec3 {
        let (i0, i1, i2, i3, t) = self.locate(u);
        let (p0, p1, p2, p3) = (self.points[i0], self.points[i1], self.points[i2], self.points[i3]);
        let v0 = (p2 - p0) * 0.5;
        let v1 = (p3 - p1) * 0.5;

        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        p1 * h00 + v0 * h10 + p2 * h01 + v1 * h11
    }

    /// Unit tangent at `u` in [0, 1].
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let (i0, i1, i2, i3, t) = self.locate(u);
        let (p0, p1, p2, p3) = (self.points[i0], self.points[i1], self.points[i2], self.points[i3]);
        let v0 = (p2 - p0) * 0.5;
        let v1 = (p3 - p1) * 0.5;

        let t2 = t * t;
        let d00 = 6.0 * t2 - 6.0 * t;
        let d10 = 3.0 * t2 - 4.0 * t + 1.0;
        let d01 = -6.0 * t2 + 6.0 * t;
        let d11 = 3.0 * t2 - 2.0 * t;

        let d = p1 * d00 + v0 * d10 + p2 * d01 + v1 * d11;
        let d = d.normalize_or_zero();
        if d == Vec3::ZERO {
            (p2 - p1).normalize_or_zero()
        } else {
            d
        }
    }

    /// `segments + 1` frames evenly spaced in parameter, with normals carried
    /// along by parallel transport so the tube does not twist.
    pub fn frames(&self, segments: usize) -> Result<Vec<CurveFrame>> {
        if segments == 0 {
            return Err(Error::Geometry("curve needs at least 1 segment".into()));
        }

        let mut frames: Vec<CurveFrame> = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let point = self.point_at(u);
            let tangent = self.tangent_at(u);
            if tangent == Vec3::ZERO {
                return Err(Error::Geometry(format!("degenerate curve tangent at u={u}")));
            }

            let normal = match frames.last() {
                None => initial_normal(tangent),
                Some(prev) => {
                    let axis = prev.tangent.cross(tangent);
                    if axis.length_squared() > 1e-12 {
                        let theta = prev.tangent.dot(tangent).clamp(-1.0, 1.0).acos();
                        Quat::from_axis_angle(axis.normalize(), theta) * prev.normal
                    } else {
                        prev.normal
                    }
                }
            };
            // Re-orthogonalize against drift
            let normal = (normal - tangent * normal.dot(tangent)).normalize();
            let binormal = tangent.cross(normal);

            frames.push(CurveFrame { point, tangent, normal, binormal });
        }
        Ok(frames)
    }
}

/// Any normal perpendicular to `tangent`, built from the least aligned axis.
fn initial_normal(tangent: Vec3) -> Vec3 {
    let abs = tangent.abs();
    let axis = if abs.x <= abs.y && abs.x <= abs.z {
        Vec3::X
    } else if abs.y <= abs.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    tangent.cross(tangent.cross(axis).normalize())
}
