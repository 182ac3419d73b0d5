//! Spiral root paths
//!
//! Each root climbs from the ground to the crown along a spiral whose phase is
//! set by its index and whose width grows with the total number of roots. Since
//! every root's shape depends on the total, adding a root reshapes all of them.

use std::f32::consts::{PI, TAU};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};

/// Number of segments along a root path (points = segments + 1).
pub const ROOT_SEGMENTS: usize = 20;
/// Number of control points in a root path.
pub const ROOT_PATH_POINTS: usize = ROOT_SEGMENTS + 1;
/// Height reached by the top of every root.
pub const ROOT_HEIGHT: f32 = 8.0;
/// Roots the tree starts with before any photo is added.
pub const BASE_ROOT_COUNT: usize = 3;

const BASE_RADIUS: f32 = 0.3;

/// Signed growth relative to the base tree (`total - 3`).
fn growth(total: usize) -> f32 {
    total as f32 - BASE_ROOT_COUNT as f32
}

/// Spiral amplitude shared by every root when `total` roots exist.
pub fn spiral_radius(total: usize) -> f32 {
    0.8 + 0.2 * growth(total)
}

/// Control points of root `index` out of `total` roots.
///
/// Deterministic: the same `(index, total)` always yields bit-identical points.
/// Fails when `total` is zero or `index` is not below `total`.
pub fn generate_root_path(index: usize, total: usize) -> Result<Vec<Vec3>> {
    if total == 0 {
        return Err(Error::Geometry("root total must be at least 1".into()));
    }
    if index >= total {
        return Err(Error::Geometry(format!(
            "root index {index} out of range for {total} roots"
        )));
    }

    let start_angle = TAU * index as f32 / total as f32;
    let spiral = spiral_radius(total);
    let flare = 0.3 * growth(total);

    let points = (0..=ROOT_SEGMENTS)
        .map(|i| {
            let t = i as f32 / ROOT_SEGMENTS as f32;
            let y = t * ROOT_HEIGHT;
            let angle = start_angle + 3.0 * PI * t + 0.3 * (4.0 * PI * t).sin();
            let radius = BASE_RADIUS + spiral * (TAU * t).sin() + t * flare;
            Vec3::new(radius * angle.cos(), y, radius * angle.sin())
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_shape_for_many_totals() {
        for total in 3..20 {
            for index in 0..total {
                let path = generate_root_path(index, total).unwrap();
                assert_eq!(path.len(), ROOT_PATH_POINTS);
                assert_eq!(path[0].y, 0.0);
                assert_eq!(path[ROOT_PATH_POINTS - 1].y, ROOT_HEIGHT);
            }
        }
    }

    #[test]
    fn test_path_is_deterministic() {
        let a = generate_root_path(2, 7).unwrap();
        let b = generate_root_path(2, 7).unwrap();
        let bits = |p: &[Vec3]| p.iter().flat_map(|v| v.to_array().map(f32::to_bits)).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_start_angle_spreads_roots() {
        // At t = 0 the radius is the base radius, so the first point sits on
        // a circle of radius 0.3 at the root's start angle.
        let total = 4;
        for index in 0..total {
            let p = generate_root_path(index, total).unwrap()[0];
            let expected = TAU * index as f32 / total as f32;
            assert!((p.x - BASE_RADIUS * expected.cos()).abs() < 1e-5);
            assert!((p.z - BASE_RADIUS * expected.sin()).abs() < 1e-5);
        }
    }

    #[test]
    fn test_growth_reshapes_existing_roots() {
        let before = generate_root_path(0, 3).unwrap();
        let after = generate_root_path(0, 4).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_spiral_radius_non_decreasing() {
        for total in 1..50 {
            assert!(spiral_radius(total + 1) >= spiral_radius(total));
        }
        assert!((spiral_radius(3) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(generate_root_path(0, 0), Err(Error::Geometry(_))));
        assert!(matches!(generate_root_path(3, 3), Err(Error::Geometry(_))));
        assert!(generate_root_path(0, 1).is_ok());
    }
}
