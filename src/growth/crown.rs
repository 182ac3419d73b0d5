//! The ambient leaf crown
//!
//! 24 leaves in five fixed clusters. Positions never change; only rotation and
//! scale get a little random jitter when the crown is built.

use std::f32::consts::TAU;

use rand::Rng;

use crate::core::types::Vec3;
use crate::growth::material::Material;
use crate::scene::LocalTransform;

/// Number of leaves in the crown.
pub const CROWN_LEAF_COUNT: usize = 24;

/// Named regions of the crown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrownCluster {
    Center,
    Left,
    Right,
    Front,
    Back,
}

/// Fixed crown layout, grouped by cluster.
const CROWN_LAYOUT: [(CrownCluster, [f32; 3]); CROWN_LEAF_COUNT] = [
    (CrownCluster::Center, [0.0, 10.0, 0.0]),
    (CrownCluster::Center, [0.5, 10.2, 0.3]),
    (CrownCluster::Center, [-0.5, 10.2, -0.3]),
    (CrownCluster::Center, [0.3, 9.8, 0.5]),
    (CrownCluster::Left, [-2.0, 8.5, 1.0]),
    (CrownCluster::Left, [-2.2, 8.8, 0.8]),
    (CrownCluster::Left, [-1.8, 8.3, 1.2]),
    (CrownCluster::Left, [-2.5, 8.6, 0.5]),
    (CrownCluster::Left, [-1.5, 8.7, 1.5]),
    (CrownCluster::Right, [2.0, 8.5, -1.0]),
    (CrownCluster::Right, [2.2, 8.8, -0.8]),
    (CrownCluster::Right, [1.8, 8.3, -1.2]),
    (CrownCluster::Right, [2.5, 8.6, -0.5]),
    (CrownCluster::Right, [1.5, 8.7, -1.5]),
    (CrownCluster::Front, [1.0, 9.2, 2.2]),
    (CrownCluster::Front, [1.2, 9.5, 2.0]),
    (CrownCluster::Front, [0.8, 9.0, 2.4]),
    (CrownCluster::Front, [1.5, 9.3, 1.8]),
    (CrownCluster::Front, [0.5, 9.4, 2.6]),
    (CrownCluster::Back, [-1.0, 9.2, -2.2]),
    (CrownCluster::Back, [-1.2, 9.5, -2.0]),
    (CrownCluster::Back, [-0.8, 9.0, -2.4]),
    (CrownCluster::Back, [-1.5, 9.3, -1.8]),
    (CrownCluster::Back, [-0.5, 9.4, -2.6]),
];

/// Maximum tilt on the X and Z axes (radians).
pub const CROWN_TILT: f32 = 0.25;
/// Uniform scale range.
pub const CROWN_SCALE: std::ops::Range<f32> = 0.8..1.2;

/// An ambient, non-interactive crown leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct CrownLeaf {
    pub cluster: CrownCluster,
    pub transform: LocalTransform,
}

impl CrownLeaf {
    pub fn material(&self) -> Material {
        Material::CROWN_LEAF
    }
}

/// Build the crown. Only rotation and scale are drawn from `rng`.
pub fn build_crown(rng: &mut impl Rng) -> Vec<CrownLeaf> {
    CROWN_LAYOUT
        .iter()
        .map(|&(cluster, [x, y, z])| {
            let rotation = Vec3::new(
                rng.gen_range(-CROWN_TILT..CROWN_TILT),
                rng.gen_range(0.0..TAU),
                rng.gen_range(-CROWN_TILT..CROWN_TILT),
            );
            let scale = rng.gen_range(CROWN_SCALE);
            CrownLeaf {
                cluster,
                transform: LocalTransform {
                    position: Vec3::new(x, y, z),
                    rotation,
                    scale: Vec3::splat(scale),
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_crown_count_and_clusters() {
        let crown = build_crown(&mut StdRng::seed_from_u64(1));
        assert_eq!(crown.len(), CROWN_LEAF_COUNT);
        let count = |c| crown.iter().filter(|l| l.cluster == c).count();
        assert_eq!(count(CrownCluster::Center), 4);
        for c in [CrownCluster::Left, CrownCluster::Right, CrownCluster::Front, CrownCluster::Back] {
            assert_eq!(count(c), 5);
        }
    }

    #[test]
    fn test_jitter_bounds() {
        for seed in 0..20 {
            for leaf in build_crown(&mut StdRng::seed_from_u64(seed)) {
                let r = leaf.transform.rotation;
                assert!(r.x.abs() <= CROWN_TILT && r.z.abs() <= CROWN_TILT);
                assert!((0.0..TAU).contains(&r.y));
                let s = leaf.transform.scale;
                assert!(s.x >= 0.8 && s.x < 1.2);
                assert_eq!(s, Vec3::splat(s.x));
            }
        }
    }

    #[test]
    fn test_positions_independent_of_seed() {
        let a = build_crown(&mut StdRng::seed_from_u64(1));
        let b = build_crown(&mut StdRng::seed_from_u64(2));
        for (la, lb) in a.iter().zip(&b) {
            assert_eq!(la.transform.position, lb.transform.position);
        }
    }

    #[test]
    fn test_same_seed_same_crown() {
        let a = build_crown(&mut StdRng::seed_from_u64(9));
        let b = build_crown(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
