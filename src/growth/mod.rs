//! Procedural growth: root spirals, tube meshes, and leaf layout
//!
//! Everything here is either a pure function of its inputs or draws only
//! cosmetic values (leaf jitter and placement) from an injected RNG.

pub mod path;
pub mod curve;
pub mod material;
pub mod root_mesh;
pub mod leaf_shape;
pub mod crown;
pub mod photo_leaf;

pub use path::{generate_root_path, spiral_radius, BASE_ROOT_COUNT, ROOT_PATH_POINTS};
pub use root_mesh::{tube_radius, MeshVertex, RootMeshBuilder, TubeMesh};
pub use leaf_shape::LeafShape;
pub use crown::{build_crown, CrownCluster, CrownLeaf, CROWN_LEAF_COUNT};
pub use photo_leaf::{LeafId, PhotoLeaf, PhotoLeafFactory};
pub use material::Material;
