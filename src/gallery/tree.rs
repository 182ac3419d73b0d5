//! Authoritative tree state and growth
//!
//! The tree starts with three roots and a fixed crown. Every accepted photo
//! adds one root and one photo leaf. Because each root's spiral depends on the
//! total root count, growth rebuilds every root's mesh for the new total and
//! swaps them all in at once.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::core::error::Error;
use crate::core::types::{Mat4, Result, Vec3};
use crate::gallery::photo::{Photo, PhotoId};
use crate::gallery::texture::TextureCompletion;
use crate::growth::crown::{build_crown, CrownLeaf};
use crate::growth::leaf_shape::LeafShape;
use crate::growth::path::BASE_ROOT_COUNT;
use crate::growth::photo_leaf::{LeafId, PhotoLeaf, PhotoLeafFactory};
use crate::growth::root_mesh::{RootMeshBuilder, TubeMesh};
use crate::scene::tree_matrix;

/// One spiral root. Its index never changes; its mesh is rebuilt whenever the
/// root count changes.
#[derive(Debug)]
pub struct Root {
    index: usize,
    /// Root count the current mesh was built for
    total: usize,
    mesh: TubeMesh,
    /// Sway around the trunk axis (radians)
    pub rotation_y: f32,
}

impl Root {
    fn new(index: usize, total: usize, mesh: TubeMesh) -> Self {
        Self {
            index,
            total,
            mesh,
            rotation_y: 0.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn mesh(&self) -> &TubeMesh {
        &self.mesh
    }

    pub fn tube_radius(&self) -> f32 {
        self.mesh.radius
    }

    /// Swap in a new mesh, returning the one it supersedes.
    fn replace_mesh(&mut self, mesh: TubeMesh, total: usize) -> TubeMesh {
        self.total = total;
        std::mem::replace(&mut self.mesh, mesh)
    }

    /// Root-to-world matrix given the tree group's matrix.
    pub fn world_matrix(&self, tree: &Mat4) -> Mat4 {
        *tree * Mat4::from_rotation_y(self.rotation_y)
    }
}

/// Counts describing the current tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub roots: usize,
    pub crown_leaves: usize,
    pub photo_leaves: usize,
    pub photos: usize,
    pub textured_leaves: usize,
    pub root_triangles: usize,
}

/// Roots, leaves, and photos of the tree.
pub struct TreeState {
    roots: Vec<Root>,
    crown: Vec<CrownLeaf>,
    photo_leaves: Vec<PhotoLeaf>,
    photos: Vec<Photo>,
    pub(crate) mesh_builder: RootMeshBuilder,
    leaf_factory: PhotoLeafFactory,
    rng: StdRng,
    /// Whole-tree rotation about +Y (radians)
    pub yaw: f32,
}

impl TreeState {
    /// Build the initial tree: three roots and the crown. `rng` drives only
    /// cosmetic jitter and leaf placement.
    pub fn new(mut rng: StdRng) -> Result<Self> {
        let mesh_builder = RootMeshBuilder::default();
        let roots = (0..BASE_ROOT_COUNT)
            .map(|index| Ok(Root::new(index, BASE_ROOT_COUNT, mesh_builder.build_root(index, BASE_ROOT_COUNT)?)))
            .collect::<Result<Vec<_>>>()?;
        let crown = build_crown(&mut rng);

        log::info!("Tree created with {} roots and {} crown leaves", roots.len(), crown.len());

        Ok(Self {
            roots,
            crown,
            photo_leaves: Vec::new(),
            photos: Vec::new(),
            mesh_builder,
            leaf_factory: PhotoLeafFactory::default(),
            rng,
            yaw: 0.0,
        })
    }

    /// Build the initial tree with a seeded RNG.
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Build meshes for every root index under `total`.
    fn build_meshes(&self, total: usize) -> Result<Vec<TubeMesh>> {
        let builder = &self.mesh_builder;
        (0..total)
            .into_par_iter()
            .map(|index| builder.build_root(index, total))
            .collect()
    }

    /// Grow the tree by one photo: one new root, every existing root rebuilt
    /// for the new count, and one photo leaf.
    ///
    /// The photo's id is assigned here. All meshes are built before anything is
    /// committed, so on error the tree is left exactly as it was.
    pub fn add_photo(&mut self, mut photo: Photo) -> Result<&PhotoLeaf> {
        let new_total = self.roots.len() + 1;
        let mut meshes = self.build_meshes(new_total)?;
        let new_mesh = meshes
            .pop()
            .ok_or_else(|| Error::Geometry(format!("no mesh built for {new_total} roots")))?;

        photo.id = PhotoId(self.photos.len() as u64);

        for (root, mesh) in self.roots.iter_mut().zip(meshes) {
            drop(root.replace_mesh(mesh, new_total));
        }
        self.roots.push(Root::new(new_total - 1, new_total, new_mesh));

        let leaf_id = LeafId(self.photo_leaves.len() as u64);
        let leaf = self.leaf_factory.create_leaf(leaf_id, &photo, &mut self.rng);
        log::info!(
            "Added photo '{}' ({} bytes): {} roots now",
            photo.name,
            photo.byte_size,
            self.roots.len()
        );
        self.photos.push(photo);
        self.photo_leaves.push(leaf);

        self.photo_leaves
            .last()
            .ok_or_else(|| Error::Geometry(format!("photo leaf {leaf_id:?} missing after growth")))
    }

    /// Rebuild every root for the current count. Idempotent.
    pub fn recompute_roots(&mut self) -> Result<()> {
        let total = self.roots.len();
        let meshes = self.build_meshes(total)?;
        for (root, mesh) in self.roots.iter_mut().zip(meshes) {
            drop(root.replace_mesh(mesh, total));
        }
        Ok(())
    }

    /// Attach a finished texture load. Failed loads leave the leaf untextured.
    /// Returns whether a texture was attached.
    pub fn apply_texture(&mut self, completion: TextureCompletion) -> bool {
        let TextureCompletion { leaf, result } = completion;
        let Some(target) = self.photo_leaves.iter_mut().find(|l| l.id == leaf) else {
            log::warn!("Texture finished for unknown leaf {:?}", leaf);
            return false;
        };
        match result {
            Ok(texture) => {
                log::debug!("Texture {}x{} attached to leaf {:?}", texture.width, texture.height, leaf);
                target.attach_texture(texture);
                true
            }
            Err(e) => {
                log::warn!("Texture load failed for leaf {:?}: {}", leaf, e);
                false
            }
        }
    }

    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut [Root] {
        &mut self.roots
    }

    pub fn crown_leaves(&self) -> &[CrownLeaf] {
        &self.crown
    }

    /// Photo leaves, in upload order. These are the only pickable leaves.
    pub fn photo_leaves(&self) -> &[PhotoLeaf] {
        &self.photo_leaves
    }

    pub(crate) fn photo_leaves_mut(&mut self) -> &mut [PhotoLeaf] {
        &mut self.photo_leaves
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn photo(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.get(id.0 as usize).filter(|p| p.id == id)
    }

    /// The photo a leaf displays.
    pub fn photo_for_leaf(&self, leaf: &PhotoLeaf) -> Option<&Photo> {
        self.photo(leaf.photo)
    }

    /// Outline geometry shared by every leaf.
    pub fn leaf_shape(&self) -> &Arc<LeafShape> {
        self.leaf_factory.shape()
    }

    /// World matrix of the tree group.
    pub fn tree_matrix(&self) -> Mat4 {
        tree_matrix(self.yaw)
    }

    /// World position of a photo leaf's centre.
    pub fn leaf_world_position(&self, leaf: &PhotoLeaf) -> Vec3 {
        leaf.world_matrix(&self.tree_matrix()).transform_point3(Vec3::ZERO)
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            roots: self.roots.len(),
            crown_leaves: self.crown.len(),
            photo_leaves: self.photo_leaves.len(),
            photos: self.photos.len(),
            textured_leaves: self.photo_leaves.iter().filter(|l| l.is_textured()).count(),
            root_triangles: self.roots.iter().map(|r| r.mesh.triangle_count()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::texture::LeafTexture;
    use crate::growth::crown::CROWN_LEAF_COUNT;
    use crate::growth::path::generate_root_path;
    use crate::growth::photo_leaf::tests::sample_photo;
    use crate::growth::root_mesh::tube_radius;

    #[test]
    fn test_initial_state() {
        let state = TreeState::with_seed(1).unwrap();
        let stats = state.stats();
        assert_eq!(stats.roots, 3);
        assert_eq!(stats.crown_leaves, CROWN_LEAF_COUNT);
        assert_eq!(stats.photo_leaves, 0);
        assert_eq!(stats.photos, 0);
        for (i, root) in state.roots().iter().enumerate() {
            assert_eq!(root.index(), i);
            assert_eq!(root.total(), 3);
        }
    }

    #[test]
    fn test_growth_keeps_invariants() {
        let mut state = TreeState::with_seed(2).unwrap();
        for k in 1..=5u64 {
            state.add_photo(sample_photo(99)).unwrap();
            assert_eq!(state.roots().len(), 3 + k as usize);
            assert_eq!(state.photo_leaves().len(), k as usize);
            assert_eq!(state.crown_leaves().len(), CROWN_LEAF_COUNT);
        }
        for (k, (leaf, photo)) in state.photo_leaves().iter().zip(state.photos()).enumerate() {
            assert_eq!(photo.id, PhotoId(k as u64));
            assert_eq!(leaf.photo, photo.id);
            assert_eq!(state.photo_for_leaf(leaf).unwrap().id, photo.id);
        }
    }

    #[test]
    fn test_add_photo_returns_the_new_leaf() {
        let mut state = TreeState::with_seed(4).unwrap();
        for k in 0..3u64 {
            let leaf = state.add_photo(sample_photo(k)).unwrap();
            let (id, photo, position) = (leaf.id, leaf.photo, leaf.transform.position);
            assert_eq!(id, LeafId(k));
            assert_eq!(photo, PhotoId(k));

            let last = state.photo_leaves().last().unwrap();
            assert_eq!(last.id, id);
            assert_eq!(last.transform.position, position);
        }
    }

    #[test]
    fn test_every_root_matches_current_total() {
        let mut state = TreeState::with_seed(3).unwrap();
        state.add_photo(sample_photo(0)).unwrap();
        state.add_photo(sample_photo(1)).unwrap();
        let total = state.roots().len();
        assert_eq!(total, 5);
        for root in state.roots() {
            assert_eq!(root.total(), total);
            assert_eq!(root.mesh().path, generate_root_path(root.index(), total).unwrap());
            assert_eq!(root.tube_radius(), tube_radius(total));
        }
    }

    #[test]
    fn test_thickness_non_decreasing_with_growth() {
        let mut state = TreeState::with_seed(4).unwrap();
        let mut last = state.roots()[0].tube_radius();
        for i in 0..4 {
            state.add_photo(sample_photo(i)).unwrap();
            let radii: Vec<f32> = state.roots().iter().map(Root::tube_radius).collect();
            assert!(radii.iter().all(|r| *r == radii[0]));
            assert!(radii[0] >= last);
            last = radii[0];
        }
    }

    #[test]
    fn test_failed_growth_commits_nothing() {
        let mut state = TreeState::with_seed(5).unwrap();
        state.add_photo(sample_photo(0)).unwrap();
        let before = state.stats();
        let paths: Vec<_> = state.roots().iter().map(|r| r.mesh().path.clone()).collect();

        state.mesh_builder = RootMeshBuilder { radial_segments: 0, ..Default::default() };
        let err = state.add_photo(sample_photo(1)).unwrap_err();
        assert!(matches!(err, Error::Geometry(_)));

        assert_eq!(state.stats(), before);
        for (root, path) in state.roots().iter().zip(&paths) {
            assert_eq!(&root.mesh().path, path);
            assert_eq!(root.total(), 4);
        }
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut state = TreeState::with_seed(6).unwrap();
        state.add_photo(sample_photo(0)).unwrap();
        let before: Vec<_> = state.roots().iter().map(|r| r.mesh().vertices.clone()).collect();
        state.recompute_roots().unwrap();
        for (root, verts) in state.roots().iter().zip(&before) {
            assert_eq!(&root.mesh().vertices, verts);
        }
    }

    #[test]
    fn test_apply_texture() {
        let mut state = TreeState::with_seed(7).unwrap();
        let id = state.add_photo(sample_photo(0)).unwrap().id;
        let failed = TextureCompletion {
            leaf: id,
            result: Err(Error::Runtime("decode failed".into())),
        };
        assert!(!state.apply_texture(failed));
        assert!(!state.photo_leaves()[0].is_textured());

        let ok = TextureCompletion {
            leaf: id,
            result: Ok(LeafTexture { width: 2, height: 1, rgba: Arc::from(vec![0u8; 8]) }),
        };
        assert!(state.apply_texture(ok));
        let leaf = &state.photo_leaves()[0];
        assert!(leaf.is_textured());
        assert!((leaf.transform.scale.x - 2.0 * leaf.base_scale).abs() < 1e-6);
        assert_eq!(state.stats().textured_leaves, 1);

        let unknown = TextureCompletion {
            leaf: LeafId(42),
            result: Ok(LeafTexture { width: 1, height: 1, rgba: Arc::from(vec![0u8; 4]) }),
        };
        assert!(!state.apply_texture(unknown));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = TreeState::with_seed(8).unwrap();
        let mut b = TreeState::with_seed(8).unwrap();
        a.add_photo(sample_photo(0)).unwrap();
        b.add_photo(sample_photo(0)).unwrap();
        assert_eq!(a.crown_leaves(), b.crown_leaves());
        assert_eq!(a.photo_leaves()[0].transform, b.photo_leaves()[0].transform);
    }
}
