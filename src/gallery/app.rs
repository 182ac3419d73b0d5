//! The photo tree gallery
//!
//! [`Gallery`] owns everything: tree state, camera and controls, the frame
//! scheduler, the texture loader, the ingestion worker, and the tokio runtime
//! they run on. All mutation goes through `&mut Gallery` on one thread.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::{Handle, Runtime};

use crate::core::camera::Camera;
use crate::core::config::GalleryConfig;
use crate::core::controls::Controls;
use crate::core::error::Error;
use crate::core::types::{Result, Vec2};
use crate::gallery::animation::AnimationScheduler;
use crate::gallery::ingest::{IncomingFile, IngestEvent, IngestPipeline, IngestReport};
use crate::gallery::photo::PhotoDisplay;
use crate::gallery::picking::{pointer_to_ndc, PickingService};
use crate::gallery::texture::TextureLoader;
use crate::gallery::tree::{TreeState, TreeStats};
use crate::scene::{Renderer, SceneLighting};

/// Size of the render surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
}

impl SurfaceInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Where selections and growth are shown to the user.
pub trait Presenter {
    /// A photo leaf was clicked.
    fn show_photo(&mut self, photo: PhotoDisplay);

    /// The tree grew; `root_count` is the new number of roots.
    fn growth(&mut self, _root_count: usize) {}
}

/// Presenter that only logs.
#[derive(Debug, Default)]
pub struct LoggingPresenter;

impl Presenter for LoggingPresenter {
    fn show_photo(&mut self, photo: PhotoDisplay) {
        log::info!("Selected '{}' (uploaded {})", photo.name, photo.uploaded);
    }

    fn growth(&mut self, root_count: usize) {
        log::info!("Tree has {} roots", root_count);
    }
}

/// Presenter that keeps everything it was shown.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub shown: Vec<PhotoDisplay>,
    pub growth: Vec<usize>,
}

impl Presenter for RecordingPresenter {
    fn show_photo(&mut self, photo: PhotoDisplay) {
        self.shown.push(photo);
    }

    fn growth(&mut self, root_count: usize) {
        self.growth.push(root_count);
    }
}

/// Interactive photo tree.
pub struct Gallery<P: Presenter = LoggingPresenter> {
    config: GalleryConfig,
    tree: TreeState,
    camera: Camera,
    controls: Controls,
    scheduler: AnimationScheduler,
    textures: TextureLoader,
    ingest: IngestPipeline,
    picking: PickingService,
    lighting: SceneLighting,
    presenter: P,
    surface: SurfaceInfo,
    frames_rendered: u64,
    // Must stay the last field: dropped after the loaders
    runtime: Runtime,
}

impl<P: Presenter> Gallery<P> {
    /// Set up the gallery on `surface`.
    ///
    /// `surface` is `None` when no render surface could be created, which is
    /// fatal. `advanced_controls` selects orbit controls; without them the
    /// camera falls back to basic drag and zoom.
    pub fn new(
        config: GalleryConfig,
        surface: Option<SurfaceInfo>,
        advanced_controls: bool,
        presenter: P,
    ) -> Result<Self> {
        let surface = surface.ok_or_else(|| {
            Error::Initialization(
                "no render surface available; check that your device supports hardware-accelerated 3D graphics"
                    .into(),
            )
        })?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("phototree-worker")
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime(format!("failed to start runtime: {e}")))?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let tree = TreeState::new(rng)?;

        let mut camera = Camera::from_config(&config.camera, 1.0);
        camera.set_aspect(surface.width as f32, surface.height as f32);
        let controls = Controls::select(advanced_controls, &config.camera, &config.orbit);

        let textures = TextureLoader::new(runtime.handle().clone());
        let ingest = IngestPipeline::new(runtime.handle(), config.ingest.clone());
        let scheduler = AnimationScheduler::new(config.animation.clone());

        log::info!(
            "Gallery ready on {}x{} surface with {} controls",
            surface.width,
            surface.height,
            if controls.is_orbit() { "orbit" } else { "basic" }
        );

        Ok(Self {
            config,
            tree,
            camera,
            controls,
            scheduler,
            textures,
            ingest,
            picking: PickingService::new(),
            lighting: SceneLighting::default(),
            presenter,
            surface,
            frames_rendered: 0,
            runtime,
        })
    }

    /// Ingest a batch of files and wait for it to finish. Files are handled in
    /// order, each one fully grown into the tree before the next.
    pub fn ingest_now(&mut self, files: impl IntoIterator<Item = IncomingFile>) -> IngestReport {
        let mut report = IngestReport::default();
        for file in files {
            if let Err(e) = self.ingest.submit(file) {
                log::warn!("Could not queue file: {}", e);
            }
        }
        while let Some(event) = self.ingest.blocking_next() {
            self.commit(event, &mut report);
        }
        report
    }

    /// Queue files for ingestion. They are added to the tree by later
    /// [`frame`](Self::frame) calls as they finish.
    pub fn submit(&mut self, files: impl IntoIterator<Item = IncomingFile>) -> Result<()> {
        for file in files {
            self.ingest.submit(file)?;
        }
        Ok(())
    }

    fn commit(&mut self, event: IngestEvent, report: &mut IngestReport) {
        match event {
            IngestEvent::Prepared(prepared, permit) => {
                let name = prepared.photo.name.clone();
                let grown = self.tree.add_photo(prepared.photo).map(|leaf| (leaf.id, leaf.photo));
                match grown {
                    Ok((leaf_id, photo_id)) => {
                        if let Some(photo) = self.tree.photo(photo_id) {
                            self.textures.schedule(leaf_id, Arc::clone(&photo.image_data));
                        }
                        self.presenter.growth(self.tree.roots().len());
                        report.accepted.push(photo_id);
                    }
                    Err(e) => {
                        log::warn!("Could not grow tree for '{}': {}", name, e);
                        report.failed.push((name, e.to_string()));
                    }
                }
                permit.release();
            }
            IngestEvent::Skipped(name) => {
                log::debug!("Skipping non-image file '{}'", name);
                report.skipped.push(name);
            }
            IngestEvent::Failed(name, e) => {
                log::warn!("Failed to ingest '{}': {}", name, e);
                report.failed.push((name, e.to_string()));
            }
        }
    }

    /// Apply finished work and render one frame. Returns what was ingested
    /// since the last frame.
    pub fn frame(&mut self, renderer: &mut dyn Renderer) -> IngestReport {
        for completion in self.textures.drain() {
            self.tree.apply_texture(completion);
        }

        let mut report = IngestReport::default();
        while let Some(event) = self.ingest.try_next() {
            self.commit(event, &mut report);
        }

        self.scheduler.tick(
            &mut self.tree,
            &mut self.camera,
            &mut self.controls,
            &self.lighting,
            renderer,
        );
        if self.frames_rendered == 0 {
            log::info!("First frame rendered");
        }
        self.frames_rendered += 1;
        report
    }

    /// Block until every scheduled texture has loaded and attach them.
    /// Returns how many were attached.
    pub fn wait_for_textures(&mut self) -> usize {
        let mut attached = 0;
        for completion in self.textures.wait_all() {
            if self.tree.apply_texture(completion) {
                attached += 1;
            }
        }
        attached
    }

    /// Pick at normalized device coordinates. A hit is shown on the presenter
    /// and returned.
    pub fn click(&mut self, ndc: Vec2) -> Option<PhotoDisplay> {
        let display = {
            let hit = self.picking.pick(ndc, &self.camera, &self.tree)?;
            self.tree.photo_for_leaf(hit.leaf)?.display()
        };
        self.presenter.show_photo(display.clone());
        Some(display)
    }

    /// Pick at a pointer position in surface pixels.
    pub fn click_at(&mut self, x: f32, y: f32) -> Option<PhotoDisplay> {
        let ndc = pointer_to_ndc(x, y, self.surface.width as f32, self.surface.height as f32);
        self.click(ndc)
    }

    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.controls.on_drag(&mut self.camera, dx, dy);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.controls.on_wheel(&mut self.camera, delta_y);
    }

    /// The render surface changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface = SurfaceInfo::new(width, height);
        self.camera.set_aspect(width as f32, height as f32);
    }

    /// True until the first frame has been rendered.
    pub fn is_loading(&self) -> bool {
        self.frames_rendered == 0
    }

    pub fn tree(&self) -> &TreeState {
        &self.tree
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn lighting(&self) -> &SceneLighting {
        &self.lighting
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn surface(&self) -> SurfaceInfo {
        self.surface
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Handle of the runtime background work runs on.
    pub fn runtime(&self) -> &Handle {
        self.runtime.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::codec::tests::png_bytes;
    use crate::gallery::photo::PhotoId;
    use crate::scene::LoggingRenderer;

    fn gallery() -> Gallery<RecordingPresenter> {
        Gallery::new(
            GalleryConfig::default().with_seed(42),
            Some(SurfaceInfo::new(800, 600)),
            true,
            RecordingPresenter::default(),
        )
        .unwrap()
    }

    fn png(name: &str, w: u32, h: u32) -> IncomingFile {
        IncomingFile::new(name, "image/png", png_bytes(w, h))
    }

    #[test]
    fn test_missing_surface_is_fatal() {
        let result = Gallery::new(GalleryConfig::default(), None, true, LoggingPresenter);
        assert!(matches!(result, Err(Error::Initialization(_))));
    }

    #[test]
    fn test_basic_controls_fallback() {
        let gallery = Gallery::new(
            GalleryConfig::default(),
            Some(SurfaceInfo::new(640, 480)),
            false,
            LoggingPresenter,
        )
        .unwrap();
        assert!(!gallery.controls().is_orbit());
        assert_eq!(gallery.stats().roots, 3);
    }

    #[test]
    fn test_batch_upload_grows_tree() {
        let mut gallery = gallery();
        let report = gallery.ingest_now(vec![
            png("a.png", 64, 32),
            IncomingFile::new("notes.txt", "text/plain", b"hello".to_vec()),
            png("b.png", 20, 40),
        ]);

        assert_eq!(report.accepted, vec![PhotoId(0), PhotoId(1)]);
        assert_eq!(report.skipped, vec!["notes.txt".to_string()]);
        assert!(report.failed.is_empty());

        let stats = gallery.stats();
        assert_eq!(stats.roots, 5);
        assert_eq!(stats.crown_leaves, 24);
        assert_eq!(stats.photo_leaves, 2);
        assert_eq!(stats.photos, 2);

        let tree = gallery.tree();
        assert_eq!(tree.photo_for_leaf(&tree.photo_leaves()[0]).unwrap().name, "a.png");
        assert_eq!(tree.photo_for_leaf(&tree.photo_leaves()[1]).unwrap().name, "b.png");
        assert_eq!(gallery.presenter().growth, vec![4, 5]);
    }

    #[test]
    fn test_failed_file_does_not_stop_batch() {
        let mut gallery = gallery();
        let report = gallery.ingest_now(vec![
            IncomingFile::new("broken.jpg", "image/jpeg", b"nope".to_vec()),
            png("ok.png", 10, 10),
        ]);
        assert_eq!(report.accepted, vec![PhotoId(0)]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken.jpg");
        assert_eq!(gallery.stats().roots, 4);
    }

    #[test]
    fn test_textures_attach_with_aspect() {
        let mut gallery = gallery();
        gallery.ingest_now(vec![png("wide.png", 80, 40)]);
        assert_eq!(gallery.wait_for_textures(), 1);

        let leaf = &gallery.tree().photo_leaves()[0];
        assert!(leaf.is_textured());
        assert!((leaf.transform.scale.x - 2.0 * leaf.base_scale).abs() < 1e-4);
        assert_eq!(gallery.stats().textured_leaves, 1);
    }

    #[test]
    fn test_submitted_files_commit_on_frame() {
        let mut gallery = gallery();
        let mut renderer = LoggingRenderer::default();
        gallery.submit(vec![png("later.png", 16, 16)]).unwrap();

        let mut accepted = Vec::new();
        for _ in 0..500 {
            accepted.extend(gallery.frame(&mut renderer).accepted);
            if !accepted.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(accepted, vec![PhotoId(0)]);
        assert_eq!(gallery.stats().roots, 4);
    }

    #[test]
    fn test_loading_until_first_frame() {
        let mut gallery = gallery();
        assert!(gallery.is_loading());
        gallery.frame(&mut LoggingRenderer::default());
        assert!(!gallery.is_loading());
    }

    #[test]
    fn test_click_shows_photo() {
        let mut gallery = gallery();
        gallery.ingest_now(vec![png("pick-me.png", 16, 16)]);
        // Face the camera so the hit is not edge-on
        gallery.tree.photo_leaves_mut()[0].transform.rotation = glam::Vec3::ZERO;
        let tree = gallery.tree();
        let leaf = &tree.photo_leaves()[0];
        let target = leaf.world_matrix(&tree.tree_matrix()).transform_point3(glam::Vec3::new(0.1, 0.05, 0.0));
        let ndc = gallery.camera().project(target);

        let shown = gallery.click(ndc).unwrap();
        assert_eq!(shown.name, "pick-me.png");
        assert!(shown.data_uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(gallery.presenter().shown, vec![shown]);
    }

    #[test]
    fn test_click_on_empty_sky() {
        let mut gallery = gallery();
        gallery.ingest_now(vec![png("a.png", 16, 16)]);
        assert!(gallery.click_at(5.0, 5.0).is_none());
        assert!(gallery.presenter().shown.is_empty());
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut gallery = gallery();
        gallery.resize(1000, 500);
        assert_eq!(gallery.surface(), SurfaceInfo::new(1000, 500));
        assert!((gallery.camera().aspect - 2.0).abs() < 1e-6);
        gallery.resize(10, 1000);
        assert!((gallery.camera().aspect - 0.1).abs() < 1e-6);
    }
}
