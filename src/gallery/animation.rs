//! Per-frame animation
//!
//! Once per display refresh: auto-rotate the tree, sway each root and photo
//! leaf with its index as phase offset, update the camera controls, and hand
//! the frame to the renderer. Crown leaves do not move on their own.

use std::time::Instant;

use crate::core::camera::Camera;
use crate::core::config::AnimationConfig;
use crate::core::controls::Controls;
use crate::core::time::FrameTimer;
use crate::gallery::tree::TreeState;
use crate::scene::{Renderer, SceneLighting, SceneView};

/// Drives the per-frame animation.
pub struct AnimationScheduler {
    config: AnimationConfig,
    timer: FrameTimer,
}

impl AnimationScheduler {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            timer: FrameTimer::new(),
        }
    }

    /// Scheduler whose clock starts at `start`.
    pub fn starting_at(config: AnimationConfig, start: Instant) -> Self {
        Self {
            config,
            timer: FrameTimer::starting_at(start),
        }
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Advance the animated state of `tree` to `elapsed` seconds.
    pub fn advance(&self, tree: &mut TreeState, elapsed: f32) {
        tree.yaw += self.config.auto_rotate_step;

        for root in tree.roots_mut() {
            let phase = elapsed + root.index() as f32;
            root.rotation_y += self.config.root_sway * phase.sin();
        }

        for (k, leaf) in tree.photo_leaves_mut().iter_mut().enumerate() {
            let phase = elapsed + k as f32;
            leaf.transform.rotation.y += self.config.leaf_sway * phase.sin();
        }
    }

    /// Run one frame now.
    pub fn tick(
        &mut self,
        tree: &mut TreeState,
        camera: &mut Camera,
        controls: &mut Controls,
        lighting: &SceneLighting,
        renderer: &mut dyn Renderer,
    ) {
        self.tick_at(Instant::now(), tree, camera, controls, lighting, renderer);
    }

    /// Run one frame at an explicit instant.
    pub fn tick_at(
        &mut self,
        now: Instant,
        tree: &mut TreeState,
        camera: &mut Camera,
        controls: &mut Controls,
        lighting: &SceneLighting,
        renderer: &mut dyn Renderer,
    ) {
        self.timer.tick_at(now);
        self.advance(tree, self.timer.elapsed_secs());
        controls.update(camera);
        renderer.render(&SceneView::new(camera, tree, lighting));
    }
}
