//! Asynchronous photo texture loading
//!
//! Decoding runs on the tokio runtime; finished textures come back over a
//! channel and are attached by the owner of the tree state, which is the only
//! writer of a leaf's texture.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::growth::photo_leaf::LeafId;

/// Decoded RGBA8 image bound to a photo leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafTexture {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels
    pub rgba: Arc<[u8]>,
}

impl LeafTexture {
    /// Decode an encoded image into a texture.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: Arc::from(rgba.into_raw()),
        })
    }

    /// Width over height, `None` for an empty image.
    pub fn aspect(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

/// Outcome of one texture load.
#[derive(Debug)]
pub struct TextureCompletion {
    pub leaf: LeafId,
    pub result: Result<LeafTexture>,
}

/// Schedules texture decodes and collects their completions.
pub struct TextureLoader {
    handle: Handle,
    completion_tx: mpsc::UnboundedSender<TextureCompletion>,
    completion_rx: mpsc::UnboundedReceiver<TextureCompletion>,
    in_flight: usize,
}

impl TextureLoader {
    /// Create a loader that spawns onto `handle`.
    pub fn new(handle: Handle) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            handle,
            completion_tx,
            completion_rx,
            in_flight: 0,
        }
    }

    /// Start decoding `image_data` for `leaf`. The leaf must already be in
    /// the tree state.
    pub fn schedule(&mut self, leaf: LeafId, image_data: Arc<[u8]>) {
        self.in_flight += 1;
        let tx = self.completion_tx.clone();
        self.handle.spawn(async move {
            let result = tokio::task::spawn_blocking(move || LeafTexture::decode(&image_data))
                .await
                .unwrap_or_else(|e| Err(Error::Runtime(format!("texture task failed: {e}"))));
            // Receiver lives as long as the loader
            let _ = tx.send(TextureCompletion { leaf, result });
        });
    }

    /// Next finished load, without waiting.
    pub fn try_next(&mut self) -> Option<TextureCompletion> {
        let completion = self.completion_rx.try_recv().ok()?;
        self.in_flight -= 1;
        Some(completion)
    }

    /// All loads finished so far, without waiting.
    pub fn drain(&mut self) -> Vec<TextureCompletion> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Block until every scheduled load has finished. Must not be called from
    /// inside the runtime.
    pub fn wait_all(&mut self) -> Vec<TextureCompletion> {
        let mut done = Vec::with_capacity(self.in_flight);
        while self.in_flight > 0 {
            match self.completion_rx.blocking_recv() {
                Some(completion) => {
                    self.in_flight -= 1;
                    done.push(completion);
                }
                None => break,
            }
        }
        done
    }

    /// Loads scheduled but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::codec::tests::png_bytes;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_and_aspect() {
        let tex = LeafTexture::decode(&png_bytes(40, 20)).unwrap();
        assert_eq!((tex.width, tex.height), (40, 20));
        assert_eq!(tex.rgba.len(), 40 * 20 * 4);
        assert_eq!(tex.aspect(), Some(2.0));
    }

    #[test]
    fn test_loads_complete_through_channel() {
        let rt = runtime();
        let mut loader = TextureLoader::new(rt.handle().clone());
        loader.schedule(LeafId(0), Arc::from(png_bytes(8, 4)));
        loader.schedule(LeafId(1), Arc::from(&b"broken"[..]));
        assert_eq!(loader.in_flight(), 2);

        let mut done = loader.wait_all();
        done.sort_by_key(|c| c.leaf);
        assert_eq!(loader.in_flight(), 0);
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].result.as_ref().unwrap().width, 8);
        assert!(done[1].result.is_err());
        assert!(loader.try_next().is_none());
    }
}
