//! Photo ingestion
//!
//! Incoming files are filtered by mime type and compressed off the owning
//! thread. A single worker handles submissions in order, and does not start
//! on the next file until the previous photo has been committed to the tree,
//! so at most one compressed photo is ever waiting.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use image::ImageFormat;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};

use crate::core::config::IngestConfig;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::gallery::codec::{compress_image, ENCODED_MIME};
use crate::gallery::photo::{Photo, PhotoId};

/// Mime type assumed when a file's extension says nothing.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// A file handed to the gallery for upload.
#[derive(Clone, Debug)]
pub struct IncomingFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its mime type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, mime_for_path(path), bytes))
    }

    /// Only `image/*` files are ingested.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Mime type for a path, from its extension.
pub fn mime_for_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME.to_string())
}

/// A compressed photo ready to grow the tree.
#[derive(Clone, Debug)]
pub struct PreparedPhoto {
    pub photo: Photo,
    pub width: u32,
    pub height: u32,
}

/// Compress `file` into a photo. The id is a placeholder until the tree
/// accepts it.
pub fn prepare(file: &IncomingFile, config: &IngestConfig) -> Result<PreparedPhoto> {
    let encoded = compress_image(&file.bytes, config.max_dimension, config.jpeg_quality)?;
    Ok(PreparedPhoto {
        photo: Photo {
            id: PhotoId(0),
            image_data: Arc::from(encoded.bytes),
            encoded_mime: ENCODED_MIME,
            name: file.name.clone(),
            byte_size: file.bytes.len() as u64,
            mime_type: file.mime_type.clone(),
            uploaded_at: Local::now(),
        },
        width: encoded.width,
        height: encoded.height,
    })
}

/// Held while a prepared photo is waiting to be committed. The worker takes
/// no further file until it is released or dropped.
#[derive(Debug)]
pub struct CommitPermit(OwnedSemaphorePermit);

impl CommitPermit {
    /// The photo has been committed; let the worker continue.
    pub fn release(self) {
        drop(self.0);
    }
}

/// Outcome of one submitted file.
#[derive(Debug)]
pub enum IngestEvent {
    Prepared(PreparedPhoto, CommitPermit),
    /// Not an image; carries the file name
    Skipped(String),
    /// Compression failed; carries the file name and the error
    Failed(String, Error),
}

/// Summary of a batch upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestReport {
    /// Photos added to the tree, in upload order
    pub accepted: Vec<PhotoId>,
    /// Names of files that were not images
    pub skipped: Vec<String>,
    /// Names of files that could not be ingested, with the reason
    pub failed: Vec<(String, String)>,
}

impl IngestReport {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Background compression of submitted files, one at a time in submission
/// order.
pub struct IngestPipeline {
    request_tx: mpsc::UnboundedSender<IncomingFile>,
    event_rx: mpsc::UnboundedReceiver<IngestEvent>,
    pending: usize,
}

impl IngestPipeline {
    /// Start the worker on `handle`.
    pub fn new(handle: &Handle, config: IngestConfig) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        handle.spawn(Self::worker_loop(config, request_rx, event_tx));
        Self {
            request_tx,
            event_rx,
            pending: 0,
        }
    }

    async fn worker_loop(
        config: IngestConfig,
        mut request_rx: mpsc::UnboundedReceiver<IncomingFile>,
        event_tx: mpsc::UnboundedSender<IngestEvent>,
    ) {
        let gate = Arc::new(Semaphore::new(1));
        while let Some(file) = request_rx.recv().await {
            // Wait until the previous photo has been committed
            let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
                break;
            };
            let event = Self::process(file, config.clone(), CommitPermit(permit)).await;
            if event_tx.send(event).is_err() {
                break;
            }
        }
    }

    async fn process(file: IncomingFile, config: IngestConfig, permit: CommitPermit) -> IngestEvent {
        if !file.is_image() {
            return IngestEvent::Skipped(file.name);
        }
        let name = file.name.clone();
        match tokio::task::spawn_blocking(move || prepare(&file, &config)).await {
            Ok(Ok(prepared)) => IngestEvent::Prepared(prepared, permit),
            Ok(Err(e)) => IngestEvent::Failed(name, e),
            Err(e) => IngestEvent::Failed(name, Error::Runtime(format!("ingest task failed: {e}"))),
        }
    }

    /// Queue a file for ingestion.
    pub fn submit(&mut self, file: IncomingFile) -> Result<()> {
        self.request_tx
            .send(file)
            .map_err(|_| Error::Runtime("ingest worker stopped".into()))?;
        self.pending += 1;
        Ok(())
    }

    /// Next finished file, without waiting. A prepared photo's permit must be
    /// released once it is committed.
    pub fn try_next(&mut self) -> Option<IngestEvent> {
        let event = self.event_rx.try_recv().ok()?;
        self.pending -= 1;
        Some(event)
    }

    /// Next finished file, blocking until one is ready. Must not be called
    /// from inside the runtime.
    pub fn blocking_next(&mut self) -> Option<IngestEvent> {
        if self.pending == 0 {
            return None;
        }
        let event = self.event_rx.blocking_recv()?;
        self.pending -= 1;
        Some(event)
    }

    /// Files submitted but not yet collected.
    pub fn pending(&self) -> usize {
        self.pending
    }
}
