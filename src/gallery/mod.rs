//! The interactive gallery: tree state, ingestion, texturing, picking, and
//! the per-frame loop

pub mod photo;
pub mod codec;
pub mod texture;
pub mod tree;
pub mod ingest;
pub mod picking;
pub mod animation;
pub mod app;

pub use photo::{Photo, PhotoDisplay, PhotoId};
pub use texture::{LeafTexture, TextureCompletion, TextureLoader};
pub use tree::{Root, TreeState, TreeStats};
pub use ingest::{IncomingFile, IngestPipeline, IngestReport};
pub use picking::{pointer_to_ndc, PickHit, PickingService};
pub use animation::AnimationScheduler;
pub use app::{Gallery, LoggingPresenter, Presenter, RecordingPresenter, SurfaceInfo};
