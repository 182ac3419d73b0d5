//! Scene description handed to the external renderer

pub mod node;
pub mod view;

pub use node::{tree_matrix, LocalTransform};
pub use view::{Light, LoggingRenderer, Renderer, SceneLighting, SceneView};
