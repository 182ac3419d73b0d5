//! Uploaded photos

use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Identifier of a photo, equal to its position in upload order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PhotoId(pub u64);

/// An accepted photo. Immutable once created.
#[derive(Clone, Debug)]
pub struct Photo {
    pub id: PhotoId,
    /// Re-encoded image bytes, shared with texture loads
    pub image_data: Arc<[u8]>,
    /// Mime type of `image_data`
    pub encoded_mime: &'static str,
    /// Original file name
    pub name: String,
    /// Size of the original file in bytes
    pub byte_size: u64,
    /// Mime type of the original file
    pub mime_type: String,
    pub uploaded_at: DateTime<Local>,
}

impl Photo {
    /// `data:` URI of the encoded image, for presentation surfaces.
    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.image_data);
        format!("data:{};base64,{}", self.encoded_mime, encoded)
    }

    /// Upload time formatted for people.
    pub fn uploaded_display(&self) -> String {
        self.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Fields shown when the photo's leaf is selected.
    pub fn display(&self) -> PhotoDisplay {
        PhotoDisplay {
            id: self.id,
            name: self.name.clone(),
            uploaded: self.uploaded_display(),
            data_uri: self.data_uri(),
        }
    }
}

/// What a presentation surface shows for a selected photo.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhotoDisplay {
    pub id: PhotoId,
    pub name: String,
    pub uploaded: String,
    pub data_uri: String,
}
