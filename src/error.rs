//! Error type shared by every designer and admin operation.
//!
//! No variant is fatal: the designer session converts failures into
//! [`Notice`](crate::Notice)s and leaves its state untouched.

use crate::overlay::OverlayId;

/// Result alias used throughout the crate.
pub type DesignerResult<T> = Result<T, DesignerError>;

#[derive(thiserror::Error, Debug)]
pub enum DesignerError {
    #[error("SVG file not found: {0}")]
    AssetNotFound(String),

    #[error("failed to read {path}: {source}")]
    AssetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid SVG document: {0}")]
    InvalidSvg(String),

    #[error("Please select a valid image file: {name}")]
    InvalidFileType { name: String, mime_type: String },

    #[error("failed to decode image {name}: {source}")]
    ImageDecode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid configuration file: {0}")]
    MalformedImport(#[source] serde_json::Error),

    #[error("unknown view: {0}")]
    UnknownView(String),

    #[error("layer {layer} is not part of view {view}")]
    UnknownLayer { view: String, layer: String },

    #[error("unknown uniform: {0}")]
    UnknownUniform(String),

    #[error("no overlay with id {0}")]
    UnknownOverlay(OverlayId),

    #[error("invalid placement for {0}")]
    InvalidPlacement(OverlayId),

    #[error("{kind} ID already exists: {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("Please fill in {0}")]
    MissingField(&'static str),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("text content is empty")]
    EmptyText,

    #[error("editor busy: {0}")]
    EditorBusy(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DesignerError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn editor_busy(msg: impl Into<String>) -> Self {
        Self::EditorBusy(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            DesignerError::AssetNotFound("uniform/shirt-front.svg".into()).to_string(),
            "SVG file not found: uniform/shirt-front.svg"
        );
        assert_eq!(
            DesignerError::Duplicate {
                kind: "View",
                id: "shirt-front".into()
            }
            .to_string(),
            "View ID already exists: shirt-front"
        );
        assert!(
            DesignerError::render("x")
                .to_string()
                .starts_with("render error:")
        );
    }
}
