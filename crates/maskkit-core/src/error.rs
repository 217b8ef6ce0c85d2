//! Error handling for MaskKit
//!
//! Provides error types for every failure family of the annotation core:
//! - Oracle errors (segmentation requests)
//! - Geometry errors (lasso boolean edits)
//! - Label errors (label persistence)
//! - Session errors (setup, missing images or objects)
//!
//! Rejected gestures and stale prediction responses are not errors; they are
//! reported through return values by the editor.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Segmentation oracle error type
///
/// Represents failures of a prediction request. Object state is never
/// mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Transport-level failure (connection refused, timeout, ...)
    #[error("Segmentation request failed: {reason}")]
    RequestFailed {
        /// The reason the request failed.
        reason: String,
    },

    /// The oracle answered with a non-success status
    #[error("Segmentation request rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the oracle.
        status: u16,
        /// Response body, usually a JSON error detail.
        body: String,
    },

    /// The response body could not be decoded
    #[error("Invalid segmentation response: {reason}")]
    InvalidResponse {
        /// The decoding failure.
        reason: String,
    },

    /// The oracle returned a polygon that cannot form an object
    #[error("Oracle returned an invalid polygon with {points} points")]
    InvalidPolygon {
        /// Number of points in the returned ring.
        points: usize,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClientBuild(String),

    /// Generic oracle error
    #[error("Oracle error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Geometry error type
///
/// Raised by the polygon boolean editor. The edited polygon is left at its
/// pre-edit value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A ring has too few vertices to enclose an area
    #[error("Ring has {count} points, at least {required} are required")]
    TooFewPoints {
        /// Number of vertices supplied.
        count: usize,
        /// Minimum number of vertices.
        required: usize,
    },

    /// A coordinate is NaN or infinite
    #[error("Ring contains a non-finite coordinate")]
    NonFiniteCoordinate,

    /// The boolean operation produced no ring
    #[error("Boolean {operation} produced an empty result")]
    EmptyResult {
        /// The operation that was attempted.
        operation: String,
    },

    /// The image extents are not usable for normalization
    #[error("Invalid image size {width}x{height}")]
    InvalidImageSize {
        /// Image width in pixels.
        width: f64,
        /// Image height in pixels.
        height: f64,
    },
}

/// Label persistence error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelError {
    /// Saving labels failed
    #[error("Failed to save labels for {image_id}: {reason}")]
    SaveFailed {
        /// Image whose labels were being saved.
        image_id: String,
        /// The reason the save failed.
        reason: String,
    },

    /// Loading labels failed
    #[error("Failed to load labels for {image_id}: {reason}")]
    LoadFailed {
        /// Image whose labels were being loaded.
        image_id: String,
        /// The reason the load failed.
        reason: String,
    },

    /// Deleting labels failed
    #[error("Failed to delete labels for {image_id}: {reason}")]
    DeleteFailed {
        /// Image whose labels were being deleted.
        image_id: String,
        /// The reason the delete failed.
        reason: String,
    },

    /// The remote label service answered with a non-success status
    #[error("Label service rejected request with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Session error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// No session has been set up yet
    #[error("No session is active")]
    NoSession,

    /// No image is currently active
    #[error("No image is active")]
    NoActiveImage,

    /// Image id is not part of the session
    #[error("Image not found: {image_id}")]
    ImageNotFound {
        /// The unknown image id.
        image_id: String,
    },

    /// Image exists but another image is active
    #[error("Image {image_id} is not the active image")]
    ImageNotActive {
        /// The inactive image id.
        image_id: String,
    },

    /// Object id is not part of the current image
    #[error("Annotation object not found: {object_id}")]
    ObjectNotFound {
        /// The unknown object id.
        object_id: String,
    },

    /// Class index is outside the session class list
    #[error("Unknown class index {class_id}")]
    UnknownClass {
        /// The out-of-range index.
        class_id: usize,
    },

    /// Session setup supplied no classes
    #[error("At least one class must be provided")]
    NoClasses,

    /// Session setup found no images
    #[error("No supported images found in {dataset_path}")]
    NoImages {
        /// Dataset root that was scanned.
        dataset_path: String,
    },

    /// Session setup was rejected by the provider
    #[error("Session setup failed: {reason}")]
    SetupFailed {
        /// The reason setup failed.
        reason: String,
    },
}

/// Main error type for MaskKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Oracle error
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Label persistence error
    #[error(transparent)]
    Label(#[from] LabelError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is an oracle error
    pub fn is_oracle_error(&self) -> bool {
        matches!(self, Error::Oracle(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is a persistence error
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Label(_) | Error::Io(_))
    }

    /// Check if this is a session error
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::Session(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
