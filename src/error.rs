//! Error types for the transport driver and its configuration layer

use crate::vector::Vector;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Material index {material} has no material-cuts couple")]
    UnknownMaterial { material: usize },

    #[error("Track {track_id} could not be relocated after {pushes} pushes at {position}")]
    RelocationLimit {
        track_id: u32,
        pushes: u32,
        position: Vector<f64>,
    },

    #[error("Histograms have different binning: {left} vs {right}")]
    HistogramMismatch { left: String, right: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
