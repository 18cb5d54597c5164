// SPDX-License-Identifier: MPL-2.0

//! Error types for the camera application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Pipeline-related errors
    Pipeline(PipelineError),
    /// Photo capture errors
    Capture(CaptureError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Pipeline-specific errors
#[derive(Debug, Clone)]
pub enum PipelineError {
    /// GStreamer initialization failed
    InitializationFailed(String),
    /// A required element factory is not installed
    MissingElement(String),
    /// Linking two elements failed
    LinkFailed(String),
    /// A state transition was refused by the pipeline
    StateChange(String),
    /// Caps renegotiation failed
    Negotiation(String),
}

/// Photo capture errors
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Capture requested while the pipeline is not playing
    NotPlaying,
    /// Capture requested while a previous capture is still being written
    AlreadyInFlight,
    /// File-written notification arrived with no capture in flight
    NotInFlight,
    /// Copying the capture to the gallery failed
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Pipeline(e) => write!(f, "Pipeline error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InitializationFailed(msg) => {
                write!(f, "Initialization failed: {}", msg)
            }
            PipelineError::MissingElement(name) => write!(f, "Missing element: {}", name),
            PipelineError::LinkFailed(msg) => write!(f, "Link failed: {}", msg),
            PipelineError::StateChange(msg) => write!(f, "State change failed: {}", msg),
            PipelineError::Negotiation(msg) => write!(f, "Caps negotiation failed: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NotPlaying => write!(f, "Pipeline is not playing"),
            CaptureError::AlreadyInFlight => write!(f, "A capture is already in flight"),
            CaptureError::NotInFlight => write!(f, "No capture in flight"),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PipelineError {}
impl std::error::Error for CaptureError {}

// Conversions from sub-errors to AppError
impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

// Conversions for I/O errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}
