//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, FsError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Fs(FsError::ItemExists(name)) => {
            format!("error: {:?} already exists at the destination", name)
        }
        ApiError::Fs(FsError::CircularReference(path)) => {
            format!("error: cannot move {:?} into itself", path)
        }
        ApiError::PathNotFound(path) => format!("error: no such path {:?}", path),
        other => format!("error: {}", other),
    }
}
