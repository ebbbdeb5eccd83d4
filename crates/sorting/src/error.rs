//! Errors raised by session setup and by explicit user actions.
//!
//! A rejected drop is not an error: see [`crate::controller::DropRejection`].

#[derive(Debug, thiserror::Error)]
pub enum SortError {
    #[error("image list is empty")]
    NoImages,
    #[error("failed to load image list: {0}")]
    ImageList(String),
    #[error("image id {0:?} appears more than once")]
    DuplicateImage(String),
    #[error("cannot add more than {max} groups")]
    GroupLimit { max: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
