//! Interfaces to the page hosting the engine: image-list loading, move
//! submission, trial-completion requests and the rendering sink.
//!
//! All calls out of the engine are fire-and-forget.

use serde::{Deserialize, Serialize};

use crate::error::SortError;
use crate::geometry::{Point, Size};
use crate::object::ObjectRef;
use crate::recorder::MoveRecord;

/// Supplies the image identifiers for a session. Order does not matter; the
/// session shuffles it.
pub trait ImageSource {
    fn load_image_ids(&mut self) -> Result<Vec<String>, SortError>;
}

pub trait MoveSink {
    fn submit_move(&mut self, record: &MoveRecord);
}

pub trait CompletionNotifier {
    /// Ask the host to fetch and show the trial completion code.
    fn request_completion_code(&mut self);
}

pub trait RenderSink {
    fn render(&mut self, update: RenderUpdate);
}

/// Everything the drag controller talks to once a session is running.
pub trait Host: MoveSink + CompletionNotifier + RenderSink {}

impl<T: MoveSink + CompletionNotifier + RenderSink> Host for T {}

/// Presentation changes for one object.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderUpdate {
    /// `url` is the image source; groups have none.
    Show {
        target: ObjectRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Moved { target: ObjectRef, at: Point },
    Resized { target: ObjectRef, size: Size },
    Raised { target: ObjectRef, z: u32 },
    Dragging { target: ObjectRef, active: bool },
    Labelled { target: ObjectRef, text: String },
}

/// In-memory list, e.g. already fetched by the host.
#[derive(Clone, Debug, Default)]
pub struct StaticImageList(pub Vec<String>);

impl ImageSource for StaticImageList {
    fn load_image_ids(&mut self) -> Result<Vec<String>, SortError> {
        Ok(self.0.clone())
    }
}

/// JSON array of ids as served by the image-list endpoint.
#[derive(Clone, Copy, Debug)]
pub struct JsonImageList<'a>(pub &'a str);

impl ImageSource for JsonImageList<'_> {
    fn load_image_ids(&mut self) -> Result<Vec<String>, SortError> {
        serde_json::from_str(self.0).map_err(|e| SortError::ImageList(e.to_string()))
    }
}

/// Buffers every outgoing call until the host drains it.
#[derive(Debug, Default)]
pub struct Outbox {
    pub moves: Vec<MoveRecord>,
    pub render: Vec<RenderUpdate>,
    pub completion_requested: bool,
}

impl Outbox {
    pub fn take_moves(&mut self) -> Vec<MoveRecord> {
        std::mem::take(&mut self.moves)
    }

    pub fn take_render(&mut self) -> Vec<RenderUpdate> {
        std::mem::take(&mut self.render)
    }

    /// Returns the pending completion request once, then clears it.
    pub fn take_completion_request(&mut self) -> bool {
        std::mem::take(&mut self.completion_requested)
    }
}

impl MoveSink for Outbox {
    fn submit_move(&mut self, record: &MoveRecord) {
        self.moves.push(record.clone());
    }
}

impl CompletionNotifier for Outbox {
    fn request_completion_code(&mut self) {
        self.completion_requested = true;
    }
}

impl RenderSink for Outbox {
    fn render(&mut self, update: RenderUpdate) {
        self.render.push(update);
    }
}
