//! Image entity: a draggable tile and its drag lifecycle.
//!
//! `position` is what is displayed. `perfect_position` follows the pointer
//! exactly, even past a boundary, so dragging out and back in does not snap.
//! Until an image has left staging the two are always equal.

use crate::controller::DropRejection;
use crate::geometry::{Bounds, Point};
use crate::group::Group;
use crate::object::{GroupId, ImageId};

/// Where an image lives. There is no transition back to `Staging`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Placement {
    #[default]
    Staging,
    Placed(GroupId),
}

impl Placement {
    #[must_use]
    pub fn group(self) -> Option<GroupId> {
        match self {
            Self::Staging => None,
            Self::Placed(g) => Some(g),
        }
    }
}

/// A successful drop, as seen by the image.
#[derive(Clone, PartialEq, Debug)]
pub struct Commit {
    pub group: GroupId,
    /// Group before this drop; `None` when the image came from staging.
    pub previous: Option<GroupId>,
    pub from: Point,
    pub to: Point,
}

impl Commit {
    #[must_use]
    pub fn is_first_placement(&self) -> bool {
        self.previous.is_none()
    }

    #[must_use]
    pub fn changed_group(&self) -> bool {
        self.previous != Some(self.group)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum DragEnd {
    Committed(Commit),
    Rejected(DropRejection),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Image {
    id: ImageId,
    url: String,
    position: Point,
    perfect_position: Point,
    last_solid_position: Point,
    placement: Placement,
    shown_at: Option<f64>,
    z_index: u32,
    dragging: bool,
}

impl Image {
    /// Off-screen placeholder coordinates for images not yet staged.
    pub const HIDDEN: Point = Point::new(-1.0, -1.0);

    #[must_use]
    pub fn new(id: ImageId, url: String, z_index: u32) -> Self {
        Self {
            id,
            url,
            position: Self::HIDDEN,
            perfect_position: Self::HIDDEN,
            last_solid_position: Self::HIDDEN,
            placement: Placement::Staging,
            shown_at: None,
            z_index,
            dragging: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ImageId {
        &self.id
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub fn perfect_position(&self) -> Point {
        self.perfect_position
    }

    #[must_use]
    pub fn last_solid_position(&self) -> Point {
        self.last_solid_position
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn group(&self) -> Option<GroupId> {
        self.placement.group()
    }

    /// Has this image left staging? (Placed at least once.)
    #[must_use]
    pub fn is_unstaged(&self) -> bool {
        matches!(self.placement, Placement::Placed(_))
    }

    #[must_use]
    pub fn is_on_screen(&self) -> bool {
        self.shown_at.is_some()
    }

    #[must_use]
    pub fn shown_at(&self) -> Option<f64> {
        self.shown_at
    }

    #[must_use]
    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Put the image in the staging slot and start its dwell clock.
    pub fn stage(&mut self, at: Point, now_ms: f64) {
        self.perfect_position = at;
        self.position = at;
        self.last_solid_position = at;
        self.shown_at = Some(now_ms);
    }

    /// Whole milliseconds since the image was staged.
    #[must_use]
    pub fn dwell_ms(&self, now_ms: f64) -> u64 {
        let shown = self.shown_at.unwrap_or(now_ms);
        (now_ms - shown).max(0.0).round() as u64
    }

    pub fn start_drag(&mut self, z_index: u32) {
        self.last_solid_position = self.position;
        self.z_index = z_index;
        self.dragging = true;
    }

    /// Follow the pointer. Once unstaged the displayed position is kept on the
    /// game area; it is not held inside the group mid-drag.
    pub fn apply_delta(&mut self, delta: Point, game_bounds: Bounds) {
        self.perfect_position = self.perfect_position + delta;
        self.position = if self.is_unstaged() {
            game_bounds.clamp(self.perfect_position)
        } else {
            self.perfect_position
        };
    }

    pub fn move_to(&mut self, to: Point, bounds: Bounds) {
        self.perfect_position = to;
        self.position = if self.is_unstaged() {
            bounds.clamp(to)
        } else {
            to
        };
    }

    /// Finish the drag against an already validated target.
    pub fn end_drag(&mut self, target: Result<&Group, DropRejection>, footprint: f64) -> DragEnd {
        let group = match target {
            Ok(group) => group,
            Err(reason) => {
                self.cancel_drag();
                return DragEnd::Rejected(reason);
            }
        };
        let previous = self.placement.group();
        self.placement = Placement::Placed(group.id());

        let bounds = group.image_bounds(footprint);
        self.perfect_position = bounds.clamp(self.perfect_position);
        self.move_to(self.perfect_position, bounds);

        let commit = Commit {
            group: group.id(),
            previous,
            from: self.last_solid_position,
            to: self.position,
        };
        self.last_solid_position = self.position;
        self.dragging = false;
        DragEnd::Committed(commit)
    }

    /// Drop back to the pre-drag snapshot. Cannot fail.
    pub fn cancel_drag(&mut self) {
        self.position = self.last_solid_position;
        self.perfect_position = self.last_solid_position;
        self.dragging = false;
    }
}
