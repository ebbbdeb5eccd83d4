//! Drag controller: owns the session and the host, turns pointer and resize
//! events into entity updates, and decides whether a drop commits.
//!
//! Everything runs to completion on the caller's thread. At most one drag is
//! active; a pointer-down while one is active is ignored.

use std::fmt;

use log::{debug, info, warn};

use crate::error::SortError;
use crate::geometry::{Point, Size};
use crate::host::{Host, RenderUpdate};
use crate::image::{Commit, DragEnd, Image};
use crate::object::{GroupId, ImageId, ObjectRef};
use crate::recorder::{record_move, MoveRecord};
use crate::session::{Object, Session, StagingStep};

/// Why a drop did not commit. Not an error: the image simply reverts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DropRejection {
    TrialFinished,
    /// The drop point is not strictly inside any group.
    OutsideGroups,
    /// The image is already placed in a different group.
    PlacementLocked,
    /// Unknown image, or not yet shown.
    NotOnScreen,
}

impl fmt::Display for DropRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrialFinished => write!(f, "trial finished"),
            Self::OutsideGroups => write!(f, "outside every group"),
            Self::PlacementLocked => write!(f, "image already placed in another group"),
            Self::NotOnScreen => write!(f, "image not on screen"),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum DropOutcome {
    Committed {
        commit: Commit,
        /// Present when the image changed group.
        record: Option<MoveRecord>,
    },
    Rejected(DropRejection),
}

impl DropOutcome {
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Decide where `image` may land if released at `at`.
fn check_drop(session: &Session, image: &Image, at: Point) -> Result<GroupId, DropRejection> {
    if session.trial_finished {
        return Err(DropRejection::TrialFinished);
    }
    if !image.is_on_screen() {
        return Err(DropRejection::NotOnScreen);
    }
    let target = session
        .group_at(at)
        .ok_or(DropRejection::OutsideGroups)?
        .id();
    if session.config.one_placement_per_image
        && image.is_unstaged()
        && image.group() != Some(target)
    {
        return Err(DropRejection::PlacementLocked);
    }
    Ok(target)
}

#[derive(Debug)]
pub struct DragController<H: Host> {
    session: Session,
    host: H,
}

impl<H: Host> DragController<H> {
    /// Show the initial groups and stage the first image.
    pub fn start(session: Session, host: H, now_ms: f64) -> Self {
        let mut controller = Self { session, host };
        for index in 0..controller.session.groups.len() {
            controller.show_group(GroupId(index as u32));
        }
        let step = controller.session.stage_current(now_ms);
        controller.after_staging(step);
        controller
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_parts(self) -> (Session, H) {
        (self.session, self.host)
    }

    /// Would releasing `image` at `at` commit, and into which group?
    pub fn validate_drop(&self, image: &ImageId, at: Point) -> Result<GroupId, DropRejection> {
        let image = self
            .session
            .image(image)
            .ok_or(DropRejection::NotOnScreen)?;
        check_drop(&self.session, image, at)
    }

    /// Claim `image` as the active drag. Returns whether the drag started.
    pub fn pointer_down(&mut self, image: &ImageId, at: Point) -> bool {
        self.session.last_pointer = at;
        if self.session.active_drag.is_some() || self.session.trial_finished {
            return false;
        }
        let Some(slot) = self.session.image_slot(image) else {
            debug!("pointer down on unknown image {image}");
            return false;
        };
        if !self.session.images[slot].is_on_screen() {
            return false;
        }

        let z = self.session.next_z();
        self.session.images[slot].start_drag(z);
        self.session.active_drag = Some(ObjectRef::Image(image.clone()));
        let target = ObjectRef::Image(image.clone());
        self.host.render(RenderUpdate::Raised {
            target: target.clone(),
            z,
        });
        self.host.render(RenderUpdate::Dragging {
            target,
            active: true,
        });
        debug!("drag start {image} at {at}");
        true
    }

    pub fn pointer_move(&mut self, at: Point) {
        if let Some(slot) = self.active_slot() {
            self.follow_pointer(slot, at);
        }
        self.session.last_pointer = at;
    }

    /// Release the active drag at `at`: apply the last delta, then commit or
    /// revert against that same point.
    pub fn pointer_up(&mut self, at: Point, now_ms: f64) -> Option<DropOutcome> {
        let outcome = self.active_slot().map(|slot| {
            self.follow_pointer(slot, at);
            self.finish_drag(slot, at, now_ms)
        });
        self.session.active_drag = None;
        self.session.last_pointer = at;
        outcome
    }

    /// The pointer left the surface: revert any drag in progress.
    pub fn pointer_leave(&mut self) -> bool {
        self.cancel_active()
    }

    /// Re-layout for a new viewport. Any drag in progress is cancelled first
    /// so geometry never changes under it.
    pub fn resize(&mut self, viewport: Size) {
        self.cancel_active();
        self.session.relayout(viewport);
        info!(
            "resized to {}, group size {}",
            self.session.viewport, self.session.group_size
        );

        for group in &self.session.groups {
            let target = ObjectRef::Group(group.id());
            self.host.render(RenderUpdate::Moved {
                target: target.clone(),
                at: group.position(),
            });
            self.host.render(RenderUpdate::Resized {
                target,
                size: group.size(),
            });
        }
        let placed = self.session.next_image.min(self.session.images.len());
        for image in &self.session.images[..placed] {
            self.host.render(RenderUpdate::Moved {
                target: ObjectRef::Image(image.id().clone()),
                at: image.position(),
            });
        }
    }

    /// Append the next grid group, up to the grid's capacity.
    pub fn add_group(&mut self) -> Result<GroupId, SortError> {
        match self.session.add_group() {
            Ok(id) => {
                info!("added {id}");
                self.show_group(id);
                Ok(id)
            }
            Err(err) => {
                warn!("add group refused: {err}");
                Err(err)
            }
        }
    }

    /// Only images are draggable; a group target never yields a slot.
    fn active_slot(&self) -> Option<usize> {
        let target = self.session.active_drag.as_ref()?;
        match self.session.resolve(target)? {
            Object::Image(image) => self.session.image_slot(image.id()),
            Object::Group(_) => None,
        }
    }

    fn follow_pointer(&mut self, slot: usize, at: Point) {
        let delta = at - self.session.last_pointer;
        let bounds = self.session.game_bounds();
        let image = &mut self.session.images[slot];
        image.apply_delta(delta, bounds);
        self.host.render(RenderUpdate::Moved {
            target: ObjectRef::Image(image.id().clone()),
            at: image.position(),
        });
    }

    fn finish_drag(&mut self, slot: usize, at: Point, now_ms: f64) -> DropOutcome {
        let verdict = check_drop(&self.session, &self.session.images[slot], at);
        let footprint = self.session.config.image_footprint();
        let groups = &self.session.groups;
        let target = verdict.map(|id| &groups[id.index()]);
        let end = self.session.images[slot].end_drag(target, footprint);
        self.render_settled(slot);

        match end {
            DragEnd::Rejected(reason) => {
                debug!("drop of {} rejected: {reason}", self.session.images[slot].id());
                DropOutcome::Rejected(reason)
            }
            DragEnd::Committed(commit) => {
                info!(
                    "{} placed in {} at {}",
                    self.session.images[slot].id(),
                    commit.group,
                    commit.to
                );
                if commit.is_first_placement() {
                    self.advance_staging(now_ms);
                }
                let record = commit.changed_group().then(|| {
                    record_move(&mut self.host, &self.session.images[slot], &commit, now_ms)
                });
                DropOutcome::Committed { commit, record }
            }
        }
    }

    /// Stage the next image after a first placement.
    fn advance_staging(&mut self, now_ms: f64) {
        let step = self.session.advance_staging(now_ms);
        self.after_staging(step);
    }

    fn after_staging(&mut self, step: StagingStep) {
        match step {
            StagingStep::Staged(slot) => self.show_image(slot),
            StagingStep::TrialFinished => {
                info!("trial finished");
                self.host.request_completion_code();
            }
        }
    }

    fn cancel_active(&mut self) -> bool {
        let Some(slot) = self.active_slot() else {
            self.session.active_drag = None;
            return false;
        };
        self.session.images[slot].cancel_drag();
        self.session.active_drag = None;
        self.render_settled(slot);
        debug!("drag of {} cancelled", self.session.images[slot].id());
        true
    }

    fn render_settled(&mut self, slot: usize) {
        let image = &self.session.images[slot];
        let target = ObjectRef::Image(image.id().clone());
        self.host.render(RenderUpdate::Moved {
            target: target.clone(),
            at: image.position(),
        });
        self.host.render(RenderUpdate::Dragging {
            target,
            active: false,
        });
    }

    fn show_image(&mut self, slot: usize) {
        let image = &self.session.images[slot];
        let target = ObjectRef::Image(image.id().clone());
        self.host.render(RenderUpdate::Show {
            target: target.clone(),
            url: Some(image.url().to_owned()),
        });
        self.host.render(RenderUpdate::Moved {
            target: target.clone(),
            at: image.position(),
        });
        self.host.render(RenderUpdate::Raised {
            target,
            z: image.z_index(),
        });
    }

    fn show_group(&mut self, id: GroupId) {
        let Some(group) = self.session.groups.get(id.index()) else {
            return;
        };
        let target = ObjectRef::Group(id);
        let z = self.session.config.base_z_index.saturating_sub(1);
        self.host.render(RenderUpdate::Show {
            target: target.clone(),
            url: None,
        });
        self.host.render(RenderUpdate::Labelled {
            target: target.clone(),
            text: group.label(),
        });
        self.host.render(RenderUpdate::Moved {
            target: target.clone(),
            at: group.position(),
        });
        self.host.render(RenderUpdate::Resized {
            target: target.clone(),
            size: group.size(),
        });
        self.host.render(RenderUpdate::Raised { target, z });
    }
}
