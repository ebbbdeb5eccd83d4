//! Session state: every image and group of one sorting trial, the staging
//! pointer, the active drag and the z-order counter.

use std::collections::{HashMap, HashSet};

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::GameConfig;
use crate::error::SortError;
use crate::geometry::{Bounds, Point, Size};
use crate::group::Group;
use crate::host::ImageSource;
use crate::image::Image;
use crate::layout;
use crate::object::{GroupId, ImageId, ObjectRef};

/// Borrowed view of whatever an [`ObjectRef`] points at.
#[derive(Clone, Copy, Debug)]
pub enum Object<'a> {
    Group(&'a Group),
    Image(&'a Image),
}

/// Result of filling the staging slot.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StagingStep {
    /// Slot index into the image sequence of the newly staged image.
    Staged(usize),
    TrialFinished,
}

/// Per-image entry of the trial's starting state.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct InitialImageState {
    pub image_id: String,
    pub group: i32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug)]
pub struct Session {
    pub(crate) config: GameConfig,
    pub(crate) viewport: Size,
    pub(crate) group_size: Size,
    /// Shuffled once at load; never reordered afterwards.
    pub(crate) images: Vec<Image>,
    pub(crate) image_slots: HashMap<ImageId, usize>,
    /// Registration order is grid order: `groups[i].id() == GroupId(i)`.
    pub(crate) groups: Vec<Group>,
    /// Index of the image in (or about to enter) the staging slot. Every
    /// image before it has been placed.
    pub(crate) next_image: usize,
    pub(crate) active_drag: Option<ObjectRef>,
    pub(crate) last_pointer: Point,
    pub(crate) highest_z: u32,
    pub(crate) trial_finished: bool,
}

impl Session {
    /// Load and shuffle the image list and lay out the default group.
    ///
    /// An image list that fails to load, is empty or has duplicate ids is
    /// fatal: there is no session without images.
    pub fn load<S, R>(
        config: GameConfig,
        source: &mut S,
        rng: &mut R,
        viewport: Size,
    ) -> Result<Self, SortError>
    where
        S: ImageSource + ?Sized,
        R: Rng + ?Sized,
    {
        config.validate()?;
        let ids = source.load_image_ids()?;
        if ids.is_empty() {
            return Err(SortError::NoImages);
        }

        let mut images = Vec::with_capacity(ids.len());
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id.clone()) {
                return Err(SortError::DuplicateImage(id));
            }
            let url = format!("/images/{id}");
            images.push(Image::new(ImageId(id), url, config.base_z_index));
        }
        images.shuffle(rng);

        let image_slots = images
            .iter()
            .enumerate()
            .map(|(slot, image)| (image.id().clone(), slot))
            .collect();

        let viewport = sanitize(viewport);
        let group_size = layout::group_size(&config, viewport);
        let mut first = Group::new(GroupId(0), Point::default(), group_size);
        first.move_to(
            layout::group_origin(&config, 0, group_size),
            viewport,
            config.image_footprint(),
        );

        info!("session loaded with {} images", images.len());
        Ok(Self {
            highest_z: config.base_z_index,
            config,
            viewport,
            group_size,
            images,
            image_slots,
            groups: vec![first],
            next_image: 0,
            active_drag: None,
            last_pointer: Point::default(),
            trial_finished: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn group_size(&self) -> Size {
        self.group_size
    }

    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn image(&self, id: &ImageId) -> Option<&Image> {
        self.image_slot(id).map(|slot| &self.images[slot])
    }

    #[must_use]
    pub fn image_slot(&self, id: &ImageId) -> Option<usize> {
        self.image_slots.get(id).copied()
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.index())
    }

    #[must_use]
    pub fn resolve(&self, target: &ObjectRef) -> Option<Object<'_>> {
        match target {
            ObjectRef::Group(id) => self.group(*id).map(Object::Group),
            ObjectRef::Image(id) => self.image(id).map(Object::Image),
        }
    }

    /// First group, in registration order, whose interior holds `p`.
    #[must_use]
    pub fn group_at(&self, p: Point) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains_point(p))
    }

    #[must_use]
    pub fn staging_index(&self) -> usize {
        self.next_image
    }

    #[must_use]
    pub fn staged_image(&self) -> Option<&Image> {
        self.images.get(self.next_image).filter(|i| i.is_on_screen())
    }

    #[must_use]
    pub fn placed_images(&self) -> &[Image] {
        &self.images[..self.next_image.min(self.images.len())]
    }

    /// Images still to be placed, counting the one in staging.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.images.len().saturating_sub(self.next_image)
    }

    #[must_use]
    pub fn trial_finished(&self) -> bool {
        self.trial_finished
    }

    #[must_use]
    pub fn active_drag(&self) -> Option<&ObjectRef> {
        self.active_drag.as_ref()
    }

    #[must_use]
    pub fn last_pointer(&self) -> Point {
        self.last_pointer
    }

    /// Clamp box for images outside any group constraint.
    #[must_use]
    pub fn game_bounds(&self) -> Bounds {
        Bounds::inset(Point::default(), self.viewport, self.config.image_footprint())
    }

    /// Starting state reported for a fresh trial: nothing placed yet.
    #[must_use]
    pub fn initial_state(&self) -> Vec<InitialImageState> {
        self.images
            .iter()
            .map(|image| InitialImageState {
                image_id: image.id().to_string(),
                group: GroupId::STAGING_SENTINEL,
                x: -1,
                y: -1,
            })
            .collect()
    }

    pub(crate) fn next_z(&mut self) -> u32 {
        let z = self.highest_z;
        self.highest_z = self.highest_z.saturating_add(1);
        z
    }

    /// Show the image at the staging pointer, or finish the trial if the
    /// sequence is exhausted.
    pub(crate) fn stage_current(&mut self, now_ms: f64) -> StagingStep {
        let slot = self.next_image;
        let at = self.config.staging_position;
        match self.images.get_mut(slot) {
            Some(image) => {
                image.stage(at, now_ms);
                StagingStep::Staged(slot)
            }
            None => {
                self.trial_finished = true;
                StagingStep::TrialFinished
            }
        }
    }

    /// Move the staging pointer past the image just placed.
    pub(crate) fn advance_staging(&mut self, now_ms: f64) -> StagingStep {
        if self.trial_finished {
            return StagingStep::TrialFinished;
        }
        self.next_image += 1;
        self.stage_current(now_ms)
    }

    pub(crate) fn add_group(&mut self) -> Result<GroupId, SortError> {
        let max = self.config.max_groups();
        if self.groups.len() >= max {
            return Err(SortError::GroupLimit { max });
        }
        let Ok(index) = u32::try_from(self.groups.len()) else {
            return Err(SortError::GroupLimit { max });
        };
        let id = GroupId(index);
        let mut group = Group::new(id, Point::default(), self.group_size);
        group.move_to(
            layout::group_origin(&self.config, id.index(), self.group_size),
            self.viewport,
            self.config.image_footprint(),
        );
        self.groups.push(group);
        Ok(id)
    }

    /// Recompute group geometry for `viewport` and carry placed images along.
    pub(crate) fn relayout(&mut self, viewport: Size) {
        let viewport = sanitize(viewport);
        let old = self.group_size;
        let new = layout::group_size(&self.config, viewport);
        layout::place_groups(&self.config, &mut self.groups, new, viewport);
        let placed = self.next_image.min(self.images.len());
        layout::rescale(&self.config, old, new, &mut self.images[..placed], &self.groups);
        self.viewport = viewport;
        self.group_size = new;
    }
}

/// Negative or non-finite viewport sides become zero.
fn sanitize(viewport: Size) -> Size {
    let side = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
    Size::new(side(viewport.width), side(viewport.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{JsonImageList, StaticImageList};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(n: usize) -> StaticImageList {
        StaticImageList((0..n).map(|i| format!("img{i}")).collect())
    }

    fn load(n: usize) -> Session {
        let mut rng = StdRng::seed_from_u64(7);
        Session::load(GameConfig::default(), &mut ids(n), &mut rng, Size::new(800.0, 600.0))
            .unwrap()
    }

    #[test]
    fn load_creates_one_group_and_hidden_images() {
        let s = load(5);
        assert_eq!(s.groups().len(), 1);
        assert_eq!(s.groups()[0].position(), Point::new(16.0, 32.0));
        assert_eq!(s.groups()[0].size(), Size::new(168.0, 260.0));
        assert_eq!(s.images().len(), 5);
        assert!(s.images().iter().all(|i| !i.is_on_screen()));
        assert_eq!(s.staging_index(), 0);
        assert_eq!(s.remaining(), 5);
        assert!(s.staged_image().is_none());
    }

    #[test]
    fn load_shuffles_but_keeps_every_id() {
        let s = load(50);
        let mut got: Vec<String> = s.images().iter().map(|i| i.id().to_string()).collect();
        let original: Vec<String> = (0..50).map(|i| format!("img{i}")).collect();
        assert_ne!(got, original);
        got.sort();
        let mut sorted = original;
        sorted.sort();
        assert_eq!(got, sorted);
        for (slot, image) in s.images().iter().enumerate() {
            assert_eq!(s.image_slot(image.id()), Some(slot));
        }
    }

    #[test]
    fn empty_list_is_fatal() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = Session::load(GameConfig::default(), &mut ids(0), &mut rng, Size::new(800.0, 600.0))
            .unwrap_err();
        assert!(matches!(err, SortError::NoImages));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut source = JsonImageList(r#"["a", "b", "a"]"#);
        let err = Session::load(GameConfig::default(), &mut source, &mut rng, Size::new(800.0, 600.0))
            .unwrap_err();
        assert!(matches!(err, SortError::DuplicateImage(id) if id == "a"));
    }

    #[test]
    fn staging_walks_the_sequence_then_finishes() {
        let mut s = load(2);
        assert_eq!(s.stage_current(10.0), StagingStep::Staged(0));
        assert_eq!(s.staged_image().unwrap().position(), Point::new(-116.0, 30.0));
        assert_eq!(s.advance_staging(20.0), StagingStep::Staged(1));
        assert_eq!(s.remaining(), 1);
        assert_eq!(s.advance_staging(30.0), StagingStep::TrialFinished);
        assert!(s.trial_finished());
        assert_eq!(s.remaining(), 0);
        assert_eq!(s.advance_staging(40.0), StagingStep::TrialFinished);
        assert_eq!(s.staging_index(), 2);
    }

    #[test]
    fn add_group_until_limit() {
        let mut s = load(1);
        for expected in 1..8 {
            assert_eq!(s.add_group().unwrap(), GroupId(expected));
        }
        assert_eq!(s.groups()[5].position(), Point::new(216.0, 324.0));
        let err = s.add_group().unwrap_err();
        assert!(matches!(err, SortError::GroupLimit { max: 8 }));
        assert_eq!(s.groups().len(), 8);
    }

    #[test]
    fn group_at_uses_strict_interior() {
        let mut s = load(1);
        s.add_group().unwrap();
        assert_eq!(s.group_at(Point::new(50.0, 50.0)).map(Group::id), Some(GroupId(0)));
        assert_eq!(s.group_at(Point::new(250.0, 50.0)).map(Group::id), Some(GroupId(1)));
        assert!(s.group_at(Point::new(16.0, 50.0)).is_none());
        assert!(s.group_at(Point::new(200.0, 50.0)).is_none());
    }

    #[test]
    fn resolve_typed_refs() {
        let s = load(3);
        let id = s.images()[1].id().clone();
        assert!(matches!(s.resolve(&ObjectRef::Image(id)), Some(Object::Image(_))));
        assert!(matches!(s.resolve(&ObjectRef::Group(GroupId(0))), Some(Object::Group(_))));
        assert!(s.resolve(&ObjectRef::Group(GroupId(4))).is_none());
        assert!(s.resolve(&ObjectRef::Image("nope".into())).is_none());
    }

    #[test]
    fn degenerate_viewport_stays_finite() {
        let mut s = load(1);
        s.relayout(Size::new(0.0, -5.0));
        assert_eq!(s.viewport(), Size::ZERO);
        assert_eq!(s.group_size(), Size::new(1.0, 1.0));
        assert!(s.groups()[0].position().is_finite());
        s.relayout(Size::new(800.0, 600.0));
        assert_eq!(s.group_size(), Size::new(168.0, 260.0));
    }

    #[test]
    fn infinite_viewport_is_treated_as_empty() {
        let mut s = load(2);
        s.stage_current(0.0);
        s.images[0].start_drag(3);
        let group = s.groups[0].clone();
        let bounds = s.game_bounds();
        s.images[0].apply_delta(Point::new(176.0, 50.0), bounds);
        s.images[0].end_drag(Ok(&group), s.config.image_footprint());
        s.advance_staging(0.0);
        assert_eq!(s.placed_images().len(), 1);

        for viewport in [
            Size::new(f64::INFINITY, 600.0),
            Size::new(800.0, f64::NEG_INFINITY),
            Size::new(f64::NAN, f64::INFINITY),
        ] {
            s.relayout(viewport);
            assert!(s.viewport().width.is_finite() && s.viewport().height.is_finite());
            assert!(s.group_size().width.is_finite() && s.group_size().height.is_finite());
            assert!(s.groups()[0].position().is_finite());
            assert!(s.images()[0].position().is_finite());
            assert!(s.images()[0].perfect_position().is_finite());
        }
    }

    #[test]
    fn initial_state_marks_everything_unplaced() {
        let s = load(3);
        let state = s.initial_state();
        assert_eq!(state.len(), 3);
        assert!(state.iter().all(|e| e.group == -1 && e.x == -1 && e.y == -1));
    }

    #[test]
    fn z_counter_is_monotonic() {
        let mut s = load(1);
        assert_eq!(s.next_z(), 2);
        assert_eq!(s.next_z(), 3);
    }

    #[test]
    fn z_counter_saturates_at_max() {
        let config = GameConfig {
            base_z_index: u32::MAX - 1,
            ..GameConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = Session::load(config, &mut ids(1), &mut rng, Size::new(800.0, 600.0)).unwrap();
        assert_eq!(s.next_z(), u32::MAX - 1);
        assert_eq!(s.next_z(), u32::MAX);
        assert_eq!(s.next_z(), u32::MAX);
    }
}
