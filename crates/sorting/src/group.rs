//! Group entity: a rectangular drop target on the grid.

use crate::geometry::{point_in_rect, Bounds, Point, Size};
use crate::object::GroupId;

#[derive(Clone, PartialEq, Debug)]
pub struct Group {
    id: GroupId,
    position: Point,
    size: Size,
}

impl Group {
    #[must_use]
    pub fn new(id: GroupId, position: Point, size: Size) -> Self {
        Self { id, position, size }
    }

    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        point_in_rect(p, self.position, self.size)
    }

    /// Set the top-left corner, clamped so at least one image's extent of the
    /// group stays on the game area.
    pub fn move_to(&mut self, to: Point, game_area: Size, footprint: f64) {
        self.position = Bounds::inset(Point::default(), game_area, footprint).clamp(to);
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    #[must_use]
    pub fn grid_index(&self) -> usize {
        self.id.index()
    }

    /// `(column, row)` in a grid `columns` groups wide.
    #[must_use]
    pub fn grid_position(&self, columns: usize) -> (usize, usize) {
        let i = self.grid_index();
        (i % columns, i / columns)
    }

    /// Valid top-left positions for an image of `footprint` inside this group.
    #[must_use]
    pub fn image_bounds(&self, footprint: f64) -> Bounds {
        Bounds::inset(self.position, self.size, footprint)
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("Group {}", self.grid_index() + 1)
    }
}
