//! Grid layout: group sizing, group placement and proportional re-mapping of
//! placed images when the viewport changes.
//!
//! Grid cell `(col, row)` has its top-left corner at
//! `(margin/2 + col*(margin + w), banner + margin/2 + row*(margin + h))`.
//! Only the `col*w`/`row*h` part and the offset inside the group depend on
//! the group size, so a resize scales everything measured from the
//! margin-only reference point `((col + 0.5)*margin, (row + 0.5)*margin + banner)`.

use crate::config::GameConfig;
use crate::geometry::{Point, Scale, Size};
use crate::group::Group;
use crate::image::Image;

/// Size of every group for the given viewport, floored at
/// `min_group_extent` so later scale factors stay finite.
#[must_use]
pub fn group_size(config: &GameConfig, viewport: Size) -> Size {
    let cols = config.grid_columns as f64;
    let rows = config.grid_rows as f64;
    let width = viewport.width / cols - config.group_margin;
    let height = (viewport.height - config.banner_height) / rows - config.group_margin;
    // f64::max discards NaN, so a NaN viewport also lands on the floor.
    Size::new(
        width.max(config.min_group_extent),
        height.max(config.min_group_extent),
    )
}

/// `(column, row)` of grid index `index`.
#[must_use]
pub fn grid_cell(config: &GameConfig, index: usize) -> (usize, usize) {
    (index % config.grid_columns, index / config.grid_columns)
}

/// Top-left corner of the group at grid index `index`.
#[must_use]
pub fn group_origin(config: &GameConfig, index: usize, group_size: Size) -> Point {
    let (col, row) = grid_cell(config, index);
    let m = config.group_margin;
    Point::new(
        m / 2.0 + col as f64 * (m + group_size.width),
        config.banner_height + m / 2.0 + row as f64 * (group_size.height + m),
    )
}

/// The part of a cell's origin that does not scale with group size.
#[must_use]
pub fn cell_reference(config: &GameConfig, (col, row): (usize, usize)) -> Point {
    let m = config.group_margin;
    Point::new(
        (col as f64 + 0.5) * m,
        (row as f64 + 0.5) * m + config.banner_height,
    )
}

#[must_use]
pub fn rescale_point(p: Point, reference: Point, scale: Scale) -> Point {
    (p - reference) * scale + reference
}

/// Move and resize every group onto its grid cell.
pub fn place_groups(config: &GameConfig, groups: &mut [Group], group_size: Size, viewport: Size) {
    let footprint = config.image_footprint();
    for group in groups {
        let origin = group_origin(config, group.grid_index(), group_size);
        group.move_to(origin, viewport, footprint);
        group.resize(group_size);
    }
}

/// Re-map placed images from `old` to `new` group size.
///
/// `groups` must already carry their new geometry: each image is re-clamped
/// into its group's new rectangle. A degenerate `old` (first layout) leaves
/// images untouched.
pub fn rescale(config: &GameConfig, old: Size, new: Size, images: &mut [Image], groups: &[Group]) {
    let Some(scale) = new.scale_from(old) else {
        return;
    };
    let footprint = config.image_footprint();
    for image in images {
        let Some(group) = image.group().and_then(|g| groups.get(g.index())) else {
            continue;
        };
        let reference = cell_reference(config, group.grid_position(config.grid_columns));
        let to = rescale_point(image.position(), reference, scale);
        image.move_to(to, group.image_bounds(footprint));
    }
}
