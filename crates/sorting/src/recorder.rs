//! Move records: one per change of group, sent to the host for storage.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::host::MoveSink;
use crate::image::{Commit, Image};
use crate::object::GroupId;

/// A committed move of an image into a different group (or out of staging).
///
/// Serializes to the shape the collection endpoint expects. Groups are grid
/// indices with `-1` for staging.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    pub image_id: String,
    pub old_group: i32,
    pub new_group: i32,
    pub old_x: f64,
    pub new_x: f64,
    pub old_y: f64,
    pub new_y: f64,
    #[serde(rename = "time_elapsed")]
    pub time_elapsed_ms: u64,
}

impl MoveRecord {
    pub const REQUIRED_FIELDS: [&'static str; 8] = [
        "image_id",
        "old_group",
        "new_group",
        "old_x",
        "new_x",
        "old_y",
        "new_y",
        "time_elapsed",
    ];

    #[must_use]
    pub fn from_commit(image: &Image, commit: &Commit, now_ms: f64) -> Self {
        Self {
            image_id: image.id().to_string(),
            old_group: GroupId::wire_index(commit.previous),
            new_group: GroupId::wire_index(Some(commit.group)),
            old_x: commit.from.x,
            new_x: commit.to.x,
            old_y: commit.from.y,
            new_y: commit.to.y,
            time_elapsed_ms: image.dwell_ms(now_ms),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Does a decoded move object carry every field the endpoint stores?
    #[must_use]
    pub fn has_required_fields(value: &serde_json::Value) -> bool {
        Self::REQUIRED_FIELDS
            .iter()
            .all(|field| value.get(field).is_some())
    }
}

/// Build the record for `commit` and hand it to `sink`.
///
/// Delivery is the sink's business: nothing is retried here.
pub fn record_move<S: MoveSink + ?Sized>(
    sink: &mut S,
    image: &Image,
    commit: &Commit,
    now_ms: f64,
) -> MoveRecord {
    let record = MoveRecord::from_commit(image, commit, now_ms);
    debug!(
        "move {}: {} -> {} after {} ms",
        record.image_id, record.old_group, record.new_group, record.time_elapsed_ms
    );
    sink.submit_move(&record);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::host::Outbox;

    fn commit() -> Commit {
        Commit {
            group: GroupId(2),
            previous: None,
            from: Point::new(-116.0, 30.0),
            to: Point::new(40.0, 50.0),
        }
    }

    fn image() -> Image {
        let mut img = Image::new("kitten".into(), "/images/kitten".into(), 2);
        img.stage(Point::new(-116.0, 30.0), 1_000.0);
        img
    }

    #[test]
    fn record_from_first_placement() {
        let record = MoveRecord::from_commit(&image(), &commit(), 4_250.0);
        assert_eq!(record.image_id, "kitten");
        assert_eq!(record.old_group, -1);
        assert_eq!(record.new_group, 2);
        assert_eq!((record.old_x, record.old_y), (-116.0, 30.0));
        assert_eq!((record.new_x, record.new_y), (40.0, 50.0));
        assert_eq!(record.time_elapsed_ms, 3_250);
    }

    #[test]
    fn wire_format_has_required_fields() {
        let record = MoveRecord::from_commit(&image(), &commit(), 2_000.0);
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert!(MoveRecord::has_required_fields(&value));
        assert_eq!(value["time_elapsed"], 1_000);
        assert!(value.get("time_elapsed_ms").is_none());
    }

    #[test]
    fn missing_field_is_detected() {
        let value = serde_json::json!({
            "image_id": "a", "old_group": -1, "new_group": 0,
            "old_x": 0.0, "new_x": 1.0, "old_y": 0.0, "new_y": 1.0,
        });
        assert!(!MoveRecord::has_required_fields(&value));
    }

    #[test]
    fn record_move_submits_to_sink() {
        let mut outbox = Outbox::default();
        let record = record_move(&mut outbox, &image(), &commit(), 1_500.0);
        assert_eq!(outbox.moves, vec![record]);
    }
}
