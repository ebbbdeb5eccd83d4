//! Drag-and-drop image sorting engine.
//!
//! Images wait in a staging slot and are dragged into grid-laid-out groups.
//! Each change of group is recorded as a move for later analysis. The engine
//! owns no rendering: it emits [`host::RenderUpdate`]s and move records to
//! whatever hosts it, typically a browser page through [`SortingGame`].

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod group;
pub mod host;
pub mod image;
pub mod layout;
pub mod object;
pub mod recorder;
pub mod session;


use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

pub use config::GameConfig;
pub use controller::{DragController, DropOutcome, DropRejection};
pub use error::SortError;
pub use geometry::{Point, Size};
pub use host::{Host, Outbox, RenderUpdate};
pub use object::{GroupId, ImageId, ObjectRef};
pub use recorder::MoveRecord;
pub use session::Session;

/// Browser-facing handle: one sorting trial driven by DOM events.
///
/// Outgoing traffic is buffered; the page drains it with the `take_*`
/// methods after each event and forwards moves to the server.
#[wasm_bindgen]
#[derive(Debug)]
pub struct SortingGame {
    controller: DragController<Outbox>,
}

#[wasm_bindgen]
impl SortingGame {
    /// Start a trial from the image-list JSON with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(
        image_list_json: &str,
        width: f64,
        height: f64,
        seed: u64,
        now_ms: f64,
    ) -> Result<SortingGame, JsError> {
        Self::with_config(image_list_json, "{}", width, height, seed, now_ms)
    }

    /// Like `new`, with a (partial) JSON `GameConfig`.
    pub fn with_config(
        image_list_json: &str,
        config_json: &str,
        width: f64,
        height: f64,
        seed: u64,
        now_ms: f64,
    ) -> Result<SortingGame, JsError> {
        let config = GameConfig::from_json(config_json)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut source = host::JsonImageList(image_list_json);
        let session = Session::load(config, &mut source, &mut rng, Size::new(width, height))?;
        Ok(Self {
            controller: DragController::start(session, Outbox::default(), now_ms),
        })
    }

    pub fn pointer_down(&mut self, image_id: &str, x: f64, y: f64) -> bool {
        self.controller
            .pointer_down(&ImageId::from(image_id), Point::new(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.controller.pointer_move(Point::new(x, y));
    }

    /// Returns true when the drop committed.
    pub fn pointer_up(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        self.controller
            .pointer_up(Point::new(x, y), now_ms)
            .is_some_and(|outcome| outcome.is_committed())
    }

    pub fn pointer_leave(&mut self) {
        self.controller.pointer_leave();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.controller.resize(Size::new(width, height));
    }

    /// Grid index of the new group.
    pub fn add_group(&mut self) -> Result<u32, JsError> {
        Ok(self.controller.add_group()?.0)
    }

    #[must_use]
    pub fn trial_finished(&self) -> bool {
        self.controller.session().trial_finished()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.controller.session().remaining()
    }

    /// True once after the trial ends: fetch and show the completion code.
    pub fn take_completion_request(&mut self) -> bool {
        self.controller.host_mut().take_completion_request()
    }

    /// Pending move records as a JSON array.
    pub fn take_moves_json(&mut self) -> Result<String, JsError> {
        let moves = self.controller.host_mut().take_moves();
        Ok(serde_json::to_string(&moves)?)
    }

    /// Pending render updates as a JSON array.
    pub fn take_render_json(&mut self) -> Result<String, JsError> {
        let updates = self.controller.host_mut().take_render();
        Ok(serde_json::to_string(&updates)?)
    }

    pub fn initial_state_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.controller.session().initial_state())?)
    }
}

impl SortingGame {
    #[must_use]
    pub fn controller(&self) -> &DragController<Outbox> {
        &self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> SortingGame {
        SortingGame::new(r#"["a", "b"]"#, 800.0, 600.0, 9, 0.0).unwrap()
    }

    fn staged(game: &SortingGame) -> String {
        let session = game.controller().session();
        session.staged_image().unwrap().id().to_string()
    }

    #[test]
    fn full_trial_through_facade() {
        let mut game = game();
        assert_eq!(game.remaining(), 2);
        let render: serde_json::Value =
            serde_json::from_str(&game.take_render_json().unwrap()).unwrap();
        assert!(!render.as_array().unwrap().is_empty());

        for now in [1_000.0, 2_000.0] {
            let id = staged(&game);
            assert!(game.pointer_down(&id, -116.0, 30.0));
            game.pointer_move(0.0, 50.0);
            assert!(game.pointer_up(60.0, 80.0, now));
        }
        assert!(game.trial_finished());
        assert!(game.take_completion_request());

        let moves: Vec<serde_json::Value> =
            serde_json::from_str(&game.take_moves_json().unwrap()).unwrap();
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(MoveRecord::has_required_fields));
        assert_eq!(moves[0]["old_group"], -1);
        assert_eq!(moves[0]["new_group"], 0);
        assert_eq!(game.take_moves_json().unwrap(), "[]");
    }

    #[test]
    fn add_group_and_resize() {
        let mut game = game();
        assert_eq!(game.add_group().unwrap(), 1);
        game.take_render_json().unwrap();
        game.resize(1024.0, 768.0);
        let render: Vec<RenderUpdate> =
            serde_json::from_str(&game.take_render_json().unwrap()).unwrap();
        assert!(render.contains(&RenderUpdate::Resized {
            target: ObjectRef::Group(GroupId(1)),
            size: Size::new(224.0, 344.0),
        }));
    }

    #[test]
    fn custom_config_applies() {
        let game = SortingGame::with_config(
            r#"["a"]"#,
            r#"{"staging_position": {"x": -50.0, "y": 10.0}}"#,
            800.0,
            600.0,
            1,
            0.0,
        )
        .unwrap();
        let session = game.controller().session();
        assert_eq!(session.staged_image().unwrap().position(), Point::new(-50.0, 10.0));
    }

    #[test]
    fn top_z_index_keeps_dragging() {
        let mut game = SortingGame::with_config(
            r#"["a", "b"]"#,
            r#"{"base_z_index": 4294967295}"#,
            800.0,
            600.0,
            1,
            0.0,
        )
        .unwrap();
        for _ in 0..2 {
            let id = staged(&game);
            assert!(game.pointer_down(&id, -116.0, 30.0));
            game.pointer_leave();
        }
        let id = staged(&game);
        let session = game.controller().session();
        assert_eq!(session.image(&ImageId::from(id.as_str())).unwrap().z_index(), u32::MAX);
    }

    #[test]
    fn infinite_resize_keeps_positions_finite() {
        let mut game = game();
        let id = staged(&game);
        assert!(game.pointer_down(&id, -116.0, 30.0));
        assert!(game.pointer_up(60.0, 80.0, 1.0));
        game.resize(f64::INFINITY, 600.0);
        let session = game.controller().session();
        let image = session.image(&ImageId::from(id.as_str())).unwrap();
        assert!(image.position().is_finite());
        assert!(session.group_size().width.is_finite());
    }

    #[test]
    fn initial_state_lists_all_images() {
        let game = game();
        let state: Vec<serde_json::Value> =
            serde_json::from_str(&game.initial_state_json().unwrap()).unwrap();
        assert_eq!(state.len(), 2);
        assert!(state.iter().all(|s| s["group"] == -1));
    }
}
