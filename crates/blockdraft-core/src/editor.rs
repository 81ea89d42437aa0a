//! The editor: a diagram, its drawing, and its history kept in step.

use crate::config::EditorConfig;
use crate::diagram::{BlockId, ConnectionError, ConnectionId, Diagram, PortId};
use crate::history::{Change, Command, History};
use crate::hit_test;
use crate::interaction::BlockRequest;
use crate::persist::{DesignFile, LoadReport};
use crate::storage::{Storage, StorageResult};
use crate::surface::Surface;
use crate::view::DiagramView;
use kurbo::{Point, Vec2};

/// Owns the model, the surface it is drawn on, and the undo history.
///
/// Every edit goes through here so the three never drift apart.
pub struct Editor<S: Surface> {
    diagram: Diagram,
    view: DiagramView,
    surface: S,
    history: History,
    config: EditorConfig,
}

impl<S: Surface> Editor<S> {
    pub fn new(surface: S, config: EditorConfig) -> Self {
        Self {
            diagram: Diagram::new(),
            view: DiagramView::new(),
            surface,
            history: History::with_limit(config.history_limit),
            config,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn view(&self) -> &DiagramView {
        &self.view
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct surface access, for transient items such as drag feedback.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Create and draw a block, recording it for undo.
    pub fn add_block(&mut self, origin: Point, inputs: usize, outputs: usize) -> BlockId {
        let id = self.diagram.add_block(origin, inputs, outputs);
        if let Some(block) = self.diagram.block(id) {
            self.view.add_block(&mut self.surface, block);
            self.history.record(Command::add_block(block.clone()));
            log::debug!("Added {} at ({}, {})", block.label(), origin.x, origin.y);
        }
        id
    }

    /// Create the block a confirmed [`BlockRequest`] describes.
    pub fn confirm_block(&mut self, request: &BlockRequest) -> BlockId {
        self.add_block(request.position, request.inputs, request.outputs)
    }

    /// Delete a block and every connection touching it.
    pub fn delete_block(&mut self, id: BlockId) -> bool {
        let Some((block, connections)) = self.diagram.remove_block(id) else {
            return false;
        };
        for connection in &connections {
            self.view.remove_connection(&mut self.surface, connection.id());
        }
        self.view.remove_block(&mut self.surface, id);
        log::debug!(
            "Deleted {} with {} connection(s)",
            block.label(),
            connections.len()
        );
        self.history.record(Command::DeleteBlock { block, connections });
        true
    }

    /// Connect an output port to an input port, recording it for undo.
    pub fn connect(
        &mut self,
        source: PortId,
        target: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        let id = self.diagram.add_connection(source, target)?;
        if let Some(connection) = self.diagram.connection(id) {
            self.view.add_connection(&mut self.surface, connection);
            self.history.record(Command::AddConnection {
                connection: connection.clone(),
            });
        }
        Ok(id)
    }

    /// Move a block and reroute its connections. Not recorded.
    pub fn move_block(&mut self, id: BlockId, delta: Vec2) -> bool {
        let Some(rerouted) = self.diagram.move_block(id, delta) else {
            return false;
        };
        self.view.move_block(&mut self.surface, id, delta);
        self.redraw_connections(&rerouted);
        true
    }

    /// Called when a drag ends; records the total move if moves are undoable.
    pub fn finish_move(&mut self, id: BlockId, delta: Vec2) {
        if self.config.record_moves && delta != Vec2::ZERO {
            self.history.record(Command::MoveBlock { block: id, delta });
        }
    }

    /// Undo the last recorded edit. Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.diagram) {
            Some(changes) => {
                self.sync(&changes);
                true
            }
            None => false,
        }
    }

    /// Redo the last undone edit. Returns false when there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.diagram) {
            Some(changes) => {
                self.sync(&changes);
                true
            }
            None => false,
        }
    }

    pub fn port_at(&self, point: Point) -> Option<PortId> {
        hit_test::port_at(&self.surface, &self.diagram, point)
    }

    pub fn block_at(&self, point: Point) -> Option<BlockId> {
        hit_test::block_at(&self.diagram, point)
    }

    /// Outline the port under the point, if any, and clear any other outline.
    pub fn hover(&mut self, point: Point) {
        let port = self.port_at(point);
        if port != self.view.hovered() {
            self.view.set_hovered(&mut self.surface, port);
        }
    }

    /// Empty the canvas. History is cleared as well.
    pub fn clear(&mut self) {
        self.diagram.clear();
        self.history.clear();
        self.view.rebuild(&mut self.surface, &self.diagram);
    }

    /// Snapshot of the diagram in file form.
    pub fn to_design(&self) -> DesignFile {
        DesignFile::from_diagram(&self.diagram)
    }

    /// Replace the diagram with a loaded design and redraw everything.
    ///
    /// History does not survive a load.
    pub fn load_design(&mut self, design: &DesignFile) -> LoadReport {
        let report = design.restore(&mut self.diagram, self.config.load_tolerance);
        self.history.clear();
        self.view.rebuild(&mut self.surface, &self.diagram);
        log::info!(
            "Loaded design: {} block(s), {} connection(s)",
            report.blocks,
            report.connections
        );
        for unresolved in &report.unresolved {
            log::warn!("Dropped connection {}: {}", unresolved.index, unresolved.reason);
        }
        report
    }

    pub fn save<St: Storage + ?Sized>(&self, storage: &St, name: &str) -> StorageResult<()> {
        storage.save(name, &self.to_design())?;
        log::info!("Saved design {:?}", name);
        Ok(())
    }

    pub fn load<St: Storage + ?Sized>(
        &mut self,
        storage: &St,
        name: &str,
    ) -> StorageResult<LoadReport> {
        let design = storage.load(name)?;
        Ok(self.load_design(&design))
    }

    fn sync(&mut self, changes: &[Change]) {
        for change in changes {
            match *change {
                Change::BlockAdded(id) => {
                    if let Some(block) = self.diagram.block(id) {
                        self.view.add_block(&mut self.surface, block);
                    }
                }
                Change::BlockRemoved(id) => self.view.remove_block(&mut self.surface, id),
                Change::BlockMoved(id, delta) => {
                    self.view.move_block(&mut self.surface, id, delta)
                }
                Change::ConnectionAdded(id) | Change::ConnectionRerouted(id) => {
                    self.redraw_connections(&[id])
                }
                Change::ConnectionRemoved(id) => {
                    self.view.remove_connection(&mut self.surface, id)
                }
            }
        }
    }

    fn redraw_connections(&mut self, ids: &[ConnectionId]) {
        for id in ids {
            if let Some(connection) = self.diagram.connection(*id) {
                self.view.update_connection(&mut self.surface, connection);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::surface::{ItemTag, Primitive, SceneSurface};

    fn editor() -> Editor<SceneSurface> {
        Editor::new(SceneSurface::new(), EditorConfig::default())
    }

    #[test]
    fn test_add_block_draws_and_records() {
        let mut editor = editor();
        let id = editor.add_block(Point::new(10.0, 10.0), 2, 1);
        assert_eq!(editor.surface().len(), 5);
        assert!(editor.view().block_item(id).is_some());
        assert!(editor.history().can_undo());
    }

    #[test]
    fn test_confirm_block_request() {
        let mut editor = editor();
        let request = BlockRequest::at(Point::new(5.0, 5.0)).with_counts(3, 2);
        let id = editor.confirm_block(&request);
        let block = editor.diagram().block(id).unwrap();
        assert_eq!(block.input_count(), 3);
        assert_eq!(block.output_count(), 2);
        assert_eq!(block.label(), "Block 0");
    }

    #[test]
    fn test_undo_redo_keeps_surface_in_step() {
        let mut editor = editor();
        let a = editor.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = editor.add_block(Point::new(200.0, 0.0), 1, 1);
        let ab = editor
            .connect(PortId::output(a, 0), PortId::input(b, 0))
            .unwrap();
        assert_eq!(editor.surface().len(), 9);

        assert!(editor.undo());
        assert_eq!(editor.surface().len(), 8);
        assert!(editor.view().connection_item(ab).is_none());

        assert!(editor.undo());
        assert_eq!(editor.surface().len(), 4);
        assert!(editor.view().block_item(b).is_none());

        assert!(editor.redo());
        assert!(editor.redo());
        assert_eq!(editor.surface().len(), 9);
        assert!(editor.view().connection_item(ab).is_some());
        assert!(!editor.redo());
    }

    #[test]
    fn test_move_reroutes_drawn_connection() {
        let mut editor = editor();
        let a = editor.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = editor.add_block(Point::new(200.0, 0.0), 1, 1);
        let ab = editor
            .connect(PortId::output(a, 0), PortId::input(b, 0))
            .unwrap();

        assert!(editor.move_block(b, Vec2::new(0.0, 100.0)));
        let item = editor.view().connection_item(ab).unwrap();
        match &editor.surface().item(item).unwrap().primitive {
            Primitive::PolyLine { points, .. } => {
                assert_eq!(points.last(), Some(&Point::new(200.0, 120.0)));
            }
            other => panic!("unexpected primitive {:?}", other),
        }
        // Not recorded.
        assert_eq!(editor.history().undo_len(), 3);
        assert!(!editor.move_block(BlockId::nil(), Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_delete_block_undo() {
        let mut editor = editor();
        let a = editor.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = editor.add_block(Point::new(200.0, 0.0), 1, 1);
        editor
            .connect(PortId::output(a, 0), PortId::input(b, 0))
            .unwrap();

        assert!(editor.delete_block(a));
        assert_eq!(editor.surface().len(), 4);
        assert_eq!(editor.diagram().connection_count(), 0);

        assert!(editor.undo());
        assert_eq!(editor.surface().len(), 9);
        assert_eq!(editor.diagram().connection_count(), 1);
        assert!(!editor.delete_block(BlockId::nil()));
    }

    #[test]
    fn test_delete_undo_restores_block_order() {
        let mut editor = editor();
        let a = editor.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = editor.add_block(Point::new(50.0, 20.0), 1, 1);
        let before = editor.to_design();

        assert!(editor.delete_block(a));
        assert_eq!(editor.block_at(Point::new(75.0, 40.0)), Some(b));
        assert!(editor.undo());

        let labels: Vec<_> = editor.diagram().blocks().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["Block 0", "Block 1"]);
        assert_eq!(editor.block_at(Point::new(75.0, 40.0)), Some(a));
        assert_eq!(editor.to_design(), before);
        assert_eq!(editor.to_design().blocks[0].x, 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut editor = editor();
        let a = editor.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = editor.add_block(Point::new(200.0, 50.0), 1, 2);
        editor
            .connect(PortId::output(a, 0), PortId::input(b, 0))
            .unwrap();
        editor.save(&storage, "pipeline").unwrap();

        let mut other = Editor::new(SceneSurface::new(), EditorConfig::default());
        other.add_block(Point::new(500.0, 500.0), 0, 0);
        let report = other.load(&storage, "pipeline").unwrap();
        assert!(report.is_complete());
        assert_eq!(other.diagram().len(), 2);
        assert_eq!(other.diagram().connection_count(), 1);
        assert!(!other.history().can_undo());
        assert_eq!(other.surface().items_tagged(ItemTag::Feedback).count(), 0);
        assert_eq!(other.surface().len(), 10);
    }

    #[test]
    fn test_clear() {
        let mut editor = editor();
        editor.add_block(Point::new(0.0, 0.0), 1, 1);
        editor.clear();
        assert!(editor.diagram().is_empty());
        assert!(editor.surface().is_empty());
        assert!(!editor.undo());
        let id = editor.add_block(Point::new(0.0, 0.0), 1, 1);
        assert_eq!(editor.diagram().block(id).unwrap().label(), "Block 0");
    }
}
