//! Undo/redo command log.

use crate::config::MAX_UNDO_HISTORY;
use crate::diagram::{Block, BlockId, Connection, ConnectionId, Diagram};
use kurbo::Vec2;

/// A recorded, invertible edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A block was created. `connections` holds connections removed along
    /// with the block when it was undone, so redo can put them back.
    AddBlock {
        block: Block,
        connections: Vec<Connection>,
    },
    AddConnection { connection: Connection },
    /// A block was deleted together with its incident connections.
    DeleteBlock {
        block: Block,
        connections: Vec<Connection>,
    },
    /// A block was dragged by `delta`.
    MoveBlock { block: BlockId, delta: Vec2 },
}

/// A model change produced by undo or redo, for syncing the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    BlockAdded(BlockId),
    BlockRemoved(BlockId),
    BlockMoved(BlockId, Vec2),
    ConnectionAdded(ConnectionId),
    ConnectionRemoved(ConnectionId),
    ConnectionRerouted(ConnectionId),
}

impl Command {
    /// Record the creation of a block.
    pub fn add_block(block: Block) -> Self {
        Command::AddBlock {
            block,
            connections: Vec::new(),
        }
    }

    /// Perform the edit on the diagram.
    fn apply(self, diagram: &mut Diagram) -> (Command, Vec<Change>) {
        let mut changes = Vec::new();
        let command = match self {
            Command::AddBlock { block, connections } => {
                let (block, connections) = restore(diagram, block, connections, &mut changes);
                Command::AddBlock { block, connections }
            }
            Command::AddConnection { connection } => {
                restore_connection(diagram, &connection, &mut changes);
                Command::AddConnection { connection }
            }
            Command::DeleteBlock { block, connections } => {
                let (block, connections) = take(diagram, block, connections, &mut changes);
                Command::DeleteBlock { block, connections }
            }
            Command::MoveBlock { block, delta } => {
                shift(diagram, block, delta, &mut changes);
                Command::MoveBlock { block, delta }
            }
        };
        (command, changes)
    }

    /// Reverse the edit on the diagram.
    fn revert(self, diagram: &mut Diagram) -> (Command, Vec<Change>) {
        let mut changes = Vec::new();
        let command = match self {
            Command::AddBlock { block, connections } => {
                let (block, connections) = take(diagram, block, connections, &mut changes);
                Command::AddBlock { block, connections }
            }
            Command::AddConnection { connection } => {
                let connection = match diagram.remove_connection(connection.id()) {
                    Some(removed) => {
                        changes.push(Change::ConnectionRemoved(removed.id()));
                        removed
                    }
                    None => connection,
                };
                Command::AddConnection { connection }
            }
            Command::DeleteBlock { block, connections } => {
                let (block, connections) = restore(diagram, block, connections, &mut changes);
                Command::DeleteBlock { block, connections }
            }
            Command::MoveBlock { block, delta } => {
                shift(diagram, block, -delta, &mut changes);
                Command::MoveBlock { block, delta }
            }
        };
        (command, changes)
    }
}

/// Remove a block and its connections, returning their current state.
fn take(
    diagram: &mut Diagram,
    block: Block,
    connections: Vec<Connection>,
    changes: &mut Vec<Change>,
) -> (Block, Vec<Connection>) {
    match diagram.remove_block(block.id()) {
        Some((removed, incident)) => {
            changes.extend(incident.iter().map(|c| Change::ConnectionRemoved(c.id())));
            changes.push(Change::BlockRemoved(removed.id()));
            (removed, incident)
        }
        None => (block, connections),
    }
}

/// Put a block back, then its connections.
fn restore(
    diagram: &mut Diagram,
    block: Block,
    connections: Vec<Connection>,
    changes: &mut Vec<Change>,
) -> (Block, Vec<Connection>) {
    changes.push(Change::BlockAdded(block.id()));
    diagram.insert_block(block.clone());
    for connection in &connections {
        restore_connection(diagram, connection, changes);
    }
    (block, connections)
}

fn restore_connection(diagram: &mut Diagram, connection: &Connection, changes: &mut Vec<Change>) {
    match diagram.insert_connection(connection.clone()) {
        Ok(id) => changes.push(Change::ConnectionAdded(id)),
        Err(err) => log::warn!("Could not restore connection {}: {}", connection.id(), err),
    }
}

fn shift(diagram: &mut Diagram, block: BlockId, delta: Vec2, changes: &mut Vec<Change>) {
    if let Some(rerouted) = diagram.move_block(block, delta) {
        changes.push(Change::BlockMoved(block, delta));
        changes.extend(rerouted.into_iter().map(Change::ConnectionRerouted));
    }
}

/// Linear undo/redo history.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(MAX_UNDO_HISTORY)
    }

    /// History keeping at most `limit` undo steps.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a command that has already been performed.
    pub fn record(&mut self, command: Command) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last command. `None` if there was nothing to undo.
    pub fn undo(&mut self, diagram: &mut Diagram) -> Option<Vec<Change>> {
        let command = self.undo_stack.pop()?;
        let (command, changes) = command.revert(diagram);
        self.redo_stack.push(command);
        Some(changes)
    }

    /// Redo the last undone command. `None` if there was nothing to redo.
    pub fn redo(&mut self, diagram: &mut Diagram) -> Option<Vec<Change>> {
        let command = self.redo_stack.pop()?;
        let (command, changes) = command.apply(diagram);
        self.undo_stack.push(command);
        Some(changes)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recently recorded command.
    pub fn last(&self) -> Option<&Command> {
        self.undo_stack.last()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
