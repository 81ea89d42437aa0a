//! Keeps a [`Surface`] in step with the diagram model.

use crate::diagram::{Block, BlockId, Connection, ConnectionId, Diagram, PortDirection, PortId};
use crate::surface::{
    BLOCK_FILL, INPUT_PORT_FILL, ItemId, ItemTag, OUTPUT_PORT_FILL, Primitive, Surface,
};
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Surface items drawn for one block.
#[derive(Debug, Clone)]
struct BlockItems {
    frame: ItemId,
    label: ItemId,
    ports: Vec<(PortId, ItemId)>,
}

impl BlockItems {
    fn all(&self) -> impl Iterator<Item = ItemId> + '_ {
        [self.frame, self.label]
            .into_iter()
            .chain(self.ports.iter().map(|&(_, item)| item))
    }
}

/// Maps diagram entities to the surface items that draw them.
#[derive(Debug, Clone, Default)]
pub struct DiagramView {
    blocks: HashMap<BlockId, BlockItems>,
    connections: HashMap<ConnectionId, ItemId>,
    /// Port currently outlined by hover.
    hovered: Option<PortId>,
}

impl DiagramView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a block: frame, centred label, then its ports on top.
    pub fn add_block<S: Surface>(&mut self, surface: &mut S, block: &Block) {
        let frame = surface.create(
            Primitive::Rect {
                bounds: block.bounds(),
                fill: BLOCK_FILL,
            },
            ItemTag::Block(block.id()),
        );
        let label = surface.create(
            Primitive::Text {
                position: block.bounds().center(),
                text: block.label(),
            },
            ItemTag::Label(block.id()),
        );
        let ports = block
            .ports()
            .map(|port| {
                let fill = match port.direction() {
                    PortDirection::Input => INPUT_PORT_FILL,
                    PortDirection::Output => OUTPUT_PORT_FILL,
                };
                let item = surface.create(
                    Primitive::Oval {
                        bounds: port.bounds,
                        fill,
                    },
                    ItemTag::Port(port.id),
                );
                (port.id, item)
            })
            .collect();
        self.blocks
            .insert(block.id(), BlockItems { frame, label, ports });
    }

    /// Delete every item drawn for a block.
    pub fn remove_block<S: Surface>(&mut self, surface: &mut S, id: BlockId) {
        if let Some(items) = self.blocks.remove(&id) {
            for item in items.all() {
                surface.delete(item);
            }
        }
        if self.hovered.is_some_and(|p| p.block == id) {
            self.hovered = None;
        }
    }

    /// Move every item drawn for a block.
    pub fn move_block<S: Surface>(&mut self, surface: &mut S, id: BlockId, delta: Vec2) {
        if let Some(items) = self.blocks.get(&id) {
            for item in items.all() {
                surface.translate(item, delta);
            }
        }
    }

    /// Draw a connection as an arrowed poly-line.
    pub fn add_connection<S: Surface>(&mut self, surface: &mut S, connection: &Connection) {
        let item = surface.create(
            connection_primitive(connection.path.clone()),
            ItemTag::Connection(connection.id()),
        );
        self.connections.insert(connection.id(), item);
    }

    /// Redraw a connection along its current path.
    pub fn update_connection<S: Surface>(&mut self, surface: &mut S, connection: &Connection) {
        match self.connections.get(&connection.id()) {
            Some(&item) => surface.update(item, connection_primitive(connection.path.clone())),
            None => self.add_connection(surface, connection),
        }
    }

    pub fn remove_connection<S: Surface>(&mut self, surface: &mut S, id: ConnectionId) {
        if let Some(item) = self.connections.remove(&id) {
            surface.delete(item);
        }
    }

    /// Clear every port outline, then outline `port` if given.
    pub fn set_hovered<S: Surface>(&mut self, surface: &mut S, port: Option<PortId>) {
        for items in self.blocks.values() {
            for &(_, item) in &items.ports {
                surface.set_highlight(item, false);
            }
        }
        if let Some(item) = port.and_then(|p| self.port_item(p)) {
            surface.set_highlight(item, true);
        }
        self.hovered = port;
    }

    pub fn hovered(&self) -> Option<PortId> {
        self.hovered
    }

    /// Surface item drawn for a port.
    pub fn port_item(&self, port: PortId) -> Option<ItemId> {
        self.blocks
            .get(&port.block)?
            .ports
            .iter()
            .find(|&&(id, _)| id == port)
            .map(|&(_, item)| item)
    }

    /// Surface item drawn for a block's frame.
    pub fn block_item(&self, id: BlockId) -> Option<ItemId> {
        self.blocks.get(&id).map(|items| items.frame)
    }

    /// Surface item drawn for a connection.
    pub fn connection_item(&self, id: ConnectionId) -> Option<ItemId> {
        self.connections.get(&id).copied()
    }

    /// Throw away the surface contents and redraw the whole diagram.
    pub fn rebuild<S: Surface>(&mut self, surface: &mut S, diagram: &Diagram) {
        surface.clear();
        self.blocks.clear();
        self.connections.clear();
        self.hovered = None;
        for block in diagram.blocks() {
            self.add_block(surface, block);
        }
        for connection in diagram.connections() {
            self.add_connection(surface, connection);
        }
    }
}

fn connection_primitive(points: Vec<Point>) -> Primitive {
    Primitive::PolyLine {
        points,
        dashed: false,
        arrow: true,
    }
}

/// Primitive for the dashed line shown while a connection is being drawn.
pub fn feedback_primitive(points: Vec<Point>) -> Primitive {
    Primitive::PolyLine {
        points,
        dashed: true,
        arrow: true,
    }
}
