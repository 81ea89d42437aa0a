//! Blocks and their ports.

use crate::geometry::port_anchor;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for blocks.
pub type BlockId = Uuid;

/// Fixed block width.
pub const BLOCK_WIDTH: f64 = 100.0;
/// Height of a block with no ports.
pub const BLOCK_BASE_HEIGHT: f64 = 50.0;
/// Vertical distance between consecutive ports on the same side.
pub const PORT_SPACING: f64 = 10.0;
/// Offset from the block's top edge to the centre of its first port.
pub const FIRST_PORT_OFFSET: f64 = 20.0;
/// Radius of the circle drawn for a port.
pub const PORT_RADIUS: f64 = 5.0;

/// Which side of a block a port sits on, and which way data flows through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// Stable identity of a port: its owning block, side and index on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId {
    pub block: BlockId,
    pub direction: PortDirection,
    pub index: usize,
}

impl PortId {
    pub fn input(block: BlockId, index: usize) -> Self {
        Self {
            block,
            direction: PortDirection::Input,
            index,
        }
    }

    pub fn output(block: BlockId, index: usize) -> Self {
        Self {
            block,
            direction: PortDirection::Output,
            index,
        }
    }
}

/// A resolved port with its current geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Port {
    pub id: PortId,
    /// Visual bounds of the port circle.
    pub bounds: Rect,
}

impl Port {
    pub fn direction(&self) -> PortDirection {
        self.id.direction
    }

    /// Point connectors attach to.
    pub fn anchor(&self) -> Point {
        port_anchor(self.bounds)
    }
}

/// A rectangular node with input ports on its left edge and output ports on its right.
///
/// Ports are not stored; their geometry is derived from the block's origin and
/// port counts, so moving the block moves every port with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) id: BlockId,
    /// Top-left corner in canvas coordinates.
    pub origin: Point,
    inputs: usize,
    outputs: usize,
    /// Sequential number assigned at creation.
    label_index: usize,
}

impl Block {
    pub(crate) fn new(origin: Point, inputs: usize, outputs: usize, label_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            inputs,
            outputs,
            label_index,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn input_count(&self) -> usize {
        self.inputs
    }

    pub fn output_count(&self) -> usize {
        self.outputs
    }

    pub fn label_index(&self) -> usize {
        self.label_index
    }

    /// Display label, e.g. "Block 0".
    pub fn label(&self) -> String {
        format!("Block {}", self.label_index)
    }

    pub fn width(&self) -> f64 {
        BLOCK_WIDTH
    }

    pub fn height(&self) -> f64 {
        BLOCK_BASE_HEIGHT + PORT_SPACING * self.inputs.max(self.outputs) as f64
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width(),
            self.origin.y + self.height(),
        )
    }

    /// Whether the point lies inside the block, edges included.
    pub fn contains(&self, point: Point) -> bool {
        let b = self.bounds();
        b.x0 <= point.x && point.x <= b.x1 && b.y0 <= point.y && point.y <= b.y1
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.origin += delta;
    }

    pub fn port_count(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => self.inputs,
            PortDirection::Output => self.outputs,
        }
    }

    /// Whether this block owns the given port.
    pub fn has_port(&self, port: PortId) -> bool {
        port.block == self.id && port.index < self.port_count(port.direction)
    }

    /// Resolve one of this block's ports. `None` if the id belongs elsewhere.
    pub fn port(&self, id: PortId) -> Option<Port> {
        if !self.has_port(id) {
            return None;
        }
        let x = match id.direction {
            PortDirection::Input => self.origin.x,
            PortDirection::Output => self.origin.x + self.width(),
        };
        let y = self.origin.y + FIRST_PORT_OFFSET + PORT_SPACING * id.index as f64;
        Some(Port {
            id,
            bounds: Rect::new(x - PORT_RADIUS, y - PORT_RADIUS, x + PORT_RADIUS, y + PORT_RADIUS),
        })
    }

    /// Input ports, top to bottom.
    pub fn inputs(&self) -> impl Iterator<Item = Port> + '_ {
        (0..self.inputs).filter_map(|i| self.port(PortId::input(self.id, i)))
    }

    /// Output ports, top to bottom.
    pub fn outputs(&self) -> impl Iterator<Item = Port> + '_ {
        (0..self.outputs).filter_map(|i| self.port(PortId::output(self.id, i)))
    }

    /// All ports: inputs first, then outputs.
    pub fn ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.inputs().chain(self.outputs())
    }
}
