//! Design file format.
//!
//! Blocks are stored by origin and port counts. Connections are stored by the
//! bounding boxes of their two ports, `[x1, y1, x2, y2]`, and are matched back
//! to live ports by position when loaded.

use crate::diagram::{ConnectionError, Diagram, PortDirection};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One stored block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub x: f64,
    pub y: f64,
    /// Negative counts from hand-edited files load as zero.
    pub num_inputs: i64,
    pub num_outputs: i64,
}

/// One stored connection: the boxes of its output and input ports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub start_port: [f64; 4],
    pub end_port: [f64; 4],
}

fn rect_coords(rect: Rect) -> [f64; 4] {
    [rect.x0, rect.y0, rect.x1, rect.y1]
}

fn coords_center([x0, y0, x1, y1]: [f64; 4]) -> Point {
    Point::new((x0 + x1) / 2.0, (y0 + y1) / 2.0)
}

/// Whole-diagram file contents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DesignFile {
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

impl DesignFile {
    /// Capture a diagram, blocks and connections in insertion order.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let blocks = diagram
            .blocks()
            .map(|b| BlockRecord {
                x: b.origin.x,
                y: b.origin.y,
                num_inputs: b.input_count() as i64,
                num_outputs: b.output_count() as i64,
            })
            .collect();
        let connections = diagram
            .connections()
            .filter_map(|c| {
                Some(ConnectionRecord {
                    start_port: rect_coords(diagram.port_bounds(c.source)?),
                    end_port: rect_coords(diagram.port_bounds(c.target)?),
                })
            })
            .collect();
        Self {
            blocks,
            connections,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Replace the diagram's contents with this design.
    ///
    /// Each connection endpoint is matched to the nearest port of the right
    /// direction within `tolerance` of its stored box centre. Connections that
    /// cannot be matched are left out and listed in the report.
    pub fn restore(&self, diagram: &mut Diagram, tolerance: f64) -> LoadReport {
        diagram.clear();
        for record in &self.blocks {
            diagram.add_block(
                Point::new(record.x, record.y),
                record.num_inputs.max(0) as usize,
                record.num_outputs.max(0) as usize,
            );
        }

        let mut report = LoadReport {
            blocks: self.blocks.len(),
            ..LoadReport::default()
        };
        for (index, record) in self.connections.iter().enumerate() {
            let start = coords_center(record.start_port);
            let end = coords_center(record.end_port);
            let source = diagram.nearest_port(start, PortDirection::Output, tolerance);
            let target = diagram.nearest_port(end, PortDirection::Input, tolerance);
            let result = match (source, target) {
                (None, _) => Err(UnresolvedReason::MissingStart),
                (_, None) => Err(UnresolvedReason::MissingEnd),
                (Some(source), Some(target)) => diagram
                    .add_connection(source, target)
                    .map_err(UnresolvedReason::Rejected),
            };
            match result {
                Ok(_) => report.connections += 1,
                Err(reason) => report.unresolved.push(UnresolvedConnection { index, reason }),
            }
        }
        report
    }
}

/// Why a stored connection was dropped on load.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum UnresolvedReason {
    #[error("no output port at the stored start position")]
    MissingStart,
    #[error("no input port at the stored end position")]
    MissingEnd,
    #[error(transparent)]
    Rejected(#[from] ConnectionError),
}

/// A stored connection that could not be restored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnresolvedConnection {
    /// Position in the file's connection list.
    pub index: usize,
    pub reason: UnresolvedReason,
}

/// Outcome of restoring a design.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub blocks: usize,
    pub connections: usize,
    pub unresolved: Vec<UnresolvedConnection>,
}

impl LoadReport {
    /// True when every stored connection was restored.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}
