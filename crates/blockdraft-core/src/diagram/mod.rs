//! The authoritative block graph.

mod block;
mod connection;

pub use block::{
    BLOCK_BASE_HEIGHT, BLOCK_WIDTH, Block, BlockId, FIRST_PORT_OFFSET, PORT_RADIUS, PORT_SPACING,
    Port, PortDirection, PortId,
};
pub use connection::{Connection, ConnectionError, ConnectionId};

use crate::geometry::route_orthogonal;
use connection::validate_endpoints;
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;

/// Blocks, their ports and the connections between them.
///
/// Every connection refers to live ports of live blocks: removing a block
/// removes its connections with it.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    blocks: HashMap<BlockId, Block>,
    /// Block ids in insertion order.
    block_order: Vec<BlockId>,
    connections: HashMap<ConnectionId, Connection>,
    /// Connection ids in insertion order.
    connection_order: Vec<ConnectionId>,
    /// Label number for the next block created.
    next_label: usize,
    /// Sequence number for the next connection created.
    next_connection: u64,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block at `origin` with the given number of ports on each side.
    pub fn add_block(&mut self, origin: Point, inputs: usize, outputs: usize) -> BlockId {
        let block = Block::new(origin, inputs, outputs, self.next_label);
        let id = block.id();
        self.next_label += 1;
        self.block_order.push(id);
        self.blocks.insert(id, block);
        id
    }

    /// Put back a previously removed block, keeping its id and label.
    ///
    /// The block returns to its creation-order slot, which label numbers record.
    pub fn insert_block(&mut self, block: Block) {
        let id = block.id();
        let label = block.label_index();
        self.next_label = self.next_label.max(label + 1);
        if self.blocks.contains_key(&id) {
            self.blocks.insert(id, block);
            return;
        }
        let slot = self.block_order.partition_point(|other| {
            self.blocks
                .get(other)
                .is_some_and(|b| b.label_index() < label)
        });
        self.block_order.insert(slot, id);
        self.blocks.insert(id, block);
    }

    /// Remove a block together with every connection that touches it.
    ///
    /// The removed connections are returned in insertion order.
    pub fn remove_block(&mut self, id: BlockId) -> Option<(Block, Vec<Connection>)> {
        let block = self.blocks.remove(&id)?;
        self.block_order.retain(|&b| b != id);
        let incident: Vec<Connection> = self
            .connections_of(id)
            .into_iter()
            .filter_map(|cid| self.remove_connection(cid))
            .collect();
        Some((block, incident))
    }

    /// Translate a block and re-route every connection attached to it.
    ///
    /// Returns the re-routed connection ids, or `None` for an unknown block.
    pub fn move_block(&mut self, id: BlockId, delta: Vec2) -> Option<Vec<ConnectionId>> {
        self.blocks.get_mut(&id)?.translate(delta);
        let affected = self.connections_of(id);
        for &cid in &affected {
            self.reroute(cid);
        }
        Some(affected)
    }

    /// Connect an output port to an input port.
    pub fn add_connection(
        &mut self,
        source: PortId,
        target: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        let path = self.route_between(source, target)?;
        let connection = Connection::new(source, target, path, self.next_connection);
        self.next_connection += 1;
        let id = connection.id();
        self.connection_order.push(id);
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Put back a previously removed connection, keeping its id and its
    /// place in creation order.
    ///
    /// The path is recomputed since the endpoints may have moved meanwhile.
    pub fn insert_connection(
        &mut self,
        mut connection: Connection,
    ) -> Result<ConnectionId, ConnectionError> {
        connection.path = self.route_between(connection.source, connection.target)?;
        let id = connection.id();
        let sequence = connection.sequence;
        self.next_connection = self.next_connection.max(sequence + 1);
        if self.connections.contains_key(&id) {
            self.connections.insert(id, connection);
            return Ok(id);
        }
        let slot = self.connection_order.partition_point(|other| {
            self.connections
                .get(other)
                .is_some_and(|c| c.sequence < sequence)
        });
        self.connection_order.insert(slot, id);
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a single connection.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;
        self.connection_order.retain(|&c| c != id);
        Some(connection)
    }

    /// Validate a prospective connection and compute its route.
    fn route_between(&self, source: PortId, target: PortId) -> Result<Vec<Point>, ConnectionError> {
        let source_port = self.port(source).ok_or(ConnectionError::UnknownPort)?;
        let target_port = self.port(target).ok_or(ConnectionError::UnknownPort)?;
        validate_endpoints(source, source_port.direction(), target, target_port.direction())?;
        Ok(route_orthogonal(source_port.anchor(), target_port.anchor()))
    }

    fn reroute(&mut self, id: ConnectionId) {
        let Some((source, target)) = self.connections.get(&id).map(|c| (c.source, c.target)) else {
            return;
        };
        let (Some(from), Some(to)) = (self.port_anchor(source), self.port_anchor(target)) else {
            return;
        };
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.path = route_orthogonal(from, to);
        }
    }

    /// Get a block by id.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.block_order.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Get a connection by id.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connection_order
            .iter()
            .filter_map(|id| self.connections.get(id))
    }

    /// Ids of the connections touching a block, in insertion order.
    pub fn connections_of(&self, block: BlockId) -> Vec<ConnectionId> {
        self.connections()
            .filter(|c| c.touches(block))
            .map(|c| c.id())
            .collect()
    }

    /// Resolve a port against the live blocks.
    pub fn port(&self, id: PortId) -> Option<Port> {
        self.blocks.get(&id.block)?.port(id)
    }

    /// Direction of a port, or `None` if the diagram does not know it.
    pub fn port_direction(&self, id: PortId) -> Option<PortDirection> {
        self.port(id).map(|p| p.direction())
    }

    pub fn port_bounds(&self, id: PortId) -> Option<Rect> {
        self.port(id).map(|p| p.bounds)
    }

    pub fn port_anchor(&self, id: PortId) -> Option<Point> {
        self.port(id).map(|p| p.anchor())
    }

    /// First block, in insertion order, whose rectangle contains the point.
    pub fn block_at(&self, point: Point) -> Option<BlockId> {
        self.blocks().find(|b| b.contains(point)).map(|b| b.id())
    }

    /// Closest port of the given direction whose anchor lies within `tolerance`.
    pub fn nearest_port(
        &self,
        point: Point,
        direction: PortDirection,
        tolerance: f64,
    ) -> Option<PortId> {
        self.blocks()
            .flat_map(|b| b.ports())
            .filter(|p| p.direction() == direction)
            .map(|p| (p.id, (p.anchor() - point).hypot()))
            .filter(|&(_, dist)| dist <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Remove everything and restart label numbering.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.block_order.clear();
        self.connections.clear();
        self.connection_order.clear();
        self.next_label = 0;
        self.next_connection = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blocks() -> (Diagram, BlockId, BlockId) {
        let mut diagram = Diagram::new();
        let a = diagram.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = diagram.add_block(Point::new(200.0, 0.0), 1, 1);
        (diagram, a, b)
    }

    #[test]
    fn test_add_block() {
        let mut diagram = Diagram::new();
        for (inputs, outputs) in [(0, 0), (1, 3), (4, 2)] {
            let id = diagram.add_block(Point::new(5.0, 5.0), inputs, outputs);
            let block = diagram.block(id).unwrap();
            assert_eq!(block.inputs().count(), inputs);
            assert_eq!(block.outputs().count(), outputs);
            let expected = 50.0 + 10.0 * inputs.max(outputs) as f64;
            assert!((block.height() - expected).abs() < f64::EPSILON);
        }
        assert_eq!(diagram.len(), 3);
    }

    #[test]
    fn test_labels_are_sequential_and_not_reused() {
        let mut diagram = Diagram::new();
        let a = diagram.add_block(Point::ZERO, 1, 1);
        let b = diagram.add_block(Point::ZERO, 1, 1);
        diagram.remove_block(b);
        let c = diagram.add_block(Point::ZERO, 1, 1);
        assert_eq!(diagram.block(a).unwrap().label(), "Block 0");
        assert_eq!(diagram.block(c).unwrap().label(), "Block 2");
    }

    #[test]
    fn test_add_connection_rules() {
        let (mut diagram, a, b) = two_blocks();
        let a_out = PortId::output(a, 0);
        let a_in = PortId::input(a, 0);
        let b_out = PortId::output(b, 0);
        let b_in = PortId::input(b, 0);

        assert_eq!(
            diagram.add_connection(b_in, a_out),
            Err(ConnectionError::SourceNotOutput(PortDirection::Input))
        );
        assert_eq!(
            diagram.add_connection(a_out, b_out),
            Err(ConnectionError::TargetNotInput(PortDirection::Output))
        );
        assert_eq!(
            diagram.add_connection(b_in, a_in),
            Err(ConnectionError::SourceNotOutput(PortDirection::Input))
        );
        assert_eq!(diagram.add_connection(a_out, a_out), Err(ConnectionError::SamePort));
        assert_eq!(diagram.connection_count(), 0);

        let id = diagram.add_connection(a_out, b_in).unwrap();
        let conn = diagram.connection(id).unwrap();
        assert_eq!(conn.path.first(), Some(&Point::new(100.0, 20.0)));
        assert_eq!(conn.path.last(), Some(&Point::new(200.0, 20.0)));
        assert_eq!(conn.path.len(), 4);
    }

    #[test]
    fn test_unknown_port_rejected() {
        let (mut diagram, a, b) = two_blocks();
        assert_eq!(
            diagram.add_connection(PortId::output(a, 3), PortId::input(b, 0)),
            Err(ConnectionError::UnknownPort)
        );
        assert_eq!(diagram.port_direction(PortId::output(a, 3)), None);
        assert_eq!(
            diagram.port_direction(PortId::output(a, 0)),
            Some(PortDirection::Output)
        );
    }

    #[test]
    fn test_ports_can_be_shared() {
        let mut diagram = Diagram::new();
        let a = diagram.add_block(Point::ZERO, 0, 1);
        let b = diagram.add_block(Point::new(200.0, 0.0), 2, 0);
        assert!(diagram.add_connection(PortId::output(a, 0), PortId::input(b, 0)).is_ok());
        assert!(diagram.add_connection(PortId::output(a, 0), PortId::input(b, 1)).is_ok());
        assert!(diagram.add_connection(PortId::output(a, 0), PortId::input(b, 1)).is_ok());
        assert_eq!(diagram.connection_count(), 3);
    }

    #[test]
    fn test_move_block_reroutes_only_attached_connections() {
        let mut diagram = Diagram::new();
        let a = diagram.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = diagram.add_block(Point::new(200.0, 0.0), 1, 1);
        let c = diagram.add_block(Point::new(0.0, 200.0), 1, 1);
        let d = diagram.add_block(Point::new(200.0, 200.0), 1, 1);
        let ab = diagram.add_connection(PortId::output(a, 0), PortId::input(b, 0)).unwrap();
        let cd = diagram.add_connection(PortId::output(c, 0), PortId::input(d, 0)).unwrap();
        let cd_before = diagram.connection(cd).unwrap().path.clone();

        let moved = diagram.move_block(b, Vec2::new(30.0, 40.0)).unwrap();
        assert_eq!(moved, vec![ab]);

        let ab_path = &diagram.connection(ab).unwrap().path;
        assert_eq!(ab_path.last().copied(), diagram.port_anchor(PortId::input(b, 0)));
        assert_eq!(ab_path.last(), Some(&Point::new(230.0, 60.0)));
        assert_eq!(ab_path.first().copied(), diagram.port_anchor(PortId::output(a, 0)));
        assert_eq!(diagram.connection(cd).unwrap().path, cd_before);
    }

    #[test]
    fn test_move_unknown_block() {
        let mut diagram = Diagram::new();
        assert!(diagram.move_block(uuid::Uuid::new_v4(), Vec2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_remove_block_cascades() {
        let (mut diagram, a, b) = two_blocks();
        let c = diagram.add_block(Point::new(400.0, 0.0), 1, 1);
        diagram.add_connection(PortId::output(a, 0), PortId::input(b, 0)).unwrap();
        let bc = diagram.add_connection(PortId::output(b, 0), PortId::input(c, 0)).unwrap();
        let ca = diagram.add_connection(PortId::output(c, 0), PortId::input(a, 0)).unwrap();

        let (removed, incident) = diagram.remove_block(b).unwrap();
        assert_eq!(removed.id(), b);
        assert_eq!(incident.len(), 2);
        assert_eq!(incident[1].id(), bc);
        assert_eq!(diagram.connection_count(), 1);
        assert!(diagram.connection(ca).is_some());
        assert!(diagram.remove_block(b).is_none());
    }

    #[test]
    fn test_reinsert_restores_identity() {
        let (mut diagram, a, b) = two_blocks();
        let ab = diagram.add_connection(PortId::output(a, 0), PortId::input(b, 0)).unwrap();
        let (block, incident) = diagram.remove_block(b).unwrap();

        diagram.insert_block(block);
        for conn in incident {
            diagram.insert_connection(conn).unwrap();
        }
        assert_eq!(diagram.len(), 2);
        assert_eq!(diagram.block(b).unwrap().label(), "Block 1");
        assert!(diagram.connection(ab).is_some());
        assert_eq!(diagram.blocks().last().map(|b| b.id()), Some(b));
    }

    #[test]
    fn test_reinsert_keeps_creation_order() {
        let mut diagram = Diagram::new();
        let a = diagram.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = diagram.add_block(Point::new(50.0, 20.0), 1, 1);
        let c = diagram.add_block(Point::new(300.0, 0.0), 1, 1);
        let bc = diagram.add_connection(PortId::output(b, 0), PortId::input(c, 0)).unwrap();
        let ab = diagram.add_connection(PortId::output(a, 0), PortId::input(b, 0)).unwrap();
        let ac = diagram.add_connection(PortId::output(a, 0), PortId::input(c, 0)).unwrap();

        let (block, incident) = diagram.remove_block(a).unwrap();
        assert_eq!(diagram.block_at(Point::new(75.0, 40.0)), Some(b));
        diagram.insert_block(block);
        for conn in incident {
            diagram.insert_connection(conn).unwrap();
        }

        let order: Vec<_> = diagram.blocks().map(|b| b.id()).collect();
        assert_eq!(order, vec![a, b, c]);
        let conns: Vec<_> = diagram.connections().map(|c| c.id()).collect();
        assert_eq!(conns, vec![bc, ab, ac]);
        assert_eq!(diagram.block_at(Point::new(75.0, 40.0)), Some(a));
    }

    #[test]
    fn test_insert_connection_to_missing_block_fails() {
        let (mut diagram, a, b) = two_blocks();
        let ab = diagram.add_connection(PortId::output(a, 0), PortId::input(b, 0)).unwrap();
        let conn = diagram.remove_connection(ab).unwrap();
        diagram.remove_block(b);
        assert_eq!(diagram.insert_connection(conn), Err(ConnectionError::UnknownPort));
    }

    #[test]
    fn test_block_at_prefers_insertion_order() {
        let mut diagram = Diagram::new();
        let a = diagram.add_block(Point::new(0.0, 0.0), 1, 1);
        let b = diagram.add_block(Point::new(50.0, 20.0), 1, 1);
        assert_eq!(diagram.block_at(Point::new(75.0, 40.0)), Some(a));
        assert_eq!(diagram.block_at(Point::new(140.0, 40.0)), Some(b));
        assert_eq!(diagram.block_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_nearest_port() {
        let (diagram, a, b) = two_blocks();
        assert_eq!(
            diagram.nearest_port(Point::new(101.0, 20.0), PortDirection::Output, 2.0),
            Some(PortId::output(a, 0))
        );
        assert_eq!(
            diagram.nearest_port(Point::new(200.0, 20.0), PortDirection::Input, 2.0),
            Some(PortId::input(b, 0))
        );
        assert_eq!(
            diagram.nearest_port(Point::new(200.0, 20.0), PortDirection::Output, 2.0),
            None
        );
        assert_eq!(
            diagram.nearest_port(Point::new(110.0, 20.0), PortDirection::Output, 2.0),
            None
        );
    }

    #[test]
    fn test_clear() {
        let (mut diagram, _, _) = two_blocks();
        diagram.clear();
        assert!(diagram.is_empty());
        let id = diagram.add_block(Point::ZERO, 1, 1);
        assert_eq!(diagram.block(id).unwrap().label(), "Block 0");
    }
}
