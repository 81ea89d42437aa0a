//! Directed connections between ports.

use super::block::{BlockId, PortDirection, PortId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// Why a connection attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("port is not part of the diagram")]
    UnknownPort,
    #[error("connection must start at an output port, found {0}")]
    SourceNotOutput(PortDirection),
    #[error("connection must end at an input port, found {0}")]
    TargetNotInput(PortDirection),
    #[error("a port cannot be connected to itself")]
    SamePort,
}

/// An edge from an output port to an input port, with its cached route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub source: PortId,
    pub target: PortId,
    /// Routed path from the source anchor to the target anchor.
    pub path: Vec<Point>,
    /// Creation order within the diagram.
    pub(crate) sequence: u64,
}

impl Connection {
    pub(crate) fn new(source: PortId, target: PortId, path: Vec<Point>, sequence: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            path,
            sequence,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether either endpoint belongs to the block.
    pub fn touches(&self, block: BlockId) -> bool {
        self.source.block == block || self.target.block == block
    }
}

/// Check the direction rules for a prospective connection.
pub(crate) fn validate_endpoints(
    source: PortId,
    source_direction: PortDirection,
    target: PortId,
    target_direction: PortDirection,
) -> Result<(), ConnectionError> {
    if source == target {
        return Err(ConnectionError::SamePort);
    }
    if source_direction != PortDirection::Output {
        return Err(ConnectionError::SourceNotOutput(source_direction));
    }
    if target_direction != PortDirection::Input {
        return Err(ConnectionError::TargetNotInput(target_direction));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conn = Connection::new(PortId::output(a, 0), PortId::input(b, 0), Vec::new(), 0);
        assert!(conn.touches(a));
        assert!(conn.touches(b));
        assert!(!conn.touches(Uuid::new_v4()));
    }

    #[test]
    fn test_validate_endpoints() {
        let a = Uuid::new_v4();
        let out = PortId::output(a, 0);
        let inp = PortId::input(a, 0);
        assert!(validate_endpoints(out, PortDirection::Output, inp, PortDirection::Input).is_ok());
        assert_eq!(
            validate_endpoints(out, PortDirection::Output, out, PortDirection::Output),
            Err(ConnectionError::SamePort)
        );
        assert_eq!(
            validate_endpoints(inp, PortDirection::Input, out, PortDirection::Output),
            Err(ConnectionError::SourceNotOutput(PortDirection::Input))
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ConnectionError::TargetNotInput(PortDirection::Output);
        assert_eq!(err.to_string(), "connection must end at an input port, found output");
    }
}
