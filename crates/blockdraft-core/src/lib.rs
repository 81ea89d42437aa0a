//! Blockdraft Core Library
//!
//! Block-diagram model, hit-testing, pointer interaction and undo history,
//! independent of any particular windowing or rendering backend.

pub mod config;
pub mod diagram;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod persist;
pub mod storage;
pub mod surface;
pub mod view;

pub use config::EditorConfig;
pub use diagram::{
    Block, BlockId, Connection, ConnectionError, ConnectionId, Diagram, Port, PortDirection, PortId,
};
pub use editor::Editor;
pub use geometry::{port_anchor, route_orthogonal};
pub use history::{Command, History};
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{BlockRequest, InteractionHandler, InteractionState, RequestError};
pub use persist::{DesignFile, LoadReport};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use surface::{SceneSurface, Surface};
pub use view::DiagramView;
