//! Drawing surface abstraction.
//!
//! The editor never produces pixels. It issues primitive create / update /
//! delete calls against a [`Surface`] and asks it which items lie under a
//! point. [`SceneSurface`] is a retained in-memory implementation.

mod scene;

pub use scene::{SceneItem, SceneSurface};

use crate::diagram::{BlockId, ConnectionId, PortId};
use kurbo::{Point, Rect, Vec2};
use peniko::Color;

/// Fill of block rectangles.
pub const BLOCK_FILL: Color = Color::from_rgba8(173, 216, 230, 255);
/// Fill of input port circles.
pub const INPUT_PORT_FILL: Color = Color::from_rgba8(255, 0, 0, 255);
/// Fill of output port circles.
pub const OUTPUT_PORT_FILL: Color = Color::from_rgba8(0, 128, 0, 255);
/// Outline of a hovered port.
pub const HIGHLIGHT_OUTLINE: Color = Color::from_rgba8(255, 255, 0, 255);

/// Handle to an item created on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// What a surface item stands for in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemTag {
    Block(BlockId),
    Label(BlockId),
    Port(PortId),
    Connection(ConnectionId),
    /// Transient line shown while a connection is being drawn.
    Feedback,
}

/// A drawable primitive.
#[derive(Debug, Clone)]
pub enum Primitive {
    Rect { bounds: Rect, fill: Color },
    Text { position: Point, text: String },
    Oval { bounds: Rect, fill: Color },
    PolyLine {
        points: Vec<Point>,
        dashed: bool,
        arrow: bool,
    },
}

impl Primitive {
    /// Translate the primitive's geometry.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Primitive::Rect { bounds, .. } | Primitive::Oval { bounds, .. } => {
                *bounds = *bounds + delta;
            }
            Primitive::Text { position, .. } => *position += delta,
            Primitive::PolyLine { points, .. } => {
                for p in points.iter_mut() {
                    *p += delta;
                }
            }
        }
    }
}

/// Rendering backend contract.
///
/// Implementations can forward to a GPU scene, a toolkit canvas, or keep a
/// retained model like [`SceneSurface`].
pub trait Surface: Send + Sync {
    /// Create an item on top of everything else.
    fn create(&mut self, primitive: Primitive, tag: ItemTag) -> ItemId;

    /// Replace an item's geometry and style.
    fn update(&mut self, item: ItemId, primitive: Primitive);

    /// Move an item by a delta.
    fn translate(&mut self, item: ItemId, delta: Vec2);

    /// Delete an item. Unknown items are ignored.
    fn delete(&mut self, item: ItemId);

    /// Items overlapping the point, topmost first.
    fn items_at(&self, point: Point) -> Vec<ItemId>;

    /// Tag an item was created with.
    fn tag(&self, item: ItemId) -> Option<ItemTag>;

    /// Toggle the highlight outline of an item.
    fn set_highlight(&mut self, item: ItemId, highlighted: bool);

    /// Delete every item.
    fn clear(&mut self);
}
