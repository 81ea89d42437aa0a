//! Retained in-memory surface.

use super::{HIGHLIGHT_OUTLINE, ItemId, ItemTag, Primitive, Surface};
use crate::geometry::{distance_to_route, route_bounds};
use kurbo::{Point, Rect, Vec2};
use peniko::Color;

/// How close a point must be to a poly-line to hit it.
const LINE_HIT_TOLERANCE: f64 = 1.0;

/// An item kept by [`SceneSurface`].
#[derive(Debug, Clone)]
pub struct SceneItem {
    pub id: ItemId,
    pub tag: ItemTag,
    pub primitive: Primitive,
    pub highlighted: bool,
}

impl SceneItem {
    /// Outline colour to draw the item with, if any.
    pub fn outline(&self) -> Option<Color> {
        self.highlighted.then_some(HIGHLIGHT_OUTLINE)
    }

    /// Whether the item covers the point.
    pub fn hit_test(&self, point: Point) -> bool {
        match &self.primitive {
            Primitive::Rect { bounds, .. } | Primitive::Oval { bounds, .. } => {
                contains_inclusive(*bounds, point)
            }
            // Labels are decoration and never intercept the pointer.
            Primitive::Text { .. } => false,
            Primitive::PolyLine { points, .. } => {
                let bounds = route_bounds(points).inflate(LINE_HIT_TOLERANCE, LINE_HIT_TOLERANCE);
                contains_inclusive(bounds, point)
                    && distance_to_route(point, points) <= LINE_HIT_TOLERANCE
            }
        }
    }
}

fn contains_inclusive(rect: Rect, point: Point) -> bool {
    rect.x0 <= point.x && point.x <= rect.x1 && rect.y0 <= point.y && point.y <= rect.y1
}

/// Surface that keeps every item in memory in stacking order.
///
/// Later items are drawn on top of earlier ones.
#[derive(Debug, Clone, Default)]
pub struct SceneSurface {
    items: Vec<SceneItem>,
    next_id: u64,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an item by id.
    pub fn item(&self, id: ItemId) -> Option<&SceneItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut SceneItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Items in stacking order (bottom to top).
    pub fn items(&self) -> impl Iterator<Item = &SceneItem> {
        self.items.iter()
    }

    /// Items carrying the given tag.
    pub fn items_tagged(&self, tag: ItemTag) -> impl Iterator<Item = &SceneItem> {
        self.items.iter().filter(move |i| i.tag == tag)
    }

    pub fn is_highlighted(&self, id: ItemId) -> bool {
        self.item(id).is_some_and(|i| i.highlighted)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Surface for SceneSurface {
    fn create(&mut self, primitive: Primitive, tag: ItemTag) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(SceneItem {
            id,
            tag,
            primitive,
            highlighted: false,
        });
        id
    }

    fn update(&mut self, item: ItemId, primitive: Primitive) {
        if let Some(item) = self.item_mut(item) {
            item.primitive = primitive;
        }
    }

    fn translate(&mut self, item: ItemId, delta: Vec2) {
        if let Some(item) = self.item_mut(item) {
            item.primitive.translate(delta);
        }
    }

    fn delete(&mut self, item: ItemId) {
        self.items.retain(|i| i.id != item);
    }

    fn items_at(&self, point: Point) -> Vec<ItemId> {
        self.items
            .iter()
            .rev()
            .filter(|i| i.hit_test(point))
            .map(|i| i.id)
            .collect()
    }

    fn tag(&self, item: ItemId) -> Option<ItemTag> {
        self.item(item).map(|i| i.tag)
    }

    fn set_highlight(&mut self, item: ItemId, highlighted: bool) {
        if let Some(item) = self.item_mut(item) {
            item.highlighted = highlighted;
        }
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BLOCK_FILL;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Primitive {
        Primitive::Rect {
            bounds: Rect::new(x0, y0, x1, y1),
            fill: BLOCK_FILL,
        }
    }

    #[test]
    fn test_items_at_topmost_first() {
        let mut surface = SceneSurface::new();
        let bottom = surface.create(rect(0.0, 0.0, 100.0, 100.0), ItemTag::Feedback);
        let top = surface.create(rect(50.0, 50.0, 150.0, 150.0), ItemTag::Feedback);

        assert_eq!(surface.items_at(Point::new(75.0, 75.0)), vec![top, bottom]);
        assert_eq!(surface.items_at(Point::new(10.0, 10.0)), vec![bottom]);
        assert!(surface.items_at(Point::new(500.0, 500.0)).is_empty());
    }

    #[test]
    fn test_edges_are_inclusive() {
        let mut surface = SceneSurface::new();
        let id = surface.create(rect(0.0, 0.0, 10.0, 10.0), ItemTag::Feedback);
        assert_eq!(surface.items_at(Point::new(10.0, 10.0)), vec![id]);
    }

    #[test]
    fn test_text_never_hit() {
        let mut surface = SceneSurface::new();
        surface.create(
            Primitive::Text {
                position: Point::new(5.0, 5.0),
                text: "Block 0".to_string(),
            },
            ItemTag::Feedback,
        );
        assert!(surface.items_at(Point::new(5.0, 5.0)).is_empty());
    }

    #[test]
    fn test_polyline_hit() {
        let mut surface = SceneSurface::new();
        let id = surface.create(
            Primitive::PolyLine {
                points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
                dashed: false,
                arrow: true,
            },
            ItemTag::Feedback,
        );
        assert_eq!(surface.items_at(Point::new(50.0, 0.5)), vec![id]);
        assert!(surface.items_at(Point::new(50.0, 3.0)).is_empty());
    }

    #[test]
    fn test_translate_and_delete() {
        let mut surface = SceneSurface::new();
        let id = surface.create(rect(0.0, 0.0, 10.0, 10.0), ItemTag::Feedback);
        surface.translate(id, Vec2::new(100.0, 0.0));
        assert!(surface.items_at(Point::new(5.0, 5.0)).is_empty());
        assert_eq!(surface.items_at(Point::new(105.0, 5.0)), vec![id]);

        surface.delete(id);
        assert!(surface.is_empty());
        assert_eq!(surface.tag(id), None);
    }

    #[test]
    fn test_highlight() {
        let mut surface = SceneSurface::new();
        let id = surface.create(rect(0.0, 0.0, 10.0, 10.0), ItemTag::Feedback);
        assert!(!surface.is_highlighted(id));
        assert_eq!(surface.item(id).unwrap().outline(), None);
        surface.set_highlight(id, true);
        assert!(surface.is_highlighted(id));
        assert_eq!(surface.item(id).unwrap().outline(), Some(HIGHLIGHT_OUTLINE));
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut surface = SceneSurface::new();
        let first = surface.create(rect(0.0, 0.0, 1.0, 1.0), ItemTag::Feedback);
        surface.clear();
        let second = surface.create(rect(0.0, 0.0, 1.0, 1.0), ItemTag::Feedback);
        assert_ne!(first, second);
    }
}
