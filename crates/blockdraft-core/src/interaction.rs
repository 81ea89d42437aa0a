//! Pointer interaction state machine.
//!
//! Primary-button gestures either drag a block or draw a connection from a
//! port. The secondary button asks the caller for a new block's port counts.
//! Malformed gestures never raise errors; they simply end in [`InteractionState::Idle`].

use crate::diagram::{BlockId, PortId};
use crate::editor::Editor;
use crate::geometry::route_orthogonal;
use crate::input::{InputState, MouseButton, PointerEvent};
use crate::surface::{ItemId, ItemTag, Surface};
use crate::view::feedback_primitive;
use kurbo::{Point, Vec2};
use thiserror::Error;

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// A block follows the pointer.
    DraggingBlock {
        block: BlockId,
        /// Pointer position relative to the block's origin at press time.
        grab_offset: Vec2,
        /// Block origin at press time.
        start_origin: Point,
    },
    /// A connection is being drawn from `start`.
    DrawingConnection {
        start: PortId,
        /// Dashed line following the pointer.
        feedback: ItemId,
    },
}

/// Error parsing the new-block dialog fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid number of inputs: {0:?}")]
    Inputs(String),
    #[error("Invalid number of outputs: {0:?}")]
    Outputs(String),
}

/// Pending request for a new block, produced by a secondary click.
///
/// The caller shows a dialog prefilled with the counts and passes the
/// confirmed request to [`Editor::confirm_block`]. Dropping it cancels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRequest {
    /// Where the block's top-left corner goes.
    pub position: Point,
    pub inputs: usize,
    pub outputs: usize,
}

impl BlockRequest {
    /// A request at `position` with one input and one output.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            inputs: 1,
            outputs: 1,
        }
    }

    pub fn with_counts(mut self, inputs: usize, outputs: usize) -> Self {
        self.inputs = inputs;
        self.outputs = outputs;
        self
    }

    /// Fill the counts from dialog text fields. Negative numbers give no ports.
    pub fn with_fields(self, inputs: &str, outputs: &str) -> Result<Self, RequestError> {
        let inputs = parse_count(inputs).ok_or_else(|| RequestError::Inputs(inputs.to_string()))?;
        let outputs =
            parse_count(outputs).ok_or_else(|| RequestError::Outputs(outputs.to_string()))?;
        Ok(self.with_counts(inputs, outputs))
    }
}

fn parse_count(field: &str) -> Option<usize> {
    let value: i64 = field.trim().parse().ok()?;
    Some(usize::try_from(value.max(0)).unwrap_or(0))
}

/// Drives an [`Editor`] from raw pointer events.
#[derive(Debug, Clone, Default)]
pub struct InteractionHandler {
    state: InteractionState,
    input: InputState,
}

impl InteractionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// Feed one pointer event. Returns a block request on secondary press.
    pub fn handle_pointer_event<S: Surface>(
        &mut self,
        editor: &mut Editor<S>,
        event: PointerEvent,
    ) -> Option<BlockRequest> {
        self.input.handle_pointer_event(event);
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => {
                self.handle_press(editor, position);
                None
            }
            PointerEvent::Down {
                position,
                button: MouseButton::Right,
            } => Some(BlockRequest::at(position)),
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => {
                self.handle_release(editor, position);
                None
            }
            PointerEvent::Move { position } => {
                if self.input.is_button_pressed(MouseButton::Left) {
                    self.handle_drag(editor, position);
                } else if !self.input.any_button_pressed() {
                    editor.hover(position);
                }
                None
            }
            _ => None,
        }
    }

    /// Primary button pressed.
    pub fn handle_press<S: Surface>(&mut self, editor: &mut Editor<S>, point: Point) {
        if !self.is_idle() {
            // A release went missing; drop whatever was in progress.
            self.cancel(editor);
        }

        if let Some(port) = editor.port_at(point) {
            let Some(anchor) = editor.diagram().port_anchor(port) else {
                return;
            };
            let feedback = editor.surface_mut().create(
                feedback_primitive(route_orthogonal(anchor, point)),
                ItemTag::Feedback,
            );
            self.state = InteractionState::DrawingConnection {
                start: port,
                feedback,
            };
            log::debug!("Drawing connection from {:?}", port);
        } else if let Some(block) = editor.block_at(point) {
            let Some(origin) = editor.diagram().block(block).map(|b| b.origin) else {
                return;
            };
            self.state = InteractionState::DraggingBlock {
                block,
                grab_offset: point - origin,
                start_origin: origin,
            };
        } else {
            self.state = InteractionState::Idle;
        }
    }

    /// Pointer moved with the primary button held.
    pub fn handle_drag<S: Surface>(&mut self, editor: &mut Editor<S>, point: Point) {
        match self.state {
            InteractionState::Idle => {}
            InteractionState::DraggingBlock {
                block, grab_offset, ..
            } => {
                let Some(origin) = editor.diagram().block(block).map(|b| b.origin) else {
                    self.state = InteractionState::Idle;
                    return;
                };
                let delta = (point - grab_offset) - origin;
                if delta != Vec2::ZERO {
                    editor.move_block(block, delta);
                }
            }
            InteractionState::DrawingConnection { start, feedback } => {
                match editor.diagram().port_anchor(start) {
                    Some(anchor) => editor
                        .surface_mut()
                        .update(feedback, feedback_primitive(route_orthogonal(anchor, point))),
                    None => self.cancel(editor),
                }
            }
        }
    }

    /// Primary button released.
    pub fn handle_release<S: Surface>(&mut self, editor: &mut Editor<S>, point: Point) {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => {}
            InteractionState::DraggingBlock {
                block,
                start_origin,
                ..
            } => {
                if let Some(origin) = editor.diagram().block(block).map(|b| b.origin) {
                    editor.finish_move(block, origin - start_origin);
                }
            }
            InteractionState::DrawingConnection { start, feedback } => {
                editor.surface_mut().delete(feedback);
                if let Some(target) = editor.port_at(point) {
                    if let Err(err) = editor.connect(start, target) {
                        log::debug!("Discarded connection gesture: {}", err);
                    }
                }
            }
        }
    }

    /// Abandon the current gesture and return to idle.
    pub fn cancel<S: Surface>(&mut self, editor: &mut Editor<S>) {
        if let InteractionState::DrawingConnection { feedback, .. } =
            std::mem::take(&mut self.state)
        {
            editor.surface_mut().delete(feedback);
        }
    }
}
