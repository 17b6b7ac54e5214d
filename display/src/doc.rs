//! Persistent overlay model: fixed comments, shapes, and the keyed tables that
//! hold them on one display.
//!
//! The hub relays mutation events, never snapshots, and gives no ordering
//! guarantee between a create and the updates that follow it. Every mutation
//! here is therefore written as an upsert: an update for an unknown id
//! materialises the object from defaults, a delete for an unknown id does
//! nothing, and replaying any event yields the same table.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use protocol::{FixedCommentFields, FontFamily, FontSize, ShapeFields, ShapeKind};
use serde::Serialize;

use crate::consts::{
    DEFAULT_COMMENT_COLOR, DEFAULT_FIXED_X, DEFAULT_FIXED_Y, DEFAULT_SHAPE_COLOR, DEFAULT_SHAPE_EXTENT,
    DEFAULT_SHAPE_POS,
};

/// Identifier of a persistent object, assigned by the sender.
pub type ObjectId = String;

/// A positioned, non-scrolling annotation. Positions are percentages of the
/// surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedComment {
    pub id: ObjectId,
    pub text: String,
    pub color: String,
    pub font_family: FontFamily,
    pub size: FontSize,
    pub x: f64,
    pub y: f64,
}

impl FixedComment {
    /// A fixed comment with every attribute at its default.
    #[must_use]
    pub fn with_defaults(id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            color: DEFAULT_COMMENT_COLOR.to_owned(),
            font_family: FontFamily::default(),
            size: FontSize::default(),
            x: DEFAULT_FIXED_X,
            y: DEFAULT_FIXED_Y,
        }
    }

    /// Merge every present field of `fields` into `self`.
    pub fn apply(&mut self, fields: &FixedCommentFields) {
        if let Some(text) = &fields.text {
            self.text.clone_from(text);
        }
        if let Some(color) = &fields.color {
            self.color.clone_from(color);
        }
        if let Some(family) = fields.font_family {
            self.font_family = family;
        }
        if let Some(size) = fields.size {
            self.size = size;
        }
        if let Some(x) = fields.x {
            self.x = x;
        }
        if let Some(y) = fields.y {
            self.y = y;
        }
    }
}

/// A vector overlay. Geometry is a percentage of the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub id: ObjectId,
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

impl Shape {
    #[must_use]
    pub fn with_defaults(id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            kind: ShapeKind::default(),
            x: DEFAULT_SHAPE_POS,
            y: DEFAULT_SHAPE_POS,
            width: DEFAULT_SHAPE_EXTENT,
            height: DEFAULT_SHAPE_EXTENT,
            color: DEFAULT_SHAPE_COLOR.to_owned(),
        }
    }

    pub fn apply(&mut self, fields: &ShapeFields) {
        if let Some(kind) = fields.kind {
            self.kind = kind;
        }
        if let Some(x) = fields.x {
            self.x = x;
        }
        if let Some(y) = fields.y {
            self.y = y;
        }
        if let Some(w) = fields.width {
            self.width = w;
        }
        if let Some(h) = fields.height {
            self.height = h;
        }
        if let Some(color) = &fields.color {
            self.color.clone_from(color);
        }
    }
}

/// The two id-keyed tables of one display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectTables {
    fixed: HashMap<ObjectId, FixedComment>,
    shapes: HashMap<ObjectId, Shape>,
}

impl ObjectTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Fixed comments ---

    /// Insert a fixed comment. An existing entry with the same id is replaced.
    pub fn create_fixed(&mut self, fields: &FixedCommentFields) {
        let mut comment = FixedComment::with_defaults(fields.id.clone());
        comment.apply(fields);
        self.fixed.insert(comment.id.clone(), comment);
    }

    /// Merge `fields` into the fixed comment with the same id, creating it
    /// from defaults when absent.
    pub fn update_fixed(&mut self, fields: &FixedCommentFields) {
        self.fixed
            .entry(fields.id.clone())
            .or_insert_with(|| FixedComment::with_defaults(fields.id.clone()))
            .apply(fields);
    }

    /// Remove a fixed comment. Returns `false` if the id was unknown.
    pub fn delete_fixed(&mut self, id: &str) -> bool {
        self.fixed.remove(id).is_some()
    }

    pub fn clear_fixed(&mut self) {
        self.fixed.clear();
    }

    #[must_use]
    pub fn fixed(&self, id: &str) -> Option<&FixedComment> {
        self.fixed.get(id)
    }

    #[must_use]
    pub fn fixed_len(&self) -> usize {
        self.fixed.len()
    }

    /// Fixed comments ordered by id for a stable draw order.
    #[must_use]
    pub fn sorted_fixed(&self) -> Vec<&FixedComment> {
        let mut items: Vec<&FixedComment> = self.fixed.values().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    // --- Shapes ---

    pub fn create_shape(&mut self, fields: &ShapeFields) {
        let mut shape = Shape::with_defaults(fields.id.clone());
        shape.apply(fields);
        self.shapes.insert(shape.id.clone(), shape);
    }

    pub fn update_shape(&mut self, fields: &ShapeFields) {
        self.shapes
            .entry(fields.id.clone())
            .or_insert_with(|| Shape::with_defaults(fields.id.clone()))
            .apply(fields);
    }

    pub fn delete_shape(&mut self, id: &str) -> bool {
        self.shapes.remove(id).is_some()
    }

    pub fn clear_shapes(&mut self) {
        self.shapes.clear();
    }

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.get(id)
    }

    #[must_use]
    pub fn shapes_len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn sorted_shapes(&self) -> Vec<&Shape> {
        let mut items: Vec<&Shape> = self.shapes.values().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Drop both tables, as on reconnect.
    pub fn reset(&mut self) {
        self.fixed.clear();
        self.shapes.clear();
    }
}
