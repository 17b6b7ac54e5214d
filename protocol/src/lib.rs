//! Shared event model for the livewall realtime transport.
//!
//! This crate owns the wire representation used by the hub, the console and
//! every display. Each direction is a closed enum so the protocol surface is
//! enumerated in one place and every consumer matches it exhaustively:
//!
//! - [`ClientEvent`]: Sender → Hub
//! - [`ServerEvent`]: Hub → every connected Sender and Display
//!
//! On the wire each event is a JSON text frame `{"event": "<name>", "data": {...}}`.
//! Payload-less events omit `data`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum comment length in UTF-16 code units after hub truncation.
pub const MAX_COMMENT_UNITS: usize = 20;

/// Error returned by the decode helpers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text frame is not valid JSON or does not match any known event.
    #[error("failed to decode event: {0}")]
    Decode(#[from] serde_json::Error),
    /// Serialization failed (non-finite float in a payload, for example).
    #[error("failed to encode event: {0}")]
    Encode(serde_json::Error),
}

// =============================================================================
// STYLE
// =============================================================================

/// Font family used to render comment text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
}

/// Relative comment size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    #[default]
    Normal,
    Large,
}

/// Vector overlay primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    #[default]
    Square,
    Line,
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// A comment as submitted by a sender and re-broadcast by the hub.
///
/// Only `text` is validated by the hub; everything else is relayed verbatim.
/// When `is_fixed` is set, displays materialise a fixed comment keyed by `id`
/// instead of scrolling the text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSubmission {
    /// Fixed-comment id, assigned by the sender. Ignored for scrolling comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// CSS color string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<FontSize>,
    #[serde(default)]
    pub is_fixed: bool,
    /// Vertical position of a fixed comment in percent (0–100).
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    /// Horizontal position of a fixed comment in percent.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical position of a fixed comment in percent. Wins over `position`.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl CommentSubmission {
    /// Build a plain scrolling comment.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }
}

/// Create or partial-update payload for a fixed comment.
///
/// Absent fields mean "leave unchanged" on update and "use the default" on
/// create.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedCommentFields {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<FontSize>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Create or partial-update payload for a shape. Geometry is in percent of
/// the display surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeFields {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShapeKind>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Identifies one persistent object for deletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
}

/// The whole moderation list. Always replaced wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationList {
    pub words: Vec<String>,
}

/// Opaque sharing-indicator payload. The hub never inspects it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPayload {
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Sent to every connection right before the hub tears down its listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingNotice {
    /// Port the hub is moving to.
    pub port: u16,
}

/// Decode a number sent either as a JSON number or as a numeric string.
///
/// Slider-driven senders post positions as strings (`"50"`). Anything that
/// is not a finite number decodes as `None` instead of failing the frame.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

// =============================================================================
// EVENTS
// =============================================================================

/// Sender → Hub.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    SubmitComment(CommentSubmission),
    ReplaceModerationList(ModerationList),
    CreateFixed(FixedCommentFields),
    UpdateFixed(FixedCommentFields),
    DeleteFixed(ObjectRef),
    CreateShape(ShapeFields),
    UpdateShape(ShapeFields),
    DeleteShape(ObjectRef),
    ClearFixed,
    ClearShapes,
    ShowIndicator(IndicatorPayload),
    HideIndicator,
}

/// Hub → every connected party.
///
/// Persistent-object mutations and indicator toggles keep the inbound event
/// name so the relay is verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    NewComment(CommentSubmission),
    ModerationListSnapshot(ModerationList),
    CreateFixed(FixedCommentFields),
    UpdateFixed(FixedCommentFields),
    DeleteFixed(ObjectRef),
    CreateShape(ShapeFields),
    UpdateShape(ShapeFields),
    DeleteShape(ObjectRef),
    ClearFixed,
    ClearShapes,
    ShowIndicator(IndicatorPayload),
    HideIndicator,
    ServerClosing(ClosingNotice),
}

impl ClientEvent {
    /// Wire name of the event, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitComment(_) => "submit_comment",
            Self::ReplaceModerationList(_) => "replace_moderation_list",
            Self::CreateFixed(_) => "create_fixed",
            Self::UpdateFixed(_) => "update_fixed",
            Self::DeleteFixed(_) => "delete_fixed",
            Self::CreateShape(_) => "create_shape",
            Self::UpdateShape(_) => "update_shape",
            Self::DeleteShape(_) => "delete_shape",
            Self::ClearFixed => "clear_fixed",
            Self::ClearShapes => "clear_shapes",
            Self::ShowIndicator(_) => "show_indicator",
            Self::HideIndicator => "hide_indicator",
        }
    }
}

impl ServerEvent {
    /// Wire name of the event, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewComment(_) => "new_comment",
            Self::ModerationListSnapshot(_) => "moderation_list_snapshot",
            Self::CreateFixed(_) => "create_fixed",
            Self::UpdateFixed(_) => "update_fixed",
            Self::DeleteFixed(_) => "delete_fixed",
            Self::CreateShape(_) => "create_shape",
            Self::UpdateShape(_) => "update_shape",
            Self::DeleteShape(_) => "delete_shape",
            Self::ClearFixed => "clear_fixed",
            Self::ClearShapes => "clear_shapes",
            Self::ShowIndicator(_) => "show_indicator",
            Self::HideIndicator => "hide_indicator",
            Self::ServerClosing(_) => "server_closing",
        }
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Decode one inbound text frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON, unknown event names and
/// payloads that do not match the event's shape.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode one inbound event as a text frame.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if a payload cannot be represented as JSON.
pub fn encode_client_event(event: &ClientEvent) -> Result<String, CodecError> {
    serde_json::to_string(event).map_err(CodecError::Encode)
}

/// Decode one outbound text frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON or unknown events.
pub fn decode_server_event(text: &str) -> Result<ServerEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode one outbound event as a text frame.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if a payload cannot be represented as JSON.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, CodecError> {
    serde_json::to_string(event).map_err(CodecError::Encode)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
