//! The composed message: header plus body, and its wire codec.

use std::fmt;

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::entity::EntityRecord;
use super::error::MessageError;
use super::field_groups::CommonFieldGroups;
use super::header::HeaderRecord;
use super::types::null_as_default;
use super::validation::{self, FieldViolation};
use crate::config;

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// The message body: entity plus common field groups.
///
/// On the wire the field groups' keys sit directly inside `txBody`, next to
/// `txEntity`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageBody {
    #[serde(rename = "txEntity", default, deserialize_with = "null_as_default")]
    pub entity: EntityRecord,

    #[serde(flatten)]
    pub field_groups: CommonFieldGroups,
}

impl MessageBody {
    pub fn new(entity: EntityRecord, field_groups: CommonFieldGroups) -> Self {
        Self {
            entity,
            field_groups,
        }
    }

    pub fn to_wire_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(config::KEY_TX_ENTITY.to_string(), self.entity.to_wire_value());
        self.field_groups.write_wire_fields(&mut map);
        Value::Object(map)
    }
}

impl Serialize for MessageBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire_value().serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A complete transaction message.
///
/// Always holds exactly one header and one body; there is no way to observe
/// an absent component. Setters that receive `None` install a fresh empty
/// record instead.
///
/// # Wire format
///
/// ```json
/// {
///   "txHeader": { "msgGrptMac": "...", ... },
///   "txBody": {
///     "txEntity": { "custNo": "...", "additionalFields": {} },
///     "accountingDate": "20231201",
///     "addtData": {},
///     "txComn1": {}, ..., "txComn8": {}
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessageEnvelope {
    #[serde(rename = "txHeader", deserialize_with = "null_as_default")]
    header: HeaderRecord,

    #[serde(rename = "txBody", deserialize_with = "null_as_default")]
    body: MessageBody,
}

impl MessageEnvelope {
    pub fn new(header: HeaderRecord, body: MessageBody) -> Self {
        Self { header, body }
    }

    // -- components ---------------------------------------------------------

    pub fn header(&self) -> &HeaderRecord {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut HeaderRecord {
        &mut self.header
    }

    /// Replaces the header; `None` installs an empty one.
    pub fn set_header(&mut self, header: impl Into<Option<HeaderRecord>>) {
        self.header = header.into().unwrap_or_default();
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut MessageBody {
        &mut self.body
    }

    /// Replaces the body; `None` installs an empty one.
    pub fn set_body(&mut self, body: impl Into<Option<MessageBody>>) {
        self.body = body.into().unwrap_or_default();
    }

    pub fn entity(&self) -> &EntityRecord {
        &self.body.entity
    }

    pub fn entity_mut(&mut self) -> &mut EntityRecord {
        &mut self.body.entity
    }

    /// Replaces the entity; `None` installs an empty one.
    pub fn set_entity(&mut self, entity: impl Into<Option<EntityRecord>>) {
        self.body.entity = entity.into().unwrap_or_default();
    }

    pub fn field_groups(&self) -> &CommonFieldGroups {
        &self.body.field_groups
    }

    pub fn field_groups_mut(&mut self) -> &mut CommonFieldGroups {
        &mut self.body.field_groups
    }

    /// Replaces the field groups; `None` installs empty ones.
    pub fn set_field_groups(&mut self, groups: impl Into<Option<CommonFieldGroups>>) {
        self.body.field_groups = groups.into().unwrap_or_default();
    }

    // -- validation ---------------------------------------------------------

    /// Required header and entity fields are present and non-blank, and the
    /// accounting date is absent or eight digits.
    ///
    /// Says nothing about patterns or lengths; see [`validate_format`](Self::validate_format).
    pub fn validate(&self) -> bool {
        self.violations().is_empty()
    }

    /// Header length ceilings, entity patterns and entity length ceilings all
    /// hold. Unset fields are skipped, so an empty envelope passes.
    pub fn validate_format(&self) -> bool {
        self.format_violations().is_empty()
    }

    /// Every rule [`validate`](Self::validate) checks that is currently broken.
    pub fn violations(&self) -> Vec<FieldViolation> {
        validation::semantic_violations(self)
    }

    /// Every rule [`validate_format`](Self::validate_format) checks that is
    /// currently broken.
    pub fn format_violations(&self) -> Vec<FieldViolation> {
        validation::format_violations(self)
    }

    /// Runs the semantic rules, then the format rules, and reports the first
    /// set that fails.
    ///
    /// # Errors
    ///
    /// [`MessageError::ValidationFailed`] or
    /// [`MessageError::FormatValidationFailed`], each carrying every broken
    /// rule of its kind.
    pub fn ensure_valid(&self) -> Result<(), MessageError> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(MessageError::ValidationFailed { violations });
        }
        let violations = self.format_violations();
        if !violations.is_empty() {
            return Err(MessageError::FormatValidationFailed { violations });
        }
        Ok(())
    }

    /// The header's three required identifiers are set.
    pub fn has_required_data(&self) -> bool {
        self.header.msg_grpt_mac.is_some()
            && self.header.global_busi_track_no.is_some()
            && self.header.subtx_no.is_some()
    }

    // -- wire codec ---------------------------------------------------------

    pub fn to_wire_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(config::KEY_TX_HEADER.to_string(), self.header.to_wire_value());
        map.insert(config::KEY_TX_BODY.to_string(), self.body.to_wire_value());
        Value::Object(map)
    }

    /// Compact wire text. Deterministic: extension keys are emitted sorted.
    pub fn to_wire_format(&self) -> String {
        self.to_wire_value().to_string()
    }

    /// Indented wire text. Differs from [`to_wire_format`](Self::to_wire_format)
    /// only in whitespace.
    pub fn to_pretty_wire_format(&self) -> String {
        format!("{:#}", self.to_wire_value())
    }

    /// Parses wire text.
    ///
    /// Blank input yields `Ok(None)`. Missing or `null` components come back
    /// as empty records; use [`from_wire_format_strict`](Self::from_wire_format_strict)
    /// to reject them instead.
    pub fn from_wire_format(text: &str) -> Result<Option<Self>, MessageError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let value = parse_object_tree(text)?;
        let envelope = decode(value)?;
        debug!(summary = %envelope, "parsed wire message");
        Ok(Some(envelope))
    }

    /// Parses wire text, requiring `txHeader`, `txBody` and `txBody.txEntity`
    /// to be present as objects.
    pub fn from_wire_format_strict(text: &str) -> Result<Option<Self>, MessageError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let value = parse_object_tree(text)?;

        require_object(&value, config::KEY_TX_HEADER)?;
        let body = require_object(&value, config::KEY_TX_BODY)?;
        require_object(body, config::KEY_TX_ENTITY)?;

        Ok(Some(decode(value)?))
    }

    // -- misc ---------------------------------------------------------------

    /// A fully independent copy. Nothing is shared with `self`.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// One-line description naming the key identifiers. Unset fields print
    /// as `null`.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

/// Parses text into a JSON tree whose root and record positions are objects.
///
/// Records would otherwise accept serde's positional array form of a struct.
fn parse_object_tree(text: &str) -> Result<Value, MessageError> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        warn!(error = %err, len = text.len(), "failed to parse wire message");
        MessageError::ParseFailed(err)
    })?;
    check_record_shapes(&value).map_err(|err| {
        warn!(error = %err, "wire message has an invalid shape");
        MessageError::ParseFailed(err)
    })?;
    Ok(value)
}

fn check_record_shapes(root: &Value) -> Result<(), serde_json::Error> {
    let root = expect_object(root, "a wire message object")?;
    if let Some(header) = root.get(config::KEY_TX_HEADER) {
        expect_object_or_null(header, config::KEY_TX_HEADER)?;
    }
    let Some(body) = root.get(config::KEY_TX_BODY) else {
        return Ok(());
    };
    let Some(body) = expect_object_or_null(body, config::KEY_TX_BODY)? else {
        return Ok(());
    };
    if let Some(entity) = body.get(config::KEY_TX_ENTITY) {
        if let Some(entity) = expect_object_or_null(entity, config::KEY_TX_ENTITY)? {
            if let Some(extra) = entity.get(config::KEY_ADDITIONAL_FIELDS) {
                expect_object_or_null(extra, config::KEY_ADDITIONAL_FIELDS)?;
            }
        }
    }
    for key in std::iter::once(config::KEY_ADDT_DATA).chain(config::GROUP_KEYS) {
        if let Some(group) = body.get(key) {
            expect_object_or_null(group, key)?;
        }
    }
    Ok(())
}

fn expect_object<'v>(
    value: &'v Value,
    expected: &'static str,
) -> Result<&'v Map<String, Value>, serde_json::Error> {
    value
        .as_object()
        .ok_or_else(|| serde_json::Error::invalid_type(unexpected(value), &expected))
}

fn expect_object_or_null<'v>(
    value: &'v Value,
    key: &'static str,
) -> Result<Option<&'v Map<String, Value>>, serde_json::Error> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(serde_json::Error::custom(format_args!(
            "{key}: invalid type: {}, expected an object",
            unexpected(other)
        ))),
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

fn decode(value: Value) -> Result<MessageEnvelope, MessageError> {
    serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "wire message has an invalid shape");
        MessageError::ParseFailed(err)
    })
}

fn require_object<'v>(parent: &'v Value, key: &'static str) -> Result<&'v Value, MessageError> {
    match parent.get(key) {
        Some(child) if child.is_object() => Ok(child),
        _ => {
            warn!(component = key, "wire message is missing a required component");
            Err(MessageError::MissingComponent(key))
        }
    }
}

impl fmt::Display for MessageEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.as_deref().unwrap_or("null").to_string();
        write!(
            f,
            "MessageEnvelope[msgGrptMac={}, globalBusiTrackNo={}, custNo={}, txSceneCd={}]",
            show(&self.header.msg_grpt_mac),
            show(&self.header.global_busi_track_no),
            show(&self.body.entity.cust_no),
            show(&self.body.entity.tx_scene_cd),
        )
    }
}

impl Serialize for MessageEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire_value().serialize(serializer)
    }
}
