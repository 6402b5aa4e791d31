//! Field-level validation rules.
//!
//! Two independent rule sets exist, and a message can pass one while failing
//! the other:
//!
//! - **semantic**: required fields present and non-blank, accounting date
//!   shaped as eight digits. Backs [`MessageEnvelope::validate`].
//! - **format**: header length ceilings, entity patterns and entity length
//!   ceilings. Backs [`MessageEnvelope::validate_format`].
//!
//! Every rule reports a [`FieldViolation`] instead of failing fast, so callers
//! that want a diagnostic (the gateway's `/api/validate`) get the whole list
//! while the boolean predicates just check for emptiness.
//!
//! [`MessageEnvelope::validate`]: super::envelope::MessageEnvelope::validate
//! [`MessageEnvelope::validate_format`]: super::envelope::MessageEnvelope::validate_format

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::entity::EntityRecord;
use super::envelope::MessageEnvelope;
use super::field_groups::CommonFieldGroups;
use super::header::HeaderRecord;
use crate::config;

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A single broken rule, naming the offending field by its wire key.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldViolation {
    /// A required field is unset, empty, or whitespace only.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    /// A field is longer than its ceiling.
    #[error("{field} exceeds {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// A field does not match its format pattern.
    #[error("{field} does not match {pattern}: {value:?}")]
    PatternMismatch {
        field: &'static str,
        pattern: &'static str,
        value: String,
    },
}

impl FieldViolation {
    /// Wire key of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingRequiredField { field }
            | Self::TooLong { field, .. }
            | Self::PatternMismatch { field, .. } => field,
        }
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static CUST_NO_RE: LazyLock<Regex> = LazyLock::new(|| compile(config::CUST_NO_PATTERN));
static QRY_VCHR_TP_CD_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(config::QRY_VCHR_TP_CD_PATTERN));
static TX_SCENE_CD_RE: LazyLock<Regex> = LazyLock::new(|| compile(config::TX_SCENE_CD_PATTERN));
static ACCOUNTING_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(config::ACCOUNTING_DATE_PATTERN));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid built-in field pattern")
}

// ---------------------------------------------------------------------------
// Primitive checks
// ---------------------------------------------------------------------------

/// `true` when the value is set and has non-whitespace content.
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn require(field: &'static str, value: Option<&str>, out: &mut Vec<FieldViolation>) {
    if !is_present(value) {
        out.push(FieldViolation::MissingRequiredField { field });
    }
}

fn max_len(field: &'static str, value: Option<&str>, max: usize, out: &mut Vec<FieldViolation>) {
    if let Some(v) = value {
        let actual = v.chars().count();
        if actual > max {
            out.push(FieldViolation::TooLong { field, max, actual });
        }
    }
}

fn matches(
    field: &'static str,
    value: Option<&str>,
    re: &Regex,
    pattern: &'static str,
    out: &mut Vec<FieldViolation>,
) {
    if let Some(v) = value {
        if !re.is_match(v) {
            out.push(FieldViolation::PatternMismatch {
                field,
                pattern,
                value: v.to_string(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Required-field rules for the header: mac, tracking number, sub-tx number.
pub fn header_required(header: &HeaderRecord) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    require(config::FIELD_MSG_GRPT_MAC, header.msg_grpt_mac.as_deref(), &mut out);
    require(
        config::FIELD_GLOBAL_BUSI_TRACK_NO,
        header.global_busi_track_no.as_deref(),
        &mut out,
    );
    require(config::FIELD_SUBTX_NO, header.subtx_no.as_deref(), &mut out);
    out
}

/// Length ceilings for the header. Unset fields are skipped.
pub fn header_lengths(header: &HeaderRecord) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    max_len(
        config::FIELD_MSG_GRPT_MAC,
        header.msg_grpt_mac.as_deref(),
        config::MAX_MSG_GRPT_MAC_LEN,
        &mut out,
    );
    max_len(
        config::FIELD_GLOBAL_BUSI_TRACK_NO,
        header.global_busi_track_no.as_deref(),
        config::MAX_GLOBAL_BUSI_TRACK_NO_LEN,
        &mut out,
    );
    max_len(
        config::FIELD_SUBTX_NO,
        header.subtx_no.as_deref(),
        config::MAX_SUBTX_NO_LEN,
        &mut out,
    );
    max_len(
        config::FIELD_TX_CODE,
        header.tx_code.as_deref(),
        config::MAX_TX_CODE_LEN,
        &mut out,
    );
    max_len(
        config::FIELD_CHANNEL_NO,
        header.channel_no.as_deref(),
        config::MAX_CHANNEL_NO_LEN,
        &mut out,
    );
    out
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Required-field rules for the entity's three identification fields.
pub fn entity_required(entity: &EntityRecord) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    require(config::FIELD_CUST_NO, entity.cust_no.as_deref(), &mut out);
    require(
        config::FIELD_QRY_VCHR_TP_CD,
        entity.qry_vchr_tp_cd.as_deref(),
        &mut out,
    );
    require(config::FIELD_TX_SCENE_CD, entity.tx_scene_cd.as_deref(), &mut out);
    out
}

/// Pattern rules for the entity. Unset fields are skipped.
pub fn entity_patterns(entity: &EntityRecord) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    matches(
        config::FIELD_CUST_NO,
        entity.cust_no.as_deref(),
        &CUST_NO_RE,
        config::CUST_NO_PATTERN,
        &mut out,
    );
    matches(
        config::FIELD_QRY_VCHR_TP_CD,
        entity.qry_vchr_tp_cd.as_deref(),
        &QRY_VCHR_TP_CD_RE,
        config::QRY_VCHR_TP_CD_PATTERN,
        &mut out,
    );
    matches(
        config::FIELD_TX_SCENE_CD,
        entity.tx_scene_cd.as_deref(),
        &TX_SCENE_CD_RE,
        config::TX_SCENE_CD_PATTERN,
        &mut out,
    );
    out
}

/// Length ceilings for the entity. Unset fields are skipped.
pub fn entity_lengths(entity: &EntityRecord) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    max_len(
        config::FIELD_CUST_NO,
        entity.cust_no.as_deref(),
        config::MAX_CUST_NO_LEN,
        &mut out,
    );
    max_len(
        config::FIELD_QRY_VCHR_TP_CD,
        entity.qry_vchr_tp_cd.as_deref(),
        config::MAX_QRY_VCHR_TP_CD_LEN,
        &mut out,
    );
    max_len(
        config::FIELD_TX_SCENE_CD,
        entity.tx_scene_cd.as_deref(),
        config::MAX_TX_SCENE_CD_LEN,
        &mut out,
    );
    out
}

// ---------------------------------------------------------------------------
// Field groups
// ---------------------------------------------------------------------------

/// Accounting date must be eight digits when set. Absence is valid.
pub fn accounting_date(groups: &CommonFieldGroups) -> Option<FieldViolation> {
    let date = groups.accounting_date.as_deref()?;
    if ACCOUNTING_DATE_RE.is_match(date) {
        None
    } else {
        Some(FieldViolation::PatternMismatch {
            field: config::KEY_ACCOUNTING_DATE,
            pattern: config::ACCOUNTING_DATE_PATTERN,
            value: date.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// All semantic violations, in header → entity → body order.
pub fn semantic_violations(envelope: &MessageEnvelope) -> Vec<FieldViolation> {
    let mut out = header_required(envelope.header());
    out.extend(entity_required(envelope.entity()));
    out.extend(accounting_date(envelope.field_groups()));
    out
}

/// All format violations, in header → entity order.
pub fn format_violations(envelope: &MessageEnvelope) -> Vec<FieldViolation> {
    let mut out = header_lengths(envelope.header());
    out.extend(entity_patterns(envelope.entity()));
    out.extend(entity_lengths(envelope.entity()));
    out
}
