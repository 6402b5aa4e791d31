//! # Message Constants
//!
//! Every wire key, length ceiling, and default literal used by the envelope
//! lives here. The downstream API matches keys case-sensitively, so a typo in
//! this file is a production incident, not a style nit.

// ---------------------------------------------------------------------------
// Envelope Keys
// ---------------------------------------------------------------------------

/// Top-level key holding the header record.
pub const KEY_TX_HEADER: &str = "txHeader";

/// Top-level key holding the body (entity + field groups).
pub const KEY_TX_BODY: &str = "txBody";

/// Body key holding the entity record.
pub const KEY_TX_ENTITY: &str = "txEntity";

/// Body key for the scalar accounting date.
pub const KEY_ACCOUNTING_DATE: &str = "accountingDate";

/// Body key for the general-purpose extension map.
pub const KEY_ADDT_DATA: &str = "addtData";

/// Entity key under which caller-supplied extension fields are nested.
pub const KEY_ADDITIONAL_FIELDS: &str = "additionalFields";

/// Body keys of the eight field groups, in index order (`GROUP_KEYS[0]` is group 1).
pub const GROUP_KEYS: [&str; GROUP_COUNT] = [
    "txComn1", "txComn2", "txComn3", "txComn4", "txComn5", "txComn6", "txComn7", "txComn8",
];

/// Number of independently addressable field groups. Indices are 1-based.
pub const GROUP_COUNT: usize = 8;

// ---------------------------------------------------------------------------
// Header Field Names
// ---------------------------------------------------------------------------

pub const FIELD_MSG_GRPT_MAC: &str = "msgGrptMac";
pub const FIELD_GLOBAL_BUSI_TRACK_NO: &str = "globalBusiTrackNo";
pub const FIELD_SUBTX_NO: &str = "subtxNo";
pub const FIELD_TX_START_TIME: &str = "txStartTime";
pub const FIELD_TX_SEND_TIME: &str = "txSendTime";
pub const FIELD_TX_CODE: &str = "txCode";
pub const FIELD_CHANNEL_NO: &str = "channelNo";

// ---------------------------------------------------------------------------
// Entity Field Names
// ---------------------------------------------------------------------------

pub const FIELD_CUST_NO: &str = "custNo";
pub const FIELD_QRY_VCHR_TP_CD: &str = "qryVchrTpCd";
pub const FIELD_TX_SCENE_CD: &str = "txSceneCd";

/// Entity keys that map onto typed attributes rather than the extension map.
pub const ENTITY_CORE_FIELDS: [&str; 3] = [FIELD_CUST_NO, FIELD_QRY_VCHR_TP_CD, FIELD_TX_SCENE_CD];

// ---------------------------------------------------------------------------
// Well-known Group Fields
// ---------------------------------------------------------------------------

/// Group 1: number of records requested by a paged query.
pub const FIELD_CUR_QRY_REQ_NUM: &str = "curQryReqNum";

/// Group 1: starting index of a paged query.
pub const FIELD_BGN_INDEX_NO: &str = "bgnIndexNo";

/// Group 8: identifier of the sending system or component.
pub const FIELD_BUSI_SEND_SYS_OR_CMPT_NO: &str = "busiSendSysOrCmptNo";

// ---------------------------------------------------------------------------
// Length Ceilings
// ---------------------------------------------------------------------------
//
// Counted in Unicode scalar values. Unset fields are never checked.

pub const MAX_MSG_GRPT_MAC_LEN: usize = 50;
pub const MAX_GLOBAL_BUSI_TRACK_NO_LEN: usize = 50;
pub const MAX_SUBTX_NO_LEN: usize = 20;
pub const MAX_TX_CODE_LEN: usize = 10;
pub const MAX_CHANNEL_NO_LEN: usize = 10;

pub const MAX_CUST_NO_LEN: usize = 20;
pub const MAX_QRY_VCHR_TP_CD_LEN: usize = 5;
pub const MAX_TX_SCENE_CD_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Format Patterns
// ---------------------------------------------------------------------------
//
// ASCII classes on purpose: `\d` in the regex crate is Unicode-aware and
// would accept Arabic-Indic digits.

/// Customer number: exactly 15 digits.
pub const CUST_NO_PATTERN: &str = r"^[0-9]{15}$";

/// Voucher-type code: exactly one digit.
pub const QRY_VCHR_TP_CD_PATTERN: &str = r"^[0-9]$";

/// Scene code: one uppercase letter followed by three digits.
pub const TX_SCENE_CD_PATTERN: &str = r"^[A-Z][0-9]{3}$";

/// Accounting date: eight digits (`YYYYMMDD`, or the literal `00000000`).
pub const ACCOUNTING_DATE_PATTERN: &str = r"^[0-9]{8}$";

// ---------------------------------------------------------------------------
// Default Literals
// ---------------------------------------------------------------------------

/// Header fields that receive a `{{name}}` placeholder from `apply_defaults`.
/// The downstream templating layer substitutes these before dispatch.
pub const PLACEHOLDER_HEADER_FIELDS: [&str; 5] = [
    FIELD_MSG_GRPT_MAC,
    FIELD_GLOBAL_BUSI_TRACK_NO,
    FIELD_SUBTX_NO,
    FIELD_TX_START_TIME,
    FIELD_TX_SEND_TIME,
];

pub const DEFAULT_CUST_NO: &str = "040000037480013";
pub const DEFAULT_QRY_VCHR_TP_CD: &str = "1";
pub const DEFAULT_TX_SCENE_CD: &str = "C203";
pub const DEFAULT_ACCOUNTING_DATE: &str = "00000000";

/// Renders the placeholder token for a header field, e.g. `{{subtxNo}}`.
pub fn placeholder(field: &str) -> String {
    format!("{{{{{}}}}}", field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_wraps_in_double_braces() {
        assert_eq!(placeholder("msgGrptMac"), "{{msgGrptMac}}");
    }

    #[test]
    fn group_keys_are_one_based() {
        assert_eq!(GROUP_KEYS[0], "txComn1");
        assert_eq!(GROUP_KEYS[GROUP_COUNT - 1], "txComn8");
    }
}
