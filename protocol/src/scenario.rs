//! Ready-made sample messages for common business flows and boundary cases.
//!
//! Presets are shape-deterministic: field values are fixed except for the
//! generated identifiers (mac, tracking number, sub-tx number) and the
//! timestamps, which are derived from the `now` passed in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::message::{
    CommonFieldGroups, EntityRecord, HeaderBuilder, HeaderRecord, MessageAssembler,
    MessageEnvelope,
};

const DATE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// Sending-system number used by the business presets.
pub const DEFAULT_SENDING_SYSTEM: &str = "99710730008";

/// A named sample message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Plain business message; passes both predicates.
    Standard,
    /// Balance query with entity extension fields.
    Query,
    /// Internal transfer with group 2 risk data.
    Transfer,
    /// Required identifiers only; everything else unset.
    Sparse,
    /// Shortest values that still validate.
    MinBoundary,
    /// Header identifiers, txCode and channelNo at their length ceilings.
    MaxBoundary,
    /// Every checked field broken; fails both predicates.
    InvalidFormat,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::Standard,
        Scenario::Query,
        Scenario::Transfer,
        Scenario::Sparse,
        Scenario::MinBoundary,
        Scenario::MaxBoundary,
        Scenario::InvalidFormat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Standard => "standard",
            Scenario::Query => "query",
            Scenario::Transfer => "transfer",
            Scenario::Sparse => "sparse",
            Scenario::MinBoundary => "min-boundary",
            Scenario::MaxBoundary => "max-boundary",
            Scenario::InvalidFormat => "invalid-format",
        }
    }

    /// An assembler preloaded with this preset, ready for further overrides.
    pub fn assembler(self, now: DateTime<Utc>) -> MessageAssembler {
        match self {
            Scenario::Standard => standard(now),
            Scenario::Query => query(now),
            Scenario::Transfer => transfer(now),
            Scenario::Sparse => sparse(),
            Scenario::MinBoundary => min_boundary(),
            Scenario::MaxBoundary => max_boundary(),
            Scenario::InvalidFormat => invalid_format(),
        }
    }

    /// The preset as a finished envelope.
    pub fn build(self, now: DateTime<Utc>) -> MessageEnvelope {
        self.assembler(now).build()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scenario {0:?}")]
pub struct UnknownScenario(pub String);

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == lower)
            .ok_or_else(|| UnknownScenario(s.to_string()))
    }
}

/// A standard message with caller-chosen customer and scene code, plus
/// arbitrary dotted-key overrides (see [`MessageAssembler::apply_override`]).
///
/// `txCode` is `PARAM_<NAME>`, so a name longer than four characters breaks
/// the `txCode` length ceiling and the result fails `validate_format()`.
/// Override `header.txCode` to keep it format-valid.
pub fn parameterized<'k, I>(
    name: &str,
    cust_no: &str,
    tx_scene_cd: &str,
    overrides: I,
    now: DateTime<Utc>,
) -> MessageEnvelope
where
    I: IntoIterator<Item = (&'k str, Value)>,
{
    let base = MessageAssembler::create()
        .apply_defaults()
        .configure_header(|h| {
            stamped(h, now)
                .tx_code(format!("PARAM_{}", name.to_ascii_uppercase()))
                .remark(format!("Parameterized test: {name}"))
        })
        .configure_entity(|e| {
            e.cust_no(cust_no)
                .qry_vchr_tp_cd("1")
                .tx_scene_cd(tx_scene_cd)
        })
        .configure_field_groups(|g| {
            g.accounting_date(now.format(DATE_FORMAT).to_string())
                .addt_data("scenario", name)
                .busi_send_sys_or_cmpt_no(DEFAULT_SENDING_SYSTEM)
        });

    overrides
        .into_iter()
        .fold(base, |assembler, (key, value)| assembler.apply_override(key, value))
        .build()
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// `MAC_` followed by 16 uppercase hex digits.
pub fn generate_mac() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("MAC_{}", hex[..16].to_ascii_uppercase())
}

/// `TRACK_<epoch millis>_<0..9999>`.
pub fn generate_track_no(now: DateTime<Utc>) -> String {
    let n = Uuid::new_v4().as_u128() % 10_000;
    format!("TRACK_{}_{}", now.timestamp_millis(), n)
}

/// `SUBTX_` followed by six digits.
pub fn generate_subtx_no() -> String {
    let n = Uuid::new_v4().as_u128() % 1_000_000;
    format!("SUBTX_{n:06}")
}

fn stamped(h: HeaderBuilder<'_>, now: DateTime<Utc>) -> HeaderBuilder<'_> {
    let ts = now.format(DATE_TIME_FORMAT).to_string();
    h.msg_grpt_mac(generate_mac())
        .global_busi_track_no(generate_track_no(now))
        .subtx_no(generate_subtx_no())
        .tx_start_time(ts.clone())
        .tx_send_time(ts)
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

fn standard(now: DateTime<Utc>) -> MessageAssembler {
    MessageAssembler::create()
        .apply_defaults()
        .configure_header(|h| {
            stamped(h, now)
                .tx_code("STD001")
                .channel_no("WEB")
                .org_no("001")
                .teller_id("STD_TELLER")
                .terminal_id("TERMINAL_001")
                .client_ip("192.168.1.100")
        })
        .configure_entity(|e| {
            e.cust_no("040000037480013")
                .qry_vchr_tp_cd("1")
                .tx_scene_cd("C203")
        })
        .configure_field_groups(|g| {
            g.accounting_date(now.format(DATE_FORMAT).to_string())
                .cur_qry_req_num("0")
                .bgn_index_no("0")
                .busi_send_sys_or_cmpt_no(DEFAULT_SENDING_SYSTEM)
        })
}

fn query(now: DateTime<Utc>) -> MessageAssembler {
    MessageAssembler::create()
        .apply_defaults()
        .configure_header(|h| {
            stamped(h, now)
                .tx_code("QRY001")
                .channel_no("API")
                .org_no("002")
        })
        .configure_entity(|e| {
            e.cust_no("040000037480014")
                .qry_vchr_tp_cd("1")
                .tx_scene_cd("C203")
                .add_field("queryType", "BALANCE")
                .add_field("queryRange", "CURRENT")
        })
        .configure_field_groups(|g| {
            g.accounting_date(now.format(DATE_FORMAT).to_string())
                .cur_qry_req_num("10")
                .bgn_index_no("1")
                .addt_data("queryParams", "balance,history")
                .busi_send_sys_or_cmpt_no(DEFAULT_SENDING_SYSTEM)
        })
}

fn transfer(now: DateTime<Utc>) -> MessageAssembler {
    MessageAssembler::create()
        .apply_defaults()
        .configure_header(|h| {
            stamped(h, now)
                .tx_code("TRF001")
                .channel_no("MOBILE")
                .org_no("003")
                .teller_id("TRF_TELLER")
                .auth_teller_id("AUTH_TELLER")
        })
        .configure_entity(|e| {
            e.cust_no("123456789012345")
                .qry_vchr_tp_cd("2")
                .tx_scene_cd("C204")
                .add_field("fromAccount", "1234567890")
                .add_field("toAccount", "0987654321")
                .add_field("amount", "1000.00")
                .add_field("currency", "CNY")
        })
        .configure_field_groups(|g| {
            g.accounting_date(now.format(DATE_FORMAT).to_string())
                .addt_data("transferType", "INTERNAL")
                .addt_data("memo", "Transfer test")
                .group(2, "authLevel", "2")
                .group(2, "riskLevel", "LOW")
                .busi_send_sys_or_cmpt_no(DEFAULT_SENDING_SYSTEM)
        })
}

fn sparse() -> MessageAssembler {
    MessageAssembler::create()
        .with_header(HeaderRecord::new("NULL_TEST_MAC", "NULL_TEST_TRACK", "NULL_TEST"))
        .with_entity(EntityRecord::new("000000000000000", "0", "C000"))
        .with_field_groups(CommonFieldGroups::with_accounting_date("00000000"))
}

fn min_boundary() -> MessageAssembler {
    MessageAssembler::create()
        .configure_header(|h| {
            h.msg_grpt_mac("MIN")
                .global_busi_track_no("1")
                .subtx_no("1")
                .tx_start_time("20230101000000")
                .tx_send_time("20230101000001")
                .tx_code("MIN")
                .channel_no("M")
                .org_no("1")
        })
        .configure_entity(|e| {
            e.cust_no("000000000000001")
                .qry_vchr_tp_cd("1")
                .tx_scene_cd("C001")
        })
        .configure_field_groups(|g| {
            g.accounting_date("20230101")
                .cur_qry_req_num("0")
                .bgn_index_no("0")
        })
}

fn max_boundary() -> MessageAssembler {
    MessageAssembler::create()
        .configure_header(|h| {
            h.msg_grpt_mac("MAX_VALUE_TEST_MAC_BOUNDARY_SCENARIO_TESTING_PAD50")
                .global_busi_track_no("MAX_GLOBAL_BUSI_TRACK_NO_BOUNDARY_TEST_SCENARIO_50")
                .subtx_no("MAX_SUBTX_BOUNDARY20")
                .tx_start_time("99991231235959")
                .tx_send_time("99991231235959")
                .tx_code("MAXCODE999")
                .channel_no("MAXCHANNEL")
                .org_no("999999999")
                .teller_id("MAX_TELLER_ID_BOUNDARY_TEST")
                .terminal_id("MAX_TERMINAL_ID_BOUNDARY")
                .client_ip("255.255.255.255")
        })
        .configure_entity(|e| {
            e.cust_no("999999999999999")
                .qry_vchr_tp_cd("9")
                .tx_scene_cd("Z999")
                .add_field("maxField", "MAX_VALUE_FIELD_CONTENT_FOR_BOUNDARY_TESTING")
        })
        .configure_field_groups(|g| {
            g.accounting_date("99991231")
                .cur_qry_req_num("999999")
                .bgn_index_no("999999")
                .addt_data("maxKey", "MAX_ADDITIONAL_DATA_VALUE_FOR_BOUNDARY_TESTING")
                .busi_send_sys_or_cmpt_no("MAX_BUSI_SEND_SYS_BOUNDARY")
        })
}

fn invalid_format() -> MessageAssembler {
    MessageAssembler::create()
        .configure_header(|h| {
            h.msg_grpt_mac("INVALID_MAC_TOO_LONG_FOR_FIELD_VALIDATION_TESTING_PURPOSES_EXCEEDING_LIMITS")
                .global_busi_track_no("")
                .subtx_no("INVALID_SUBTX_NO_TOO_LONG_FOR_VALIDATION")
        })
        .configure_entity(|e| {
            e.cust_no("INVALID_CUSTOMER_NUMBER")
                .qry_vchr_tp_cd("INVALID")
                .tx_scene_cd("INVALID_SCENE_CODE")
        })
        .configure_field_groups(|g| g.accounting_date("INVALID_DATE"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::FieldViolation;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 1, 9, 30, 15).unwrap()
    }

    #[test]
    fn names_roundtrip_through_from_str() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
            assert_eq!(scenario.to_string(), scenario.name());
        }
        assert_eq!(" Transfer ".parse::<Scenario>().unwrap(), Scenario::Transfer);
        assert!("random".parse::<Scenario>().is_err());
    }

    #[test]
    fn business_presets_pass_both_predicates() {
        for scenario in [
            Scenario::Standard,
            Scenario::Query,
            Scenario::Transfer,
            Scenario::Sparse,
            Scenario::MinBoundary,
            Scenario::MaxBoundary,
        ] {
            let envelope = scenario.build(fixed_now());
            assert!(envelope.validate(), "{scenario}: {:?}", envelope.violations());
            assert!(
                envelope.validate_format(),
                "{scenario}: {:?}",
                envelope.format_violations()
            );
        }
    }

    #[test]
    fn invalid_preset_fails_both_predicates() {
        let envelope = Scenario::InvalidFormat.build(fixed_now());
        assert!(!envelope.validate());
        assert!(!envelope.validate_format());
        // Two header lengths, three entity patterns, three entity lengths.
        assert_eq!(envelope.format_violations().len(), 8);
    }

    #[test]
    fn max_boundary_sits_on_ceilings() {
        let envelope = Scenario::MaxBoundary.build(fixed_now());
        let header = envelope.header();
        let len = |v: &Option<String>| v.as_deref().map_or(0, |s| s.chars().count());
        assert_eq!(len(&header.msg_grpt_mac), crate::config::MAX_MSG_GRPT_MAC_LEN);
        assert_eq!(len(&header.global_busi_track_no), crate::config::MAX_GLOBAL_BUSI_TRACK_NO_LEN);
        assert_eq!(len(&header.subtx_no), crate::config::MAX_SUBTX_NO_LEN);
        assert_eq!(len(&header.tx_code), crate::config::MAX_TX_CODE_LEN);
        assert_eq!(len(&header.channel_no), crate::config::MAX_CHANNEL_NO_LEN);
    }

    #[test]
    fn timestamps_follow_now() {
        let envelope = Scenario::Standard.build(fixed_now());
        assert_eq!(envelope.header().tx_start_time.as_deref(), Some("20231201093015"));
        assert_eq!(envelope.field_groups().accounting_date.as_deref(), Some("20231201"));
    }

    #[test]
    fn transfer_preset_contents() {
        let envelope = Scenario::Transfer.build(fixed_now());
        assert_eq!(envelope.entity().field("amount"), Some(&json!("1000.00")));
        assert_eq!(envelope.field_groups().field(2, "riskLevel"), Some(&json!("LOW")));
        assert_eq!(
            envelope.field_groups().field(8, "busiSendSysOrCmptNo"),
            Some(&json!(DEFAULT_SENDING_SYSTEM))
        );
    }

    #[test]
    fn generated_identifiers_have_expected_shape() {
        let mac = generate_mac();
        assert_eq!(mac.len(), 20);
        assert!(mac.starts_with("MAC_"));
        assert!(mac[4..].chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));

        let subtx = generate_subtx_no();
        assert_eq!(subtx.len(), 12);
        assert!(subtx[6..].chars().all(|c| c.is_ascii_digit()));

        let track = generate_track_no(fixed_now());
        assert!(track.starts_with(&format!("TRACK_{}_", fixed_now().timestamp_millis())));
    }

    #[test]
    fn parameterized_applies_overrides() {
        let envelope = parameterized(
            "smoke",
            "555666777888999",
            "C205",
            [
                ("header.channelNo", json!("ATM")),
                ("entity.branch", json!("B01")),
                ("priority", json!(1)),
            ],
            fixed_now(),
        );
        assert!(envelope.validate());
        assert_eq!(envelope.header().tx_code.as_deref(), Some("PARAM_SMOKE"));
        assert_eq!(
            envelope.format_violations(),
            vec![FieldViolation::TooLong {
                field: "txCode",
                max: crate::config::MAX_TX_CODE_LEN,
                actual: 11,
            }]
        );
        assert_eq!(envelope.header().channel_no.as_deref(), Some("ATM"));
        assert_eq!(envelope.entity().field("branch"), Some(&json!("B01")));
        assert_eq!(envelope.field_groups().addt_data_field("priority"), Some(&json!(1)));
        assert_eq!(envelope.field_groups().addt_data_field("scenario"), Some(&json!("smoke")));
    }

    #[test]
    fn parameterized_short_name_is_format_valid() {
        let envelope = parameterized(
            "ping",
            "555666777888999",
            "C205",
            Vec::<(&str, Value)>::new(),
            fixed_now(),
        );
        assert_eq!(envelope.header().tx_code.as_deref(), Some("PARAM_PING"));
        assert!(envelope.validate());
        assert!(envelope.validate_format());
    }

    #[test]
    fn parameterized_tx_code_can_be_overridden() {
        let envelope = parameterized(
            "regression",
            "555666777888999",
            "C205",
            [("header.txCode", json!("REG001"))],
            fixed_now(),
        );
        assert_eq!(envelope.header().tx_code.as_deref(), Some("REG001"));
        assert!(envelope.validate_format());
    }
}
