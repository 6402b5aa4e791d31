//! End-to-end tests for the message lifecycle.
//!
//! Each test drives the public API only: assemble with the fluent builder,
//! validate, render to wire text, parse it back, and compare. Together they
//! pin down the guarantees callers depend on: lossless round trips,
//! idempotent defaults, independent predicates, and permissive group
//! addressing.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use txmsg_protocol::config;
use txmsg_protocol::{
    CommonFieldGroups, EntityRecord, FieldMap, HeaderRecord, MessageAssembler, MessageEnvelope,
    MessageError, Scenario,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Header {M1,T1,S1}, entity {040000037480013,1,C203}, group 1 {curQryReqNum:"0"}.
fn reference_assembler() -> MessageAssembler {
    MessageAssembler::create()
        .configure_header(|h| {
            h.msg_grpt_mac("M1")
                .global_busi_track_no("T1")
                .subtx_no("S1")
        })
        .configure_entity(|e| {
            e.cust_no("040000037480013")
                .qry_vchr_tp_cd("1")
                .tx_scene_cd("C203")
        })
        .configure_field_groups(|g| g.group(1, "curQryReqNum", "0"))
}

fn reparse(envelope: &MessageEnvelope) -> MessageEnvelope {
    MessageEnvelope::from_wire_format(&envelope.to_wire_format())
        .expect("wire text should parse")
        .expect("wire text should not be blank")
}

// ---------------------------------------------------------------------------
// 1. Reference Message
// ---------------------------------------------------------------------------

#[test]
fn reference_message_lifecycle() {
    let envelope = reference_assembler().build_and_validate().unwrap();
    assert!(envelope.validate());
    assert!(envelope.validate_format());

    let text = envelope.to_wire_format();
    let value: Value = serde_json::from_str(&text).unwrap();
    for key in config::GROUP_KEYS {
        assert!(value["txBody"][key].is_object(), "{key} missing from wire text");
    }
    assert!(value["txBody"]["addtData"].is_object());
    assert!(value["txBody"].get("accountingDate").is_none());

    let recovered = reparse(&envelope);
    assert_eq!(recovered.header().msg_grpt_mac.as_deref(), Some("M1"));
    assert_eq!(recovered.entity().cust_no.as_deref(), Some("040000037480013"));
    assert_eq!(
        recovered.field_groups().field(1, "curQryReqNum"),
        Some(&json!("0"))
    );
    assert!(recovered.validate());
    assert!(recovered.validate_format());
}

// ---------------------------------------------------------------------------
// 2. Round Trips
// ---------------------------------------------------------------------------

#[test]
fn every_preset_survives_a_round_trip() {
    let now = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    for scenario in Scenario::ALL {
        let envelope = scenario.build(now);
        assert_eq!(reparse(&envelope), envelope, "{scenario} changed on round trip");
        assert_eq!(
            envelope.validate(),
            reparse(&envelope).validate(),
            "{scenario} predicate changed"
        );
    }
}

#[test]
fn nested_and_mixed_extension_values_round_trip() {
    let envelope = reference_assembler()
        .configure_entity(|e| {
            e.add_field("limits", json!({"daily": 5000, "single": 1000.5}))
                .add_field("tags", json!(["vip", "corporate"]))
                .add_field("verified", true)
                .add_field("note", Value::Null)
        })
        .configure_field_groups(|g| {
            g.accounting_date("20231201")
                .group(8, "flags", json!([1, 2, 3]))
                .addt_data("unicode", "结算 ✓")
        })
        .build();

    assert_eq!(reparse(&envelope), envelope);
}

#[test]
fn wire_text_is_deterministic() {
    let build = || {
        reference_assembler()
            .configure_field_groups(|g| g.addt_data("zeta", 1).addt_data("alpha", 2))
            .build()
    };
    assert_eq!(build().to_wire_format(), build().to_wire_format());

    let text = build().to_wire_format();
    assert!(text.find("\"alpha\"").unwrap() < text.find("\"zeta\"").unwrap());
}

#[test]
fn rendering_parsed_text_is_idempotent() {
    let first = reference_assembler()
        .apply_defaults()
        .build()
        .to_wire_format();
    let second = reparse(&MessageEnvelope::from_wire_format(&first).unwrap().unwrap())
        .to_wire_format();
    assert_eq!(first, second);
}

#[test]
fn deep_copy_is_equal_and_independent() {
    let original = reference_assembler().build();
    let mut copy = original.deep_copy();
    assert_eq!(copy, original);

    copy.header_mut().remark = Some("edited".into());
    copy.entity_mut().add_field("x", 1);
    copy.field_groups_mut().set_field(1, "curQryReqNum", "9");

    assert!(original.header().remark.is_none());
    assert!(!original.entity().has_field("x"));
    assert_eq!(
        original.field_groups().field(1, "curQryReqNum"),
        Some(&json!("0"))
    );
}

// ---------------------------------------------------------------------------
// 3. Defaults
// ---------------------------------------------------------------------------

#[test]
fn defaults_are_idempotent_and_never_overwrite() {
    let once = reference_assembler().apply_defaults().build();
    let twice = reference_assembler()
        .apply_defaults()
        .apply_defaults()
        .build();
    assert_eq!(once, twice);

    assert_eq!(once.header().msg_grpt_mac.as_deref(), Some("M1"));
    assert_eq!(once.header().tx_start_time.as_deref(), Some("{{txStartTime}}"));
    assert_eq!(once.field_groups().accounting_date.as_deref(), Some("00000000"));
    assert!(once.validate());
}

// ---------------------------------------------------------------------------
// 4. Validation
// ---------------------------------------------------------------------------

#[test]
fn long_mac_passes_validate_but_fails_format() {
    let envelope = reference_assembler()
        .configure_header(|h| h.msg_grpt_mac("M".repeat(51)))
        .build();
    assert!(envelope.validate());
    assert!(!envelope.validate_format());

    let err = reference_assembler()
        .configure_header(|h| h.msg_grpt_mac("M".repeat(51)))
        .build_and_validate()
        .unwrap_err();
    assert!(matches!(err, MessageError::FormatValidationFailed { .. }));
}

#[test]
fn malformed_customer_number_is_still_present() {
    let envelope = reference_assembler()
        .configure_entity(|e| e.cust_no("abc"))
        .build();
    assert!(envelope.validate());
    assert!(!envelope.validate_format());
}

#[test]
fn accounting_date_rules() {
    let with_date = |date: Option<&str>| {
        let mut groups = CommonFieldGroups::default();
        groups.accounting_date = date.map(String::from);
        reference_assembler().with_field_groups(groups).build()
    };
    assert!(with_date(Some("00000000")).validate());
    assert!(with_date(None).validate());
    assert!(!with_date(Some("2023120")).validate());
    assert!(!with_date(Some("abcd1234")).validate());
}

#[test]
fn blank_required_field_fails_validation() {
    let envelope = reference_assembler()
        .configure_header(|h| h.global_busi_track_no(" \t"))
        .build();
    assert!(!envelope.validate());
    assert!(!envelope.violations().is_empty());
}

// ---------------------------------------------------------------------------
// 5. Group Addressing
// ---------------------------------------------------------------------------

#[test]
fn out_of_range_group_index_is_ignored() {
    let mut envelope = reference_assembler().build();
    let before = envelope.clone();

    for index in [0, 9] {
        let groups = envelope.field_groups_mut();
        groups.set_field(index, "k", "v");
        assert_eq!(groups.field(index, "k"), None);
        assert_eq!(groups.remove_field(index, "k"), None);
    }
    assert_eq!(envelope, before);
}

// ---------------------------------------------------------------------------
// 6. Parsing
// ---------------------------------------------------------------------------

#[test]
fn blank_and_malformed_input() {
    assert!(MessageEnvelope::from_wire_format("").unwrap().is_none());
    assert!(MessageEnvelope::from_wire_format("   ").unwrap().is_none());
    assert!(matches!(
        MessageEnvelope::from_wire_format("{not json"),
        Err(MessageError::ParseFailed(_))
    ));
}

#[test]
fn flat_entity_keys_are_accepted() {
    let text = r#"{
        "txHeader": {"msgGrptMac": "M1", "globalBusiTrackNo": "T1", "subtxNo": "S1"},
        "txBody": {
            "txEntity": {
                "custNo": "040000037480013",
                "qryVchrTpCd": "1",
                "txSceneCd": "C203",
                "currency": "CNY"
            },
            "txComn1": {"curQryReqNum": "0"}
        }
    }"#;
    let envelope = MessageEnvelope::from_wire_format_strict(text).unwrap().unwrap();
    assert_eq!(envelope.entity().field("currency"), Some(&json!("CNY")));
    assert!(envelope.validate());

    // Re-rendered with the extension nested.
    let value = envelope.to_wire_value();
    assert_eq!(
        value["txBody"]["txEntity"]["additionalFields"]["currency"],
        json!("CNY")
    );
}

#[test]
fn envelope_from_records() {
    let mut extra = FieldMap::new();
    extra.insert("channel".into(), json!("branch"));
    let mut entity = EntityRecord::new("040000037480013", "1", "C203");
    entity.set_additional_fields(extra);

    let envelope = MessageAssembler::create()
        .with_header(HeaderRecord::new("M1", "T1", "S1"))
        .with_entity(entity)
        .with_field_groups(CommonFieldGroups::with_accounting_date("20231201"))
        .build_and_validate()
        .unwrap();

    assert_eq!(
        envelope.summary(),
        "MessageEnvelope[msgGrptMac=M1, globalBusiTrackNo=T1, custNo=040000037480013, txSceneCd=C203]"
    );
    assert!(envelope.has_required_data());
}
