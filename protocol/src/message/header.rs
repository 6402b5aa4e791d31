//! The header record: provenance and routing metadata.
//!
//! Every attribute is an optional string keyed on the wire by its camelCase
//! name. Three of them (mac, global tracking number, sub-transaction number)
//! are required for a message to validate; the rest are informational.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::validation;

/// Declares [`HeaderRecord`] together with its wire-name lookup table, so the
/// field list is written exactly once.
macro_rules! header_record {
    ($( $(#[$doc:meta])* $field:ident => $wire:literal ),+ $(,)?) => {
        /// Fixed-shape envelope metadata.
        ///
        /// Unset attributes are omitted from the wire text and come back as
        /// `None` when parsed.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
        #[serde(default)]
        pub struct HeaderRecord {
            $(
                $(#[$doc])*
                #[serde(rename = $wire)]
                pub $field: Option<String>,
            )+
        }

        impl HeaderRecord {
            /// Wire names of every header attribute, in declaration order.
            pub const FIELD_NAMES: &'static [&'static str] = &[$($wire),+];

            fn slot(&self, name: &str) -> Option<&Option<String>> {
                match name {
                    $($wire => Some(&self.$field),)+
                    _ => None,
                }
            }

            fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
                match name {
                    $($wire => Some(&mut self.$field),)+
                    _ => None,
                }
            }
        }
    };
}

header_record! {
    /// Message group MAC. Required.
    msg_grpt_mac => "msgGrptMac",
    /// Global business tracking number. Required.
    global_busi_track_no => "globalBusiTrackNo",
    /// Sub-transaction number. Required.
    subtx_no => "subtxNo",
    /// Transaction start time, `yyyyMMddHHmmss`.
    tx_start_time => "txStartTime",
    /// Transaction send time, `yyyyMMddHHmmss`.
    tx_send_time => "txSendTime",
    tx_code => "txCode",
    channel_no => "channelNo",
    org_no => "orgNo",
    teller_id => "tellerId",
    auth_teller_id => "authTellerId",
    cust_mgr_id => "custMgrId",
    terminal_id => "terminalId",
    terminal_type => "terminalType",
    tx_branch_no => "txBranchNo",
    auth_branch_no => "authBranchNo",
    client_ip => "clientIp",
    mac_addr => "macAddr",
    req_sys_date => "reqSysDate",
    req_sys_time => "reqSysTime",
    seq_no => "seqNo",
    remark => "remark",
}

impl HeaderRecord {
    /// Creates a header with the three required identifiers set.
    pub fn new(
        msg_grpt_mac: impl Into<String>,
        global_busi_track_no: impl Into<String>,
        subtx_no: impl Into<String>,
    ) -> Self {
        Self {
            msg_grpt_mac: Some(msg_grpt_mac.into()),
            global_busi_track_no: Some(global_busi_track_no.into()),
            subtx_no: Some(subtx_no.into()),
            ..Self::default()
        }
    }

    /// Reads an attribute by wire name. Unknown names read as `None`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.slot(name).and_then(|v| v.as_deref())
    }

    /// Writes an attribute by wire name. Returns `false` for unknown names.
    pub fn set_field(&mut self, name: &str, value: Option<String>) -> bool {
        match self.slot_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Sets an attribute only when it is currently unset. Returns `true` if
    /// the value was written.
    pub fn fill_if_unset(&mut self, name: &str, value: impl FnOnce() -> String) -> bool {
        match self.slot_mut(name) {
            Some(slot) if slot.is_none() => {
                *slot = Some(value());
                true
            }
            _ => false,
        }
    }

    /// Iterates over `(wire name, value)` for every attribute, set or not.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        Self::FIELD_NAMES
            .iter()
            .map(move |name| (*name, self.field(name)))
    }

    /// `true` when no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.entries().all(|(_, v)| v.is_none())
    }

    /// Required identifiers present and non-blank.
    pub fn validate(&self) -> bool {
        validation::header_required(self).is_empty()
    }

    /// Length ceilings respected for every set attribute that has one.
    pub fn validate_field_lengths(&self) -> bool {
        validation::header_lengths(self).is_empty()
    }

    /// The header as a JSON object. Unset attributes are omitted.
    pub fn to_wire_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries()
            .filter_map(|(name, v)| v.map(|v| (name.to_string(), Value::from(v))))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for HeaderRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire_value().serialize(serializer)
    }
}
