//! Common field groups: the accounting date, eight indexed extension maps,
//! and the general-purpose `addtData` map.
//!
//! Groups are addressed by a 1-based index. Indices outside `1..=8` are
//! silent no-ops: reads return `None`, writes are dropped. Every map exists
//! from construction onward and is serialized even when empty.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::types::{map_to_value, null_as_default, FieldMap};
use super::validation;
use crate::config;

/// Accounting date plus nine extension maps.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommonFieldGroups {
    /// Business date, eight digits. `"00000000"` is a real value, not "unset".
    #[serde(rename = "accountingDate")]
    pub accounting_date: Option<String>,

    #[serde(rename = "addtData", deserialize_with = "null_as_default")]
    addt_data: FieldMap,

    #[serde(rename = "txComn1", deserialize_with = "null_as_default")]
    tx_comn1: FieldMap,
    #[serde(rename = "txComn2", deserialize_with = "null_as_default")]
    tx_comn2: FieldMap,
    #[serde(rename = "txComn3", deserialize_with = "null_as_default")]
    tx_comn3: FieldMap,
    #[serde(rename = "txComn4", deserialize_with = "null_as_default")]
    tx_comn4: FieldMap,
    #[serde(rename = "txComn5", deserialize_with = "null_as_default")]
    tx_comn5: FieldMap,
    #[serde(rename = "txComn6", deserialize_with = "null_as_default")]
    tx_comn6: FieldMap,
    #[serde(rename = "txComn7", deserialize_with = "null_as_default")]
    tx_comn7: FieldMap,
    #[serde(rename = "txComn8", deserialize_with = "null_as_default")]
    tx_comn8: FieldMap,
}

impl CommonFieldGroups {
    /// Creates empty groups with the given accounting date.
    pub fn with_accounting_date(date: impl Into<String>) -> Self {
        Self {
            accounting_date: Some(date.into()),
            ..Self::default()
        }
    }

    // -- indexed groups -----------------------------------------------------

    /// Read access to group `index` (1-based). `None` when out of range.
    pub fn group(&self, index: usize) -> Option<&FieldMap> {
        match index {
            1 => Some(&self.tx_comn1),
            2 => Some(&self.tx_comn2),
            3 => Some(&self.tx_comn3),
            4 => Some(&self.tx_comn4),
            5 => Some(&self.tx_comn5),
            6 => Some(&self.tx_comn6),
            7 => Some(&self.tx_comn7),
            8 => Some(&self.tx_comn8),
            _ => None,
        }
    }

    /// Mutable access to group `index` (1-based). `None` when out of range.
    pub fn group_mut(&mut self, index: usize) -> Option<&mut FieldMap> {
        match index {
            1 => Some(&mut self.tx_comn1),
            2 => Some(&mut self.tx_comn2),
            3 => Some(&mut self.tx_comn3),
            4 => Some(&mut self.tx_comn4),
            5 => Some(&mut self.tx_comn5),
            6 => Some(&mut self.tx_comn6),
            7 => Some(&mut self.tx_comn7),
            8 => Some(&mut self.tx_comn8),
            _ => None,
        }
    }

    /// All eight groups in index order.
    pub fn groups(&self) -> [&FieldMap; config::GROUP_COUNT] {
        [
            &self.tx_comn1,
            &self.tx_comn2,
            &self.tx_comn3,
            &self.tx_comn4,
            &self.tx_comn5,
            &self.tx_comn6,
            &self.tx_comn7,
            &self.tx_comn8,
        ]
    }

    /// Sets `key` in group `index`. Out-of-range indices are ignored.
    pub fn set_field(&mut self, index: usize, key: impl Into<String>, value: impl Into<Value>) {
        if let Some(group) = self.group_mut(index) {
            group.insert(key.into(), value.into());
        }
    }

    pub fn field(&self, index: usize, key: &str) -> Option<&Value> {
        self.group(index)?.get(key)
    }

    /// Removes `key` from group `index`, returning its previous value.
    pub fn remove_field(&mut self, index: usize, key: &str) -> Option<Value> {
        self.group_mut(index)?.remove(key)
    }

    /// Replaces group `index` wholesale; `None` installs an empty map.
    pub fn set_group_map(&mut self, index: usize, data: impl Into<Option<FieldMap>>) {
        if let Some(group) = self.group_mut(index) {
            *group = data.into().unwrap_or_default();
        }
    }

    pub fn has_any_group_data(&self) -> bool {
        self.groups().iter().any(|g| !g.is_empty())
    }

    pub fn clear_all_groups(&mut self) {
        for index in 1..=config::GROUP_COUNT {
            if let Some(group) = self.group_mut(index) {
                group.clear();
            }
        }
    }

    // -- addtData -----------------------------------------------------------

    pub fn addt_data(&self) -> &FieldMap {
        &self.addt_data
    }

    pub fn addt_data_mut(&mut self) -> &mut FieldMap {
        &mut self.addt_data
    }

    /// Replaces `addtData`; `None` installs an empty map.
    pub fn set_addt_data(&mut self, data: impl Into<Option<FieldMap>>) {
        self.addt_data = data.into().unwrap_or_default();
    }

    pub fn add_addt_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.addt_data.insert(key.into(), value.into());
    }

    pub fn addt_data_field(&self, key: &str) -> Option<&Value> {
        self.addt_data.get(key)
    }

    pub fn remove_addt_data(&mut self, key: &str) -> Option<Value> {
        self.addt_data.remove(key)
    }

    pub fn has_addt_data(&self) -> bool {
        !self.addt_data.is_empty()
    }

    pub fn clear_addt_data(&mut self) {
        self.addt_data.clear();
    }

    // -- validation & wire --------------------------------------------------

    /// Accounting date absent or eight digits.
    pub fn validate_accounting_date(&self) -> bool {
        validation::accounting_date(self).is_none()
    }

    pub fn validate(&self) -> bool {
        self.validate_accounting_date()
    }

    /// Writes this record's keys into a body object. `addtData` and all eight
    /// groups are always written; the accounting date only when set.
    pub(crate) fn write_wire_fields(&self, body: &mut Map<String, Value>) {
        if let Some(date) = &self.accounting_date {
            body.insert(config::KEY_ACCOUNTING_DATE.to_string(), Value::from(date.as_str()));
        }
        body.insert(config::KEY_ADDT_DATA.to_string(), map_to_value(&self.addt_data));
        for (key, group) in config::GROUP_KEYS.iter().zip(self.groups()) {
            body.insert(key.to_string(), map_to_value(group));
        }
    }

    /// The groups as a standalone JSON object.
    pub fn to_wire_value(&self) -> Value {
        let mut map = Map::new();
        self.write_wire_fields(&mut map);
        Value::Object(map)
    }
}

impl Serialize for CommonFieldGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_maps_start_empty() {
        let groups = CommonFieldGroups::default();
        assert!(groups.accounting_date.is_none());
        assert!(!groups.has_addt_data());
        assert!(!groups.has_any_group_data());
        for index in 1..=8 {
            assert!(groups.group(index).is_some_and(|g| g.is_empty()));
        }
    }

    #[test]
    fn set_get_remove_by_index() {
        let mut groups = CommonFieldGroups::default();
        groups.set_field(1, "curQryReqNum", "0");
        groups.set_field(8, "busiSendSysOrCmptNo", "99710730008");

        assert_eq!(groups.field(1, "curQryReqNum"), Some(&json!("0")));
        assert_eq!(groups.field(8, "busiSendSysOrCmptNo"), Some(&json!("99710730008")));
        assert_eq!(groups.field(2, "curQryReqNum"), None);

        assert_eq!(groups.remove_field(1, "curQryReqNum"), Some(json!("0")));
        assert_eq!(groups.field(1, "curQryReqNum"), None);
    }

    #[test]
    fn out_of_range_index_is_a_no_op() {
        let mut groups = CommonFieldGroups::default();
        for index in [0, 9, usize::MAX] {
            groups.set_field(index, "k", "v");
            assert_eq!(groups.field(index, "k"), None);
            assert_eq!(groups.remove_field(index, "k"), None);
            groups.set_group_map(index, FieldMap::new());
            assert!(groups.group(index).is_none());
        }
        assert_eq!(groups, CommonFieldGroups::default());
    }

    #[test]
    fn set_group_map_none_installs_empty_map() {
        let mut groups = CommonFieldGroups::default();
        groups.set_field(3, "authLevel", "2");
        groups.set_group_map(3, None);
        assert!(groups.group(3).is_some_and(|g| g.is_empty()));
    }

    #[test]
    fn set_group_map_replaces_contents() {
        let mut data = FieldMap::new();
        data.insert("riskLevel".into(), json!("LOW"));

        let mut groups = CommonFieldGroups::default();
        groups.set_field(2, "authLevel", "2");
        groups.set_group_map(2, data);

        assert_eq!(groups.field(2, "riskLevel"), Some(&json!("LOW")));
        assert_eq!(groups.field(2, "authLevel"), None);
    }

    #[test]
    fn addt_data_operations() {
        let mut groups = CommonFieldGroups::default();
        groups.add_addt_data("memo", "Transfer test");
        assert!(groups.has_addt_data());
        assert_eq!(groups.addt_data_field("memo"), Some(&json!("Transfer test")));

        assert_eq!(groups.remove_addt_data("memo"), Some(json!("Transfer test")));
        assert!(!groups.has_addt_data());

        groups.add_addt_data("a", 1);
        groups.clear_addt_data();
        assert!(!groups.has_addt_data());

        groups.set_addt_data(None);
        assert!(groups.addt_data().is_empty());
    }

    #[test]
    fn clear_all_groups_keeps_addt_data() {
        let mut groups = CommonFieldGroups::default();
        groups.set_field(4, "a", 1);
        groups.set_field(7, "b", 2);
        groups.add_addt_data("keep", true);
        assert!(groups.has_any_group_data());

        groups.clear_all_groups();
        assert!(!groups.has_any_group_data());
        assert!(groups.has_addt_data());
    }

    #[test]
    fn accounting_date_validation() {
        assert!(CommonFieldGroups::default().validate());
        assert!(CommonFieldGroups::with_accounting_date("00000000").validate());
        assert!(!CommonFieldGroups::with_accounting_date("2023120").validate());
        assert!(!CommonFieldGroups::with_accounting_date("abcd1234").validate());
    }

    #[test]
    fn wire_value_always_lists_every_map() {
        let value = CommonFieldGroups::default().to_wire_value();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 9);
        assert!(obj.contains_key("addtData"));
        for key in config::GROUP_KEYS {
            assert_eq!(obj[key], json!({}));
        }
        assert!(!obj.contains_key("accountingDate"));
    }

    #[test]
    fn parse_null_maps_as_empty() {
        let groups: CommonFieldGroups =
            serde_json::from_value(json!({"addtData": null, "txComn5": null})).unwrap();
        assert!(groups.addt_data().is_empty());
        assert!(groups.group(5).is_some_and(|g| g.is_empty()));
    }

    #[test]
    fn json_roundtrip() {
        let mut groups = CommonFieldGroups::with_accounting_date("20231201");
        groups.set_field(1, "bgnIndexNo", "0");
        groups.set_field(6, "flags", json!([1, 2, 3]));
        groups.add_addt_data("scenario", "roundtrip");

        let json = serde_json::to_string(&groups).unwrap();
        let recovered: CommonFieldGroups = serde_json::from_str(&json).unwrap();
        assert_eq!(groups, recovered);
    }
}
