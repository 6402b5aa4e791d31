//! The entity record: core transactional identification plus caller-defined
//! extension fields.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::types::{map_to_value, null_as_default, value_to_text, FieldMap};
use super::validation;
use crate::config;

/// Customer number, voucher-type code, scene code, and an open extension map.
///
/// On the wire the extension map is nested under `additionalFields`. When
/// parsing, keys that appear directly inside `txEntity` but are not one of
/// the three core fields are folded into the extension map as well.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "EntityWire")]
pub struct EntityRecord {
    /// Customer number, 15 digits.
    pub cust_no: Option<String>,
    /// Query voucher-type code, one digit.
    pub qry_vchr_tp_cd: Option<String>,
    /// Transaction scene code, e.g. `C203`.
    pub tx_scene_cd: Option<String>,
    additional_fields: FieldMap,
}

impl EntityRecord {
    /// Creates an entity with the three core fields set.
    pub fn new(
        cust_no: impl Into<String>,
        qry_vchr_tp_cd: impl Into<String>,
        tx_scene_cd: impl Into<String>,
    ) -> Self {
        Self {
            cust_no: Some(cust_no.into()),
            qry_vchr_tp_cd: Some(qry_vchr_tp_cd.into()),
            tx_scene_cd: Some(tx_scene_cd.into()),
            additional_fields: FieldMap::new(),
        }
    }

    /// The extension map. Never absent.
    pub fn additional_fields(&self) -> &FieldMap {
        &self.additional_fields
    }

    /// Mutable access to the extension map.
    pub fn additional_fields_mut(&mut self) -> &mut FieldMap {
        &mut self.additional_fields
    }

    /// Replaces the extension map; `None` installs an empty one.
    pub fn set_additional_fields(&mut self, fields: impl Into<Option<FieldMap>>) {
        self.additional_fields = fields.into().unwrap_or_default();
    }

    /// Adds or overwrites an extension field.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.additional_fields.insert(name.into(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.additional_fields.get(name)
    }

    /// Removes an extension field, returning its previous value.
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.additional_fields.remove(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.additional_fields.contains_key(name)
    }

    /// Core fields present and non-blank.
    pub fn validate(&self) -> bool {
        validation::entity_required(self).is_empty()
    }

    /// Core fields match their patterns. Unset fields pass.
    pub fn validate_format(&self) -> bool {
        validation::entity_patterns(self).is_empty()
    }

    /// Core fields respect their length ceilings. Unset fields pass.
    pub fn validate_field_lengths(&self) -> bool {
        validation::entity_lengths(self).is_empty()
    }

    /// Flattens core and extension fields into one map. Unset core fields are
    /// left out; a core field always wins over an extension key of the same name.
    pub fn to_map(&self) -> FieldMap {
        let mut map = self.additional_fields.clone();
        for (name, value) in self.core_fields() {
            if let Some(v) = value {
                map.insert(name.to_string(), Value::from(v));
            }
        }
        map
    }

    /// Inverse of [`to_map`](Self::to_map): core keys populate the typed
    /// fields, everything else becomes an extension field.
    pub fn from_map(map: FieldMap) -> Self {
        let mut entity = Self::default();
        for (key, value) in map {
            match key.as_str() {
                config::FIELD_CUST_NO => entity.cust_no = value_to_text(&value),
                config::FIELD_QRY_VCHR_TP_CD => entity.qry_vchr_tp_cd = value_to_text(&value),
                config::FIELD_TX_SCENE_CD => entity.tx_scene_cd = value_to_text(&value),
                _ => {
                    entity.additional_fields.insert(key, value);
                }
            }
        }
        entity
    }

    /// The entity as a JSON object: set core fields plus `additionalFields`.
    pub fn to_wire_value(&self) -> Value {
        let mut map: Map<String, Value> = self
            .core_fields()
            .into_iter()
            .filter_map(|(name, v)| v.map(|v| (name.to_string(), Value::from(v))))
            .collect();
        map.insert(
            config::KEY_ADDITIONAL_FIELDS.to_string(),
            map_to_value(&self.additional_fields),
        );
        Value::Object(map)
    }

    fn core_fields(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (config::FIELD_CUST_NO, self.cust_no.as_deref()),
            (config::FIELD_QRY_VCHR_TP_CD, self.qry_vchr_tp_cd.as_deref()),
            (config::FIELD_TX_SCENE_CD, self.tx_scene_cd.as_deref()),
        ]
    }
}

impl Serialize for EntityRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire_value().serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EntityWire {
    #[serde(rename = "custNo", default)]
    cust_no: Option<String>,
    #[serde(rename = "qryVchrTpCd", default)]
    qry_vchr_tp_cd: Option<String>,
    #[serde(rename = "txSceneCd", default)]
    tx_scene_cd: Option<String>,
    #[serde(rename = "additionalFields", default, deserialize_with = "null_as_default")]
    additional_fields: FieldMap,
    #[serde(flatten)]
    flat: FieldMap,
}

impl From<EntityWire> for EntityRecord {
    fn from(wire: EntityWire) -> Self {
        let mut additional_fields = wire.flat;
        additional_fields.extend(wire.additional_fields);
        Self {
            cust_no: wire.cust_no,
            qry_vchr_tp_cd: wire.qry_vchr_tp_cd,
            tx_scene_cd: wire.tx_scene_cd,
            additional_fields,
        }
    }
}
