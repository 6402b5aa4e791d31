//! Message construction via the builder pattern.
//!
//! [`MessageAssembler`] owns one header, one entity and one set of field
//! groups. Callers either replace a record wholesale (`with_*`) or edit it in
//! place through a scoped sub-builder (`configure_*`). Nothing is validated
//! until [`build_and_validate`](MessageAssembler::build_and_validate).
//!
//! ```
//! use txmsg_protocol::MessageAssembler;
//!
//! let envelope = MessageAssembler::create()
//!     .configure_header(|h| {
//!         h.msg_grpt_mac("M1")
//!             .global_busi_track_no("T1")
//!             .subtx_no("S1")
//!     })
//!     .configure_entity(|e| {
//!         e.cust_no("040000037480013")
//!             .qry_vchr_tp_cd("1")
//!             .tx_scene_cd("C203")
//!     })
//!     .configure_field_groups(|g| g.cur_qry_req_num("0"))
//!     .build_and_validate()
//!     .unwrap();
//!
//! assert!(envelope.validate_format());
//! ```

use serde_json::Value;
use tracing::debug;

use super::entity::EntityRecord;
use super::envelope::{MessageBody, MessageEnvelope};
use super::error::MessageError;
use super::field_groups::CommonFieldGroups;
use super::header::HeaderRecord;
use super::types::{value_to_text, FieldMap};
use crate::config;

// ---------------------------------------------------------------------------
// MessageAssembler
// ---------------------------------------------------------------------------

/// Single-use fluent builder for [`MessageEnvelope`].
#[derive(Debug, Clone, Default)]
pub struct MessageAssembler {
    header: HeaderRecord,
    entity: EntityRecord,
    field_groups: CommonFieldGroups,
}

impl MessageAssembler {
    /// Starts with three empty records.
    pub fn create() -> Self {
        Self::default()
    }

    /// Edits the header in place.
    pub fn configure_header<F>(mut self, f: F) -> Self
    where
        F: for<'a> FnOnce(HeaderBuilder<'a>) -> HeaderBuilder<'a>,
    {
        f(HeaderBuilder {
            record: &mut self.header,
        });
        self
    }

    /// Edits the entity in place.
    pub fn configure_entity<F>(mut self, f: F) -> Self
    where
        F: for<'a> FnOnce(EntityBuilder<'a>) -> EntityBuilder<'a>,
    {
        f(EntityBuilder {
            record: &mut self.entity,
        });
        self
    }

    /// Edits the field groups in place.
    pub fn configure_field_groups<F>(mut self, f: F) -> Self
    where
        F: for<'a> FnOnce(FieldGroupsBuilder<'a>) -> FieldGroupsBuilder<'a>,
    {
        f(FieldGroupsBuilder {
            record: &mut self.field_groups,
        });
        self
    }

    /// Replaces the header. `None` starts over with an empty one.
    pub fn with_header(mut self, header: impl Into<Option<HeaderRecord>>) -> Self {
        self.header = header.into().unwrap_or_default();
        self
    }

    /// Replaces the entity. `None` starts over with an empty one.
    pub fn with_entity(mut self, entity: impl Into<Option<EntityRecord>>) -> Self {
        self.entity = entity.into().unwrap_or_default();
        self
    }

    /// Replaces the field groups. `None` starts over with empty ones.
    pub fn with_field_groups(mut self, groups: impl Into<Option<CommonFieldGroups>>) -> Self {
        self.field_groups = groups.into().unwrap_or_default();
        self
    }

    /// Fills unset fields with their defaults. Set fields, even blank ones,
    /// are left alone.
    ///
    /// - header `msgGrptMac`, `globalBusiTrackNo`, `subtxNo`, `txStartTime`,
    ///   `txSendTime` get a `{{wireName}}` placeholder
    /// - entity core fields get `040000037480013` / `1` / `C203`
    /// - accounting date gets `00000000`
    pub fn apply_defaults(mut self) -> Self {
        let mut filled = 0usize;
        for name in config::PLACEHOLDER_HEADER_FIELDS {
            if self.header.fill_if_unset(name, || config::placeholder(name)) {
                filled += 1;
            }
        }

        let slots = [
            (&mut self.entity.cust_no, config::DEFAULT_CUST_NO),
            (&mut self.entity.qry_vchr_tp_cd, config::DEFAULT_QRY_VCHR_TP_CD),
            (&mut self.entity.tx_scene_cd, config::DEFAULT_TX_SCENE_CD),
            (
                &mut self.field_groups.accounting_date,
                config::DEFAULT_ACCOUNTING_DATE,
            ),
        ];
        for (slot, default) in slots {
            if slot.is_none() {
                *slot = Some(default.to_string());
                filled += 1;
            }
        }

        debug!(filled, "applied message defaults");
        self
    }

    /// Sets one field addressed by a dotted key.
    ///
    /// | key                         | target                          |
    /// |-----------------------------|---------------------------------|
    /// | `header.<wireName>`         | header attribute (unknown names ignored) |
    /// | `entity.custNo` etc.        | entity core field               |
    /// | `entity.<other>`            | entity extension field          |
    /// | `comn.accountingDate`       | accounting date                 |
    /// | `comn.curQryReqNum`, `comn.bgnIndexNo` | group 1             |
    /// | `comn.busiSendSysOrCmptNo`  | group 8                         |
    /// | `comn.<other>`, anything else | `addtData`                    |
    ///
    /// Core and header slots, and the three named group fields, receive
    /// non-string values in their compact JSON form.
    pub fn apply_override(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match key.split_once('.') {
            Some(("header", name)) => {
                if !self.header.set_field(name, value_to_text(&value)) {
                    debug!(key, "ignoring override for unknown header field");
                }
            }
            Some(("entity", name)) => match name {
                config::FIELD_CUST_NO => self.entity.cust_no = value_to_text(&value),
                config::FIELD_QRY_VCHR_TP_CD => self.entity.qry_vchr_tp_cd = value_to_text(&value),
                config::FIELD_TX_SCENE_CD => self.entity.tx_scene_cd = value_to_text(&value),
                _ => self.entity.add_field(name, value),
            },
            Some(("comn", name)) => match name {
                config::KEY_ACCOUNTING_DATE => {
                    self.field_groups.accounting_date = value_to_text(&value);
                }
                config::FIELD_CUR_QRY_REQ_NUM | config::FIELD_BGN_INDEX_NO => {
                    self.field_groups.set_field(1, name, value_to_text(&value));
                }
                config::FIELD_BUSI_SEND_SYS_OR_CMPT_NO => {
                    self.field_groups.set_field(8, name, value_to_text(&value));
                }
                _ => self.field_groups.add_addt_data(name, value),
            },
            _ => self.field_groups.add_addt_data(key, value),
        }
        self
    }

    pub fn header(&self) -> &HeaderRecord {
        &self.header
    }

    pub fn entity(&self) -> &EntityRecord {
        &self.entity
    }

    pub fn field_groups(&self) -> &CommonFieldGroups {
        &self.field_groups
    }

    /// Composes the envelope. Performs no validation.
    pub fn build(self) -> MessageEnvelope {
        let envelope = MessageEnvelope::new(
            self.header,
            MessageBody::new(self.entity, self.field_groups),
        );
        debug!(summary = %envelope, "built message envelope");
        envelope
    }

    /// Composes the envelope, then runs the semantic and format checks in
    /// that order.
    ///
    /// # Errors
    ///
    /// See [`MessageEnvelope::ensure_valid`].
    pub fn build_and_validate(self) -> Result<MessageEnvelope, MessageError> {
        let envelope = self.build();
        envelope.ensure_valid()?;
        Ok(envelope)
    }
}

// ---------------------------------------------------------------------------
// Sub-builders
// ---------------------------------------------------------------------------

/// Scoped setter facade over the assembler's header.
#[derive(Debug)]
pub struct HeaderBuilder<'a> {
    record: &'a mut HeaderRecord,
}

macro_rules! header_setters {
    ($($field:ident),+ $(,)?) => {
        $(
            pub fn $field(self, value: impl Into<String>) -> Self {
                self.record.$field = Some(value.into());
                self
            }
        )+
    };
}

impl<'a> HeaderBuilder<'a> {
    header_setters! {
        msg_grpt_mac,
        global_busi_track_no,
        subtx_no,
        tx_start_time,
        tx_send_time,
        tx_code,
        channel_no,
        org_no,
        teller_id,
        auth_teller_id,
        cust_mgr_id,
        terminal_id,
        terminal_type,
        tx_branch_no,
        auth_branch_no,
        client_ip,
        mac_addr,
        req_sys_date,
        req_sys_time,
        seq_no,
        remark,
    }

    /// Sets an attribute by wire name. Unknown names are ignored.
    pub fn set(self, name: &str, value: impl Into<String>) -> Self {
        self.record.set_field(name, Some(value.into()));
        self
    }

    /// Unsets an attribute by wire name.
    pub fn clear(self, name: &str) -> Self {
        self.record.set_field(name, None);
        self
    }
}

/// Scoped setter facade over the assembler's entity.
#[derive(Debug)]
pub struct EntityBuilder<'a> {
    record: &'a mut EntityRecord,
}

impl<'a> EntityBuilder<'a> {
    pub fn cust_no(self, value: impl Into<String>) -> Self {
        self.record.cust_no = Some(value.into());
        self
    }

    pub fn qry_vchr_tp_cd(self, value: impl Into<String>) -> Self {
        self.record.qry_vchr_tp_cd = Some(value.into());
        self
    }

    pub fn tx_scene_cd(self, value: impl Into<String>) -> Self {
        self.record.tx_scene_cd = Some(value.into());
        self
    }

    pub fn add_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.add_field(name, value);
        self
    }

    /// Merges `fields` into the extension map. `None` changes nothing.
    pub fn with_additional_fields(self, fields: impl Into<Option<FieldMap>>) -> Self {
        if let Some(fields) = fields.into() {
            self.record.additional_fields_mut().extend(fields);
        }
        self
    }
}

/// Scoped setter facade over the assembler's field groups.
#[derive(Debug)]
pub struct FieldGroupsBuilder<'a> {
    record: &'a mut CommonFieldGroups,
}

impl<'a> FieldGroupsBuilder<'a> {
    pub fn accounting_date(self, value: impl Into<String>) -> Self {
        self.record.accounting_date = Some(value.into());
        self
    }

    pub fn addt_data(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.add_addt_data(key, value);
        self
    }

    /// Merges `data` into `addtData`. `None` changes nothing.
    pub fn with_addt_data(self, data: impl Into<Option<FieldMap>>) -> Self {
        if let Some(data) = data.into() {
            self.record.addt_data_mut().extend(data);
        }
        self
    }

    /// Sets `key` in group `index` (1-based). Out-of-range indices are ignored.
    pub fn group(self, index: usize, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.set_field(index, key, value);
        self
    }

    /// Replaces group `index` wholesale. `None` empties it.
    pub fn with_group(self, index: usize, data: impl Into<Option<FieldMap>>) -> Self {
        self.record.set_group_map(index, data);
        self
    }

    /// Current query request count, kept in group 1.
    pub fn cur_qry_req_num(self, value: impl Into<String>) -> Self {
        self.group(1, config::FIELD_CUR_QRY_REQ_NUM, value.into())
    }

    /// Begin index number, kept in group 1.
    pub fn bgn_index_no(self, value: impl Into<String>) -> Self {
        self.group(1, config::FIELD_BGN_INDEX_NO, value.into())
    }

    /// Sending system or component number, kept in group 8.
    pub fn busi_send_sys_or_cmpt_no(self, value: impl Into<String>) -> Self {
        self.group(8, config::FIELD_BUSI_SEND_SYS_OR_CMPT_NO, value.into())
    }
}
