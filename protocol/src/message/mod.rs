//! Transaction message model, assembly and validation.
//!
//! A message is a [`MessageEnvelope`]: one [`HeaderRecord`] plus a
//! [`MessageBody`] holding one [`EntityRecord`] and one
//! [`CommonFieldGroups`]. Messages are put together with a
//! [`MessageAssembler`], checked with [`MessageEnvelope::validate`] and
//! [`MessageEnvelope::validate_format`], and carried as JSON text.
//!
//! # Lifecycle
//!
//! ```text
//! MessageAssembler ──build()──> MessageEnvelope ──to_wire_format()──> text
//!                                      ^                                │
//!                                      └────── from_wire_format() ──────┘
//! ```
//!
//! Parsing the text produced by `to_wire_format` yields an envelope equal to
//! the original.

pub mod builder;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod field_groups;
pub mod header;
pub mod types;
pub mod validation;

pub use builder::{EntityBuilder, FieldGroupsBuilder, HeaderBuilder, MessageAssembler};
pub use entity::EntityRecord;
pub use envelope::{MessageBody, MessageEnvelope};
pub use error::MessageError;
pub use field_groups::CommonFieldGroups;
pub use header::HeaderRecord;
pub use types::FieldMap;
pub use validation::FieldViolation;
