// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # txmsg: Core Library
//!
//! Assembly, validation and JSON serialization of two-part transaction
//! messages: a fixed header plus a body of entity data and extension groups.
//!
//! ## Modules
//!
//! - **message**: The records, the composed envelope, the fluent assembler
//!   and both validation rule sets.
//! - **scenario**: Sample messages for common business flows and boundary
//!   cases.
//! - **config**: Wire key names, length ceilings, patterns and defaults.
//!
//! The library performs no I/O. Sending a message means rendering it with
//! [`MessageEnvelope::to_wire_format`] and handing the text to a transport;
//! the `txmsg-gateway` binary provides one over HTTP.
//!
//! ## Guarantees
//!
//! 1. Rendering never fails, and the output is byte-stable for equal envelopes.
//! 2. Parsing the rendered text gives back an equal envelope.
//! 3. An envelope always has a header, an entity and all nine extension maps.

pub mod config;
pub mod message;
pub mod scenario;

pub use message::{
    CommonFieldGroups, EntityRecord, FieldMap, FieldViolation, HeaderRecord, MessageAssembler,
    MessageBody, MessageEnvelope, MessageError,
};
pub use scenario::Scenario;
