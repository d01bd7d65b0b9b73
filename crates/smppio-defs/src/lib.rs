//! SMPP command and TLV descriptor tables.
//!
//! The well-known SMPP 3.4 operations are a closed, compile-time set resolved
//! by `match` — no reflection, O(1) dispatch by command identifier. Forward
//! compatibility comes from a process-wide extension registry: descriptors
//! added at runtime become available to every existing and future session.

pub mod command;
pub mod error;
pub mod registry;
pub mod status;
pub mod tlv;

pub use command::CommandDef;
pub use error::{DefsError, Result};
pub use registry::{add_command, add_tlv, command_by_id, command_by_name, tlv_by_name, tlv_by_tag};
pub use tlv::TlvDef;
