use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use tracing::debug;

use crate::command::{self, CommandDef};
use crate::error::{DefsError, Result};
use crate::tlv::{self, TlvDef};

/// Runtime extension tables, shared process-wide.
///
/// Built-in descriptors are resolved first and cannot be shadowed here by
/// accident: an extension entry with a built-in name simply overwrites the
/// name→id mapping for subsequent operations, matching the insert-or-overwrite
/// contract. In-flight PDUs are unaffected.
struct Extensions {
    commands_by_name: RwLock<HashMap<String, u32>>,
    commands_by_id: RwLock<HashMap<u32, String>>,
    tlvs_by_name: RwLock<HashMap<String, u16>>,
    tlvs_by_tag: RwLock<HashMap<u16, String>>,
}

fn extensions() -> &'static Extensions {
    static EXTENSIONS: OnceLock<Extensions> = OnceLock::new();
    EXTENSIONS.get_or_init(|| Extensions {
        commands_by_name: RwLock::new(HashMap::new()),
        commands_by_id: RwLock::new(HashMap::new()),
        tlvs_by_name: RwLock::new(HashMap::new()),
        tlvs_by_tag: RwLock::new(HashMap::new()),
    })
}

/// Register (or overwrite) a command descriptor.
///
/// The command becomes sendable by name on every existing and future session.
pub fn add_command(name: &str, id: u32) -> Result<()> {
    if name.is_empty() {
        return Err(DefsError::EmptyName);
    }
    if id == 0 {
        return Err(DefsError::ZeroCommandId(name.to_string()));
    }

    let ext = extensions();
    ext.commands_by_name
        .write()
        .expect("command registry poisoned")
        .insert(name.to_string(), id);
    ext.commands_by_id
        .write()
        .expect("command registry poisoned")
        .insert(id, name.to_string());
    debug!(name, id = format_args!("{id:#010x}"), "command registered");
    Ok(())
}

/// Register (or overwrite) a TLV descriptor.
pub fn add_tlv(name: &str, tag: u16) -> Result<()> {
    if name.is_empty() {
        return Err(DefsError::EmptyName);
    }

    let ext = extensions();
    ext.tlvs_by_name
        .write()
        .expect("TLV registry poisoned")
        .insert(name.to_string(), tag);
    ext.tlvs_by_tag
        .write()
        .expect("TLV registry poisoned")
        .insert(tag, name.to_string());
    debug!(name, tag = format_args!("{tag:#06x}"), "TLV registered");
    Ok(())
}

/// Resolve a command descriptor by identifier: built-ins first, then the
/// extension table.
pub fn command_by_id(id: u32) -> Option<CommandDef> {
    if let Some(def) = command::builtin_by_id(id) {
        return Some(def);
    }
    extensions()
        .commands_by_id
        .read()
        .expect("command registry poisoned")
        .get(&id)
        .map(|name| CommandDef {
            name: Cow::Owned(name.clone()),
            id,
        })
}

/// Resolve a command descriptor by dispatch name.
///
/// Extension entries take precedence so an overwrite of a built-in name takes
/// effect for all subsequent sends.
pub fn command_by_name(name: &str) -> Option<CommandDef> {
    let ext = extensions()
        .commands_by_name
        .read()
        .expect("command registry poisoned")
        .get(name)
        .copied();
    if let Some(id) = ext {
        return Some(CommandDef {
            name: Cow::Owned(name.to_string()),
            id,
        });
    }
    command::builtin_by_name(name)
}

/// Resolve a TLV descriptor by tag.
pub fn tlv_by_tag(tag: u16) -> Option<TlvDef> {
    if let Some(def) = tlv::builtin_by_tag(tag) {
        return Some(def);
    }
    extensions()
        .tlvs_by_tag
        .read()
        .expect("TLV registry poisoned")
        .get(&tag)
        .map(|name| TlvDef {
            name: Cow::Owned(name.clone()),
            tag,
        })
}

/// Resolve a TLV descriptor by name.
pub fn tlv_by_name(name: &str) -> Option<TlvDef> {
    let ext = extensions()
        .tlvs_by_name
        .read()
        .expect("TLV registry poisoned")
        .get(name)
        .copied();
    if let Some(tag) = ext {
        return Some(TlvDef {
            name: Cow::Owned(name.to_string()),
            tag,
        });
    }
    tlv::builtin_by_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ENQUIRE_LINK, SUBMIT_SM};

    #[test]
    fn builtin_commands_resolve_both_ways() {
        let by_id = command_by_id(SUBMIT_SM).expect("submit_sm should resolve");
        assert_eq!(by_id.name, "submit_sm");

        let by_name = command_by_name("enquire_link").expect("enquire_link should resolve");
        assert_eq!(by_name.id, ENQUIRE_LINK);
    }

    #[test]
    fn unknown_command_id_is_none() {
        assert!(command_by_id(0x0000_7777).is_none());
    }

    #[test]
    fn extension_command_resolves_after_registration() {
        add_command("vendor_probe", 0x0001_0001).expect("registration should succeed");
        let def = command_by_name("vendor_probe").expect("extension should resolve");
        assert_eq!(def.id, 0x0001_0001);
        let back = command_by_id(0x0001_0001).expect("extension should resolve by id");
        assert_eq!(back.name, "vendor_probe");
    }

    #[test]
    fn extension_overwrite_takes_effect() {
        add_command("vendor_flux", 0x0001_0002).expect("registration should succeed");
        add_command("vendor_flux", 0x0001_0003).expect("overwrite should succeed");
        let def = command_by_name("vendor_flux").expect("extension should resolve");
        assert_eq!(def.id, 0x0001_0003);
    }

    #[test]
    fn rejects_empty_or_zero_descriptors() {
        assert!(matches!(add_command("", 1), Err(DefsError::EmptyName)));
        assert!(matches!(
            add_command("broken", 0),
            Err(DefsError::ZeroCommandId(_))
        ));
    }

    #[test]
    fn builtin_and_extension_tlvs_resolve() {
        let payload = tlv_by_tag(crate::tlv::MESSAGE_PAYLOAD).expect("builtin should resolve");
        assert_eq!(payload.name, "message_payload");

        add_tlv("vendor_trace_id", 0x1400).expect("registration should succeed");
        let def = tlv_by_name("vendor_trace_id").expect("extension should resolve");
        assert_eq!(def.tag, 0x1400);
        assert_eq!(
            tlv_by_tag(0x1400).expect("extension should resolve").name,
            "vendor_trace_id"
        );
    }
}
