//! Built-in SMPP 3.4 command identifiers.

use std::borrow::Cow;

/// Bit 31 of command_id marks a response.
pub const RESPONSE_BIT: u32 = 0x8000_0000;

pub const GENERIC_NACK: u32 = 0x8000_0000;
pub const BIND_RECEIVER: u32 = 0x0000_0001;
pub const BIND_RECEIVER_RESP: u32 = 0x8000_0001;
pub const BIND_TRANSMITTER: u32 = 0x0000_0002;
pub const BIND_TRANSMITTER_RESP: u32 = 0x8000_0002;
pub const QUERY_SM: u32 = 0x0000_0003;
pub const QUERY_SM_RESP: u32 = 0x8000_0003;
pub const SUBMIT_SM: u32 = 0x0000_0004;
pub const SUBMIT_SM_RESP: u32 = 0x8000_0004;
pub const DELIVER_SM: u32 = 0x0000_0005;
pub const DELIVER_SM_RESP: u32 = 0x8000_0005;
pub const UNBIND: u32 = 0x0000_0006;
pub const UNBIND_RESP: u32 = 0x8000_0006;
pub const REPLACE_SM: u32 = 0x0000_0007;
pub const REPLACE_SM_RESP: u32 = 0x8000_0007;
pub const CANCEL_SM: u32 = 0x0000_0008;
pub const CANCEL_SM_RESP: u32 = 0x8000_0008;
pub const BIND_TRANSCEIVER: u32 = 0x0000_0009;
pub const BIND_TRANSCEIVER_RESP: u32 = 0x8000_0009;
pub const OUTBIND: u32 = 0x0000_000B;
pub const ENQUIRE_LINK: u32 = 0x0000_0015;
pub const ENQUIRE_LINK_RESP: u32 = 0x8000_0015;
pub const SUBMIT_MULTI: u32 = 0x0000_0021;
pub const SUBMIT_MULTI_RESP: u32 = 0x8000_0021;
pub const ALERT_NOTIFICATION: u32 = 0x0000_0102;
pub const DATA_SM: u32 = 0x0000_0103;
pub const DATA_SM_RESP: u32 = 0x8000_0103;

/// A command descriptor: a dispatch name and its numeric identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    pub name: Cow<'static, str>,
    pub id: u32,
}

impl CommandDef {
    pub(crate) const fn builtin(name: &'static str, id: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            id,
        }
    }
}

/// Resolve a built-in command by identifier.
pub(crate) fn builtin_by_id(id: u32) -> Option<CommandDef> {
    let name = match id {
        GENERIC_NACK => "generic_nack",
        BIND_RECEIVER => "bind_receiver",
        BIND_RECEIVER_RESP => "bind_receiver_resp",
        BIND_TRANSMITTER => "bind_transmitter",
        BIND_TRANSMITTER_RESP => "bind_transmitter_resp",
        QUERY_SM => "query_sm",
        QUERY_SM_RESP => "query_sm_resp",
        SUBMIT_SM => "submit_sm",
        SUBMIT_SM_RESP => "submit_sm_resp",
        DELIVER_SM => "deliver_sm",
        DELIVER_SM_RESP => "deliver_sm_resp",
        UNBIND => "unbind",
        UNBIND_RESP => "unbind_resp",
        REPLACE_SM => "replace_sm",
        REPLACE_SM_RESP => "replace_sm_resp",
        CANCEL_SM => "cancel_sm",
        CANCEL_SM_RESP => "cancel_sm_resp",
        BIND_TRANSCEIVER => "bind_transceiver",
        BIND_TRANSCEIVER_RESP => "bind_transceiver_resp",
        OUTBIND => "outbind",
        ENQUIRE_LINK => "enquire_link",
        ENQUIRE_LINK_RESP => "enquire_link_resp",
        SUBMIT_MULTI => "submit_multi",
        SUBMIT_MULTI_RESP => "submit_multi_resp",
        ALERT_NOTIFICATION => "alert_notification",
        DATA_SM => "data_sm",
        DATA_SM_RESP => "data_sm_resp",
        _ => return None,
    };
    Some(CommandDef::builtin(name, id))
}

/// Resolve a built-in command by dispatch name.
pub(crate) fn builtin_by_name(name: &str) -> Option<CommandDef> {
    let id = match name {
        "generic_nack" => GENERIC_NACK,
        "bind_receiver" => BIND_RECEIVER,
        "bind_receiver_resp" => BIND_RECEIVER_RESP,
        "bind_transmitter" => BIND_TRANSMITTER,
        "bind_transmitter_resp" => BIND_TRANSMITTER_RESP,
        "query_sm" => QUERY_SM,
        "query_sm_resp" => QUERY_SM_RESP,
        "submit_sm" => SUBMIT_SM,
        "submit_sm_resp" => SUBMIT_SM_RESP,
        "deliver_sm" => DELIVER_SM,
        "deliver_sm_resp" => DELIVER_SM_RESP,
        "unbind" => UNBIND,
        "unbind_resp" => UNBIND_RESP,
        "replace_sm" => REPLACE_SM,
        "replace_sm_resp" => REPLACE_SM_RESP,
        "cancel_sm" => CANCEL_SM,
        "cancel_sm_resp" => CANCEL_SM_RESP,
        "bind_transceiver" => BIND_TRANSCEIVER,
        "bind_transceiver_resp" => BIND_TRANSCEIVER_RESP,
        "outbind" => OUTBIND,
        "enquire_link" => ENQUIRE_LINK,
        "enquire_link_resp" => ENQUIRE_LINK_RESP,
        "submit_multi" => SUBMIT_MULTI,
        "submit_multi_resp" => SUBMIT_MULTI_RESP,
        "alert_notification" => ALERT_NOTIFICATION,
        "data_sm" => DATA_SM,
        "data_sm_resp" => DATA_SM_RESP,
        _ => return None,
    };
    builtin_by_id(id)
}
