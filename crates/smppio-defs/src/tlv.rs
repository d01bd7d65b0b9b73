//! Built-in optional-parameter (TLV) tags.

use std::borrow::Cow;

pub const USER_MESSAGE_REFERENCE: u16 = 0x0204;
pub const SAR_MSG_REF_NUM: u16 = 0x020C;
pub const SAR_TOTAL_SEGMENTS: u16 = 0x020E;
pub const SAR_SEGMENT_SEQNUM: u16 = 0x020F;
pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
pub const NETWORK_ERROR_CODE: u16 = 0x0423;
pub const MESSAGE_PAYLOAD: u16 = 0x0424;
pub const MESSAGE_STATE: u16 = 0x0427;

/// A TLV descriptor: a name and its numeric tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvDef {
    pub name: Cow<'static, str>,
    pub tag: u16,
}

impl TlvDef {
    pub(crate) const fn builtin(name: &'static str, tag: u16) -> Self {
        Self {
            name: Cow::Borrowed(name),
            tag,
        }
    }
}

pub(crate) fn builtin_by_tag(tag: u16) -> Option<TlvDef> {
    let name = match tag {
        USER_MESSAGE_REFERENCE => "user_message_reference",
        SAR_MSG_REF_NUM => "sar_msg_ref_num",
        SAR_TOTAL_SEGMENTS => "sar_total_segments",
        SAR_SEGMENT_SEQNUM => "sar_segment_seqnum",
        RECEIPTED_MESSAGE_ID => "receipted_message_id",
        NETWORK_ERROR_CODE => "network_error_code",
        MESSAGE_PAYLOAD => "message_payload",
        MESSAGE_STATE => "message_state",
        _ => return None,
    };
    Some(TlvDef::builtin(name, tag))
}

pub(crate) fn builtin_by_name(name: &str) -> Option<TlvDef> {
    let tag = match name {
        "user_message_reference" => USER_MESSAGE_REFERENCE,
        "sar_msg_ref_num" => SAR_MSG_REF_NUM,
        "sar_total_segments" => SAR_TOTAL_SEGMENTS,
        "sar_segment_seqnum" => SAR_SEGMENT_SEQNUM,
        "receipted_message_id" => RECEIPTED_MESSAGE_ID,
        "network_error_code" => NETWORK_ERROR_CODE,
        "message_payload" => MESSAGE_PAYLOAD,
        "message_state" => MESSAGE_STATE,
        _ => return None,
    };
    builtin_by_tag(tag)
}
