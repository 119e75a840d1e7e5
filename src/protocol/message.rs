use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::core::{DatapathId, Error, Result, OPENFLOW_VERSION};

/// Length of the fixed OpenFlow header
pub const HEADER_LEN: usize = 8;

// ofp_type values
pub const OFPT_HELLO: u8 = 0;
pub const OFPT_ECHO_REQUEST: u8 = 2;
pub const OFPT_ECHO_REPLY: u8 = 3;
pub const OFPT_FEATURES_REQUEST: u8 = 5;
pub const OFPT_FEATURES_REPLY: u8 = 6;
pub const OFPT_FLOW_MOD: u8 = 14;
pub const OFPT_MULTIPART_REQUEST: u8 = 18;
pub const OFPT_MULTIPART_REPLY: u8 = 19;

/// Multipart type for port descriptions
pub const OFPMP_PORT_DESC: u16 = 13;

// OXM classes and fields
const OFPXMC_OPENFLOW_BASIC: u16 = 0x8000;
const OFPXMC_EXPERIMENTER: u16 = 0xffff;
const OFPXMT_OFB_IN_PORT: u8 = 0;
/// ONF experimenter id carrying the optical transport extensions
pub const ONF_EXPERIMENTER_ID: u32 = 0x4f4e_4600;
const OFPXMT_EXP_ODU_SIGTYPE: u8 = 0;
const OFPXMT_EXP_ODU_SIGID: u8 = 1;

// instruction and action types
const OFPIT_WRITE_ACTIONS: u16 = 3;
const OFPIT_APPLY_ACTIONS: u16 = 4;
const OFPAT_OUTPUT: u16 = 0;
const OFPAT_SET_FIELD: u16 = 25;
const OFPMT_OXM: u16 = 1;

fn need(buf: &Bytes, len: usize, what: &str) -> Result<()> {
    if buf.remaining() < len {
        return Err(Error::protocol_decode(format!(
            "truncated {what}: need {len} bytes, have {}",
            buf.remaining()
        )));
    }
    Ok(())
}

fn pad8(len: usize) -> usize {
    (len + 7) / 8 * 8
}

/// ODU signal identifier of the optical transport extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OduSigid {
    /// Tributary port number
    pub tpn: u16,
    /// Number of time slots
    pub tslen: u16,
    /// Time slot bitmap
    pub tsmap: u16,
}

impl fmt::Display for OduSigid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{TPN={}, tslen={}, tsmap={:08b}}}",
            self.tpn, self.tslen, self.tsmap
        )
    }
}

/// A single OXM TLV
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OxmField {
    /// Ingress port
    InPort(u32),
    /// ODU signal type
    OduSigtype(u8),
    /// ODU signal id
    OduSigid(OduSigid),
    /// Anything else, kept opaque
    Other {
        class: u16,
        field: u8,
        has_mask: bool,
        value: Bytes,
    },
}

impl OxmField {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        need(buf, 4, "oxm header")?;
        let class = buf.get_u16();
        let field_and_mask = buf.get_u8();
        let len = buf.get_u8() as usize;
        need(buf, len, "oxm value")?;
        let mut value = buf.split_to(len);

        let field = field_and_mask >> 1;
        let has_mask = field_and_mask & 1 == 1;

        match (class, field, has_mask) {
            (OFPXMC_OPENFLOW_BASIC, OFPXMT_OFB_IN_PORT, false) if len == 4 => {
                Ok(OxmField::InPort(value.get_u32()))
            }
            (OFPXMC_EXPERIMENTER, OFPXMT_EXP_ODU_SIGTYPE, false)
                if len == 5 && value[..4] == ONF_EXPERIMENTER_ID.to_be_bytes() =>
            {
                value.advance(4);
                Ok(OxmField::OduSigtype(value.get_u8()))
            }
            (OFPXMC_EXPERIMENTER, OFPXMT_EXP_ODU_SIGID, false)
                if len == 10 && value[..4] == ONF_EXPERIMENTER_ID.to_be_bytes() =>
            {
                value.advance(4);
                Ok(OxmField::OduSigid(OduSigid {
                    tpn: value.get_u16(),
                    tslen: value.get_u16(),
                    tsmap: value.get_u16(),
                }))
            }
            _ => Ok(OxmField::Other {
                class,
                field,
                has_mask,
                value,
            }),
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        match self {
            OxmField::InPort(port) => {
                dst.put_u16(OFPXMC_OPENFLOW_BASIC);
                dst.put_u8(OFPXMT_OFB_IN_PORT << 1);
                dst.put_u8(4);
                dst.put_u32(*port);
            }
            OxmField::OduSigtype(sigtype) => {
                dst.put_u16(OFPXMC_EXPERIMENTER);
                dst.put_u8(OFPXMT_EXP_ODU_SIGTYPE << 1);
                dst.put_u8(5);
                dst.put_u32(ONF_EXPERIMENTER_ID);
                dst.put_u8(*sigtype);
            }
            OxmField::OduSigid(sigid) => {
                dst.put_u16(OFPXMC_EXPERIMENTER);
                dst.put_u8(OFPXMT_EXP_ODU_SIGID << 1);
                dst.put_u8(10);
                dst.put_u32(ONF_EXPERIMENTER_ID);
                dst.put_u16(sigid.tpn);
                dst.put_u16(sigid.tslen);
                dst.put_u16(sigid.tsmap);
            }
            OxmField::Other {
                class,
                field,
                has_mask,
                value,
            } => {
                dst.put_u16(*class);
                dst.put_u8(field << 1 | *has_mask as u8);
                dst.put_u8(value.len() as u8);
                dst.extend_from_slice(value);
            }
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            OxmField::InPort(_) => 8,
            OxmField::OduSigtype(_) => 9,
            OxmField::OduSigid(_) => 14,
            OxmField::Other { value, .. } => 4 + value.len(),
        }
    }
}

/// Action inside an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Output { port: u32, max_len: u16 },
    SetField(OxmField),
    Other { kind: u16, body: Bytes },
}

impl Action {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        need(buf, 4, "action header")?;
        let kind = buf.get_u16();
        let len = buf.get_u16() as usize;
        if len < 4 {
            return Err(Error::protocol_decode(format!("action length {len} below header")));
        }
        need(buf, len - 4, "action body")?;
        let mut body = buf.split_to(len - 4);

        match kind {
            OFPAT_OUTPUT => {
                need(&body, 6, "output action")?;
                Ok(Action::Output {
                    port: body.get_u32(),
                    max_len: body.get_u16(),
                })
            }
            OFPAT_SET_FIELD => Ok(Action::SetField(OxmField::decode(&mut body)?)),
            _ => Ok(Action::Other { kind, body }),
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        match self {
            Action::Output { port, max_len } => {
                dst.put_u16(OFPAT_OUTPUT);
                dst.put_u16(16);
                dst.put_u32(*port);
                dst.put_u16(*max_len);
                dst.put_bytes(0, 6);
            }
            Action::SetField(field) => {
                let len = pad8(4 + field.encoded_len());
                dst.put_u16(OFPAT_SET_FIELD);
                dst.put_u16(len as u16);
                field.encode(dst);
                dst.put_bytes(0, len - 4 - field.encoded_len());
            }
            Action::Other { kind, body } => {
                dst.put_u16(*kind);
                dst.put_u16((4 + body.len()) as u16);
                dst.extend_from_slice(body);
            }
        }
    }
}

fn decode_actions(mut body: Bytes) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    while body.has_remaining() {
        actions.push(Action::decode(&mut body)?);
    }
    Ok(actions)
}

/// Flow-mod instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    WriteActions(Vec<Action>),
    ApplyActions(Vec<Action>),
    Other { kind: u16, body: Bytes },
}

impl Instruction {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        need(buf, 4, "instruction header")?;
        let kind = buf.get_u16();
        let len = buf.get_u16() as usize;
        if len < 4 {
            return Err(Error::protocol_decode(format!(
                "instruction length {len} below header"
            )));
        }
        need(buf, len - 4, "instruction body")?;
        let mut body = buf.split_to(len - 4);

        match kind {
            OFPIT_WRITE_ACTIONS | OFPIT_APPLY_ACTIONS => {
                need(&body, 4, "instruction padding")?;
                body.advance(4);
                let actions = decode_actions(body)?;
                if kind == OFPIT_WRITE_ACTIONS {
                    Ok(Instruction::WriteActions(actions))
                } else {
                    Ok(Instruction::ApplyActions(actions))
                }
            }
            _ => Ok(Instruction::Other { kind, body }),
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        let (kind, actions) = match self {
            Instruction::WriteActions(actions) => (OFPIT_WRITE_ACTIONS, actions),
            Instruction::ApplyActions(actions) => (OFPIT_APPLY_ACTIONS, actions),
            Instruction::Other { kind, body } => {
                dst.put_u16(*kind);
                dst.put_u16((4 + body.len()) as u16);
                dst.extend_from_slice(body);
                return;
            }
        };

        let mut encoded = BytesMut::new();
        for action in actions {
            action.encode(&mut encoded);
        }
        dst.put_u16(kind);
        dst.put_u16((8 + encoded.len()) as u16);
        dst.put_bytes(0, 4);
        dst.extend_from_slice(&encoded);
    }
}

/// Flow-mod command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowModCommand {
    Add,
    Modify,
    ModifyStrict,
    Delete,
    DeleteStrict,
    Unknown(u8),
}

impl From<u8> for FlowModCommand {
    fn from(raw: u8) -> Self {
        match raw {
            0 => FlowModCommand::Add,
            1 => FlowModCommand::Modify,
            2 => FlowModCommand::ModifyStrict,
            3 => FlowModCommand::Delete,
            4 => FlowModCommand::DeleteStrict,
            other => FlowModCommand::Unknown(other),
        }
    }
}

impl From<FlowModCommand> for u8 {
    fn from(command: FlowModCommand) -> Self {
        match command {
            FlowModCommand::Add => 0,
            FlowModCommand::Modify => 1,
            FlowModCommand::ModifyStrict => 2,
            FlowModCommand::Delete => 3,
            FlowModCommand::DeleteStrict => 4,
            FlowModCommand::Unknown(other) => other,
        }
    }
}

/// Body of an OFPT_FLOW_MOD message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    pub cookie: u64,
    pub cookie_mask: u64,
    pub table_id: u8,
    pub command: FlowModCommand,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub buffer_id: u32,
    pub out_port: u32,
    pub out_group: u32,
    pub flags: u16,
    pub matches: Vec<OxmField>,
    pub instructions: Vec<Instruction>,
}

impl FlowMod {
    /// A flow-mod with the given command and no match or instructions
    pub fn new(command: FlowModCommand) -> Self {
        FlowMod {
            cookie: 0,
            cookie_mask: 0,
            table_id: 0,
            command,
            idle_timeout: 0,
            hard_timeout: 0,
            priority: 0,
            buffer_id: u32::MAX,
            out_port: u32::MAX,
            out_group: u32::MAX,
            flags: 0,
            matches: Vec::new(),
            instructions: Vec::new(),
        }
    }

    fn decode(mut body: Bytes) -> Result<Self> {
        need(&body, 40, "flow mod")?;
        let cookie = body.get_u64();
        let cookie_mask = body.get_u64();
        let table_id = body.get_u8();
        let command = FlowModCommand::from(body.get_u8());
        let idle_timeout = body.get_u16();
        let hard_timeout = body.get_u16();
        let priority = body.get_u16();
        let buffer_id = body.get_u32();
        let out_port = body.get_u32();
        let out_group = body.get_u32();
        let flags = body.get_u16();
        body.advance(2);

        need(&body, 4, "match header")?;
        let match_type = body.get_u16();
        let match_len = body.get_u16() as usize;
        if match_type != OFPMT_OXM || match_len < 4 {
            return Err(Error::protocol_decode(format!(
                "unsupported match type {match_type} length {match_len}"
            )));
        }
        need(&body, pad8(match_len) - 4, "match fields")?;
        let mut fields = body.split_to(match_len - 4);
        body.advance(pad8(match_len) - match_len);

        let mut matches = Vec::new();
        while fields.has_remaining() {
            matches.push(OxmField::decode(&mut fields)?);
        }

        let mut instructions = Vec::new();
        while body.has_remaining() {
            instructions.push(Instruction::decode(&mut body)?);
        }

        Ok(FlowMod {
            cookie,
            cookie_mask,
            table_id,
            command,
            idle_timeout,
            hard_timeout,
            priority,
            buffer_id,
            out_port,
            out_group,
            flags,
            matches,
            instructions,
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u64(self.cookie);
        dst.put_u64(self.cookie_mask);
        dst.put_u8(self.table_id);
        dst.put_u8(self.command.into());
        dst.put_u16(self.idle_timeout);
        dst.put_u16(self.hard_timeout);
        dst.put_u16(self.priority);
        dst.put_u32(self.buffer_id);
        dst.put_u32(self.out_port);
        dst.put_u32(self.out_group);
        dst.put_u16(self.flags);
        dst.put_bytes(0, 2);

        let match_len = 4 + self.matches.iter().map(OxmField::encoded_len).sum::<usize>();
        dst.put_u16(OFPMT_OXM);
        dst.put_u16(match_len as u16);
        for field in &self.matches {
            field.encode(dst);
        }
        dst.put_bytes(0, pad8(match_len) - match_len);

        for instruction in &self.instructions {
            instruction.encode(dst);
        }
    }
}

/// Switch features advertised in a features reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchFeatures {
    pub datapath_id: u64,
    pub n_buffers: u32,
    pub n_tables: u8,
    pub auxiliary_id: u8,
    pub capabilities: u32,
}

impl SwitchFeatures {
    /// Features carrying only the datapath id
    pub fn for_datapath(dpid: DatapathId) -> Self {
        SwitchFeatures {
            datapath_id: dpid.value(),
            n_buffers: 0,
            n_tables: 0,
            auxiliary_id: 0,
            capabilities: 0,
        }
    }
}

/// OpenFlow 1.3 message as seen by the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hello { xid: u32, body: Bytes },
    EchoRequest { xid: u32, data: Bytes },
    EchoReply { xid: u32, data: Bytes },
    FeaturesRequest { xid: u32 },
    FeaturesReply { xid: u32, features: SwitchFeatures },
    MultipartRequest {
        xid: u32,
        kind: u16,
        flags: u16,
        body: Bytes,
    },
    MultipartReply {
        xid: u32,
        kind: u16,
        flags: u16,
        body: Bytes,
    },
    FlowMod { xid: u32, flow_mod: FlowMod },
    /// Any other type, or any non-hello message of another version
    Unknown {
        version: u8,
        msg_type: u8,
        xid: u32,
        body: Bytes,
    },
}

impl Message {
    /// Transaction id
    pub fn xid(&self) -> u32 {
        match self {
            Message::Hello { xid, .. }
            | Message::EchoRequest { xid, .. }
            | Message::EchoReply { xid, .. }
            | Message::FeaturesRequest { xid }
            | Message::FeaturesReply { xid, .. }
            | Message::MultipartRequest { xid, .. }
            | Message::MultipartReply { xid, .. }
            | Message::FlowMod { xid, .. }
            | Message::Unknown { xid, .. } => *xid,
        }
    }

    /// Short name for logs
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Hello { .. } => "Hello",
            Message::EchoRequest { .. } => "Echo Request",
            Message::EchoReply { .. } => "Echo Reply",
            Message::FeaturesRequest { .. } => "Features Request",
            Message::FeaturesReply { .. } => "Features Reply",
            Message::MultipartRequest { .. } => "Multipart Request",
            Message::MultipartReply { .. } => "Multipart Reply",
            Message::FlowMod { .. } => "Flowmod",
            Message::Unknown { .. } => "Unknown",
        }
    }

    fn msg_type(&self) -> u8 {
        match self {
            Message::Hello { .. } => OFPT_HELLO,
            Message::EchoRequest { .. } => OFPT_ECHO_REQUEST,
            Message::EchoReply { .. } => OFPT_ECHO_REPLY,
            Message::FeaturesRequest { .. } => OFPT_FEATURES_REQUEST,
            Message::FeaturesReply { .. } => OFPT_FEATURES_REPLY,
            Message::MultipartRequest { .. } => OFPT_MULTIPART_REQUEST,
            Message::MultipartReply { .. } => OFPT_MULTIPART_REPLY,
            Message::FlowMod { .. } => OFPT_FLOW_MOD,
            Message::Unknown { msg_type, .. } => *msg_type,
        }
    }

    /// Decodes one complete frame, header included
    pub fn decode(mut frame: Bytes) -> Result<Self> {
        need(&frame, HEADER_LEN, "header")?;
        let version = frame.get_u8();
        let msg_type = frame.get_u8();
        let length = frame.get_u16() as usize;
        let xid = frame.get_u32();
        if length != frame.remaining() + HEADER_LEN {
            return Err(Error::protocol_decode(format!(
                "header length {length} does not match frame of {} bytes",
                frame.remaining() + HEADER_LEN
            )));
        }
        let mut body = frame;

        if msg_type == OFPT_HELLO {
            return Ok(Message::Hello { xid, body });
        }
        if version != OPENFLOW_VERSION {
            return Ok(Message::Unknown {
                version,
                msg_type,
                xid,
                body,
            });
        }

        match msg_type {
            OFPT_ECHO_REQUEST => Ok(Message::EchoRequest { xid, data: body }),
            OFPT_ECHO_REPLY => Ok(Message::EchoReply { xid, data: body }),
            OFPT_FEATURES_REQUEST => Ok(Message::FeaturesRequest { xid }),
            OFPT_FEATURES_REPLY => {
                need(&body, 24, "features reply")?;
                let datapath_id = body.get_u64();
                let n_buffers = body.get_u32();
                let n_tables = body.get_u8();
                let auxiliary_id = body.get_u8();
                body.advance(2);
                let capabilities = body.get_u32();
                Ok(Message::FeaturesReply {
                    xid,
                    features: SwitchFeatures {
                        datapath_id,
                        n_buffers,
                        n_tables,
                        auxiliary_id,
                        capabilities,
                    },
                })
            }
            OFPT_MULTIPART_REQUEST | OFPT_MULTIPART_REPLY => {
                need(&body, 8, "multipart header")?;
                let kind = body.get_u16();
                let flags = body.get_u16();
                body.advance(4);
                if msg_type == OFPT_MULTIPART_REQUEST {
                    Ok(Message::MultipartRequest {
                        xid,
                        kind,
                        flags,
                        body,
                    })
                } else {
                    Ok(Message::MultipartReply {
                        xid,
                        kind,
                        flags,
                        body,
                    })
                }
            }
            OFPT_FLOW_MOD => Ok(Message::FlowMod {
                xid,
                flow_mod: FlowMod::decode(body)?,
            }),
            _ => Ok(Message::Unknown {
                version,
                msg_type,
                xid,
                body,
            }),
        }
    }

    /// Appends the encoded frame to `dst`
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();
        let version = match self {
            Message::Unknown { version, .. } => *version,
            _ => OPENFLOW_VERSION,
        };
        dst.put_u8(version);
        dst.put_u8(self.msg_type());
        dst.put_u16(0);
        dst.put_u32(self.xid());

        match self {
            Message::Hello { body, .. } | Message::Unknown { body, .. } => {
                dst.extend_from_slice(body)
            }
            Message::EchoRequest { data, .. } | Message::EchoReply { data, .. } => {
                dst.extend_from_slice(data)
            }
            Message::FeaturesRequest { .. } => {}
            Message::FeaturesReply { features, .. } => {
                dst.put_u64(features.datapath_id);
                dst.put_u32(features.n_buffers);
                dst.put_u8(features.n_tables);
                dst.put_u8(features.auxiliary_id);
                dst.put_bytes(0, 2);
                dst.put_u32(features.capabilities);
                dst.put_u32(0);
            }
            Message::MultipartRequest {
                kind, flags, body, ..
            }
            | Message::MultipartReply {
                kind, flags, body, ..
            } => {
                dst.put_u16(*kind);
                dst.put_u16(*flags);
                dst.put_bytes(0, 4);
                dst.extend_from_slice(body);
            }
            Message::FlowMod { flow_mod, .. } => flow_mod.encode(dst),
        }

        let length = dst.len() - start;
        if length > u16::MAX as usize {
            dst.truncate(start);
            return Err(Error::protocol(format!("message of {length} bytes exceeds frame limit")));
        }
        dst[start + 2..start + 4].copy_from_slice(&(length as u16).to_be_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(message: &Message) -> Bytes {
        let mut buf = BytesMut::new();
        message.encode(&mut buf).unwrap();
        buf.freeze()
    }

    #[test]
    fn test_features_reply_layout() {
        let reply = Message::FeaturesReply {
            xid: 9,
            features: SwitchFeatures::for_datapath(DatapathId::new(0x0102).unwrap()),
        };
        let bytes = frame(&reply);
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..8], &[4, OFPT_FEATURES_REPLY, 0, 32, 0, 0, 0, 9]);
        assert_eq!(&bytes[8..16], &[0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_port_desc_reply_layout() {
        let reply = Message::MultipartReply {
            xid: 3,
            kind: OFPMP_PORT_DESC,
            flags: 0,
            body: Bytes::new(),
        };
        let bytes = frame(&reply);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[8..10], &[0, 13]);
    }

    #[test]
    fn test_flow_mod_with_otn_fields() {
        let mut flow_mod = FlowMod::new(FlowModCommand::Add);
        flow_mod.matches = vec![
            OxmField::InPort(5),
            OxmField::OduSigtype(2),
            OxmField::OduSigid(OduSigid {
                tpn: 1,
                tslen: 8,
                tsmap: 0b1010,
            }),
        ];
        flow_mod.instructions = vec![Instruction::WriteActions(vec![
            Action::SetField(OxmField::OduSigtype(3)),
            Action::Output {
                port: 9,
                max_len: 0,
            },
        ])];
        let message = Message::FlowMod { xid: 42, flow_mod };

        let bytes = frame(&message);
        // header + fixed part + padded match
        assert_eq!((bytes.len() - 8 - 40) % 8, 0);
        assert_eq!(Message::decode(bytes).unwrap(), message);
    }

    #[test]
    fn test_foreign_version_is_unknown() {
        let raw = Bytes::from_static(&[1, OFPT_FLOW_MOD, 0, 8, 0, 0, 0, 1]);
        assert!(matches!(
            Message::decode(raw).unwrap(),
            Message::Unknown { version: 1, .. }
        ));
    }

    #[test]
    fn test_hello_of_any_version() {
        let raw = Bytes::from_static(&[
            6, OFPT_HELLO, 0, 16, 0, 0, 0, 1, 0, 1, 0, 8, 0, 0, 0, 0x50,
        ]);
        assert!(matches!(Message::decode(raw).unwrap(), Message::Hello { xid: 1, .. }));
    }

    #[test]
    fn test_truncated_flow_mod_is_error() {
        let raw = Bytes::from_static(&[4, OFPT_FLOW_MOD, 0, 12, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert!(matches!(Message::decode(raw), Err(Error::ProtocolDecode(_))));
    }

    #[test]
    fn test_sigid_display() {
        let sigid = OduSigid {
            tpn: 3,
            tslen: 2,
            tsmap: 0b11,
        };
        assert_eq!(sigid.to_string(), "{TPN=3, tslen=2, tsmap=00000011}");
    }
}
