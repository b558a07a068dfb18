// ABOUTME: bind_transmitter / bind_receiver / bind_transceiver requests and their responses
// ABOUTME: One body layout serves all three modes; the mode only selects the command_id

use crate::codec::{
    decode_cstring, decode_fixed, decode_u8, encode_fixed, expect_command_id, CodecError,
    Decodable, Encodable, PduHeader,
};
use crate::datatypes::{
    AddressRange, BindMode, CommandId, CommandStatus, InterfaceVersion, NumericPlanIndicator,
    Password, SystemId, SystemType, TypeOfNumber,
};
use bytes::{BufMut, BytesMut};
use std::io::Cursor;

/// Size of the mandatory bind body: system_id[16] + password[9] +
/// system_type[13] + interface_version + addr_ton + addr_npi + address_range[41]
pub const BIND_BODY_SIZE: usize = 16 + 9 + 13 + 1 + 1 + 1 + 41;

/// A bind request in any of the three modes.
#[derive(Clone, Debug, PartialEq)]
pub struct Bind {
    pub mode: BindMode,
    pub sequence_number: u32,

    // Body
    /// 5.2.1 system_id: identification of the ESME requesting to bind.
    pub system_id: SystemId,

    /// 5.2.2 password: used by the SMSC to authenticate the ESME.
    pub password: Password,

    /// 5.2.3 system_type: categorizes the type of ESME. Empty for the tester.
    pub system_type: SystemType,

    /// 5.2.4 interface_version: SMPP version supported by the ESME.
    pub interface_version: InterfaceVersion,

    /// 5.2.5 addr_ton: Type of Number of the ESME address range.
    pub addr_ton: TypeOfNumber,

    /// 5.2.6 addr_npi: Numbering Plan Indicator of the ESME address range.
    pub addr_npi: NumericPlanIndicator,

    /// 5.2.7 address_range: SME addresses served by the ESME. Empty for the
    /// tester.
    pub address_range: AddressRange,
}

impl Bind {
    /// A v3.4 bind with empty system_type / address_range and TON/NPI 0.
    ///
    /// Credentials longer than their fields are truncated, not rejected.
    pub fn new(mode: BindMode, sequence_number: u32, system_id: &str, password: &str) -> Self {
        Self {
            mode,
            sequence_number,
            system_id: SystemId::from(system_id),
            password: Password::from(password),
            system_type: SystemType::default(),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: TypeOfNumber::Unknown,
            addr_npi: NumericPlanIndicator::Unknown,
            address_range: AddressRange::default(),
        }
    }
}

impl Encodable for Bind {
    fn command_id(&self) -> CommandId {
        self.mode.request_id()
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        encode_fixed(buf, &self.system_id);
        encode_fixed(buf, &self.password);
        encode_fixed(buf, &self.system_type);
        buf.put_u8(self.interface_version as u8);
        buf.put_u8(self.addr_ton as u8);
        buf.put_u8(self.addr_npi as u8);
        encode_fixed(buf, &self.address_range);
    }

    fn encoded_size(&self) -> usize {
        PduHeader::SIZE + BIND_BODY_SIZE
    }
}

impl Decodable for Bind {
    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let mode = BindMode::from_request_id(header.command_id).ok_or(
            CodecError::UnexpectedCommandId {
                expected: CommandId::BindTransceiver,
                actual: header.command_id,
            },
        )?;

        let system_id = decode_fixed(buf)?;
        let password = decode_fixed(buf)?;
        let system_type = decode_fixed(buf)?;

        let version = decode_u8(buf)?;
        let interface_version =
            InterfaceVersion::try_from(version).map_err(|_| CodecError::FieldValidation {
                field: "interface_version",
                reason: format!("unsupported version {version:#04x}"),
            })?;

        let ton = decode_u8(buf)?;
        let addr_ton = TypeOfNumber::try_from(ton).map_err(|_| CodecError::FieldValidation {
            field: "addr_ton",
            reason: format!("unknown TON {ton:#04x}"),
        })?;

        let npi = decode_u8(buf)?;
        let addr_npi =
            NumericPlanIndicator::try_from(npi).map_err(|_| CodecError::FieldValidation {
                field: "addr_npi",
                reason: format!("unknown NPI {npi:#04x}"),
            })?;

        let address_range = decode_fixed(buf)?;

        Ok(Bind {
            mode,
            sequence_number: header.sequence_number,
            system_id,
            password,
            system_type,
            interface_version,
            addr_ton,
            addr_npi,
            address_range,
        })
    }
}

/// bind_*_resp. The body (SMSC system_id plus optional TLVs) may be absent
/// when the bind is rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct BindResponse {
    pub mode: BindMode,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
    /// Identifies the SMSC to the ESME; empty if the body was omitted
    pub system_id: String,
}

impl BindResponse {
    pub fn new(mode: BindMode, sequence_number: u32, system_id: impl Into<String>) -> Self {
        Self {
            mode,
            command_status: CommandStatus::Ok,
            sequence_number,
            system_id: system_id.into(),
        }
    }

    pub fn error(mode: BindMode, sequence_number: u32, status: CommandStatus) -> Self {
        Self {
            mode,
            command_status: status,
            sequence_number,
            system_id: String::new(),
        }
    }

    /// Decode a response that must belong to `mode`
    pub fn decode_for(
        mode: BindMode,
        header: PduHeader,
        buf: &mut Cursor<&[u8]>,
    ) -> Result<Self, CodecError> {
        expect_command_id(&header, mode.response_id())?;
        Self::decode(header, buf)
    }
}

impl Encodable for BindResponse {
    fn command_id(&self) -> CommandId {
        self.mode.response_id()
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn command_status(&self) -> CommandStatus {
        self.command_status
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        // Rejections conventionally carry no body
        if self.command_status.is_ok() {
            let system_id = SystemId::from(self.system_id.as_str());
            buf.put_slice(system_id.as_str_bytes());
            buf.put_u8(0);
        }
    }
}

impl Decodable for BindResponse {
    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let mode = BindMode::from_response_id(header.command_id).ok_or(
            CodecError::UnexpectedCommandId {
                expected: CommandId::BindTransceiverResp,
                actual: header.command_id,
            },
        )?;

        // Optional TLVs (sc_interface_version) after the system_id are ignored
        let system_id = decode_cstring(buf, 16, "system_id")?;

        Ok(BindResponse {
            mode,
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            system_id,
        })
    }
}
