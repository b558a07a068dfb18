use num_enum::{FromPrimitive, IntoPrimitive};
use std::borrow::Cow;

/// The command_status field of an SMPP message response indicates the success
/// or failure of an SMPP request. It is relevant only in the SMPP response
/// message and should be set to NULL in SMPP request messages.
///
/// Codes outside the SMPP v3.4 table (reserved, SMPP extension and SMSC vendor
/// ranges) decode to `Other` rather than failing.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    /// No Error
    Ok = 0x00000000,

    /// Message Length is invalid
    InvalidMsgLength = 0x00000001,

    /// Command Length is invalid
    InvalidCommandLength = 0x00000002,

    /// Invalid Command ID
    InvalidCommandId = 0x00000003,

    /// Incorrect BIND Status for given command
    IncorrectBindStatus = 0x00000004,

    /// ESME Already in Bound State
    AlreadyBoundState = 0x00000005,

    /// Invalid Priority Flag
    InvalidPriorityFlag = 0x00000006,

    /// Invalid Registered Delivery Flag
    InvalidRegisteredDeliveryFlag = 0x00000007,

    /// System Error
    SystemError = 0x00000008,

    // Reserved   0x00000009
    /// Invalid Source Address
    InvalidSourceAddress = 0x0000000A,

    /// Invalid Dest Addr
    InvalidDestinationAddress = 0x0000000B,

    /// Message ID is invalid
    InvalidMessageId = 0x0000000C,

    /// Bind Failed
    BindFailed = 0x0000000D,

    /// Invalid Password
    InvalidPassword = 0x0000000E,

    /// Invalid System ID
    InvalidSystemId = 0x0000000F,

    // Reserved 0x00000010
    /// Cancel SM Failed
    CancelSmFailed = 0x00000011,

    // Reserved 0x00000012
    /// Replace SM Failed
    ReplaceSmFailed = 0x00000013,

    /// Message Queue Full
    MessageQueueFull = 0x00000014,

    /// Invalid Service Type
    InvalidServiceType = 0x00000015,

    // Reserved 0x00000016 - 0x00000032
    /// Invalid number of destinations
    InvalidNumberOfDestinations = 0x00000033,

    /// Invalid Distribution List name
    InvalidDistributionListName = 0x00000034,

    // Reserved 0x00000035 - 0x0000003F
    /// Destination flag is invalid (submit_multi)
    InvalidDestinationFlag = 0x00000040,

    // Reserved    0x00000041
    /// Invalid 'submit with replace' request
    InvalidSubmitWithReplaceRequest = 0x00000042,

    /// Invalid esm_class field data
    InvalidEsmClassFieldData = 0x00000043,

    /// Cannot Submit to Distribution List
    CannotSubmitToDistributionList = 0x00000044,

    /// submit_sm or submit_multi failed
    SubmitFailed = 0x00000045,

    // Reserved 0x00000046 - 0x00000047
    /// Invalid Source address TON
    InvalidSourceAddressTon = 0x00000048,

    /// Invalid Source address NPI
    InvalidSourceAddressNpi = 0x00000049,

    /// Invalid Destination address TON
    InvalidDestinationAddressTon = 0x00000050,

    /// Invalid Destination address NPI
    InvalidDestinationAddressNpi = 0x00000051,

    // Reserved 0x00000052
    /// Invalid system_type field
    InvalidSystemTypeField = 0x00000053,
    /// Invalid replace_if_present flag
    InvalidReplaceIfPresentFlag = 0x00000054,
    /// Invalid number of messages
    InvalidNumberOfMessages = 0x00000055,

    // Reserved 0x00000056 - 0x00000057
    /// Throttling error (ESME has exceeded allowed message limits)
    ThrottlingError = 0x00000058,

    // Reserved 0x00000059 - 0x00000060
    /// Invalid Scheduled Delivery Time
    InvalidScheduledDeliveryTime = 0x00000061,
    /// Invalid message validity period (Expiry time)
    InvalidExpiryTime = 0x00000062,
    /// Predefined Message Invalid or Not Found
    InvalidPredefinedMessageId = 0x00000063,
    /// ESME Receiver Temporary App Error Code
    ReceiverTemporaryAppError = 0x00000064,
    /// ESME Receiver Permanent App Error Code
    ReceiverPermanentAppError = 0x00000065,
    /// ESME Receiver Reject Message Error Code
    ReceiverRejectMessageError = 0x00000066,
    /// query_sm request failed
    QuerySmRequestFailed = 0x00000067,

    // Reserved 0x00000068 - 0x000000BF
    /// Error in the optional part of the PDU Body.
    ErrorInOptionalPartOfPduBody = 0x000000C0,
    /// Optional Parameter not allowed
    OptionalParameterNotAllowed = 0x000000C1,
    /// Invalid Parameter Length.
    InvalidParameterLength = 0x000000C2,
    /// Expected Optional Parameter missing
    ExpectedOptionalParameterMissing = 0x000000C3,
    /// Invalid Optional Parameter Value
    InvalidOptionalParameterValue = 0x000000C4,

    // Reserved 0x000000C5 - 0x000000FD
    /// Delivery Failure (used for data_sm_resp)
    DeliveryFailed = 0x000000FE,

    /// Unknown Error
    UnknownError = 0x000000FF,

    // Reserved for SMPP extension 0x00000100 - 0x000003FF
    // Reserved for SMSC vendor specific errors 0x00000400 - 0x000004FF
    // Reserved 0x00000500 - 0xFFFFFFFF
    #[num_enum(catch_all)]
    Other(u32),
}

impl CommandStatus {
    /// Short human-readable description, as reported to operators.
    pub fn description(&self) -> Cow<'static, str> {
        let text = match self {
            CommandStatus::Ok => "No Error",
            CommandStatus::InvalidMsgLength => "Message Length is invalid",
            CommandStatus::InvalidCommandLength => "Command Length is invalid",
            CommandStatus::InvalidCommandId => "Invalid Command ID",
            CommandStatus::IncorrectBindStatus => "Incorrect BIND Status for given command",
            CommandStatus::AlreadyBoundState => "ESME Already in Bound State",
            CommandStatus::InvalidPriorityFlag => "Invalid Priority Flag",
            CommandStatus::InvalidRegisteredDeliveryFlag => "Invalid Registered Delivery Flag",
            CommandStatus::SystemError => "System Error",
            CommandStatus::InvalidSourceAddress => "Invalid Source Address",
            CommandStatus::InvalidDestinationAddress => "Invalid Dest Addr",
            CommandStatus::InvalidMessageId => "Message ID is invalid",
            CommandStatus::BindFailed => "Bind Failed",
            CommandStatus::InvalidPassword => "Invalid Password",
            CommandStatus::InvalidSystemId => "Invalid System ID",
            CommandStatus::CancelSmFailed => "Cancel SM Failed",
            CommandStatus::ReplaceSmFailed => "Replace SM Failed",
            CommandStatus::MessageQueueFull => "Message Queue Full",
            CommandStatus::InvalidServiceType => "Invalid Service Type",
            CommandStatus::InvalidNumberOfDestinations => "Invalid number of destinations",
            CommandStatus::InvalidDistributionListName => "Invalid Distribution List name",
            CommandStatus::InvalidDestinationFlag => "Destination flag is invalid",
            CommandStatus::InvalidSubmitWithReplaceRequest => {
                "Invalid 'submit with replace' request"
            }
            CommandStatus::InvalidEsmClassFieldData => "Invalid esm_class field data",
            CommandStatus::CannotSubmitToDistributionList => "Cannot Submit to Distribution List",
            CommandStatus::SubmitFailed => "submit_sm or submit_multi failed",
            CommandStatus::InvalidSourceAddressTon => "Invalid Source address TON",
            CommandStatus::InvalidSourceAddressNpi => "Invalid Source address NPI",
            CommandStatus::InvalidDestinationAddressTon => "Invalid Destination address TON",
            CommandStatus::InvalidDestinationAddressNpi => "Invalid Destination address NPI",
            CommandStatus::InvalidSystemTypeField => "Invalid system_type field",
            CommandStatus::InvalidReplaceIfPresentFlag => "Invalid replace_if_present flag",
            CommandStatus::InvalidNumberOfMessages => "Invalid number of messages",
            CommandStatus::ThrottlingError => {
                "Throttling error (ESME has exceeded allowed message limits)"
            }
            CommandStatus::InvalidScheduledDeliveryTime => "Invalid Scheduled Delivery Time",
            CommandStatus::InvalidExpiryTime => "Invalid message validity period value",
            CommandStatus::InvalidPredefinedMessageId => "Predefined Message Invalid or Not Found",
            CommandStatus::ReceiverTemporaryAppError => "ESME Receiver Temporary App Error Code",
            CommandStatus::ReceiverPermanentAppError => "ESME Receiver Permanent App Error Code",
            CommandStatus::ReceiverRejectMessageError => "ESME Receiver Reject Message Error Code",
            CommandStatus::QuerySmRequestFailed => "query_sm request failed",
            CommandStatus::ErrorInOptionalPartOfPduBody => {
                "Error in the optional part of the PDU Body"
            }
            CommandStatus::OptionalParameterNotAllowed => "Optional Parameter not allowed",
            CommandStatus::InvalidParameterLength => "Invalid Parameter Length",
            CommandStatus::ExpectedOptionalParameterMissing => {
                "Expected Optional Parameter missing"
            }
            CommandStatus::InvalidOptionalParameterValue => "Invalid Optional Parameter Value",
            CommandStatus::DeliveryFailed => "Delivery Failure (used for data_sm_resp)",
            CommandStatus::UnknownError => "Unknown Error",
            CommandStatus::Other(code) => {
                return Cow::Owned(format!("Unknown Status Code: 0x{code:08X}"));
            }
        };
        Cow::Borrowed(text)
    }

    /// The raw wire value
    pub fn code(&self) -> u32 {
        u32::from(*self)
    }

    pub fn is_ok(&self) -> bool {
        *self == CommandStatus::Ok
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X} ({})", self.code(), self.description())
    }
}

/// Looks up the description for any raw command_status value.
///
/// Never fails: codes outside the known table produce
/// `"Unknown Status Code: 0x…"`.
pub fn describe(status: u32) -> Cow<'static, str> {
    CommandStatus::from(status).description()
}
