//! Message kinds and record decoding for the printer's MQTT relay.
//!
//! Each inbound message is a flat JSON object whose `commandType` member picks
//! the kind; every other member is a loosely typed payload field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message kinds known to be emitted by the printer.
///
/// Only a handful of these carry state we track; the rest are recognised so
/// that they can be ignored without being reported as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    EventNotify,
    PrintSchedule,
    FirmwareVersion,
    NozzleTemp,
    HotbedTemp,
    FanSpeed,
    PrintSpeed,
    AutoLeveling,
    PrintControl,
    FileListRequest,
    GcodeFileRequest,
    AllowFirmwareUpdate,
    GcodeFileDownload,
    ZAxisRecoup,
    ExtrusionStep,
    EnterOrQuitMaterial,
    MoveStep,
    MoveDirection,
    MoveZero,
    AppQueryStatus,
    OnlineNotify,
    AppRecoverFactory,
    BleOnOff,
    DeleteGcodeFile,
    DeviceNameSet,
    DeviceLogUpload,
    OnOffModal,
    MotorLock,
    PreheatConfig,
    BreakPoint,
    AiCalib,
    VideoOnOff,
    AdvancedParameters,
    GcodeCommand,
    PreviewImageUrl,
    SystemCheck,
    AiSwitch,
    AiInfoCheck,
    ModelLayer,
    MaxPrintSpeed,
    PrintStopped,
    IsLeveled,
    Unknown1081,
    Unknown1084,
    ErrorCode,
    NozzleType,
    GcodeTransport,
    AlexaMessage,
}

impl CommandType {
    /// Map a raw discriminator onto a known kind.
    pub fn from_code(code: u32) -> Option<Self> {
        use CommandType::*;
        let kind = match code {
            1000 => EventNotify,
            1001 => PrintSchedule,
            1002 => FirmwareVersion,
            1003 => NozzleTemp,
            1004 => HotbedTemp,
            1005 => FanSpeed,
            1006 => PrintSpeed,
            1007 => AutoLeveling,
            1008 => PrintControl,
            1009 => FileListRequest,
            1010 => GcodeFileRequest,
            1011 => AllowFirmwareUpdate,
            1020 => GcodeFileDownload,
            1021 => ZAxisRecoup,
            1022 => ExtrusionStep,
            1023 => EnterOrQuitMaterial,
            1024 => MoveStep,
            1025 => MoveDirection,
            1026 => MoveZero,
            1027 => AppQueryStatus,
            1028 => OnlineNotify,
            1029 => AppRecoverFactory,
            1031 => BleOnOff,
            // Also used for the "reset gcode param" message.
            1032 => DeleteGcodeFile,
            1034 => DeviceNameSet,
            1035 => DeviceLogUpload,
            1036 => OnOffModal,
            1037 => MotorLock,
            1038 => PreheatConfig,
            1039 => BreakPoint,
            1040 => AiCalib,
            1041 => VideoOnOff,
            1042 => AdvancedParameters,
            1043 => GcodeCommand,
            1044 => PreviewImageUrl,
            1049 => SystemCheck,
            1050 => AiSwitch,
            1051 => AiInfoCheck,
            1052 => ModelLayer,
            1055 => MaxPrintSpeed,
            1068 => PrintStopped,
            1072 => IsLeveled,
            1081 => Unknown1081,
            1084 => Unknown1084,
            1085 => ErrorCode,
            1093 => NozzleType,
            2018 => GcodeTransport,
            3000 => AlexaMessage,
            _ => return None,
        };
        Some(kind)
    }
}

/// Loosely typed payload of a record.
///
/// All getters are forgiving: a missing key or a value of the wrong shape
/// yields the zero value instead of an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventFields(Map<String, Value>);

impl EventFields {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn float(&self, key: &str) -> f64 {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            Some(Value::Bool(b)) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    /// Non-negative integer; fractional values are truncated.
    pub fn uint(&self, key: &str) -> u64 {
        let value = self.float(key);
        if value.is_finite() && value > 0.0 {
            value as u64
        } else {
            0
        }
    }

    /// Boolean-coded field: `1` or `true` means set.
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(_) => self.float(key) == 1.0,
            None => false,
        }
    }

    /// Text value; numbers are stringified, anything else is empty.
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(v @ (Value::Object(_) | Value::Array(_))) => v.to_string(),
            _ => String::new(),
        }
    }
}

/// A decoded message: kind discriminator plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "commandType")]
    pub kind: u32,
    #[serde(flatten)]
    pub fields: EventFields,
}

impl EventRecord {
    pub fn new(kind: u32, fields: EventFields) -> Self {
        Self { kind, fields }
    }

    /// Decode a single JSON message.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn command_type(&self) -> Option<CommandType> {
        CommandType::from_code(self.kind)
    }
}

/// Nozzle name for a reported nozzle code, falling back to the code itself.
pub fn nozzle_name(code: &str) -> String {
    match code {
        "0" => "Standard".to_string(),
        other => other.to_string(),
    }
}

/// Message for a known error code.
pub fn error_description(code: &str) -> Option<&'static str> {
    match code {
        "0xFF01030001" => Some("Filament Broken"),
        "0xFF01030005" => Some("Failed to transfer Gcode, please try again."),
        _ => None,
    }
}

/// Severity attached to an error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Error,
    Unknown,
}

impl ErrorSeverity {
    pub fn from_level(level: &str) -> Self {
        match level {
            // Seen before printing, usually gcode related.
            "P0" => ErrorSeverity::Info,
            // Seen mid-print, usually filament related.
            "P1" => ErrorSeverity::Error,
            _ => ErrorSeverity::Unknown,
        }
    }
}
