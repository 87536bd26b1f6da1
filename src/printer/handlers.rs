//! Per-kind message handlers.
//!
//! Each handler is a pure function from a record's payload to a [`Delta`]; the
//! engine owns applying it. This keeps field extraction and scaling testable
//! without standing up an engine or a clock.

use crate::protocol::{self, CommandType, EventFields};

/// Temperatures arrive in hundredths of a degree.
const TEMPERATURE_SCALE: f64 = 100.0;
/// Progress arrives in hundredths of a percent.
const PROGRESS_SCALE: f64 = 10_000.0;
/// Filament usage arrives in millimetres.
const FILAMENT_SCALE: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleUpdate {
    pub job_name: String,
    pub image: String,
    pub progress: f64,
    pub elapsed_time: u64,
    pub remaining_time: u64,
    pub ai_enabled: bool,
    pub ai_sensitivity: u64,
    pub ai_pause_on_detect: bool,
    pub ai_data_consent: bool,
    pub filament_used: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub current: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub code: String,
    pub level: String,
    pub ext: String,
    /// Resolved message, or the raw code when it is not in the table.
    pub message: String,
    pub known: bool,
}

/// Change requested by a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    Schedule(ScheduleUpdate),
    Layer { current: u64, total: u64 },
    /// Also refreshes the heartbeat.
    NozzleTemp(Temperature),
    BedTemp(Temperature),
    FanSpeed(u64),
    PrintSpeed(u64),
    MaxPrintSpeed(u64),
    MotorLock(bool),
    NozzleType(String),
    Leveled(bool),
    /// The control message says nothing about the new state, only that it
    /// flipped.
    TogglePause,
    Reset,
    /// Resets only when the print has finished.
    ResetIfFinished,
    Error(ErrorReport),
}

pub type Handler = fn(&EventFields) -> Delta;

/// Handler for a kind, or `None` for kinds that are recognised but inert.
pub fn handler_for(kind: CommandType) -> Option<Handler> {
    let handler: Handler = match kind {
        CommandType::EventNotify => event_notify,
        CommandType::PrintSchedule => print_schedule,
        CommandType::ModelLayer => model_layer,
        CommandType::NozzleTemp => nozzle_temp,
        CommandType::HotbedTemp => hotbed_temp,
        CommandType::FanSpeed => fan_speed,
        CommandType::PrintSpeed => print_speed,
        CommandType::MaxPrintSpeed => max_print_speed,
        CommandType::MotorLock => motor_lock,
        CommandType::NozzleType => nozzle_type,
        CommandType::IsLeveled => is_leveled,
        CommandType::PrintControl => print_control,
        CommandType::PrintStopped => print_stopped,
        CommandType::ErrorCode => error_code,
        _ => return None,
    };
    Some(handler)
}

fn event_notify(_: &EventFields) -> Delta {
    Delta::ResetIfFinished
}

fn print_schedule(f: &EventFields) -> Delta {
    Delta::Schedule(ScheduleUpdate {
        job_name: f.text("name"),
        image: f.text("img"),
        progress: (f.float("progress") / PROGRESS_SCALE).clamp(0.0, 1.0),
        elapsed_time: f.uint("totalTime"),
        remaining_time: f.uint("time"),
        ai_enabled: f.flag("aiFlag"),
        ai_sensitivity: f.uint("aiLevel"),
        ai_pause_on_detect: f.flag("aiPausePrint"),
        ai_data_consent: f.flag("aiJoinImprove"),
        filament_used: f.float("filamentUsed").max(0.0) / FILAMENT_SCALE,
    })
}

fn model_layer(f: &EventFields) -> Delta {
    Delta::Layer {
        current: f.uint("real_print_layer"),
        total: f.uint("total_layer"),
    }
}

fn temperature(f: &EventFields) -> Temperature {
    Temperature {
        current: f.float("currentTemp") / TEMPERATURE_SCALE,
        target: f.float("targetTemp") / TEMPERATURE_SCALE,
    }
}

fn nozzle_temp(f: &EventFields) -> Delta {
    Delta::NozzleTemp(temperature(f))
}

fn hotbed_temp(f: &EventFields) -> Delta {
    Delta::BedTemp(temperature(f))
}

fn fan_speed(f: &EventFields) -> Delta {
    Delta::FanSpeed(f.uint("value"))
}

fn print_speed(f: &EventFields) -> Delta {
    Delta::PrintSpeed(f.uint("value"))
}

fn max_print_speed(f: &EventFields) -> Delta {
    Delta::MaxPrintSpeed(f.uint("max_print_speed"))
}

fn motor_lock(f: &EventFields) -> Delta {
    Delta::MotorLock(f.flag("lock"))
}

fn nozzle_type(f: &EventFields) -> Delta {
    Delta::NozzleType(protocol::nozzle_name(&f.text("nozzle_type")))
}

fn is_leveled(f: &EventFields) -> Delta {
    Delta::Leveled(f.flag("isLeveled"))
}

fn print_control(_: &EventFields) -> Delta {
    Delta::TogglePause
}

fn print_stopped(_: &EventFields) -> Delta {
    Delta::Reset
}

fn error_code(f: &EventFields) -> Delta {
    let code = f.text("errorCode");
    let (message, known) = match protocol::error_description(&code) {
        Some(message) => (message.to_string(), true),
        None => (code.clone(), false),
    };
    Delta::Error(ErrorReport {
        code,
        level: f.text("errorLevel"),
        ext: f.text("ext"),
        message,
        known,
    })
}
