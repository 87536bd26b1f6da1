use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filament::FilamentType;

/// AI print-monitoring settings reported alongside job progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiSettings {
    pub enabled: bool,
    pub sensitivity: u64,
    pub pause_on_detect: bool,
    pub data_consent: bool,
}

/// Best-known state of one printer.
///
/// `Default` is the reset state: every field at its zero value. Resets always
/// replace the whole struct so no stale field survives into the next job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrinterSnapshot {
    pub job_name: String,
    pub image: String,

    /// Fraction in `[0, 1]`.
    pub progress: f64,
    /// Seconds.
    pub elapsed_time: u64,
    pub remaining_time: u64,
    pub total_time: u64,
    pub print_start_time: Option<DateTime<Utc>>,
    pub print_est_finish_time: Option<DateTime<Utc>>,

    pub hotend_temp: f64,
    pub target_hotend_temp: f64,
    pub bed_temp: f64,
    pub target_bed_temp: f64,

    pub fan_speed: u64,
    pub current_speed: u64,
    pub max_speed: u64,
    pub current_layer: u64,
    pub total_layers: u64,

    pub nozzle_type: String,
    pub bed_leveled: bool,
    pub motor_locked: bool,
    pub paused: bool,

    pub filament: FilamentType,
    /// Metres.
    pub filament_used: f64,

    pub error_message: String,
    pub error_level: String,
    pub error_ext: String,

    pub ai: AiSettings,
}

impl PrinterSnapshot {
    /// A job is loaded whenever the printer reports a job name.
    pub fn printing(&self) -> bool {
        !self.job_name.is_empty()
    }

    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }

    pub fn is_heating(&self) -> bool {
        let hotend = self.target_hotend_temp - 5.0 > self.hotend_temp && self.hotend_temp > 30.0;
        let bed = self.target_bed_temp - 2.0 > self.bed_temp && self.bed_temp > 30.0;
        hotend || bed
    }

    pub(crate) fn clear_error(&mut self) {
        self.error_message.clear();
        self.error_level.clear();
    }
}
