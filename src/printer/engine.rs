use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use super::EngineError;
use super::handlers::{self, Delta};
use super::snapshot::{AiSettings, PrinterSnapshot};
use super::status::PrinterStatus;
use super::status_document::StatusDocument;
use crate::filament::{self, FilamentType};
use crate::protocol::{ErrorSeverity, EventRecord};

pub const DEFAULT_HEARTBEAT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// State engine for a single printer.
///
/// Every record goes through [`PrinterEngine::dispatch_at`]. Status is derived
/// from the snapshot on demand; [`PrinterEngine::evaluate_and_transition_at`]
/// additionally runs the transition bookkeeping (finish time, error clearing,
/// resets) and must be treated as a write.
#[derive(Debug, Clone)]
pub struct PrinterEngine {
    snapshot: PrinterSnapshot,
    last_heartbeat: DateTime<Utc>,
    previous_status: Option<PrinterStatus>,
    previous_job_name: String,
    status_document: StatusDocument,
    heartbeat_timeout: TimeDelta,
}

impl Default for PrinterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PrinterEngine {
    pub fn new() -> Self {
        Self::with_heartbeat_timeout(DEFAULT_HEARTBEAT_TIMEOUT)
    }

    pub fn with_heartbeat_timeout(timeout: std::time::Duration) -> Self {
        Self {
            snapshot: PrinterSnapshot::default(),
            // Reads as offline until the first pulse.
            last_heartbeat: DateTime::UNIX_EPOCH,
            previous_status: None,
            previous_job_name: String::new(),
            status_document: StatusDocument::default(),
            heartbeat_timeout: TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn snapshot(&self) -> &PrinterSnapshot {
        &self.snapshot
    }

    pub fn last_heartbeat(&self) -> DateTime<Utc> {
        self.last_heartbeat
    }

    pub fn dispatch(&mut self, record: &EventRecord) -> Result<(), EngineError> {
        self.dispatch_at(record, Utc::now())
    }

    /// Apply one record. Only a kind that is not in the protocol table is an
    /// error; recognised kinds without a handler are ignored.
    pub fn dispatch_at(&mut self, record: &EventRecord, now: DateTime<Utc>) -> Result<(), EngineError> {
        let kind = record
            .command_type()
            .ok_or(EngineError::UnrecognizedEvent { kind: record.kind })?;

        match handlers::handler_for(kind) {
            Some(handler) => {
                let delta = handler(&record.fields);
                tracing::debug!("{:?} -> {:?}", kind, delta);
                self.apply(delta, now);
            }
            None => tracing::trace!("Ignoring inert message kind {:?}", kind),
        }
        Ok(())
    }

    fn apply(&mut self, delta: Delta, now: DateTime<Utc>) {
        let s = &mut self.snapshot;
        match delta {
            Delta::Schedule(update) => {
                s.job_name = update.job_name;
                s.image = update.image;
                s.progress = update.progress;
                s.elapsed_time = update.elapsed_time;
                s.remaining_time = update.remaining_time;
                s.total_time = update.elapsed_time.saturating_add(update.remaining_time);
                s.filament_used = update.filament_used;
                s.ai = AiSettings {
                    enabled: update.ai_enabled,
                    sensitivity: update.ai_sensitivity,
                    pause_on_detect: update.ai_pause_on_detect,
                    data_consent: update.ai_data_consent,
                };

                if self.snapshot.job_name != self.previous_job_name {
                    self.start_new_job(now);
                }
                self.previous_job_name = self.snapshot.job_name.clone();
            }
            Delta::Layer { current, total } => {
                s.current_layer = current;
                s.total_layers = total;
            }
            Delta::NozzleTemp(temp) => {
                s.hotend_temp = temp.current;
                s.target_hotend_temp = temp.target;
                self.pulse(now);
            }
            Delta::BedTemp(temp) => {
                s.bed_temp = temp.current;
                s.target_bed_temp = temp.target;
            }
            Delta::FanSpeed(speed) => s.fan_speed = speed,
            Delta::PrintSpeed(speed) => s.current_speed = speed,
            Delta::MaxPrintSpeed(speed) => s.max_speed = speed,
            Delta::MotorLock(locked) => s.motor_locked = locked,
            Delta::NozzleType(name) => s.nozzle_type = name,
            Delta::Leveled(leveled) => s.bed_leveled = leveled,
            Delta::TogglePause => s.paused = !s.paused,
            Delta::Reset => self.reset(),
            Delta::ResetIfFinished => {
                // The printer only sends this once "finish" is acknowledged on
                // the device.
                if self.derive_status_at(now) == PrinterStatus::Finished {
                    self.reset();
                }
            }
            Delta::Error(report) => {
                if !report.known {
                    tracing::warn!(
                        "Unknown error code {} (level {:?}, ext {:?}); please report it together with what the printer was doing",
                        report.code,
                        report.level,
                        report.ext
                    );
                }
                s.error_level = report.level;
                s.error_message = report.message;
                s.error_ext = report.ext;
            }
        }
    }

    fn pulse(&mut self, now: DateTime<Utc>) {
        self.last_heartbeat = now;
    }

    fn reset(&mut self) {
        tracing::debug!("Resetting printer snapshot");
        self.snapshot = PrinterSnapshot::default();
    }

    fn start_new_job(&mut self, now: DateTime<Utc>) {
        let s = &mut self.snapshot;
        s.clear_error();
        s.print_start_time = now.checked_sub_signed(seconds(s.elapsed_time));
        s.filament = filament::classify(&s.job_name);
        self.recompute_finish_time(now);
        tracing::info!(
            "New print job {:?} (filament {})",
            self.snapshot.job_name,
            self.snapshot.filament
        );
    }

    fn recompute_finish_time(&mut self, now: DateTime<Utc>) {
        if self.snapshot.remaining_time != 0 {
            self.snapshot.print_est_finish_time =
                now.checked_add_signed(seconds(self.snapshot.remaining_time));
        }
    }

    pub fn online(&self) -> bool {
        self.online_at(Utc::now())
    }

    pub fn online_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_heartbeat) <= self.heartbeat_timeout
    }

    /// Status implied by the current fields, without any bookkeeping.
    pub fn derive_status_at(&self, now: DateTime<Utc>) -> PrinterStatus {
        PrinterStatus::derive(&self.snapshot, self.online_at(now))
    }

    /// Last status produced by [`Self::evaluate_and_transition_at`].
    pub fn current_status(&self) -> PrinterStatus {
        self.previous_status.unwrap_or(PrinterStatus::Offline)
    }

    pub fn evaluate_and_transition(&mut self) -> PrinterStatus {
        self.evaluate_and_transition_at(Utc::now())
    }

    /// Derive the status and, if it changed since the last evaluation, run the
    /// transition side effects. Returns the stored status, which may differ
    /// from the derived one (see the preheat override below).
    pub fn evaluate_and_transition_at(&mut self, now: DateTime<Utc>) -> PrinterStatus {
        let derived = self.derive_status_at(now);
        let previous = self.previous_status;
        if previous == Some(derived) {
            return derived;
        }

        self.recompute_finish_time(now);

        if previous == Some(PrinterStatus::Error) {
            self.snapshot.clear_error();
        }

        // After a job is accepted the printer keeps reporting stale
        // temperatures for a while, so it would read as printing too early.
        let status = match (previous, derived) {
            (Some(PrinterStatus::Finished | PrinterStatus::Idle), PrinterStatus::Printing) => {
                PrinterStatus::Preheating
            }
            _ => derived,
        };

        if status.resets_snapshot() {
            self.reset();
        }

        match previous {
            Some(previous) => tracing::info!("Printer status changed: {} -> {}", previous, status),
            None => tracing::info!("Printer status: {}", status),
        }
        self.previous_status = Some(status);
        status
    }

    /// `None` when no error is active.
    pub fn error_severity(&self) -> Option<ErrorSeverity> {
        self.snapshot
            .has_error()
            .then(|| ErrorSeverity::from_level(&self.snapshot.error_level))
    }

    pub fn filament_type(&self) -> FilamentType {
        self.snapshot.filament
    }

    /// Grams of filament used so far.
    pub fn filament_weight(&self) -> f64 {
        self.snapshot.filament.weight_per_meter() * self.snapshot.filament_used
    }

    /// g/cm³ of the inferred material.
    pub fn filament_density(&self) -> f64 {
        self.snapshot.filament.density()
    }

    /// cm³ of filament used so far.
    pub fn filament_volume(&self) -> f64 {
        self.filament_weight() / self.filament_density()
    }

    pub fn set_status_document(&mut self, document: Value) {
        self.status_document = StatusDocument::new(document);
    }

    pub fn service_state(&self, name: &str) -> String {
        self.status_document.service_state(name)
    }

    pub fn service_online(&self, name: &str) -> bool {
        self.status_document.service_online(name)
    }

    pub fn version_value(&self, key: &str) -> String {
        self.status_document.version_value(key)
    }
}

fn seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::zero())
}
