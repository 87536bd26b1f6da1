//! Contains the data models for API responses.

use serde::Serialize;

use crate::filament::FilamentType;
use crate::printer::{PrinterEngine, PrinterSnapshot, PrinterStatus};
use crate::protocol::ErrorSeverity;

/// Summary of the printer for dashboards.
#[derive(Debug, Serialize)]
pub struct PrinterStatusResponse {
    pub status: PrinterStatus,
    pub online: bool,
    pub job_name: String,
    pub progress_percent: f64,
    pub current_layer: u64,
    pub total_layers: u64,
    pub hotend_temp: f64,
    pub target_hotend_temp: f64,
    pub bed_temp: f64,
    pub target_bed_temp: f64,
    pub filament: FilamentType,
    /// Grams.
    pub filament_weight: f64,
    /// g/cm³.
    pub filament_density: f64,
    /// cm³.
    pub filament_volume: f64,
    pub error_message: String,
    pub error_severity: Option<ErrorSeverity>,
}

impl PrinterStatusResponse {
    pub fn new(engine: &PrinterEngine, status: PrinterStatus, online: bool) -> Self {
        let s = engine.snapshot();
        Self {
            status,
            online,
            job_name: s.job_name.clone(),
            progress_percent: s.progress_percent(),
            current_layer: s.current_layer,
            total_layers: s.total_layers,
            hotend_temp: s.hotend_temp,
            target_hotend_temp: s.target_hotend_temp,
            bed_temp: s.bed_temp,
            target_bed_temp: s.target_bed_temp,
            filament: s.filament,
            filament_weight: engine.filament_weight(),
            filament_density: engine.filament_density(),
            filament_volume: engine.filament_volume(),
            error_message: s.error_message.clone(),
            error_severity: engine.error_severity(),
        }
    }
}

/// Full snapshot with the synthesized status.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub status: PrinterStatus,
    pub online: bool,
    pub snapshot: PrinterSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub name: String,
    pub state: String,
    pub online: bool,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub key: String,
    pub value: String,
}
