use serde::{Deserialize, Serialize};
use std::fmt;

use super::snapshot::PrinterSnapshot;

/// Operational status synthesized from the snapshot. The printer never
/// reports this directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrinterStatus {
    Offline,
    Error,
    Paused,
    Preheating,
    Finished,
    Idle,
    Printing,
}

impl PrinterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrinterStatus::Offline => "Offline",
            PrinterStatus::Error => "Error",
            PrinterStatus::Paused => "Paused",
            PrinterStatus::Preheating => "Preheating",
            PrinterStatus::Finished => "Finished",
            PrinterStatus::Idle => "Idle",
            PrinterStatus::Printing => "Printing",
        }
    }

    /// States in which the printer is not engaged with a job; entering one
    /// wipes the snapshot.
    pub fn resets_snapshot(&self) -> bool {
        matches!(self, PrinterStatus::Offline | PrinterStatus::Idle)
    }

    /// Evaluate the precedence rules against a snapshot. First match wins.
    pub fn derive(snapshot: &PrinterSnapshot, online: bool) -> Self {
        if !online {
            PrinterStatus::Offline
        } else if snapshot.has_error() {
            PrinterStatus::Error
        } else if snapshot.paused {
            PrinterStatus::Paused
        } else if snapshot.progress == 0.0 && snapshot.is_heating() {
            PrinterStatus::Preheating
        } else if snapshot.progress >= 1.0 {
            PrinterStatus::Finished
        } else if !snapshot.printing() {
            PrinterStatus::Idle
        } else {
            PrinterStatus::Printing
        }
    }
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printing() -> PrinterSnapshot {
        PrinterSnapshot {
            job_name: "cube.gcode".into(),
            progress: 0.4,
            ..Default::default()
        }
    }

    #[test]
    fn test_offline_masks_everything() {
        let mut s = printing();
        s.error_message = "Filament Broken".into();
        s.paused = true;
        assert_eq!(PrinterStatus::derive(&s, false), PrinterStatus::Offline);
    }

    #[test]
    fn test_error_beats_pause_and_progress() {
        let mut s = printing();
        s.error_message = "Filament Broken".into();
        s.paused = true;
        s.progress = 1.0;
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Error);
    }

    #[test]
    fn test_pause_beats_preheat() {
        let mut s = printing();
        s.progress = 0.0;
        s.hotend_temp = 100.0;
        s.target_hotend_temp = 210.0;
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Preheating);
        s.paused = true;
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Paused);
    }

    #[test]
    fn test_preheat_thresholds() {
        let mut s = printing();
        s.progress = 0.0;
        // Cold sensor readings below 30 °C never count as heating.
        s.hotend_temp = 25.0;
        s.target_hotend_temp = 210.0;
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Printing);
        // Within 5 °C of target counts as heated.
        s.hotend_temp = 206.0;
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Printing);
        s.bed_temp = 40.0;
        s.target_bed_temp = 60.0;
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Preheating);
    }

    #[test]
    fn test_finished_idle_printing() {
        let mut s = printing();
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Printing);
        s.progress = 1.0;
        assert_eq!(PrinterStatus::derive(&s, true), PrinterStatus::Finished);
        assert_eq!(PrinterStatus::derive(&PrinterSnapshot::default(), true), PrinterStatus::Idle);
    }
}
