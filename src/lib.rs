//! State tracking for AnkerMake printers.
//!
//! Messages relayed from the printer's MQTT channel are fed into a
//! [`printer::PrinterEngine`], which keeps a snapshot of the device and
//! synthesizes an operational status from it. The [`monitor`] module keeps the
//! message stream alive and [`web`] exposes the result over HTTP.

pub mod communication;
pub mod config;
pub mod filament;
pub mod monitor;
pub mod printer;
pub mod protocol;
pub mod web;

pub use filament::{FilamentType, classify};
pub use printer::{EngineError, PrinterEngine, PrinterSnapshot, PrinterStatus, SharedEngine};
pub use protocol::{CommandType, EventFields, EventRecord};
