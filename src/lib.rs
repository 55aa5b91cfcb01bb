// printlink: vendor-neutral control contract for networked 3D printers.
//
// Data shapes for filament trays and AMS material units, lifecycle
// enumerations, local G-code syntax checking, camera capture scaffolding, and
// the Printer facade trait that concrete protocol drivers implement. No
// protocol code lives here; this crate is the seam between control logic and
// drivers.

pub mod ams;
pub mod camera;
pub mod config;
pub mod filament;
pub mod gcode;
pub mod printer;
pub mod record;
pub mod state;

pub use ams::{Ams, AmsError, AmsHub};
pub use camera::{CameraClient, CameraError, Frame, FrameSource, PrinterCamera};
pub use config::{CameraConfig, ConfigError, PrinterConfig};
pub use filament::{FilamentSettings, FilamentTray, TrayError};
pub use gcode::GcodeError;
pub use printer::{
    CalibrationOptions, EXTERNAL_SPOOL_AMS_ID, EXTERNAL_SPOOL_TRAY_ID, Fan, FilamentChoice,
    PlateTarget, PrintOptions, PrintSpeed, Printer, PrinterError, Telemetry, TrayAddress,
};
pub use record::RecordError;
pub use state::{GcodeState, LightMode, NozzleType, PrintState};
