// src/printer.rs - the facade trait concrete printer drivers implement
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::ams::{AmsError, AmsHub};
use crate::camera::{CameraError, Frame};
use crate::config::ConfigError;
use crate::filament::{FilamentSettings, FilamentTray, TrayError};
use crate::gcode::GcodeError;
use crate::state::{GcodeState, LightMode, NozzleType, PrintState};

/// AMS id the firmware uses to address the external spool holder.
pub const EXTERNAL_SPOOL_AMS_ID: u8 = 255;
/// Tray id the firmware uses to address the external spool holder.
pub const EXTERNAL_SPOOL_TRAY_ID: u8 = 254;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("not connected to printer")]
    NotConnected,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("file transfer failed: {0}")]
    Transfer(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gcode(#[from] GcodeError),
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Ams(#[from] AmsError),
    #[error(transparent)]
    Tray(#[from] TrayError),
}

/// One telemetry reading. A value can be missing two ways: the printer is
/// reporting but does not know it (`Unknown`), or no report covers it at all
/// (`NotReported`, e.g. nothing is printing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Telemetry<T> {
    Value(T),
    Unknown,
    NotReported,
}

impl<T> Telemetry<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_reported(&self) -> bool {
        !matches!(self, Self::NotReported)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Telemetry<U> {
        match self {
            Self::Value(v) => Telemetry::Value(f(v)),
            Self::Unknown => Telemetry::Unknown,
            Self::NotReported => Telemetry::NotReported,
        }
    }
}

impl<T> From<Option<T>> for Telemetry<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::NotReported,
        }
    }
}

/// Where a filament assignment lands: an AMS slot or the external spool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayAddress {
    pub ams_id: u8,
    pub tray_id: u8,
}

impl TrayAddress {
    pub fn external_spool() -> Self {
        Self {
            ams_id: EXTERNAL_SPOOL_AMS_ID,
            tray_id: EXTERNAL_SPOOL_TRAY_ID,
        }
    }

    pub fn ams_slot(ams_id: u8, tray_id: u8) -> Self {
        Self { ams_id, tray_id }
    }

    pub fn is_external(&self) -> bool {
        self.ams_id == EXTERNAL_SPOOL_AMS_ID
    }
}

impl Default for TrayAddress {
    fn default() -> Self {
        Self::external_spool()
    }
}

/// Filament selection: a preset name the firmware knows, or full settings.
#[derive(Debug, Clone, PartialEq)]
pub enum FilamentChoice {
    Preset(String),
    Settings(FilamentSettings),
}

/// Plate selection for `start_print`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlateTarget {
    Number(u32),
    Path(String),
}

impl PlateTarget {
    /// The G-code path inside the job archive this plate resolves to.
    pub fn gcode_path(&self) -> String {
        match self {
            Self::Number(n) => format!("Metadata/plate_{n}.gcode"),
            Self::Path(path) => path.clone(),
        }
    }
}

/// Options for `start_print`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    pub use_ams: bool,
    /// Tray mapping sent with the job. Leave empty to fall back to tray 0.
    pub ams_mapping: Vec<u8>,
    pub skip_objects: Option<Vec<u32>>,
    pub flow_calibration: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            use_ams: true,
            ams_mapping: Vec::new(),
            skip_objects: None,
            flow_calibration: true,
        }
    }
}

impl PrintOptions {
    /// Mapping actually sent with the job: empty when the AMS is not in use,
    /// `[0]` when it is and no mapping was given.
    pub fn effective_ams_mapping(&self) -> Vec<u8> {
        if !self.use_ams {
            return Vec::new();
        }
        if self.ams_mapping.is_empty() {
            vec![0]
        } else {
            self.ams_mapping.clone()
        }
    }
}

/// Which fan a speed command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fan {
    Part,
    Auxiliary,
    Chamber,
}

/// Print speed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrintSpeed {
    Slowest,
    Slow,
    Fast,
    Fastest,
}

impl PrintSpeed {
    pub fn level(self) -> u8 {
        match self {
            Self::Slowest => 0,
            Self::Slow => 1,
            Self::Fast => 2,
            Self::Fastest => 3,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Slowest),
            1 => Some(Self::Slow),
            2 => Some(Self::Fast),
            3 => Some(Self::Fastest),
            _ => None,
        }
    }
}

/// Calibration stages to run; all on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationOptions {
    pub bed_level: bool,
    pub motor_noise: bool,
    pub vibration_compensation: bool,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            bed_level: true,
            motor_noise: true,
            vibration_compensation: true,
        }
    }
}

/// Control facade for one networked printer.
///
/// Implementations wrap a telemetry/command channel, a file channel, and a
/// camera connection; this trait is the seam between them and control logic.
///
/// Two failure shapes, deliberately distinct: commands resolve to
/// `Ok(false)` when the printer rejects or does not acknowledge them (a
/// recoverable soft failure the caller may retry), and to `Err` for
/// structural problems (validation, lost connection, malformed input). No
/// method retries internally and none takes a timeout; callers needing
/// bounded waits wrap these calls themselves.
#[async_trait]
pub trait Printer: Send + Sync {
    // --- connection lifecycle ---

    /// Open the telemetry/command channel and the camera connection.
    async fn connect(&self) -> Result<(), PrinterError>;

    /// Close every channel. Safe to call while background work is
    /// mid-iteration; returns only once it has wound down.
    async fn disconnect(&self) -> Result<(), PrinterError>;

    /// Start only the telemetry/command client.
    async fn mqtt_start(&self) -> Result<(), PrinterError>;

    /// Stop only the telemetry/command client.
    async fn mqtt_stop(&self) -> Result<(), PrinterError>;

    /// Start the camera client. `Ok(false)` when it was already running.
    async fn camera_start(&self) -> Result<bool, PrinterError>;

    /// Stop the camera client.
    async fn camera_stop(&self) -> Result<(), PrinterError>;

    /// Whether the telemetry/command client holds a live connection.
    fn mqtt_client_connected(&self) -> bool;

    /// Whether the telemetry/command client is ready to carry commands.
    fn mqtt_client_ready(&self) -> bool;

    /// Whether the camera capture loop is running.
    fn camera_client_alive(&self) -> bool;

    // --- telemetry ---

    async fn current_layer_num(&self) -> Telemetry<u32>;

    async fn total_layer_num(&self) -> Telemetry<u32>;

    /// Remaining print time in seconds.
    async fn remaining_time(&self) -> Telemetry<u64>;

    /// Completion percentage of the running job.
    async fn percentage(&self) -> Telemetry<u8>;

    /// Job-level lifecycle state.
    async fn gcode_state(&self) -> Telemetry<GcodeState>;

    /// Current printer stage.
    async fn current_state(&self) -> Telemetry<PrintState>;

    async fn print_speed(&self) -> Telemetry<PrintSpeed>;

    /// Bed temperature in °C, `None` while the printer is not reporting it.
    async fn bed_temperature(&self) -> Option<f64>;

    /// Nozzle temperature in °C, `None` while the printer is not reporting it.
    async fn nozzle_temperature(&self) -> Option<f64>;

    /// Chamber temperature in °C, `None` while the printer is not reporting
    /// it.
    async fn chamber_temperature(&self) -> Option<f64>;

    async fn nozzle_type(&self) -> Telemetry<NozzleType>;

    /// Nozzle diameter in millimeters.
    async fn nozzle_diameter(&self) -> Telemetry<f64>;

    /// Name of the file being printed.
    async fn file_name(&self) -> Telemetry<String>;

    /// Subtask name of the running job.
    async fn subtask_name(&self) -> Telemetry<String>;

    /// G-code file of the running job.
    async fn gcode_file(&self) -> Telemetry<String>;

    /// Current print error code; 0 is nominal.
    async fn print_error_code(&self) -> Telemetry<i64>;

    /// Origin of the running job (cloud, local).
    async fn print_type(&self) -> Telemetry<String>;

    /// WiFi signal strength as reported, e.g. `"-44dBm"`.
    async fn wifi_signal(&self) -> Telemetry<String>;

    async fn light_state(&self) -> Telemetry<LightMode>;

    /// Object ids currently being skipped.
    async fn skipped_objects(&self) -> Vec<u32>;

    /// Everything recorded off the telemetry channel, raw.
    async fn mqtt_dump(&self) -> serde_json::Value;

    // --- commands ---

    async fn turn_light_on(&self) -> Result<bool, PrinterError>;

    async fn turn_light_off(&self) -> Result<bool, PrinterError>;

    /// Send G-code commands, one line each. With `check` set, syntax is
    /// validated locally and a [`GcodeError`] is raised before anything goes
    /// out; without it the commands are sent as-is.
    async fn send_gcode(&self, commands: &[&str], check: bool) -> Result<bool, PrinterError>;

    /// Start printing `filename` (previously uploaded) on the given plate.
    async fn start_print(
        &self,
        filename: &str,
        plate: PlateTarget,
        options: PrintOptions,
    ) -> Result<bool, PrinterError>;

    async fn stop_print(&self) -> Result<bool, PrinterError>;

    async fn pause_print(&self) -> Result<bool, PrinterError>;

    async fn resume_print(&self) -> Result<bool, PrinterError>;

    async fn set_bed_temperature(&self, temperature: i32) -> Result<bool, PrinterError>;

    async fn set_nozzle_temperature(&self, temperature: i32) -> Result<bool, PrinterError>;

    /// Home the toolhead.
    async fn home(&self) -> Result<bool, PrinterError>;

    /// Move the Z axis to `height` millimeters.
    async fn move_z_axis(&self, height: i32) -> Result<bool, PrinterError>;

    /// Register the filament loaded at `address`. `color` is a 6-character
    /// hex code.
    async fn set_filament_printer(
        &self,
        color: &str,
        filament: FilamentChoice,
        address: TrayAddress,
    ) -> Result<bool, PrinterError>;

    async fn set_print_speed(&self, speed: PrintSpeed) -> Result<bool, PrinterError>;

    async fn calibrate(&self, options: CalibrationOptions) -> Result<bool, PrinterError>;

    async fn load_filament_spool(&self) -> Result<bool, PrinterError>;

    async fn unload_filament_spool(&self) -> Result<bool, PrinterError>;

    /// Retry whatever filament action the printer is blocked on.
    async fn retry_filament_action(&self) -> Result<bool, PrinterError>;

    /// Skip the given objects for the rest of the running job.
    async fn skip_objects(&self, objects: &[u32]) -> Result<bool, PrinterError>;

    /// Set a fan's speed as a percentage, 0-100.
    async fn set_fan_speed(&self, fan: Fan, speed: u8) -> Result<bool, PrinterError>;

    async fn set_auto_step_recovery(&self, enabled: bool) -> Result<bool, PrinterError>;

    // --- file channel ---

    /// Upload a job file; returns the path it landed on.
    async fn upload_file(
        &self,
        data: &mut (dyn AsyncRead + Send + Unpin),
        filename: &str,
    ) -> Result<String, PrinterError>;

    /// Delete a file from the printer; returns the deleted path.
    async fn delete_file(&self, path: &str) -> Result<String, PrinterError>;

    // --- owned state ---

    /// The external spool tray, when one is registered.
    async fn vt_tray(&self) -> Option<FilamentTray>;

    /// Snapshot of every AMS unit attached to the printer.
    async fn ams_hub(&self) -> AmsHub;

    /// Most recent camera frame.
    async fn camera_frame(&self) -> Result<Frame, PrinterError>;

    /// Most recent camera frame, Base64-encoded.
    async fn camera_frame_base64(&self) -> Result<String, PrinterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_mapping_defaults_to_tray_zero() {
        let options = PrintOptions::default();
        assert!(options.use_ams);
        assert!(options.flow_calibration);
        assert_eq!(options.effective_ams_mapping(), vec![0]);

        let explicit = PrintOptions {
            ams_mapping: vec![2, 0, 1],
            ..Default::default()
        };
        assert_eq!(explicit.effective_ams_mapping(), vec![2, 0, 1]);

        let no_ams = PrintOptions {
            use_ams: false,
            ..Default::default()
        };
        assert!(no_ams.effective_ams_mapping().is_empty());
    }

    #[test]
    fn plate_targets_resolve_to_gcode_paths() {
        assert_eq!(PlateTarget::Number(1).gcode_path(), "Metadata/plate_1.gcode");
        assert_eq!(
            PlateTarget::Path("Metadata/custom.gcode".to_string()).gcode_path(),
            "Metadata/custom.gcode"
        );
    }

    #[test]
    fn default_tray_address_is_the_external_spool() {
        let address = TrayAddress::default();
        assert!(address.is_external());
        assert_eq!(address.ams_id, EXTERNAL_SPOOL_AMS_ID);
        assert_eq!(address.tray_id, EXTERNAL_SPOOL_TRAY_ID);
        assert!(!TrayAddress::ams_slot(0, 3).is_external());
    }

    #[test]
    fn speed_levels_round_trip() {
        for level in 0..=3 {
            assert_eq!(PrintSpeed::from_level(level).unwrap().level(), level);
        }
        assert_eq!(PrintSpeed::from_level(4), None);
    }

    #[test]
    fn telemetry_accessors() {
        assert_eq!(Telemetry::Value(42).value(), Some(42));
        assert_eq!(Telemetry::<u32>::Unknown.value(), None);
        assert!(Telemetry::<u32>::Unknown.is_reported());
        assert!(!Telemetry::<u32>::NotReported.is_reported());
        assert_eq!(Telemetry::from(Some(7u8)), Telemetry::Value(7u8));
        assert_eq!(Telemetry::<u8>::from(None), Telemetry::NotReported);
        assert_eq!(
            Telemetry::Value(2u8).map(|v| v * 2),
            Telemetry::Value(4u8)
        );
    }
}
