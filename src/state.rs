// src/state.rs - lifecycle enumerations the printer reports
use std::fmt;

use serde::{Deserialize, Serialize};

/// Job-level lifecycle phase, as reported on the telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GcodeState {
    Idle,
    Prepare,
    Running,
    Pause,
    Finish,
    Failed,
    Unknown,
}

impl GcodeState {
    /// Parse the state string from a status report. Anything unrecognized is
    /// `Unknown`, not an error: reports from newer firmware keep flowing.
    pub fn from_report(value: &str) -> Self {
        match value {
            "IDLE" => Self::Idle,
            "PREPARE" => Self::Prepare,
            "RUNNING" => Self::Running,
            "PAUSE" => Self::Pause,
            "FINISH" => Self::Finish,
            "FAILED" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Prepare | Self::Running | Self::Pause)
    }
}

impl fmt::Display for GcodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Prepare => "PREPARE",
            Self::Running => "RUNNING",
            Self::Pause => "PAUSE",
            Self::Finish => "FINISH",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Current printer stage, keyed by the numeric stage code in status reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintState {
    Printing,
    AutoBedLeveling,
    HeatbedPreheating,
    SweepingXyMechMode,
    ChangingFilament,
    M400Pause,
    PausedFilamentRunout,
    HeatingHotend,
    CalibratingExtrusion,
    ScanningBedSurface,
    InspectingFirstLayer,
    IdentifyingBuildPlateType,
    CalibratingMicroLidar,
    HomingToolhead,
    CleaningNozzleTip,
    CheckingExtruderTemperature,
    PausedUser,
    PausedFrontCoverFalling,
    CalibratingLidar,
    CalibratingExtrusionFlow,
    PausedNozzleTemperatureMalfunction,
    PausedHeatBedTemperatureMalfunction,
    FilamentUnloading,
    PausedSkippedStep,
    FilamentLoading,
    CalibratingMotorNoise,
    PausedAmsLost,
    PausedLowFanSpeedHeatBreak,
    PausedChamberTemperatureControlError,
    CoolingChamber,
    PausedUserGcode,
    PausedNozzleFilamentCoveredDetected,
    PausedCutterError,
    PausedFirstLayerError,
    PausedNozzleClog,
    Idle,
    Unknown,
}

impl PrintState {
    /// Map a reported stage code. Codes this build does not know about land
    /// on `Unknown`.
    pub fn from_stage(code: i64) -> Self {
        match code {
            0 => Self::Printing,
            1 => Self::AutoBedLeveling,
            2 => Self::HeatbedPreheating,
            3 => Self::SweepingXyMechMode,
            4 => Self::ChangingFilament,
            5 => Self::M400Pause,
            6 => Self::PausedFilamentRunout,
            7 => Self::HeatingHotend,
            8 => Self::CalibratingExtrusion,
            9 => Self::ScanningBedSurface,
            10 => Self::InspectingFirstLayer,
            11 => Self::IdentifyingBuildPlateType,
            12 => Self::CalibratingMicroLidar,
            13 => Self::HomingToolhead,
            14 => Self::CleaningNozzleTip,
            15 => Self::CheckingExtruderTemperature,
            16 => Self::PausedUser,
            17 => Self::PausedFrontCoverFalling,
            18 => Self::CalibratingLidar,
            19 => Self::CalibratingExtrusionFlow,
            20 => Self::PausedNozzleTemperatureMalfunction,
            21 => Self::PausedHeatBedTemperatureMalfunction,
            22 => Self::FilamentUnloading,
            23 => Self::PausedSkippedStep,
            24 => Self::FilamentLoading,
            25 => Self::CalibratingMotorNoise,
            26 => Self::PausedAmsLost,
            27 => Self::PausedLowFanSpeedHeatBreak,
            28 => Self::PausedChamberTemperatureControlError,
            29 => Self::CoolingChamber,
            30 => Self::PausedUserGcode,
            31 => Self::PausedNozzleFilamentCoveredDetected,
            32 => Self::PausedCutterError,
            33 => Self::PausedFirstLayerError,
            34 => Self::PausedNozzleClog,
            -1 | 255 => Self::Idle,
            _ => Self::Unknown,
        }
    }

    /// Stages where the job is stopped and waiting on an operator.
    pub fn is_paused(&self) -> bool {
        matches!(
            self,
            Self::M400Pause
                | Self::PausedFilamentRunout
                | Self::PausedUser
                | Self::PausedFrontCoverFalling
                | Self::PausedNozzleTemperatureMalfunction
                | Self::PausedHeatBedTemperatureMalfunction
                | Self::PausedSkippedStep
                | Self::PausedAmsLost
                | Self::PausedLowFanSpeedHeatBreak
                | Self::PausedChamberTemperatureControlError
                | Self::PausedUserGcode
                | Self::PausedNozzleFilamentCoveredDetected
                | Self::PausedCutterError
                | Self::PausedFirstLayerError
                | Self::PausedNozzleClog
        )
    }
}

/// Chamber light state as reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightMode {
    On,
    Off,
    #[default]
    Unknown,
}

impl LightMode {
    pub fn from_report(value: &str) -> Self {
        match value {
            "on" => Self::On,
            "off" => Self::Off,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Nozzle material registered on the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NozzleType {
    StainlessSteel,
    HardenedSteel,
}

impl fmt::Display for NozzleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StainlessSteel => "stainless_steel",
            Self::HardenedSteel => "hardened_steel",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcode_state_round_trip() {
        for state in [
            GcodeState::Idle,
            GcodeState::Prepare,
            GcodeState::Running,
            GcodeState::Pause,
            GcodeState::Finish,
            GcodeState::Failed,
        ] {
            assert_eq!(GcodeState::from_report(&state.to_string()), state);
        }
        assert_eq!(GcodeState::from_report("SOMETHING_NEW"), GcodeState::Unknown);
    }

    #[test]
    fn stage_codes_map_and_saturate() {
        assert_eq!(PrintState::from_stage(0), PrintState::Printing);
        assert_eq!(PrintState::from_stage(16), PrintState::PausedUser);
        assert_eq!(PrintState::from_stage(255), PrintState::Idle);
        assert_eq!(PrintState::from_stage(9000), PrintState::Unknown);
        assert!(PrintState::from_stage(6).is_paused());
        assert!(!PrintState::from_stage(0).is_paused());
    }
}
