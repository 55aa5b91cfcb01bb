// src/filament.rs - filament tray records and the settings derived from them
use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::{self, RecordError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrayError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("nozzle temperature bounds out of order: min {min} > max {max}")]
    NozzleTempBounds { min: i32, max: i32 },
}

/// Filament profile a print job cares about, projected out of a tray.
///
/// Immutable once built; `FilamentTray::filament` recomputes it from the
/// tray's current fields instead of caching it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilamentSettings {
    pub tray_info_idx: String,
    pub nozzle_temp_min: i32,
    pub nozzle_temp_max: i32,
    pub tray_type: String,
}

/// One loaded spool: physical and material identity as the printer reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilamentTray {
    /// Pressure-advance coefficient.
    pub k: f64,
    pub n: i64,
    pub tag_uid: String,
    pub tray_id_name: String,
    pub tray_info_idx: String,
    pub tray_type: String,
    pub tray_sub_brands: String,
    pub tray_color: String,
    pub tray_weight: String,
    pub tray_diameter: String,
    pub tray_temp: String,
    pub tray_time: String,
    pub bed_temp_type: String,
    pub bed_temp: String,
    pub nozzle_temp_max: i32,
    pub nozzle_temp_min: i32,
    pub xcam_info: String,
    pub tray_uuid: String,
    /// Column labels for presentation, when the report carries them.
    pub cols: Option<Vec<String>>,
}

impl FilamentTray {
    /// Field names a tray record must carry (`cols` is optional).
    pub const FIELDS: [&'static str; 19] = [
        "k",
        "n",
        "tag_uid",
        "tray_id_name",
        "tray_info_idx",
        "tray_type",
        "tray_sub_brands",
        "tray_color",
        "tray_weight",
        "tray_diameter",
        "tray_temp",
        "tray_time",
        "bed_temp_type",
        "bed_temp",
        "nozzle_temp_max",
        "nozzle_temp_min",
        "xcam_info",
        "tray_uuid",
        "cols",
    ];

    /// Build a tray from a raw key-value record. Unknown keys are ignored;
    /// a missing required key fails with the field's name.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, TrayError> {
        let tray = Self {
            k: record::float(record, "k")?,
            n: record::integer(record, "n")?,
            tag_uid: record::string(record, "tag_uid")?,
            tray_id_name: record::string(record, "tray_id_name")?,
            tray_info_idx: record::string(record, "tray_info_idx")?,
            tray_type: record::string(record, "tray_type")?,
            tray_sub_brands: record::string(record, "tray_sub_brands")?,
            tray_color: record::string(record, "tray_color")?,
            tray_weight: record::string(record, "tray_weight")?,
            tray_diameter: record::string(record, "tray_diameter")?,
            tray_temp: record::string(record, "tray_temp")?,
            tray_time: record::string(record, "tray_time")?,
            bed_temp_type: record::string(record, "bed_temp_type")?,
            bed_temp: record::string(record, "bed_temp")?,
            nozzle_temp_max: record::integer(record, "nozzle_temp_max")? as i32,
            nozzle_temp_min: record::integer(record, "nozzle_temp_min")? as i32,
            xcam_info: record::string(record, "xcam_info")?,
            tray_uuid: record::string(record, "tray_uuid")?,
            cols: record::opt_string_list(record, "cols")?,
        };
        if tray.nozzle_temp_min > tray.nozzle_temp_max {
            return Err(TrayError::NozzleTempBounds {
                min: tray.nozzle_temp_min,
                max: tray.nozzle_temp_max,
            });
        }
        Ok(tray)
    }

    /// The declared field-name set. Order-independent by construction.
    pub fn keys(&self) -> BTreeSet<&'static str> {
        Self::FIELDS.iter().copied().collect()
    }

    /// Filament settings for this tray, recomputed on every call so they
    /// always reflect the current field values.
    pub fn filament(&self) -> FilamentSettings {
        FilamentSettings {
            tray_info_idx: self.tray_info_idx.clone(),
            nozzle_temp_min: self.nozzle_temp_min,
            nozzle_temp_max: self.nozzle_temp_max,
            tray_type: self.tray_type.clone(),
        }
    }
}
