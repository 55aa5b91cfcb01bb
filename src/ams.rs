// src/ams.rs - AMS material units and the hub that indexes them
use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::filament::{FilamentTray, TrayError};
use crate::record::{self, RecordError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmsError {
    #[error("no filament tray at index {0}")]
    TrayNotFound(u8),
    #[error("no AMS unit with id {0}")]
    UnitNotFound(u8),
    #[error(transparent)]
    Tray(#[from] TrayError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// One Automated Material System unit: ambient readings plus its loaded
/// trays, keyed by slot index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ams {
    pub humidity: i64,
    pub temperature: f64,
    trays: HashMap<u8, FilamentTray>,
}

impl Ams {
    pub fn new(humidity: i64, temperature: f64) -> Self {
        Self {
            humidity,
            temperature,
            trays: HashMap::new(),
        }
    }

    /// Build a unit from a raw AMS record: `humidity`, `temperature`, and a
    /// `tray` list.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, AmsError> {
        let mut ams = Self::new(
            record::integer(record, "humidity")?,
            record::float(record, "temperature")?,
        );
        ams.process_trays(record::list(record, "tray")?)?;
        Ok(ams)
    }

    pub fn filament_trays(&self) -> &HashMap<u8, FilamentTray> {
        &self.trays
    }

    /// Replace the tray mapping from raw tray records. Slot index is the
    /// record's position unless the record carries an explicit `id`. The
    /// previous mapping survives a failed parse.
    pub fn process_trays(&mut self, records: &[Value]) -> Result<(), AmsError> {
        let mut trays = HashMap::with_capacity(records.len());
        for (position, raw) in records.iter().enumerate() {
            let record = raw.as_object().ok_or(RecordError::Invalid {
                field: "tray",
                expected: "object",
            })?;
            let index = match record::explicit_index(record)? {
                Some(id) => id,
                None => position as u8,
            };
            trays.insert(index, FilamentTray::from_record(record)?);
        }
        self.trays = trays;
        Ok(())
    }

    /// Upsert the tray at `index`, silently overwriting any existing one.
    pub fn set_filament_tray(&mut self, tray: FilamentTray, index: u8) {
        self.trays.insert(index, tray);
    }

    /// Tray at `index`, or `None` for an empty slot.
    pub fn get_filament_tray(&self, index: u8) -> Option<&FilamentTray> {
        self.trays.get(&index)
    }

    /// Strict counterpart of [`Ams::get_filament_tray`]: an empty slot is an
    /// error.
    pub fn tray(&self, index: u8) -> Result<&FilamentTray, AmsError> {
        self.trays.get(&index).ok_or(AmsError::TrayNotFound(index))
    }
}

/// All AMS units attached to one printer, keyed by unit id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmsHub {
    units: HashMap<u8, Ams>,
}

impl AmsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(&self) -> &HashMap<u8, Ams> {
        &self.units
    }

    /// Rebuild the hub from raw AMS records. Unit id is the record's position
    /// unless the record carries an explicit `id`. The previous units survive
    /// a failed parse.
    pub fn parse_list(&mut self, records: &[Value]) -> Result<(), AmsError> {
        let mut units = HashMap::with_capacity(records.len());
        for (position, raw) in records.iter().enumerate() {
            let record = raw.as_object().ok_or(RecordError::Invalid {
                field: "ams",
                expected: "object",
            })?;
            let id = match record::explicit_index(record)? {
                Some(id) => id,
                None => position as u8,
            };
            units.insert(id, Ams::from_record(record)?);
        }
        self.units = units;
        Ok(())
    }

    /// Upsert the unit at `id`, silently overwriting any existing one.
    pub fn set_ams(&mut self, unit: Ams, id: u8) {
        self.units.insert(id, unit);
    }

    /// Unit at `id`, or `None` if none is attached there.
    pub fn get_ams(&self, id: u8) -> Option<&Ams> {
        self.units.get(&id)
    }

    /// Strict counterpart of [`AmsHub::get_ams`]: a missing unit is an error.
    pub fn unit(&self, id: u8) -> Result<&Ams, AmsError> {
        self.units.get(&id).ok_or(AmsError::UnitNotFound(id))
    }
}
