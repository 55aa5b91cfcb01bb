// Tray record parsing and the filament settings projection.

use std::collections::BTreeSet;

use printlink::record::RecordError;
use printlink::{FilamentTray, TrayError};
use serde_json::{Map, Value, json};

fn tray_record() -> Map<String, Value> {
    json!({
        "k": 0.019,
        "n": 1,
        "tag_uid": "0000000000000000",
        "tray_id_name": "A00-W1",
        "tray_info_idx": "GFA00",
        "tray_type": "PLA",
        "tray_sub_brands": "PLA Basic",
        "tray_color": "FFFFFFFF",
        "tray_weight": "1000",
        "tray_diameter": "1.75",
        "tray_temp": "220",
        "tray_time": "8",
        "bed_temp_type": "1",
        "bed_temp": "35",
        "nozzle_temp_max": "230",
        "nozzle_temp_min": 190,
        "xcam_info": "8813100AE803E803",
        "tray_uuid": "3E50E57B182D4BB6B4E4BB7EF45AB4C4"
    })
    .as_object()
    .unwrap()
    .clone()
}

#[test]
fn keys_match_the_declared_field_set() {
    let tray = FilamentTray::from_record(&tray_record()).unwrap();
    let declared: BTreeSet<&str> = FilamentTray::FIELDS.iter().copied().collect();
    assert_eq!(tray.keys(), declared);
    assert_eq!(tray.keys().len(), 19);
}

#[test]
fn missing_required_field_is_named() {
    let mut record = tray_record();
    record.remove("tray_type");
    let err = FilamentTray::from_record(&record).unwrap_err();
    assert_eq!(
        err,
        TrayError::Record(RecordError::MissingField("tray_type"))
    );
}

#[test]
fn unknown_keys_are_ignored() {
    let mut record = tray_record();
    record.insert("remain".to_string(), json!(87));
    record.insert("future_field".to_string(), json!({"nested": true}));
    assert!(FilamentTray::from_record(&record).is_ok());
}

#[test]
fn numeric_fields_accept_the_firmware_string_form() {
    let tray = FilamentTray::from_record(&tray_record()).unwrap();
    assert_eq!(tray.nozzle_temp_max, 230);
    assert_eq!(tray.nozzle_temp_min, 190);
    assert_eq!(tray.n, 1);
}

#[test]
fn filament_projection_mirrors_the_tray() {
    let tray = FilamentTray::from_record(&tray_record()).unwrap();
    let settings = tray.filament();
    assert_eq!(settings.tray_info_idx, "GFA00");
    assert_eq!(settings.tray_type, "PLA");
    assert!(settings.nozzle_temp_min <= settings.nozzle_temp_max);
}

#[test]
fn filament_projection_is_recomputed_not_cached() {
    let mut tray = FilamentTray::from_record(&tray_record()).unwrap();
    assert_eq!(tray.filament().tray_type, "PLA");
    tray.tray_type = "PETG".to_string();
    assert_eq!(tray.filament().tray_type, "PETG");
}

#[test]
fn reversed_nozzle_bounds_are_rejected() {
    let mut record = tray_record();
    record.insert("nozzle_temp_min".to_string(), json!(250));
    let err = FilamentTray::from_record(&record).unwrap_err();
    assert_eq!(err, TrayError::NozzleTempBounds { min: 250, max: 230 });
}

#[test]
fn optional_cols_parse_when_present() {
    let mut record = tray_record();
    let tray = FilamentTray::from_record(&record).unwrap();
    assert_eq!(tray.cols, None);

    record.insert("cols".to_string(), json!(["FFFFFFFF"]));
    let tray = FilamentTray::from_record(&record).unwrap();
    assert_eq!(tray.cols, Some(vec!["FFFFFFFF".to_string()]));
}
