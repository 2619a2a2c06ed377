//! Roster loading from the staff sheet export and saving it back.

use konsil_core::{
    config::{DeskConfig, RosterConfig},
    error::DeskError,
    queue::AllocationQueue,
    roster::{MoodStatus, Roster},
};
use std::io::Write;
use tempfile::NamedTempFile;

fn sheet_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn path_of(file: &NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

const SHEET: &str = r#"[
  { "kuerzel": "CA", "name": "Carla",  "anstellungs_prozent": 100, "stationaer_anteil": 60, "verfuegbar": true },
  { "kuerzel": "BA", "name": "Bruno",  "anstellungs_prozent": "80", "stationaer_anteil": "100", "verfuegbar": "True", "weather": "Eisschlecken", "regenschirm": "True" },
  { "kuerzel": "PT", "name": "Petra",  "anstellungs_prozent": 20,  "stationaer_anteil": 100 },
  { "kuerzel": "XY", "name": "Xaver",  "anstellungs_prozent": 90,  "stationaer_anteil": "k.A." },
  { "kuerzel": "DK", "name": "Dana",   "anstellungs_prozent": 50,  "stationaer_anteil": 80, "verfuegbar": "False" }
]"#;

#[test]
fn load_filters_and_keeps_bad_rows_unscored() {
    let sheet = sheet_file(SHEET);

    let roster = Roster::load(path_of(&sheet), &RosterConfig::default()).unwrap();
    let ids: Vec<_> = roster.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["CA", "BA", "XY", "DK"], "20% employment must be dropped");

    let ba = roster.get("BA").unwrap();
    assert_eq!(ba.mood_status, MoodStatus::IceCream);
    assert!(ba.umbrella_friend);
    assert!(!roster.get("XY").unwrap().is_well_formed());

    let q = AllocationQueue::new(&DeskConfig::default());
    let ranked: Vec<_> = q
        .available_candidates(&roster, None)
        .into_iter()
        .map(|c| (c.record.id, c.score))
        .collect();
    // BA: umbrella friend covers own IceCream -> 0.8 * 1.0 * 1.0
    assert_eq!(ranked, [("BA".to_string(), 0.8), ("CA".to_string(), 0.6)]);
}

#[test]
fn save_then_load_preserves_edits() {
    let src = sheet_file(SHEET);
    let dst = NamedTempFile::new().unwrap();

    let mut roster = Roster::load(path_of(&src), &RosterConfig::default()).unwrap();
    roster.set_mood("CA", MoodStatus::Sunshine).unwrap();
    roster.set_umbrella_friend("DK", true).unwrap();
    roster.save(path_of(&dst)).unwrap();

    let reloaded = Roster::load(path_of(&dst), &RosterConfig::default()).unwrap();
    assert_eq!(reloaded, roster);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Roster::load("/nonexistent/konsil/roster.json", &RosterConfig::default()).unwrap_err();
    assert!(matches!(err, DeskError::Io { .. }));
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let broken = sheet_file("[{ \"kuerzel\": ");
    let err = Roster::load(path_of(&broken), &RosterConfig::default()).unwrap_err();
    assert!(matches!(err, DeskError::Serialization(_)));
}

#[test]
fn sheet_with_both_id_columns_loads() {
    let sheet = sheet_file(
        r#"[{ "id": "CA", "kuerzel": "C.A.", "name": "Carla", "anstellungs_prozent": 100, "stationaer_anteil": 60 }]"#,
    );
    let roster = Roster::load(path_of(&sheet), &RosterConfig::default()).unwrap();
    assert_eq!(roster.records()[0].id, "CA");
}
