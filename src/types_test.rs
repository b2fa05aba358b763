// Unit tests for types module

use super::*;

#[test]
fn test_snapshot_new_stamps_current_time() {
    let before = Utc::now();
    let snapshot = Snapshot::new("hello".to_string());
    let after = Utc::now();

    assert_eq!(snapshot.text, "hello");
    assert!(snapshot.captured_at >= before);
    assert!(snapshot.captured_at <= after);
}

#[test]
fn test_snapshot_preserves_multiline_text() {
    let text = "Buy\n12:00\nAddr...123\n45%".to_string();
    let snapshot = Snapshot::new(text.clone());
    assert_eq!(snapshot.text, text);
}

#[test]
fn test_pair_record_csv_field_names() {
    // The serialized field names double as the CSV headers
    let record = PairRecord {
        time: "12:00".to_string(),
        address: "Addr".to_string(),
        top10: "45%".to_string(),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(&record).unwrap();
    let bytes = writer.into_inner().unwrap();
    let output = String::from_utf8(bytes).unwrap();

    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("Time,Address,Top10"));
    assert_eq!(lines.next(), Some("12:00,Addr,45%"));
}

#[test]
fn test_pair_record_roundtrip() {
    let record = PairRecord {
        time: "03:15".to_string(),
        address: "9xQeWv".to_string(),
        top10: "12.3%".to_string(),
    };
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"Time\""));
    let back: PairRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}
