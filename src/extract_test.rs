// Unit tests for the log-to-CSV extraction pass

use super::*;
use pretty_assertions::assert_eq;

fn record(time: &str, address: &str, top10: &str) -> PairRecord {
    PairRecord {
        time: time.to_string(),
        address: address.to_string(),
        top10: top10.to_string(),
    }
}

#[test]
fn test_parse_single_record() {
    let input = "Buy\n12:00\nAddr...123\n45%";
    assert_eq!(parse_records(input), vec![record("12:00", "Addr", "45%")]);
}

#[test]
fn test_parse_address_without_ellipsis_kept_whole() {
    let input = "Buy\n09:30\n9xQeWvFull\n12%";
    assert_eq!(
        parse_records(input),
        vec![record("09:30", "9xQeWvFull", "12%")]
    );
}

#[test]
fn test_parse_is_case_insensitive_and_matches_substrings() {
    let input = "BUY NOW\n01:00\nAbc...xyz\n7%";
    assert_eq!(parse_records(input), vec![record("01:00", "Abc", "7%")]);
}

#[test]
fn test_parse_skips_blank_lines_and_noise() {
    let input = "\
═══════════════
📊 Scraped at 2026-08-27 10:00:00 UTC
═══════════════

Buy

10:05

So1ana...9f2k

33%

═══════════════
";
    assert_eq!(parse_records(input), vec![record("10:05", "So1ana", "33%")]);
}

#[test]
fn test_parse_truncated_trailing_record_is_ignored() {
    // "Buy" with fewer than three following lines is not a record
    let input = "Buy\n12:00\nAddr...123";
    assert_eq!(parse_records(input), Vec::<PairRecord>::new());
}

#[test]
fn test_parse_multiple_records_do_not_overlap() {
    let input = "Buy\n12:00\nAaa...1\n10%\nBuy\n12:05\nBbb...2\n20%";
    assert_eq!(
        parse_records(input),
        vec![record("12:00", "Aaa", "10%"), record("12:05", "Bbb", "20%")]
    );
}

#[test]
fn test_parse_empty_input() {
    assert_eq!(parse_records(""), Vec::<PairRecord>::new());
    assert_eq!(parse_records("\n\n  \n"), Vec::<PairRecord>::new());
}

#[test]
fn test_extract_to_csv_writes_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.txt");
    let output = dir.path().join("out.csv");
    std::fs::write(&input, "Buy\n12:00\nAddr...123\n45%\n").unwrap();

    let count = extract_to_csv(&input, &output).unwrap();
    assert_eq!(count, 1);

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(csv, "Time,Address,Top10\n12:00,Addr,45%\n");
}

#[test]
fn test_extract_to_csv_empty_log_still_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.txt");
    let output = dir.path().join("out.csv");
    std::fs::write(&input, "nothing interesting here\n").unwrap();

    let count = extract_to_csv(&input, &output).unwrap();
    assert_eq!(count, 0);

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(csv, "Time,Address,Top10\n");
}

#[test]
fn test_extract_to_csv_missing_input_errors() {
    let dir = tempfile::tempdir().unwrap();
    let result = extract_to_csv(&dir.path().join("nope.txt"), &dir.path().join("out.csv"));
    assert!(result.is_err());
}
