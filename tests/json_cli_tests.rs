use assert_cmd::Command;
use serde_json::Value;
use std::io::Write;
use tempfile::NamedTempFile;

fn run_json(args: &[&str], content: &str) -> Value {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();

    let output = Command::cargo_bin("logsift")
        .unwrap()
        .arg("--json")
        .args(args)
        .arg(temp_file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

const LOG: &str = "\
[Wed Oct 11 14:32:52 2023] [core:error] [pid 1234] [client 10.0.0.1:50000] AH00124: Request exceeded the limit
[2024-01-01 08:00:00] [ERROR] Database connection lost
[2024-01-02 09:00:00] [notice] Config reloaded
";

#[test]
fn test_json_structure() {
    let json = run_json(&[], LOG);

    assert_eq!(json["total_lines"], 3);
    assert_eq!(json["filtered_lines"], 3);
    assert_eq!(json["truncated"], false);
    assert!(json["file_name"].as_str().is_some());

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["format"], "apache_error_with_pid");
    assert_eq!(entries[0]["context"]["pid"], "1234");
    assert_eq!(entries[0]["context"]["error_code"], "AH00124");
    assert_eq!(entries[0]["message"], "Request exceeded the limit");
    assert_eq!(entries[2]["level"], "NOTICE");

    assert_eq!(json["pagination"]["current_page"], 1);
    assert_eq!(json["pagination"]["per_page"], 50);
    assert_eq!(json["pagination"]["total_pages"], 1);

    assert_eq!(json["stats"]["ERROR"], 2);
    assert_eq!(json["stats"]["NOTICE"], 1);
    assert!(json.get("summary").is_none());
}

#[test]
fn test_json_with_filter_keeps_full_stats() {
    let json = run_json(&["--level", "NOTICE"], LOG);

    assert_eq!(json["filtered_lines"], 1);
    assert_eq!(json["entries"].as_array().unwrap().len(), 1);
    assert_eq!(json["entries"][0]["timestamp"], "2024-01-02 09:00:00");

    // Stats describe the whole file, not the filtered view
    let total: u64 = json["stats"]
        .as_object()
        .unwrap()
        .values()
        .map(|count| count.as_u64().unwrap())
        .sum();
    assert_eq!(total, 3);
}

#[test]
fn test_json_summary() {
    let json = run_json(&["--stats"], LOG);

    assert_eq!(json["summary"]["unique_messages"], 3);
    assert_eq!(json["summary"]["with_timestamp"], 3);
    assert_eq!(json["summary"]["first_timestamp"], "2023-10-11 14:32:52");
    assert_eq!(json["summary"]["last_timestamp"], "2024-01-02 09:00:00");
}
