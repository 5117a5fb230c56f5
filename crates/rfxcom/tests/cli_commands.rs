#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const STATUS_RESPONSE: &str = "0d 01 00 01 02 53 5a 00 00 22 01 01 00 00";

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "rfxcom-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn rfxcom(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rfxcom"))
        .env_remove("RFXCOM_SCHEMAS")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("rfxcom should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(serde_json::from_str::<serde_json::Value>)
        .collect::<Result<_, _>>()
        .expect("stdout lines should be json")
}

#[test]
fn schemas_lists_bundled_schemas() {
    let output = rfxcom(&["--format", "json", "schemas"]);
    assert!(output.status.success());

    let listed = json_lines(&output);
    let names: Vec<&str> = listed[0]
        .as_array()
        .expect("schema list should be an array")
        .iter()
        .filter_map(|schema| schema["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "InterfaceControl",
            "InterfaceMessage",
            "ReceiverStarted",
            "Temperature"
        ]
    );
}

#[test]
fn encode_reset_command() {
    let mut args = vec![
        "--format",
        "json",
        "encode",
        "InterfaceControl",
        "eSubtype=Interface Control",
        "cSeqnbr=0",
        "eCmnd=reset",
    ];
    let msgs: Vec<String> = (1..=9).map(|i| format!("cMsg{i}=0")).collect();
    args.extend(msgs.iter().map(String::as_str));

    let output = rfxcom(&args);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let encoded = &json_lines(&output)[0];
    assert_eq!(encoded["frame"], "0d00000000000000000000000000");
    assert_eq!(encoded["type_code"], 0);
}

#[test]
fn encode_raw_writes_frame_bytes() {
    let values = serde_json::json!({
        "eSubtype": "THC238",
        "cSeqnbr": 1,
        "cId1": 2,
        "cId2": 3,
        "cTemperatureHigh": 0,
        "cTemperatureLow": 200,
        "cBatteryRssi": 105
    })
    .to_string();
    let output = rfxcom(&["--format", "raw", "encode", "Temperature", "--json", &values]);
    assert!(output.status.success());
    assert_eq!(
        output.stdout,
        vec![0x08, 0x50, 0x02, 0x01, 0x02, 0x03, 0x00, 0xc8, 0x69]
    );
}

#[test]
fn encode_unknown_schema_is_usage_error() {
    let output = rfxcom(&["encode", "Nope", "cSeqnbr=1"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown schema Nope"));
}

#[test]
fn encode_unknown_enum_value_is_data_invalid() {
    let output = rfxcom(&[
        "encode",
        "Temperature",
        "eSubtype=Nope",
        "cSeqnbr=1",
        "cId1=2",
        "cId2=3",
        "cTemperatureHigh=0",
        "cTemperatureLow=0",
        "cBatteryRssi=0",
    ]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_hex_argument() {
    let output = rfxcom(&["--format", "json", "decode", STATUS_RESPONSE]);
    assert!(output.status.success());

    let messages = json_lines(&output);
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message["schema"], "InterfaceMessage");
    let fields = &message["fields"];
    assert_eq!(fields["eCmnd"], "get status");
    assert_eq!(fields["fOregon"], true);
}

#[test]
fn decode_continues_after_bad_frame() {
    let output = rfxcom(&[
        "--format",
        "json",
        "decode",
        "03:42:00:00",
        "08 50 02 11 70 02 00 a7 69",
    ]);
    assert_eq!(output.status.code(), Some(60));

    let messages = json_lines(&output);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["schema"], "Temperature");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("type 0x42"));
}

#[test]
fn decode_capture_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_rfxcom"))
        .env_remove("RFXCOM_SCHEMAS")
        .args(["--format", "pretty", "decode", "--file", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("decode should start");

    let mut capture = vec![0x08, 0x50, 0x02, 0x11, 0x70, 0x02, 0x00, 0xa7, 0x69];
    capture.extend_from_slice(&[0x14, 0x01, 0x07, 0x02, 0x07]);
    capture.extend_from_slice(b"Copyright RFXCOM");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&capture)
        .expect("capture should be writable");

    let output = child.wait_with_output().expect("decode should finish");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Temperature type=0x50"));
    assert!(lines[1].starts_with("ReceiverStarted type=0x01"));
}

#[test]
fn decode_with_schema_directory() {
    let dir = unique_temp_dir("schema-dir");
    std::fs::write(
        dir.join("Switch.schema.json"),
        r#"{ "value": 17, "fields": ["eCmnd", "fOn"], "enums": { "eCmnd": { "toggle": 1 } } }"#,
    )
    .expect("schema file should be writable");

    let output = rfxcom(&[
        "--schemas",
        dir.to_str().expect("temp path should be utf-8"),
        "--format",
        "json",
        "decode",
        "03 11 01 01",
    ]);
    assert!(output.status.success());
    let messages = json_lines(&output);
    assert_eq!(messages[0]["schema"], "Switch");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_schema_directory_fails() {
    let dir = unique_temp_dir("bad-schema");
    std::fs::write(dir.join("Bad.schema.json"), "{").expect("schema file should be writable");

    let output = rfxcom(&["--schemas", dir.to_str().unwrap(), "schemas"]);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_without_input_is_usage_error() {
    let output = rfxcom(&["decode"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = rfxcom(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("rfxcom {}", env!("CARGO_PKG_VERSION"))
    );
}
