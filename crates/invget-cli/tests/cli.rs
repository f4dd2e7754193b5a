use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `invget` with no user config and no API key in scope.
fn invget(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invget").unwrap();
    cmd.env("INVGET_CONFIG", dir.join("config.json"))
        .env_remove("GEMINI_API_KEY");
    cmd
}

const SAVED_JSON: &str = r#"{
  "invoice": {
    "businessName": "ACME Roofing",
    "customerName": "Jane Doe",
    "issueDate": "3/5/2024",
    "lineItems": [{"item": "Gutter cleaning", "qty": 2, "price": "$75.00"}]
  }
}"#;

const INVOICE_TEXT: &str = "ACME Roofing LLC
123 Main St
Springfield, IL 62704
Bill To
Jane Smith
42 Elm St
Date: 03/05/2024
Description Qty Rate Amount
Gutter cleaning 2 75.00 150.00
Subtotal $150.00
Total $150.00
";

#[test]
fn test_config_path_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    invget(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    invget(dir.path())
        .args(["config", "set", "company.company_name", "ACME Roofing"])
        .assert()
        .success();

    invget(dir.path())
        .args(["config", "get", "company.company_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ACME Roofing\""));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    invget(dir.path())
        .args(["config", "set", "remote.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_masks_api_key() {
    let dir = TempDir::new().unwrap();
    invget(dir.path())
        .args(["config", "set", "remote.api_key", "super-secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("super-secret").not());

    invget(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("super-secret").not());
}

#[test]
fn test_import_saved_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("saved.json");
    fs::write(&input, SAVED_JSON).unwrap();

    invget(dir.path())
        .arg("import")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"companyName\": \"ACME Roofing\""))
        .stdout(predicate::str::contains("\"invoiceDate\": \"2024-03-05\""))
        .stderr(predicate::str::contains("from saved JSON"));
}

#[test]
fn test_import_text_as_csv() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("invoice.txt");
    fs::write(&input, INVOICE_TEXT).unwrap();

    invget(dir.path())
        .args(["import", "--offline", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("document_type,invoice_date"))
        .stdout(predicate::str::contains("Jane Smith"))
        .stdout(predicate::str::contains("Gutter cleaning"));
}

#[test]
fn test_import_invalid_json_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, "{ not json").unwrap();

    invget(dir.path())
        .arg("import")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("The JSON file is not valid"));
}

#[test]
fn test_import_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    invget(dir.path())
        .args(["import", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_payload_encode_then_decode() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("saved.json");
    let block = dir.path().join("block.txt");
    fs::write(&input, SAVED_JSON).unwrap();

    invget(dir.path())
        .args(["payload", "encode"])
        .arg(&input)
        .arg("--output")
        .arg(&block)
        .assert()
        .success();

    let encoded = fs::read_to_string(&block).unwrap();
    assert!(encoded.starts_with("INVGET_PAYLOAD_BEGIN"));
    fs::write(&block, format!("Thank you for your business.\n{encoded}\nPage 1 of 1\n")).unwrap();

    invget(dir.path())
        .args(["payload", "decode", "--format", "text"])
        .arg(&block)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bill to:\n  Jane Doe"))
        .stdout(predicate::str::contains("Total:    150"));
}

#[test]
fn test_payload_decode_without_block_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("plain.txt");
    fs::write(&input, "nothing to see here").unwrap();

    invget(dir.path())
        .args(["payload", "decode"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No invoice payload found"));
}

#[test]
fn test_chat_rejects_blank_prompt() {
    let dir = TempDir::new().unwrap();
    invget(dir.path())
        .args(["chat", "--offline", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Describe the invoice you want to generate first"));
}

#[test]
fn test_import_prints_diagnostics() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("invoice.txt");
    fs::write(&input, INVOICE_TEXT).unwrap();

    invget(dir.path())
        .args(["import", "--diagnostics", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Parsing uploaded file | name=invoice.txt"))
        .stderr(predicate::str::contains("Import branch selected | Text"));
}
