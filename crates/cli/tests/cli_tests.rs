// Binary tests for the dashsync CLI: exit codes, audit log on stdout,
// the --json contract, and both dashboard targets.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use httpmock::prelude::*;
use tempfile::TempDir;

const SOURCE: &str = "\
Nome fantasia;Corretores;Estado;Cidade;Ativa no painel
Acme (CARUARU);5;PE;Caruaru;ATIVO
Sol (CARUARU);4;PE;Caruaru;INATIVO
Lua (RECIFE);1;PE;Recife;ATIVO
";

const DASHBOARD: &str = "\
Imobiliária,Quantidade de Corretores,Estado,Cidade,Ativa em sistema,Contrato assinado
ACME (CARUARU),3,PE,Caruaru,INATIVO,Não Assinado
";

/// Command with no ambient credentials or config leaking in from the host.
fn dashsync(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dashsync"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("DASHSYNC_SPREADSHEET_ID")
        .env_remove("DASHSYNC_SHEET_TAB")
        .env_remove("DASHSYNC_ACCESS_TOKEN")
        .env_remove("DASHSYNC_API_BASE")
        .env_remove("RUST_LOG");
    cmd
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self { dir: tempfile::tempdir().unwrap() };
        ws.write("base.csv", SOURCE);
        ws.write("dashboard.csv", DASHBOARD);
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        dashsync(self.dir.path())
            .current_dir(self.dir.path())
            .args(args)
            .output()
            .unwrap()
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ===========================================================================
// run against a local CSV dashboard
// ===========================================================================

#[test]
fn run_local_dashboard_writes_and_logs() {
    let ws = Workspace::new();
    let out = ws.run(&["run", "base.csv", "--dashboard-csv", "dashboard.csv"]);

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let log = stdout(&out);
    assert!(log.starts_with("Starting synchronization..."));
    assert!(log.contains("[UPDATE] 'ACME (CARUARU)': column 'Quantidade de Corretores' from '3' to '5'."));
    assert!(log.contains("[NEW] Record to add: Sol (CARUARU) (status: INATIVO)"));
    assert!(log.contains("[SKIP] 'Lua (RECIFE)'"));
    assert!(log.trim_end().ends_with("Synchronization finished."));

    let written = fs::read_to_string(ws.path("dashboard.csv")).unwrap();
    assert_eq!(
        written,
        "Imobiliária,Quantidade de Corretores,Estado,Cidade,Ativa em sistema,Contrato assinado\n\
         ACME (CARUARU),5,PE,Caruaru,ATIVO,Assinado\n\
         Sol (CARUARU),4,PE,Caruaru,INATIVO,Não Assinado\n"
    );
}

#[test]
fn second_run_changes_nothing() {
    let ws = Workspace::new();
    let first = ws.run(&["run", "base.csv", "--dashboard-csv", "dashboard.csv"]);
    assert_eq!(first.status.code(), Some(0));
    let after_first = fs::read_to_string(ws.path("dashboard.csv")).unwrap();

    let second = ws.run(&["run", "base.csv", "--dashboard-csv", "dashboard.csv"]);
    assert_eq!(second.status.code(), Some(0));
    assert!(stdout(&second).contains("No new records to add."));
    assert_eq!(fs::read_to_string(ws.path("dashboard.csv")).unwrap(), after_first);
}

#[test]
fn dry_run_leaves_dashboard_untouched() {
    let ws = Workspace::new();
    let out = ws.run(&["run", "base.csv", "--dashboard-csv", "dashboard.csv", "--dry-run"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("nothing written"));
    assert!(stderr(&out).contains("dry run:"));
    assert_eq!(fs::read_to_string(ws.path("dashboard.csv")).unwrap(), DASHBOARD);
}

#[test]
fn json_report_is_single_value() {
    let ws = Workspace::new();
    let out = ws.run(&[
        "run",
        "base.csv",
        "--dashboard-csv",
        "dashboard.csv",
        "--json",
        "--output",
        "report.json",
    ]);

    assert_eq!(out.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["applied"]["updates_applied"], 3);
    assert_eq!(json["applied"]["rows_appended"], 1);
    assert_eq!(json["plan"]["updates"][0]["row"], 2);
    assert_eq!(json["plan"]["updates"][0]["col"], 2);
    assert_eq!(json["plan"]["updates"][0]["value"], "5");
    assert!(json["log"].as_array().unwrap().len() > 5);

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ws.path("report.json")).unwrap()).unwrap();
    assert_eq!(saved["plan"], json["plan"]);
}

// ===========================================================================
// exit codes
// ===========================================================================

#[test]
fn missing_dashboard_column_exit_31() {
    let ws = Workspace::new();
    ws.write("dashboard.csv", "Imobiliária,Estado\nACME,PE\n");
    let out = ws.run(&["run", "base.csv", "--dashboard-csv", "dashboard.csv"]);

    assert_eq!(out.status.code(), Some(31));
    let log = stdout(&out);
    assert!(log.contains("ERROR: remote schema error: column 'Quantidade de Corretores' not found"));
    assert!(log.trim_end().ends_with("Synchronization finished."));
    assert!(stderr(&out).contains("dashsync check"));
}

#[test]
fn missing_dashboard_file_exit_30() {
    let ws = Workspace::new();
    let out = ws.run(&["run", "base.csv", "--dashboard-csv", "missing.csv"]);
    assert_eq!(out.status.code(), Some(30));
}

#[test]
fn unknown_source_extension_exit_20() {
    let ws = Workspace::new();
    ws.write("base.ods", "x");
    let out = ws.run(&["run", "base.ods", "--dashboard-csv", "dashboard.csv"]);
    assert_eq!(out.status.code(), Some(20));
}

#[test]
fn missing_source_column_exit_21() {
    let ws = Workspace::new();
    ws.write("base.csv", "Nome fantasia;Corretores\nAcme;5\n");
    let out = ws.run(&["run", "base.csv", "--dashboard-csv", "dashboard.csv"]);

    assert_eq!(out.status.code(), Some(21));
    assert!(stdout(&out).contains("column 'Estado' not found"));
}

#[test]
fn bad_config_exit_10() {
    let ws = Workspace::new();
    ws.write("sync.toml", "[rules\nactive = 1");
    let out = ws.run(&["run", "base.csv", "--dashboard-csv", "dashboard.csv", "--config", "sync.toml"]);
    assert_eq!(out.status.code(), Some(10));
}

#[test]
fn missing_token_exit_12() {
    let ws = Workspace::new();
    let out = ws.run(&["run", "base.csv", "--spreadsheet-id", "sheet-1"]);

    assert_eq!(out.status.code(), Some(12));
    assert!(stderr(&out).contains("DASHSYNC_ACCESS_TOKEN"));
}

#[test]
fn missing_spreadsheet_id_exit_11() {
    let ws = Workspace::new();
    let out = ws.run(&["run", "base.csv", "--access-token", "tok"]);
    assert_eq!(out.status.code(), Some(11));
}

#[test]
fn no_subcommand_is_usage_error() {
    let ws = Workspace::new();
    let out = ws.run(&[]);
    assert_eq!(out.status.code(), Some(2));
}

// ===========================================================================
// check / config
// ===========================================================================

#[test]
fn check_reports_dashboard_shape() {
    let ws = Workspace::new();
    let out = ws.run(&["check", "--dashboard-csv", "dashboard.csv"]);

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("1 data row(s), 6 column(s)"));
}

#[test]
fn config_validate_and_show() {
    let ws = Workspace::new();
    ws.write(
        "sync.toml",
        "[rules]\nscope_token = \"(RECIFE)\"\n\n[remote]\nvalue_input = \"raw\"\n",
    );

    let out = ws.run(&["config", "validate", "sync.toml"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("key 'Nome fantasia', 4 mapping(s)"));

    let out = ws.run(&["config", "show", "sync.toml", "--json"]);
    let json: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(json["rules"]["scope_token"], "(RECIFE)");
    assert_eq!(json["remote"]["value_input"], "raw");
    assert_eq!(json["remote"]["tab"], "BaseDeDados");
}

#[test]
fn config_validate_rejects_unmapped_key() {
    let ws = Workspace::new();
    ws.write(
        "sync.toml",
        "[[mapping]]\nsource = \"Cidade\"\nremote = \"Cidade\"\n",
    );
    let out = ws.run(&["config", "validate", "sync.toml"]);
    assert_eq!(out.status.code(), Some(11));
}

// ===========================================================================
// run against a mocked Sheets API
// ===========================================================================

#[test]
fn run_against_sheets_api() {
    let ws = Workspace::new();
    let server = MockServer::start();

    let get = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet-1/values/BaseDeDados")
            .header("authorization", "Bearer tok");
        then.status(200).json_body(serde_json::json!({
            "range": "BaseDeDados!A1:F2",
            "majorDimension": "ROWS",
            "values": [
                ["Imobiliária", "Quantidade de Corretores", "Estado", "Cidade", "Ativa em sistema", "Contrato assinado"],
                ["ACME (CARUARU)", "3", "PE", "Caruaru", "INATIVO", "Não Assinado"]
            ]
        }));
    });
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/v4/spreadsheets/sheet-1/values:batchUpdate")
            .json_body(serde_json::json!({
                "valueInputOption": "USER_ENTERED",
                "data": [
                    { "range": "BaseDeDados!B2", "values": [["5"]] },
                    { "range": "BaseDeDados!E2", "values": [["ATIVO"]] },
                    { "range": "BaseDeDados!F2", "values": [["Assinado"]] }
                ]
            }));
        then.status(200).json_body(serde_json::json!({ "totalUpdatedCells": 3 }));
    });
    let append = server.mock(|when, then| {
        when.method(POST)
            .path("/v4/spreadsheets/sheet-1/values/BaseDeDados!A1:append")
            .query_param("valueInputOption", "USER_ENTERED")
            .json_body(serde_json::json!({
                "values": [["Sol (CARUARU)", "4", "PE", "Caruaru", "INATIVO", "Não Assinado"]]
            }));
        then.status(200).json_body(serde_json::json!({ "updates": { "updatedRows": 1 } }));
    });

    let out = dashsync(ws.dir.path())
        .current_dir(ws.dir.path())
        .env("DASHSYNC_ACCESS_TOKEN", "tok")
        .env("DASHSYNC_SPREADSHEET_ID", "sheet-1")
        .args(["run", "base.csv", "--api-base", server.base_url().as_str()])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(0), "stdout: {}\nstderr: {}", stdout(&out), stderr(&out));
    get.assert_calls(1);
    update.assert_calls(1);
    append.assert_calls(1);
    assert!(stdout(&out).contains("Connecting to Google Sheets sheet-1 (tab 'BaseDeDados')..."));
}

#[test]
fn rejected_update_exit_32() {
    let ws = Workspace::new();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/sheet-1/values/BaseDeDados");
        then.status(200).json_body(serde_json::json!({
            "values": [
                ["Imobiliária", "Quantidade de Corretores", "Estado", "Cidade", "Ativa em sistema", "Contrato assinado"],
                ["ACME (CARUARU)", "3", "PE", "Caruaru", "ATIVO", "Assinado"]
            ]
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/v4/spreadsheets/sheet-1/values:batchUpdate");
        then.status(403).json_body(serde_json::json!({
            "error": { "code": 403, "message": "The caller does not have permission" }
        }));
    });
    let append = server.mock(|when, then| {
        when.method(POST).path("/v4/spreadsheets/sheet-1/values/BaseDeDados!A1:append");
        then.status(200);
    });

    let out = ws.run(&[
        "run",
        "base.csv",
        "--spreadsheet-id",
        "sheet-1",
        "--access-token",
        "tok",
        "--api-base",
        server.base_url().as_str(),
    ]);

    assert_eq!(out.status.code(), Some(32));
    assert!(stdout(&out).contains("ERROR: remote rejected batch of 1 cell update(s)"));
    append.assert_calls(0);
}
