use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn make_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_biasbuster"))
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env("BIASBUSTER_API_BASE_URL", "http://127.0.0.1:9")
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .output()
        .expect("run biasbuster")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn config_file(home: &Path) -> PathBuf {
    let out = run(home, &["config"]);
    assert!(out.status.success(), "config failed: {}", stderr(&out));
    let text = stdout(&out);
    let line = text
        .lines()
        .find_map(|l| l.strip_prefix("Config file: "))
        .expect("config path line");
    PathBuf::from(line.trim())
}

fn write_report(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("report.json");
    fs::write(&path, body).expect("write report");
    path
}

const REPORT: &str =
    r#"{"result":"Bias","explanation":"Approval rates differ by age.","howToFix":"Re-weight."}"#;

#[test]
fn export_writes_json_report() {
    let home = make_home();
    let report = write_report(home.path(), REPORT);
    let out_dir = home.path().join("out");

    let out = run(
        home.path(),
        &[
            "export",
            "--report",
            report.to_str().unwrap(),
            "--id",
            "msg-1",
            "--format",
            "json",
            "--out",
            out_dir.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let written = out_dir.join("bias-report-msg-1.json");
    assert!(stdout(&out).contains("bias-report-msg-1.json"));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
    assert_eq!(json["report_id"], "msg-1");
    assert_eq!(json["result"], "Bias");
    assert_eq!(json["howToFix"], "Re-weight.");
}

#[test]
fn export_defaults_to_pdf() {
    let home = make_home();
    let report = write_report(
        home.path(),
        r#"{"bias_detected":true,"reasons":["skewed sample"],"fixes":["collect more data"]}"#,
    );
    let out_dir = home.path().join("out");

    let out = run(
        home.path(),
        &[
            "export",
            "--report",
            report.to_str().unwrap(),
            "--id",
            "legacy",
            "--out",
            out_dir.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let bytes = fs::read(out_dir.join("bias-report-legacy.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Result: Bias"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn export_rejects_file_that_is_not_a_report() {
    let home = make_home();
    let report = write_report(home.path(), r#"{"hello":"world"}"#);

    let out = run(
        home.path(),
        &["export", "--report", report.to_str().unwrap(), "--id", "x"],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Not a bias report"));
}

#[test]
fn config_shows_defaults_and_env_override() {
    let home = make_home();
    let out = run(home.path(), &["config"]);
    assert!(out.status.success());

    let text = stdout(&out);
    assert!(text.contains("url          = http://127.0.0.1:9"));
    assert!(text.contains("default_model = gpt-4"));
    assert!(text.contains("default_format = pdf"));
}

#[test]
fn config_persists_changes() {
    let home = make_home();
    let out = run(
        home.path(),
        &["config", "--server", "https://bias.example/", "--model", "claude-3"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let saved = fs::read_to_string(config_file(home.path())).unwrap();
    assert!(saved.contains("url = \"https://bias.example\""));
    assert!(saved.contains("default_model = \"claude-3\""));
}

#[test]
fn config_rejects_unknown_model() {
    let home = make_home();
    let out = run(home.path(), &["config", "--model", "gpt-9"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unknown model"));
}

#[test]
fn logout_removes_stored_token() {
    let home = make_home();
    let dir = config_file(home.path()).parent().unwrap().to_path_buf();
    fs::create_dir_all(&dir).unwrap();
    let session = dir.join("session.toml");
    fs::write(&session, "token = \"abc\"\n").unwrap();

    let out = run(home.path(), &["logout"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Logged out."));
    assert!(!session.exists());

    let again = run(home.path(), &["logout"]);
    assert!(stdout(&again).contains("Not logged in."));
}

#[test]
fn whoami_without_login_does_not_touch_network() {
    let home = make_home();
    let out = run(home.path(), &["whoami"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Not logged in."));
}

#[test]
fn history_without_login_points_at_login() {
    let home = make_home();
    let out = run(home.path(), &["history"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("biasbuster login"));
}

#[test]
fn send_refuses_unsupported_attachment() {
    let home = make_home();
    let file = home.path().join("weights.pkl");
    fs::write(&file, b"\x80\x04").unwrap();

    let out = run(
        home.path(),
        &["send", "check this", "--file", file.to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Unsupported file type"));
}
