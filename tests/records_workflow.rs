use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

const PASS: &str = "112358";

fn hallazgos_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hallazgos"));
    cmd.env("HOME", home);
    cmd.env_remove("HALLAZGOS_CONFIG");
    cmd.env_remove("HALLAZGOS_PASS");
    cmd.env_remove("HALLAZGOS_UI_COLOR");
    cmd.env_remove("HALLAZGOS_UI_MAX_TABLE_ROWS");
    cmd.env_remove("HALLAZGOS_STORE_PATH");
    cmd.env_remove("HALLAZGOS_ADMIN_PASSCODE");
    cmd.env_remove("HALLAZGOS_EXPORT_SHEET_NAME");
    cmd.env_remove("HALLAZGOS_LOGS_ENABLED");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    hallazgos_cmd(home).args(args).output().expect("run hallazgos")
}

fn run_ok_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let out = run(home, &full);
    assert!(
        out.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("parse json")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home = std::env::temp_dir().join(format!(
        "hallazgos-workflow-test-{}-{seq}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn add(home: &Path, zone: &str, tipo: &str, desc: &str, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["--pass", PASS, "add", "--zone", zone, "--tipo", tipo, "--desc", desc];
    args.extend_from_slice(extra);
    run_ok_json(home, &args)
}

fn codes(list: &serde_json::Value, column: &str) -> Vec<String> {
    list.get(column)
        .and_then(|a| a.as_array())
        .expect("column array")
        .iter()
        .map(|f| {
            format!(
                "{} {}",
                f.get("tipo").and_then(|t| t.as_str()).unwrap_or(""),
                f.get("id").and_then(|i| i.as_u64()).unwrap_or(0)
            )
        })
        .collect()
}

#[test]
fn add_assigns_ids_per_kind_across_zones() {
    let home = make_temp_home();

    let first = add(&home, "Pope", "LDA", "Bandeja de goma", &[]);
    assert_eq!(first.pointer("/finding/id").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        first.pointer("/finding/estado").and_then(|v| v.as_str()),
        Some("EN PROCESO")
    );
    assert_eq!(
        first.pointer("/finding/criticidad").and_then(|v| v.as_str()),
        Some("B")
    );

    let second = add(
        &home,
        "Secado",
        "LDA",
        "Ducto",
        &["--crit", "A", "--status", "ATRASADO", "--fecha", "03/02/2025"],
    );
    assert_eq!(second.pointer("/finding/id").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(
        second.pointer("/finding/fechaCierre").and_then(|v| v.as_str()),
        Some("2025-02-03")
    );

    let fc = add(&home, "Secado", "FC", "Goma en rodillo", &[]);
    assert_eq!(fc.pointer("/finding/id").and_then(|v| v.as_u64()), Some(1));

    let list = run_ok_json(&home, &["list", "--zone", "Secado"]);
    assert_eq!(codes(&list, "lda"), vec!["LDA 2"]);
    assert_eq!(codes(&list, "fc"), vec!["FC 1"]);
    assert_eq!(
        list.pointer("/counts/1/count").and_then(|v| v.as_u64()),
        Some(2)
    );

    let found = run_ok_json(&home, &["list", "--search", "GOMA"]);
    assert!(found.get("zone").is_none());
    assert_eq!(codes(&found, "lda"), vec!["LDA 1"]);
    assert_eq!(codes(&found, "fc"), vec!["FC 1"]);

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn edit_and_delete_by_code_reference() {
    let home = make_temp_home();
    add(&home, "Pope", "LDA", "Bandeja", &[]);
    let created = add(&home, "Pope", "FC", "Derrame", &["--doc", "LUP", "--cod-doc", "LUP-7"]);
    let uuid = created
        .pointer("/finding/uuid")
        .and_then(|v| v.as_str())
        .expect("uuid")
        .to_string();

    let edited = run_ok_json(
        &home,
        &[
            "--pass",
            PASS,
            "edit",
            "FC 1@Pope",
            "--status",
            "EJECUTADO",
            "--doc",
            "SIN DOC",
        ],
    );
    assert_eq!(
        edited.pointer("/finding/uuid").and_then(|v| v.as_str()),
        Some(uuid.as_str())
    );
    assert_eq!(
        edited.pointer("/finding/estado").and_then(|v| v.as_str()),
        Some("EJECUTADO")
    );
    assert_eq!(
        edited.pointer("/finding/codigoDoc").and_then(|v| v.as_str()),
        Some("")
    );

    let shown = run_ok_json(&home, &["show", &uuid[..8]]);
    assert_eq!(shown.get("desc").and_then(|v| v.as_str()), Some("Derrame"));

    let deleted = run_ok_json(&home, &["--pass", PASS, "delete", &uuid, "--yes"]);
    assert_eq!(deleted.get("affected").and_then(|v| v.as_u64()), Some(1));

    let list = run_ok_json(&home, &["list"]);
    assert_eq!(codes(&list, "fc"), Vec::<String>::new());
    assert_eq!(codes(&list, "lda"), vec!["LDA 1"]);

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn dry_run_leaves_data_and_logs_untouched() {
    let home = make_temp_home();
    let out = run(
        &home,
        &[
            "--dry-run", "--pass", PASS, "add", "--zone", "Pope", "--tipo", "LDA", "--desc",
            "Ducto",
        ],
    );
    assert!(out.status.success());
    assert!(!home.join(".config/hallazgos/data_riesgos.json").exists());
    assert!(!home.join(".config/hallazgos/logs").exists());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn renumber_compacts_ids_by_zone_precedence() {
    let home = make_temp_home();
    add(&home, "Formacion", "LDA", "uno", &[]);
    add(&home, "Pope", "LDA", "dos", &[]);
    add(&home, "Secado", "LDA", "tres", &[]);

    let first = run_ok_json(&home, &["list", "--zone", "Formacion"]);
    let target = first
        .pointer("/lda/0/uuid")
        .and_then(|v| v.as_str())
        .expect("uuid")
        .to_string();
    run_ok_json(&home, &["--pass", PASS, "delete", "LDA 2@Pope", "--yes"]);

    let out = run_ok_json(&home, &["--pass", PASS, "renumber"]);
    assert_eq!(out.get("affected").and_then(|v| v.as_u64()), Some(2));

    let shown = run_ok_json(&home, &["show", &target]);
    assert_eq!(shown.get("id").and_then(|v| v.as_u64()), Some(2));
    let secado = run_ok_json(&home, &["list", "--zone", "Secado"]);
    assert_eq!(codes(&secado, "lda"), vec!["LDA 1"]);

    let again = run_ok_json(&home, &["--pass", PASS, "renumber"]);
    assert_eq!(again.get("affected").and_then(|v| v.as_u64()), Some(0));

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn stats_filters_and_percentages() {
    let home = make_temp_home();
    add(&home, "Pope", "LDA", "a", &["--crit", "A", "--status", "EJECUTADO"]);
    add(&home, "Pope", "FC", "b", &["--crit", "A"]);
    add(&home, "Secado", "LDA", "c", &["--crit", "C", "--status", "EJECUTADO"]);

    let all = run_ok_json(&home, &["stats"]);
    assert_eq!(all.pointer("/summary/totals/total").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(
        all.pointer("/summary/totals/executed_pct").and_then(|v| v.as_u64()),
        Some(67)
    );
    assert_eq!(
        all.pointer("/summary/pareto/0/zone").and_then(|v| v.as_str()),
        Some("Pope")
    );

    let only_a = run_ok_json(&home, &["stats", "--crit", "A", "--zone", "TODAS"]);
    assert_eq!(
        only_a.pointer("/summary/totals/total").and_then(|v| v.as_u64()),
        Some(2)
    );
    assert_eq!(
        only_a.pointer("/filter/criticality").and_then(|v| v.as_str()),
        Some("A")
    );
    assert!(only_a.pointer("/filter/zone").is_some_and(|v| v.is_null()));

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn json_export_then_import_restores_records() {
    let home = make_temp_home();
    add(&home, "Clarificacion", "FC", "Espuma", &["--obs", "revisar bomba"]);
    add(&home, "Pope", "LDA", "Escalera", &[]);

    let snapshot = home.join("respaldo.json");
    let out = run(
        &home,
        &["export", "json", "--out", snapshot.to_str().expect("utf8 path")],
    );
    assert!(out.status.success());
    let exported: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&snapshot).expect("read snapshot"))
            .expect("parse snapshot");
    assert_eq!(exported.as_array().map(Vec::len), Some(2));

    run_ok_json(&home, &["--pass", PASS, "clear", "--yes"]);
    assert_eq!(
        run_ok_json(&home, &["stats"])
            .pointer("/summary/totals/total")
            .and_then(|v| v.as_u64()),
        Some(0)
    );

    let imported = run_ok_json(
        &home,
        &["--pass", PASS, "import", snapshot.to_str().expect("utf8 path")],
    );
    assert_eq!(imported.get("affected").and_then(|v| v.as_u64()), Some(2));

    let out = run(&home, &["export", "json", "--out", "-"]);
    assert!(out.status.success());
    let again: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse stdout");
    assert_eq!(again, exported);

    let _ = std::fs::remove_dir_all(&home);
}

fn first_lda_uuid(list: &serde_json::Value) -> String {
    list.pointer("/lda/0/uuid")
        .and_then(|v| v.as_str())
        .expect("uuid")
        .to_string()
}

#[test]
fn records_without_uuid_keep_the_one_assigned_on_first_read() {
    let home = make_temp_home();
    let data = home.join(".config/hallazgos/data_riesgos.json");
    std::fs::create_dir_all(data.parent().expect("data dir")).expect("mkdir");
    std::fs::write(
        &data,
        r#"[{"id":1,"zona":"Pope","tipo":"LDA","desc":"Bandeja de goma"}]"#,
    )
    .expect("write data");

    let first = first_lda_uuid(&run_ok_json(&home, &["list"]));
    let second = first_lda_uuid(&run_ok_json(&home, &["list"]));
    assert_eq!(first, second);

    let edited = run_ok_json(
        &home,
        &["--pass", PASS, "edit", &first, "--status", "EJECUTADO"],
    );
    assert_eq!(
        edited.pointer("/finding/uuid").and_then(|v| v.as_str()),
        Some(first.as_str())
    );

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn import_and_clear_replace_an_unreadable_data_file() {
    let home = make_temp_home();
    let data = home.join(".config/hallazgos/data_riesgos.json");
    std::fs::create_dir_all(data.parent().expect("data dir")).expect("mkdir");
    std::fs::write(&data, "{corrupt").expect("write data");

    let good = home.join("bueno.json");
    std::fs::write(
        &good,
        r#"[{"uuid":"u-1","id":3,"zona":"Secado","tipo":"FC","desc":"Goma en rodillo"}]"#,
    )
    .expect("write snapshot");

    let imported = run_ok_json(
        &home,
        &["--pass", PASS, "import", good.to_str().expect("utf8 path")],
    );
    assert_eq!(imported.get("affected").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        imported.pointer("/detail/reemplazados").and_then(|v| v.as_u64()),
        Some(0)
    );
    assert_eq!(
        codes(&run_ok_json(&home, &["list", "--zone", "Secado"]), "fc"),
        vec!["FC 3"]
    );

    std::fs::write(&data, "{corrupt").expect("write data");
    let cleared = run_ok_json(&home, &["--pass", PASS, "clear", "--yes"]);
    assert_eq!(cleared.get("affected").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(
        std::fs::read_to_string(&data).expect("read data").trim(),
        "[]"
    );

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn csv_and_xlsx_exports_write_files() {
    let home = make_temp_home();
    add(&home, "Pope", "LDA", "Ducto, con coma", &["--fecha", "2025-01-31"]);

    let csv = home.join("reporte.csv");
    let xlsx = home.join("reporte.xlsx");
    assert!(run(&home, &["export", "csv", "--out", csv.to_str().expect("utf8")])
        .status
        .success());
    assert!(run(&home, &["export", "xlsx", "--out", xlsx.to_str().expect("utf8")])
        .status
        .success());

    let text = std::fs::read_to_string(&csv).expect("read csv");
    let mut lines = text.lines();
    assert!(lines.next().is_some_and(|h| h.starts_with("ZONA,")));
    let row = lines.next().expect("data row");
    assert!(row.contains("\"Ducto, con coma\""), "{row}");
    assert!(row.contains("31/01/25"), "{row}");

    let bytes = std::fs::read(&xlsx).expect("read xlsx");
    assert!(bytes.starts_with(b"PK"), "xlsx is a zip container");

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn mutations_are_listed_in_logs_newest_first() {
    let home = make_temp_home();
    add(&home, "Pope", "LDA", "a", &[]);
    run_ok_json(&home, &["--pass", PASS, "renumber"]);

    let logs = run_ok_json(&home, &["logs", "--limit", "5"]);
    let commands: Vec<&str> = logs
        .as_array()
        .expect("logs array")
        .iter()
        .filter_map(|l| l.get("command").and_then(|c| c.as_str()))
        .collect();
    assert_eq!(commands, vec!["renumber", "add"]);
    assert_eq!(
        logs.pointer("/1/data_path").and_then(|v| v.as_str()),
        Some("~/.config/hallazgos/data_riesgos.json")
    );

    let _ = std::fs::remove_dir_all(&home);
}
