use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn square(x: f64, y: f64) -> Value {
    json!([[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0]])
}

/// Four zones in a row; the outer two host clusters
fn line_dataset() -> Value {
    let animal = [0.2, 0.9, 0.9, 0.2];
    let zones: Vec<Value> = animal
        .iter()
        .enumerate()
        .map(|(i, score)| {
            json!({
                "zone": i + 1,
                "polygon": square(i as f64, 0.0),
                "human_score": 0.0,
                "animal_score": score,
                "contains_cluster": i == 0 || i == 3,
            })
        })
        .collect();
    json!({
        "zones": zones,
        "fixtures": [
            {"id": 1, "point": [0.5, 0.5]},
            {"id": 2, "point": [2.5, 0.5]},
            {"id": 3, "point": [8.0, 8.0]}
        ]
    })
}

fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("dark-corridors").expect("binary");
    cmd.arg("--quiet");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn plan_reports_corridor_and_switched_off_lights() {
    let temp = tempdir().unwrap();
    let dataset = write_json(temp.path(), "city.json", &line_dataset());

    let output = cli()
        .arg("plan")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--preset")
        .arg("animal-first")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["status"], "complete");
    assert_eq!(report["corridors"][0]["label"], "AB");
    assert_eq!(report["corridors"][0]["zones"], json!([1, 2, 3, 4]));
    assert_eq!(report["corridors"][0]["score"], 2.2);
    assert_eq!(report["excluded"], json!([1, 2]));
    assert_eq!(report["retained"], json!([3]));
}

#[test]
fn plan_writes_report_files() {
    let temp = tempdir().unwrap();
    let dataset = write_json(temp.path(), "city.json", &line_dataset());
    let out = temp.path().join("out/plan.json");
    let out_md = temp.path().join("out/plan.md");

    cli()
        .arg("plan")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--animal-weight")
        .arg("1")
        .arg("--out")
        .arg(&out)
        .arg("--out-md")
        .arg(&out_md)
        .assert()
        .success();

    let saved: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(saved["total_score"], 2.2);
    let md = fs::read_to_string(&out_md).unwrap();
    assert!(md.contains("# Dark corridor plan"));
    assert!(md.contains("`AB`"));
}

#[test]
fn plan_replays_a_saved_cost_matrix() {
    let temp = tempdir().unwrap();
    let dataset = write_json(temp.path(), "city.json", &line_dataset());
    let snapshot = temp.path().join("matrix/cost_matrix.json");

    let built = cli()
        .arg("build-matrix")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--out")
        .arg(&snapshot)
        .arg("--animal-weight")
        .arg("1")
        .output()
        .unwrap();
    assert!(built.status.success());
    let summary = stdout_json(&built);
    assert_eq!(summary["zones"], 4);
    assert_eq!(summary["edges"], 6);
    assert!(snapshot.exists());

    let output = cli()
        .arg("plan")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--animal-weight")
        .arg("1")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["corridors"][0]["score"], 2.2);
}

#[test]
fn plan_rejects_a_matrix_built_under_other_settings() {
    let temp = tempdir().unwrap();
    let dataset = write_json(temp.path(), "city.json", &line_dataset());
    let snapshot = temp.path().join("cost_matrix.json");

    cli()
        .arg("build-matrix")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--out")
        .arg(&snapshot)
        .arg("--animal-weight")
        .arg("1")
        .assert()
        .success();

    cli()
        .arg("plan")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--preset")
        .arg("human-first")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Snapshot error"));
}

#[test]
fn disconnected_clusters_exit_with_partial_report() {
    let temp = tempdir().unwrap();
    let mut data = line_dataset();
    data["zones"].as_array_mut().unwrap().push(json!({
        "zone": 9,
        "polygon": square(20.0, 20.0),
        "human_score": 0.1,
        "animal_score": 0.1,
        "contains_cluster": true,
    }));
    let dataset = write_json(temp.path(), "city.json", &data);

    let output = cli()
        .arg("plan")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--animal-weight")
        .arg("1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let report = stdout_json(&output);
    assert_eq!(report["status"], "disconnected");
    assert_eq!(report["paths"].as_array().unwrap().len(), 3);
    assert!(report["error"].as_str().unwrap().contains("disconnected"));
}

#[test]
fn paths_lists_every_cluster_pair() {
    let temp = tempdir().unwrap();
    let dataset = write_json(temp.path(), "city.json", &line_dataset());

    let output = cli()
        .arg("paths")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--preset")
        .arg("animal-first")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["clusters"][0]["label"], "A");
    assert_eq!(report["clusters"][1]["zone"], 4);
    assert_eq!(report["cost_matrix"], json!([[0.0, 2.2], [0.0, 0.0]]));
}

#[test]
fn missing_relevance_without_weight_is_rejected() {
    let temp = tempdir().unwrap();
    let dataset = write_json(temp.path(), "city.json", &line_dataset());

    cli()
        .arg("plan")
        .arg("--dataset")
        .arg(&dataset)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn alphabetic_labels_cap_cluster_count() {
    let temp = tempdir().unwrap();
    let zones: Vec<Value> = (0..27)
        .map(|i| {
            json!({
                "zone": i,
                "polygon": square(i as f64 * 3.0, 0.0),
                "human_score": 0.5,
                "animal_score": 0.5,
                "contains_cluster": true,
            })
        })
        .collect();
    let dataset = write_json(temp.path(), "city.json", &json!({ "zones": zones }));

    cli()
        .arg("paths")
        .arg("--dataset")
        .arg(&dataset)
        .arg("--animal-weight")
        .arg("0.5")
        .arg("--labels")
        .arg("alphabetic")
        .assert()
        .failure()
        .stderr(predicate::str::contains("27"));
}
