use jsonschema::validator_for;
use test_support::{cmd_bin, fixture_path, BIN};

fn compile_manifest_schema() -> jsonschema::Validator {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let path = manifest_dir
    .join("tests")
    .join("schemas")
    .join("dax-narrative.manifest.schema.json");
  let data = std::fs::read(&path).expect("schema file");
  let v: serde_json::Value = serde_json::from_slice(&data).expect("schema json");
  validator_for(&v).expect("compile schema")
}

#[test]
fn several_configs_write_directory_and_manifest() {
  let outdir = test_support::tempdir();
  let out_path = outdir.path().to_str().unwrap();

  let out = cmd_bin(BIN)
    .args([
      "--config",
      &fixture_path("configs/survey.json"),
      "--config",
      &fixture_path("configs/support_desk.json"),
      "--out",
      out_path,
      "--now-override",
      "2025-08-15T12:00:00",
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let ptr: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let dir = ptr["dir"].as_str().expect("dir string");
  assert_eq!(ptr["manifest"], "manifest.json");

  let manifest_path = std::path::Path::new(dir).join("manifest.json");
  let manifest: serde_json::Value = serde_json::from_slice(&std::fs::read(&manifest_path).unwrap()).unwrap();
  compile_manifest_schema()
    .validate(&manifest)
    .expect("manifest schema validation failed");

  assert_eq!(manifest["generated_at"], "2025-08-15T12:00:00");
  let artifacts = manifest["artifacts"].as_array().unwrap();
  assert_eq!(artifacts.len(), 2);
  assert_eq!(artifacts[0]["file"], "survey.dax");
  assert_eq!(artifacts[0]["sections"], serde_json::json!(["header", "kpi_cards"]));
  assert_eq!(artifacts[1]["file"], "support_desk.dax");
  assert_eq!(artifacts[1]["theme"], "Forest Green");
  assert_eq!(artifacts[1]["sections"].as_array().unwrap().len(), 11);

  for a in artifacts {
    let p = std::path::Path::new(dir).join(a["file"].as_str().unwrap());
    let body = std::fs::read_to_string(&p).expect("artifact file");
    assert_eq!(body.len() as u64, a["bytes"].as_u64().unwrap());
  }
}

#[test]
fn trailing_slash_forces_directory_for_one_config() {
  let outdir = test_support::tempdir();
  let out_path = format!("{}/nested/", outdir.path().display());
  let out = cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/survey.json"), "--out", &out_path])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let ptr: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let dir = std::path::PathBuf::from(ptr["dir"].as_str().unwrap());
  assert!(dir.join("survey.dax").exists());
  assert!(dir.join("manifest.json").exists());
}

#[test]
fn one_bad_config_aborts_the_batch() {
  let outdir = test_support::tempdir();
  let out = cmd_bin(BIN)
    .args([
      "--config",
      &fixture_path("configs/survey.json"),
      "--config",
      &fixture_path("configs/no_metrics.json"),
      "--out",
      outdir.path().to_str().unwrap(),
    ])
    .output()
    .unwrap();
  assert!(!out.status.success());
  assert!(!outdir.path().join("manifest.json").exists());
  assert!(!outdir.path().join("survey.dax").exists());
}
