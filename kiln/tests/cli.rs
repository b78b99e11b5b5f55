//! End-to-end tests driving the `kiln` binary against a project on disk.

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "resources": {
    "cache": { "type": "redis.v0" },
    "storage": { "type": "azure.storage.v0" },
    "blobs": { "type": "azure.storage.blob.v0", "parent": "storage" },
    "web": {
      "type": "project.v0",
      "path": "Web/Web.csproj",
      "env": {
        "ConnectionStrings__cache": "{cache.connectionString}",
        "ConnectionStrings__blobs": "{blobs.connectionString}"
      },
      "bindings": {
        "http": { "scheme": "http", "protocol": "tcp", "transport": "http" },
        "https": { "scheme": "https", "protocol": "tcp", "transport": "http" }
      }
    }
  }
}"#;

const KILN_TOML: &str = r#"
[project]
name = "shop"
manifest = "manifest.json"
output = "infra"

[services.web]
external = true
"#;

fn project(manifest: &str, config: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("manifest.json"), manifest).unwrap();
    if let Some(config) = config {
        fs::write(temp.path().join("kiln.toml"), config).unwrap();
    }
    temp
}

fn kiln(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kiln"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run kiln")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_generate_writes_infra_and_templates() {
    let temp = project(MANIFEST, Some(KILN_TOML));

    let output = kiln(temp.path(), &["generate"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let infra = temp.path().join("infra");
    for path in [
        "main.bicep",
        "main.parameters.json",
        "modules/environment.bicep",
        "modules/storage.bicep",
        "web/containerApp.tmpl.yaml",
    ] {
        assert!(infra.join(path).exists(), "missing {}", path);
    }
    assert!(!infra.join("modules/keyvault.bicep").exists());

    let template = fs::read_to_string(infra.join("web/containerApp.tmpl.yaml")).unwrap();
    assert!(template.contains("external: true"));
    assert!(template.contains("secretRef: connectionstrings--cache"));

    let out = stdout(&output);
    assert!(out.contains("shop (manifest.json)"));
    assert!(out.contains("  + main.bicep"));
}

#[test]
fn test_generate_keeps_edited_parameters() {
    let temp = project(MANIFEST, Some(KILN_TOML));
    let params = temp.path().join("infra").join("main.parameters.json");

    assert!(kiln(temp.path(), &["generate"]).status.success());
    fs::write(&params, "{ \"edited\": true }").unwrap();

    let output = kiln(temp.path(), &["generate"]);
    assert!(output.status.success());

    assert_eq!(fs::read_to_string(&params).unwrap(), "{ \"edited\": true }");
    assert!(stdout(&output).contains("= main.parameters.json (exists, kept)"));
}

#[test]
fn test_generate_is_deterministic() {
    let temp = project(MANIFEST, None);
    let read = |dir: &Path| {
        ["main.bicep", "modules/storage.bicep", "web/containerApp.tmpl.yaml"]
            .map(|p| fs::read_to_string(dir.join(p)).unwrap())
    };

    assert!(kiln(temp.path(), &["generate", "-o", "first"]).status.success());
    assert!(kiln(temp.path(), &["generate", "-o", "second"]).status.success());

    assert_eq!(
        read(&temp.path().join("first")),
        read(&temp.path().join("second"))
    );
}

#[test]
fn test_dry_run_writes_nothing() {
    let temp = project(MANIFEST, None);

    let output = kiln(temp.path(), &["generate", "--dry-run", "-o", "out"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert!(!temp.path().join("out").exists());
    let out = stdout(&output);
    assert!(out.contains("── web/containerApp.tmpl.yaml ──"));
    assert!(out.contains("files would be generated"));
}

#[test]
fn test_expose_flag_narrows_to_binding() {
    let temp = project(MANIFEST, None);

    let output = kiln(
        temp.path(),
        &["generate", "--dry-run", "--expose", "web:https"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("external: true"));
    assert!(out.contains("allowInsecure: false"));
}

#[test]
fn test_unknown_exposure_fails() {
    let temp = project(MANIFEST, None);

    let output = kiln(temp.path(), &["generate", "--expose", "ghost"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown resource 'ghost'"));
}

#[test]
fn test_check_reports_every_failing_service() {
    let manifest = r#"{
      "resources": {
        "api": {
          "type": "project.v0",
          "path": "Api.csproj",
          "env": { "DB": "{missing.connectionString}" }
        },
        "web": { "type": "project.v0", "path": "Web.csproj" },
        "worker": {
          "type": "project.v0",
          "path": "Worker.csproj",
          "env": { "QUEUE": "{nope.connectionString}" }
        }
      }
    }"#;
    let temp = project(manifest, None);

    let output = kiln(temp.path(), &["check"]);
    assert!(!output.status.success());

    let err = stderr(&output);
    assert!(err.contains("service 'api': failed to resolve 'DB'"));
    assert!(err.contains("service 'worker': failed to resolve 'QUEUE'"));
    assert!(!err.contains("service 'web'"));
}

#[test]
fn test_check_valid_manifest() {
    let temp = project(MANIFEST, None);

    let output = kiln(temp.path(), &["check"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("manifest.json is valid"));
}

#[test]
fn test_invalid_manifest_renders_diagnostic() {
    let temp = project("{ \"resources\": ", None);

    let output = kiln(temp.path(), &["check"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to parse manifest"));
}

#[test]
fn test_explain_lists_graph_and_registry() {
    let temp = project(MANIFEST, Some(KILN_TOML));

    let output = kiln(temp.path(), &["explain"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("1. validate"));
    assert!(out.contains("- web (project.v0) [service]"));
    assert!(out.contains("external: http, https"));
    assert!(out.contains("blobs: azure.storage.blob.v0"));
    assert!(out.contains("cache (redis)"));
    assert!(out.contains("- modules/storage.bicep"));
}
