//! Tests for container app template emission.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use kiln_codegen::{
    Error, Generator as _,
    pipeline::{CompilationContext, Pipeline},
};
use kiln_codegen_aca::{Generator, ServiceManifestEmitter};
use kiln_ir::Exposure;

const SHOP: &str = r#"{
  "resources": {
    "pg": { "type": "postgres.server.v0" },
    "db": { "type": "postgres.database.v0", "parent": "pg" },
    "storage": { "type": "azure.storage.v0" },
    "blobs": { "type": "azure.storage.blob.v0", "parent": "storage" },
    "api": {
      "type": "project.v0",
      "path": "Api/Api.csproj",
      "bindings": {
        "http": { "scheme": "http", "protocol": "tcp", "transport": "http" }
      }
    },
    "web": {
      "type": "project.v0",
      "path": "Web/Web.csproj",
      "env": {
        "ConnectionStrings__db": "{db.connectionString}",
        "ConnectionStrings__blobs": "{blobs.connectionString}",
        "services__api__0": "{api.bindings.http.url}",
        "GREETING": "hello {{world}}"
      },
      "bindings": {
        "http": { "scheme": "http", "protocol": "tcp", "transport": "http" },
        "https": { "scheme": "https", "protocol": "tcp", "transport": "http" }
      }
    },
    "mongo": {
      "type": "container.v0",
      "image": "docker.io/library/mongo:7.0",
      "args": ["--bind_ip_all"],
      "connectionString": "mongodb://{mongo.bindings.tcp.host}:{mongo.bindings.tcp.port}",
      "bindings": {
        "tcp": { "scheme": "tcp", "protocol": "tcp", "transport": "tcp", "containerPort": 27017 }
      }
    }
  }
}"#;

fn compile(src: &str, exposure: Exposure) -> CompilationContext {
    Pipeline::new()
        .exposure(exposure)
        .compile(src.as_bytes())
        .expect("pipeline should succeed")
}

fn expose(names: &[&str]) -> Exposure {
    let mut exposure = Exposure::new();
    for name in names {
        exposure.expose_all(*name);
    }
    exposure
}

#[test]
fn test_web_template() {
    let ctx = compile(SHOP, expose(&["web"]));
    let web = ServiceManifestEmitter::emit(ctx.graph().unwrap(), "web").unwrap();

    insta::assert_snapshot!("web_template", web);
}

#[test]
fn test_container_template() {
    let ctx = compile(SHOP, Exposure::new());
    let mongo = ServiceManifestEmitter::emit(ctx.graph().unwrap(), "mongo").unwrap();

    assert!(mongo.contains("- image: docker.io/library/mongo:7.0"));
    assert!(mongo.contains("- '--bind_ip_all'"));
    assert!(mongo.contains("transport: tcp"));
    assert!(mongo.contains("targetPort: 27017"));
    assert!(mongo.contains("exposedPort: 27017"));
    assert!(!mongo.contains("registries:"));
    assert!(!mongo.contains("secrets:"));
}

#[test]
fn test_exposure_passthrough() {
    let internal = compile(SHOP, Exposure::new());
    let web = ServiceManifestEmitter::emit(internal.graph().unwrap(), "web").unwrap();
    assert!(web.contains("external: false"));
    assert!(web.contains("allowInsecure: false"));
    assert!(web.contains("http://api.internal.{{ .Env.AZURE_CONTAINER_APPS_ENVIRONMENT_DEFAULT_DOMAIN }}"));

    let exposed = compile(SHOP, expose(&["web", "api"]));
    let graph = exposed.graph().unwrap();
    let web = ServiceManifestEmitter::emit(graph, "web").unwrap();
    assert!(web.contains("external: true"));
    assert!(web.contains("http://api.{{ .Env.AZURE_CONTAINER_APPS_ENVIRONMENT_DEFAULT_DOMAIN }}"));

    let api = ServiceManifestEmitter::emit(graph, "api").unwrap();
    assert!(api.contains("external: true"));
    assert!(api.contains("allowInsecure: true"));
}

#[test]
fn test_narrowed_exposure() {
    let mut exposure = Exposure::new();
    exposure.expose_binding("web", "https");

    let ctx = compile(SHOP, exposure);
    let web = ServiceManifestEmitter::emit(ctx.graph().unwrap(), "web").unwrap();

    assert!(web.contains("external: true"));
    assert!(web.contains("allowInsecure: false"));
}

#[test]
fn test_emission_is_deterministic() {
    let first = Generator::new(compile(SHOP, expose(&["web"])).graph().unwrap())
        .preview()
        .unwrap();
    let second = Generator::new(compile(SHOP, expose(&["web"])).graph().unwrap())
        .preview()
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_generator_emits_every_deployable() {
    let ctx = compile(SHOP, Exposure::new());
    let output = Generator::new(ctx.graph().unwrap()).preview().unwrap();

    let paths: Vec<_> = output.paths().collect();
    assert_eq!(
        paths,
        vec![
            "api/containerApp.tmpl.yaml",
            "mongo/containerApp.tmpl.yaml",
            "web/containerApp.tmpl.yaml",
        ]
    );
}

#[test]
fn test_failure_is_isolated() {
    let ctx = compile(
        r#"{ "resources": {
            "good": { "type": "project.v0", "path": "Good.csproj" },
            "bad": {
                "type": "project.v0",
                "path": "Bad.csproj",
                "env": { "DB": "{missing.connectionString}" }
            }
        } }"#,
        Exposure::new(),
    );
    let generator = Generator::new(ctx.graph().unwrap());

    let results = generator.emit_each();
    assert_eq!(results.len(), 2);
    assert!(results[0].1.is_ok());

    let err = results[1].1.as_ref().unwrap_err();
    assert_eq!(err.to_string(), "failed to resolve 'DB'");
    assert!(matches!(
        err.root(),
        Error::UnresolvedReference { name, expression }
            if name == "missing" && expression == "{missing.connectionString}"
    ));

    assert!(generator.preview().is_err());
}

#[test]
fn test_not_deployable() {
    let ctx = compile(SHOP, Exposure::new());
    let err = ServiceManifestEmitter::emit(ctx.graph().unwrap(), "pg").unwrap_err();
    assert!(matches!(err, Error::InvalidResource { .. }));

    let err = ServiceManifestEmitter::emit(ctx.graph().unwrap(), "ghost").unwrap_err();
    assert!(matches!(err, Error::UnknownResource { .. }));
}

#[test]
fn test_multiline_values_stay_in_their_scalar() {
    let ctx = compile(
        r#"{ "resources": {
            "web": {
                "type": "container.v0",
                "image": "nginx",
                "args": ["--motd", "hello\nworld"],
                "env": { "CERT": "line1\n  - name: INJECTED\nline3" }
            }
        } }"#,
        Exposure::new(),
    );
    let web = ServiceManifestEmitter::emit(ctx.graph().unwrap(), "web").unwrap();

    assert!(web.contains("  - \"hello\\nworld\"\n"));
    assert!(web.contains("    value: \"line1\\n  - name: INJECTED\\nline3\"\n"));
    assert!(!web.lines().any(|line| line.trim_start() == "- name: INJECTED"));
    assert!(web.lines().all(|line| !line.starts_with("line3")));
}
