use std::path::PathBuf;

use kiln_codegen::builder::CodeBuilder;
use kiln_core::{GENERATED_HEADER, GeneratedFile};

use crate::{EnvValue, ServiceManifestContext, TEMPLATE_FILE};

const API_VERSION: &str = "2024-02-02-preview";

/// The `containerApp.tmpl.yaml` of one service.
pub struct ContainerAppTemplate<'a> {
    ctx: &'a ServiceManifestContext,
}

impl<'a> ContainerAppTemplate<'a> {
    pub fn new(ctx: &'a ServiceManifestContext) -> Self {
        Self { ctx }
    }
}

impl GeneratedFile for ContainerAppTemplate<'_> {
    fn path(&self) -> PathBuf {
        PathBuf::from(&self.ctx.name).join(TEMPLATE_FILE)
    }

    fn render(&self) -> String {
        let ctx = self.ctx;

        CodeBuilder::yaml()
            .comment("#", GENERATED_HEADER)
            .line(&format!("api-version: {}", API_VERSION))
            .line("location: {{ .Env.AZURE_LOCATION }}")
            .block("identity:", |b| {
                b.line("type: UserAssigned").block("userAssignedIdentities:", |b| {
                    b.line("? \"{{ .Env.AZURE_CONTAINER_REGISTRY_MANAGED_IDENTITY_ID }}\"")
                        .line(": {}")
                })
            })
            .block("properties:", |b| {
                b.line("environmentId: {{ .Env.AZURE_CONTAINER_APPS_ENVIRONMENT_ID }}")
                    .block("configuration:", |b| configuration(b, ctx))
                    .block("template:", |b| template(b, ctx))
            })
            .block("tags:", |b| {
                b.line(&format!("azd-service-name: {}", ctx.name))
                    .line(&format!("aspire-resource-name: {}", ctx.name))
            })
            .build()
    }
}

fn configuration(b: CodeBuilder, ctx: &ServiceManifestContext) -> CodeBuilder {
    let b = b.line("activeRevisionsMode: single");

    let b = match &ctx.ingress {
        Some(ingress) => b.block("ingress:", |b| {
            let b = b
                .line(&format!("external: {}", ingress.external))
                .line(&format!("targetPort: {}", ingress.target_port));
            let b = match ingress.exposed_port() {
                Some(port) => b.line(&format!("exposedPort: {}", port)),
                None => b,
            };
            b.line(&format!("transport: {}", ingress.transport))
                .line(&format!("allowInsecure: {}", ingress.allow_insecure))
        }),
        None => b,
    };

    let b = b.when(ctx.uses_registry, |b| {
        b.block("registries:", |b| {
            b.line("- server: {{ .Env.AZURE_CONTAINER_REGISTRY_ENDPOINT }}")
                .line("  identity: {{ .Env.AZURE_CONTAINER_REGISTRY_MANAGED_IDENTITY_ID }}")
        })
    });

    b.when(!ctx.secrets.is_empty(), |b| {
        b.block("secrets:", |b| {
            b.each(&ctx.secrets, |b, secret| {
                b.line(&format!("- name: {}", secret.name))
                    .line(&format!("  value: {}", quote(&secret.value)))
            })
        })
    })
}

fn template(b: CodeBuilder, ctx: &ServiceManifestContext) -> CodeBuilder {
    b.block("containers:", |b| {
        b.line(&format!("- image: {}", ctx.image))
            .line(&format!("  name: {}", ctx.name))
            .when(!ctx.args.is_empty(), |b| {
                b.line("  args:")
                    .each(&ctx.args, |b, arg| b.line(&format!("  - {}", quote(arg))))
            })
            .line("  env:")
            .each(&ctx.env, |b, (name, value)| {
                let b = b.line(&format!("  - name: {}", name));
                match value {
                    EnvValue::Value(value) => b.line(&format!("    value: {}", quote(value))),
                    EnvValue::SecretRef(secret) => b.line(&format!("    secretRef: {}", secret)),
                }
            })
    })
    .block("scale:", |b| b.line("minReplicas: 1"))
}

/// YAML scalar for a rendered value.
///
/// Single-quoted unless the value holds control characters, which only the
/// double-quoted form can escape. Template actions (`{{ ... }}`) are kept
/// verbatim in both forms.
fn quote(value: &str) -> String {
    if !value.contains(char::is_control) {
        return format!("'{}'", value.replace('\'', "''"));
    }

    let mut out = String::from("\"");
    let mut rest = value;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        let end = start + len + 2;
        out.push_str(&escape(&rest[..start]));
        out.push_str(&rest[start..end]);
        rest = &rest[end..];
    }
    out.push_str(&escape(rest));
    out.push('"');
    out
}

/// Body of a double-quoted scalar. JSON string escapes are valid YAML escapes.
fn escape(text: &str) -> String {
    let json = serde_json::Value::String(text.to_string()).to_string();
    json[1..json.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), "'it''s'");
        assert_eq!(quote("{{ .Env.X }}"), "'{{ .Env.X }}'");
    }

    #[test]
    fn test_quote_multiline_is_double_quoted() {
        assert_eq!(
            quote("line1\n  - name: INJECTED\nline3"),
            "\"line1\\n  - name: INJECTED\\nline3\""
        );
        assert_eq!(quote("a\t\"b\""), "\"a\\t\\\"b\\\"\"");
    }

    #[test]
    fn test_quote_multiline_keeps_template_actions() {
        assert_eq!(
            quote("-----BEGIN-----\n{{ parameter \"cert\" }}"),
            "\"-----BEGIN-----\\n{{ parameter \"cert\" }}\""
        );
    }
}
