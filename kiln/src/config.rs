//! Project configuration read from `kiln.toml`.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use kiln_ir::Exposure;
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "kiln.toml";

const DEFAULT_MANIFEST: &str = "manifest.json";

/// Contents of a `kiln.toml` file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSection,
    /// Exposure decisions keyed by resource name.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    /// Manifest path, relative to the config file.
    pub manifest: Option<PathBuf>,
    /// Output directory, relative to the config file.
    pub output: Option<PathBuf>,
}

/// Which bindings of a service are reachable from outside the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Expose every binding.
    #[serde(default)]
    pub external: bool,
    /// Expose only these bindings.
    #[serde(default)]
    pub bindings: Vec<String>,
}

/// A parsed `kiln.toml` together with where it was read from.
#[derive(Debug)]
pub struct KilnToml {
    path: PathBuf,
    config: ProjectConfig,
}

impl KilnToml {
    /// Open and parse a kiln.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
        Self::parse(path, &content)
    }

    fn parse(path: PathBuf, content: &str) -> Result<Self> {
        let config = toml::from_str(content)
            .wrap_err_with(|| format!("failed to parse '{}'", path.display()))?;
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the relative paths of the config are resolved against.
    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Manifest path, if the config names one.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.config
            .project
            .manifest
            .as_ref()
            .map(|p| self.base_dir().join(p))
    }

    /// Output directory, if the config names one.
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.config
            .project
            .output
            .as_ref()
            .map(|p| self.base_dir().join(p))
    }

    /// The exposure declared under `[services]`.
    pub fn exposure(&self) -> Exposure {
        let mut exposure = Exposure::new();
        for (name, service) in &self.config.services {
            if service.external {
                exposure.expose_all(name);
            }
            for binding in &service.bindings {
                exposure.expose_binding(name, binding);
            }
        }
        exposure
    }
}

/// Everything a command needs to know about the project it works on.
#[derive(Debug)]
pub struct Project {
    /// Config file the project was read from, if any.
    pub config_path: Option<PathBuf>,
    pub name: Option<String>,
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    pub exposure: Exposure,
}

/// Command line overrides applied on top of `kiln.toml`.
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub config: Option<&'a Path>,
    pub manifest: Option<&'a Path>,
    pub output: Option<&'a Path>,
    pub expose: &'a [String],
}

impl Project {
    /// Load the project, reading `kiln.toml` when it is named or present.
    ///
    /// An explicitly named config must exist; the default one is optional.
    pub fn load(overrides: Overrides<'_>) -> Result<Self> {
        let toml = match overrides.config {
            Some(path) => Some(KilnToml::open(path)?),
            None if Path::new(DEFAULT_CONFIG).exists() => Some(KilnToml::open(DEFAULT_CONFIG)?),
            None => None,
        };
        Ok(Self::from_parts(toml, overrides))
    }

    fn from_parts(toml: Option<KilnToml>, overrides: Overrides<'_>) -> Self {
        let manifest_path = overrides
            .manifest
            .map(Path::to_path_buf)
            .or_else(|| toml.as_ref().and_then(KilnToml::manifest_path))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));

        let output_dir = overrides
            .output
            .map(Path::to_path_buf)
            .or_else(|| toml.as_ref().and_then(KilnToml::output_dir))
            .unwrap_or_else(|| PathBuf::from("."));

        let mut exposure = toml.as_ref().map(KilnToml::exposure).unwrap_or_default();
        for spec in overrides.expose {
            exposure.expose_spec(spec);
        }

        Self {
            config_path: toml.as_ref().map(|t| t.path().to_path_buf()),
            name: toml.and_then(|t| t.config.project.name),
            manifest_path,
            output_dir,
            exposure,
        }
    }
}
