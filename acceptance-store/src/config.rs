// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the report store.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use acceptance_report::{ColorScheme, RelativeSizeColorScheme};
use camino::{Utf8Path, Utf8PathBuf};
use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, builder::DefaultState,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Overall configuration for acceptance reports.
///
/// This is the root data structure for acceptance configuration. Configuration is layered: the
/// embedded [`DEFAULT_CONFIG`](Self::DEFAULT_CONFIG), then the project's config file, then
/// environment variables prefixed with `ACCEPTANCE_CONFIG_`.
#[derive(Clone, Debug)]
pub struct AcceptanceConfig {
    project_root: Utf8PathBuf,
    inner: AcceptanceConfigImpl,
}

impl AcceptanceConfig {
    /// The default location of the config within the project root.
    pub const CONFIG_PATH: &'static str = ".config/acceptance.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Environment variables with this prefix override config keys. Nested keys are separated
    /// by `__`, e.g. `ACCEPTANCE_CONFIG_STORE__DIR`.
    pub const ENVIRONMENT_PREFIX: &'static str = "ACCEPTANCE_CONFIG";

    /// Reads the config from the given file, or if not specified from `.config/acceptance.toml`
    /// in the project root.
    ///
    /// If the file isn't specified and the project doesn't have a config file, the default
    /// config is used, with environment overrides applied.
    pub fn from_sources(
        project_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        Self::from_sources_with_env(project_root, config_file, Self::environment())
    }

    /// Returns the default config for the given project root, ignoring any config files and
    /// environment variables.
    pub fn default_config(project_root: impl Into<Utf8PathBuf>) -> Self {
        let config = Self::make_default_config()
            .build()
            .expect("default config is always valid");

        let mut unknown = BTreeSet::new();
        let deserialized = deserialize_config(config, &mut unknown)
            .expect("default config is always valid");

        // The default config is embedded in the binary, so it must not have unknown keys.
        if !unknown.is_empty() {
            panic!("found unknown keys in default config: {unknown:?}");
        }

        Self {
            project_root: project_root.into(),
            inner: deserialized,
        }
    }

    pub(crate) fn from_sources_with_env(
        project_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
        environment: Environment,
    ) -> Result<Self, ConfigParseError> {
        let project_root = project_root.into();

        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = project_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config()
            .add_source(source)
            .add_source(environment);
        let (inner, unknown) = build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            let unknown_str = unknown.iter().cloned().collect::<Vec<_>>().join(", ");
            warn!(
                "ignoring unknown configuration keys in config file {config_file}: {unknown_str}"
            );
        }

        Ok(Self {
            project_root,
            inner,
        })
    }

    /// Returns the project root.
    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    /// Returns the directory XML reports are written to and loaded from.
    pub fn store_dir(&self) -> Utf8PathBuf {
        self.project_root.join(&self.inner.store.dir)
    }

    /// Returns the qualifier applied to reports when they are written, if any.
    pub fn qualifier(&self) -> Option<&str> {
        self.inner.report.qualifier.as_deref()
    }

    /// Returns the file name of the JSON summary, written inside the store directory.
    pub fn summary_file_name(&self) -> &str {
        &self.inner.summary.file_name
    }

    /// Returns the path of the JSON summary file.
    pub fn summary_path(&self) -> Utf8PathBuf {
        self.store_dir().join(self.summary_file_name())
    }

    /// Returns the configured color scheme.
    pub fn color_scheme(&self) -> ColorSchemeKind {
        self.inner.color.scheme
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn environment() -> Environment {
        Environment::with_prefix(Self::ENVIRONMENT_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }
}

/// The color schemes that may be selected in the config.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSchemeKind {
    /// Colors blend according to the relative share of passing, pending and failing tests.
    RelativeSize,
}

impl ColorSchemeKind {
    /// Returns an instance of the selected color scheme.
    pub fn scheme(self) -> Box<dyn ColorScheme + Send + Sync> {
        match self {
            ColorSchemeKind::RelativeSize => Box::new(RelativeSizeColorScheme::new()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AcceptanceConfigImpl {
    store: StoreConfig,
    #[serde(default)]
    report: ReportConfig,
    summary: SummaryConfig,
    color: ColorConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StoreConfig {
    dir: Utf8PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReportConfig {
    #[serde(default)]
    qualifier: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SummaryConfig {
    file_name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ColorConfig {
    scheme: ColorSchemeKind,
}

/// This returns a tuple of (config, ignored paths).
fn build_and_deserialize_config(
    builder: &ConfigBuilder<DefaultState>,
) -> Result<(AcceptanceConfigImpl, BTreeSet<String>), ConfigParseErrorKind> {
    let config = builder
        .build_cloned()
        .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

    let mut ignored = BTreeSet::new();
    let config = deserialize_config(config, &mut ignored)?;
    Ok((config, ignored))
}

fn deserialize_config(
    config: Config,
    ignored: &mut BTreeSet<String>,
) -> Result<AcceptanceConfigImpl, ConfigParseErrorKind> {
    let mut cb = |path: serde_ignored::Path| {
        ignored.insert(path.to_string());
    };
    let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
    serde_path_to_error::deserialize(ignored_de).map_err(|error| {
        // Both serde_path_to_error and the config crate report the key. Drop the key from the
        // config error.
        let path = error.path().clone();
        let config_error = error.into_inner();
        let error = match config_error {
            ConfigError::At { error, .. } => *error,
            other => other,
        };
        ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
            path, error,
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use std::fs;
    use test_case::test_case;

    fn no_env() -> Environment {
        AcceptanceConfig::environment().source(Some(config::Map::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AcceptanceConfig::environment().source(Some(map))
    }

    fn write_config(root: &Utf8Path, contents: &str) {
        let config_dir = root.join(".config");
        fs::create_dir_all(&config_dir).expect("created .config");
        fs::write(config_dir.join("acceptance.toml"), contents).expect("wrote config");
    }

    #[test]
    fn defaults_without_config_file() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let config = AcceptanceConfig::from_sources_with_env(dir.path(), None, no_env())
            .expect("default config parses");

        assert_eq!(config.store_dir(), dir.path().join("target/acceptance"));
        assert_eq!(config.qualifier(), None);
        assert_eq!(
            config.summary_path(),
            dir.path().join("target/acceptance/summary.json")
        );
        assert_eq!(config.color_scheme(), ColorSchemeKind::RelativeSize);
    }

    #[test]
    fn default_config_matches_sources_default() {
        let config = AcceptanceConfig::default_config("/project");
        assert_eq!(config.store_dir(), "/project/target/acceptance");
        assert_eq!(config.qualifier(), None);
    }

    #[test_case(
        indoc::indoc! {r#"
            [store]
            dir = "reports"
        "#},
        "reports",
        None
        ; "store dir"
    )]
    #[test_case(
        indoc::indoc! {r#"
            [report]
            qualifier = "firefox_linux"
        "#},
        "target/acceptance",
        Some("firefox_linux")
        ; "qualifier"
    )]
    #[test_case(
        "",
        "target/acceptance",
        None
        ; "empty file"
    )]
    fn project_config(contents: &str, store_dir: &str, qualifier: Option<&str>) {
        let dir = Utf8TempDir::new().expect("created temp dir");
        write_config(dir.path(), contents);

        let config = AcceptanceConfig::from_sources_with_env(dir.path(), None, no_env())
            .expect("config parses");
        assert_eq!(config.store_dir(), dir.path().join(store_dir));
        assert_eq!(config.qualifier(), qualifier);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        write_config(
            dir.path(),
            indoc::indoc! {r#"
                [store]
                dir = "from-file"
            "#},
        );

        let config = AcceptanceConfig::from_sources_with_env(
            dir.path(),
            None,
            env(&[
                ("ACCEPTANCE_CONFIG_STORE__DIR", "from-env"),
                ("ACCEPTANCE_CONFIG_REPORT__QUALIFIER", "chrome"),
            ]),
        )
        .expect("config parses");
        assert_eq!(config.store_dir(), dir.path().join("from-env"));
        assert_eq!(config.qualifier(), Some("chrome"));
    }

    #[test]
    fn explicit_config_file_is_required() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let missing = dir.path().join("missing.toml");

        let error = AcceptanceConfig::from_sources_with_env(dir.path(), Some(&missing), no_env())
            .expect_err("missing explicit config file fails");
        assert_eq!(error.config_file(), missing);
        assert!(
            matches!(error.kind(), ConfigParseErrorKind::BuildError(_)),
            "unexpected error kind: {:?}",
            error.kind()
        );
    }

    #[test]
    fn invalid_values_report_their_path() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        write_config(
            dir.path(),
            indoc::indoc! {r#"
                [color]
                scheme = "rainbow"
            "#},
        );

        let error = AcceptanceConfig::from_sources_with_env(dir.path(), None, no_env())
            .expect_err("unknown color scheme fails");
        match error.kind() {
            ConfigParseErrorKind::DeserializeError(error) => {
                assert_eq!(error.path().to_string(), "color.scheme");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        write_config(
            dir.path(),
            indoc::indoc! {r#"
                [store]
                dir = "reports"
                retention = 3

                [browser]
                name = "firefox"
            "#},
        );

        let config = AcceptanceConfig::from_sources_with_env(dir.path(), None, no_env())
            .expect("config with unknown keys parses");
        assert_eq!(config.store_dir(), dir.path().join("reports"));
    }
}
