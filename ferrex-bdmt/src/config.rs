use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Env var pointing at a TOML or JSON locator config file.
pub const CONFIG_PATH_ENV: &str = "BDMT_CONFIG_PATH";
/// Env var holding an inline JSON locator config.
pub const CONFIG_JSON_ENV: &str = "BDMT_CONFIG_JSON";

/// Where the active locator configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocatorConfigSource {
    /// Built-in defaults.
    #[default]
    Default,
    /// A TOML or JSON file.
    File(PathBuf),
    /// Inline JSON from `$BDMT_CONFIG_JSON`.
    Inline,
}

/// Tuning for the recursive descriptor search. The defaults match BDInfo's
/// lookup: no depth limit, symlinks are not followed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Follow symbolic links while walking the disc tree.
    pub follow_links: bool,
    /// Maximum depth below the disc root for the recursive search
    /// (`None` = unlimited). The two fixed locations are always checked.
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl LocatorConfig {
    /// `$BDMT_CONFIG_PATH` wins over `$BDMT_CONFIG_JSON`; with neither set
    /// the defaults apply. Blank values count as unset.
    pub fn load_from_env() -> anyhow::Result<(Self, LocatorConfigSource)> {
        if let Some(path) = non_empty_var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            let config = Self::load_from_file(&path)?;
            return Ok((config, LocatorConfigSource::File(path)));
        }

        if let Some(raw) = non_empty_var(CONFIG_JSON_ENV) {
            let config =
                Self::parse(&raw, Some(Format::Json)).with_context(|| {
                    format!("invalid locator config in {CONFIG_JSON_ENV}")
                })?;
            return Ok((config, LocatorConfigSource::Inline));
        }

        Ok((Self::default(), LocatorConfigSource::Default))
    }

    /// Load a `.toml` or `.json` file. Other extensions are sniffed.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("cannot read locator config {}", path.display())
        })?;

        Self::parse(&contents, Format::of(path)).with_context(|| {
            format!("invalid locator config {}", path.display())
        })
    }

    /// Parse TOML, or JSON when the text is not TOML.
    pub fn parse_str(contents: &str) -> anyhow::Result<Self> {
        Self::parse(contents, None)
    }

    fn parse(contents: &str, format: Option<Format>) -> anyhow::Result<Self> {
        match format {
            Some(Format::Toml) => Ok(toml::from_str(contents)?),
            Some(Format::Json) => Ok(serde_json::from_str(contents)?),
            None => toml::from_str(contents).or_else(|toml_err| {
                serde_json::from_str(contents).map_err(|json_err| {
                    anyhow!("neither TOML ({toml_err}) nor JSON ({json_err})")
                })
            }),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
