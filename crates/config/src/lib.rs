//! Configuration loading and validation.
//!
//! Configuration is layered with [`figment`], later layers winning:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a configuration file (TOML, YAML or JSON, chosen by extension),
//! 3. `SHOTDIFF_`-prefixed environment variables, with `__` separating
//!    nested keys (`SHOTDIFF_CUSTOM_SHOTS__CURRENT_SHOTS_PATH`).
//!
//! The loaded [`Config`] is then turned into the explicit values the core
//! works with ([`ShotPaths`], [`Destination`], [`ShotModes`]); nothing reads
//! configuration from global state.

pub mod error;
mod sources;
mod switches;

pub use crate::sources::{CustomShots, Page, PageShots, ShotModes, UrlShots};
pub use crate::switches::{DISABLE_TELEMETRY_ENV, MODE_ENV, Switches};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Deserializer, Serialize};
use shotdiff_shots::items::ShotMode;
use shotdiff_shots::{Destination, ShotPaths};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SHOTDIFF_";
/// Keys whose environment values are always strings, never numbers.
const IDENTIFIER_KEYS: [&str; 4] = ["project_id", "build_id", "commit_ref_name", "commit_hash"];
/// Looked for, in order, in the working directory.
pub const CONFIG_FILE_NAMES: [&str; 4] =
    ["shotdiff.config.toml", "shotdiff.config.yaml", "shotdiff.config.yml", "shotdiff.config.json"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "lenient_string")]
    pub project_id: Option<String>,
    /// Identifier of the CI build; scopes uploads of concurrent runs.
    #[serde(deserialize_with = "lenient_string")]
    pub build_id: Option<String>,
    /// Where report payloads are submitted.
    pub api_url: Option<String>,
    /// Where uploaded images are served from; prefix of every image URL.
    pub image_base_url: Option<String>,
    /// `owner/name`
    pub repository: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub commit_ref_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub commit_hash: Option<String>,
    /// Only produce baselines; no comparison or upload.
    pub generate_only: bool,
    pub image_path_baseline: PathBuf,
    pub image_path_current: PathBuf,
    pub image_path_difference: PathBuf,
    /// Pixel-diff tolerance handed to the comparison step.
    pub threshold: f64,
    /// CI webhook event (JSON) describing the triggering push/pull request.
    pub event_file_path: Option<PathBuf>,
    pub storybook_shots: Option<UrlShots>,
    pub ladle_shots: Option<UrlShots>,
    pub page_shots: Option<PageShots>,
    pub custom_shots: Option<CustomShots>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            build_id: None,
            api_url: None,
            image_base_url: None,
            repository: None,
            commit_ref_name: None,
            commit_hash: None,
            generate_only: false,
            image_path_baseline: PathBuf::from(".shotdiff/baseline"),
            image_path_current: PathBuf::from(".shotdiff/current"),
            image_path_difference: PathBuf::from(".shotdiff/difference"),
            threshold: 0.0,
            event_file_path: None,
            storybook_shots: None,
            ladle_shots: None,
            page_shots: None,
            custom_shots: None,
        }
    }
}

impl Config {
    /// Load configuration from `file` (or a discovered file when `None`) and
    /// the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.exists() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => discover(Path::new(".")),
        };
        let config: Self = Self::figment(file.as_deref())?.extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(file = ?file, generate_only = config.generate_only, "Loaded configuration");
        Ok(config)
    }

    /// The layered [`Figment`] before extraction.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        // Mode switches share the prefix but are not configuration values.
        let env = Env::prefixed(ENV_PREFIX).split("__").ignore(&["mode", "disable_telemetry"]);
        let mut figment = figment.merge(env);
        // Env values are parsed, so `0042` would come back as 42. Identifiers
        // are taken verbatim instead.
        for key in IDENTIFIER_KEYS {
            if let Ok(raw) = std::env::var(format!("{ENV_PREFIX}{}", key.to_ascii_uppercase())) {
                figment = figment.merge(Serialized::default(key, raw));
            }
        }
        Ok(figment)
    }

    /// The run's working directories. Custom shots, when configured, are
    /// read from their own directory instead of the default current one.
    pub fn paths(&self) -> ShotPaths {
        let current = match &self.custom_shots {
            Some(custom) => custom.current_shots_path.clone(),
            None => self.image_path_current.clone(),
        };
        ShotPaths::new(self.image_path_baseline.clone(), current, self.image_path_difference.clone())
    }

    /// Where artifacts go. Remote runs need both a project and a build id.
    pub fn destination(&self) -> Result<Destination> {
        if self.generate_only {
            return Ok(Destination::GenerateOnly);
        }
        let project_id = self.project_id.clone().ok_or_raise(|| ErrorKind::MissingField("project_id"))?;
        let build_id = self.build_id.clone().ok_or_raise(|| ErrorKind::MissingField("build_id"))?;
        Ok(Destination::Remote { project_id, build_id })
    }

    /// Prefix for image URLs in the comparison manifest. Generate-only runs
    /// produce no links, so they need none.
    pub fn image_base_url(&self) -> Result<&str> {
        if self.generate_only {
            return Ok(self.image_base_url.as_deref().unwrap_or_default());
        }
        self.image_base_url.as_deref().ok_or_raise(|| ErrorKind::MissingField("image_base_url"))
    }

    /// Active shot-capture modes, derived from which sources are configured.
    pub fn modes(&self) -> ShotModes {
        [
            (self.storybook_shots.is_some(), ShotMode::Storybook),
            (self.ladle_shots.is_some(), ShotMode::Ladle),
            (self.page_shots.is_some(), ShotMode::Page),
            (self.custom_shots.is_some(), ShotMode::Custom),
        ]
        .into_iter()
        .filter_map(|(enabled, mode)| enabled.then_some(mode))
        .collect()
    }

    /// Splits `repository` into `(owner, name)`.
    pub fn repository_parts(&self) -> Result<(&str, &str)> {
        let repository = self.repository.as_deref().ok_or_raise(|| ErrorKind::MissingField("repository"))?;
        match repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => Ok((owner, name)),
            _ => exn::bail!(ErrorKind::InvalidRepository(repository.to_string())),
        }
    }
}

/// Identifiers written as bare numbers in a configuration file
/// (`build_id = 1234`) are accepted as strings.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        String(String),
        Unsigned(u64),
        Signed(i64),
    }
    Ok(Option::<Lenient>::deserialize(deserializer)?.map(|value| match value {
        Lenient::String(s) => s,
        Lenient::Unsigned(n) => n.to_string(),
        Lenient::Signed(n) => n.to_string(),
    }))
}

/// Finds a configuration file: the first of [`CONFIG_FILE_NAMES`] in `dir`,
/// falling back to `config.toml` in the user configuration directory.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    let local = CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).find(|path| path.is_file());
    local.or_else(|| {
        let user = directories::ProjectDirs::from("", "", "shotdiff")?.config_dir().join("config.toml");
        user.is_file().then_some(user)
    })
}
