use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

pub const CONFIG_FILE_NAME: &str = "cloudhigh.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    Prism,
    Shade,
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneKind::Prism => f.write_str("prism"),
            SceneKind::Shade => f.write_str("shade"),
        }
    }
}

impl FromStr for SceneKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prism" => Ok(SceneKind::Prism),
            "shade" => Ok(SceneKind::Shade),
            other => Err(format!("unknown scene '{other}'; expected prism or shade")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub prism: PrismSection,
    #[serde(default)]
    pub shade: ShadeSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub scene: Option<SceneKind>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<WindowSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Pixels scrolled per wheel line.
    #[serde(default = "default_line_height")]
    pub line_height_px: f32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            size: None,
            title: None,
            line_height_px: default_line_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrismSection {
    #[serde(default = "default_prism_dpr_cap")]
    pub dpr_cap: f32,
}

impl Default for PrismSection {
    fn default() -> Self {
        Self {
            dpr_cap: default_prism_dpr_cap(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShadeSection {
    #[serde(default = "default_shade_dpr_cap")]
    pub dpr_cap: f32,
    #[serde(
        default = "default_intro_duration",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub intro_duration: Duration,
    #[serde(default = "default_intro_easing")]
    pub intro_easing: String,
    /// Shader seconds covered by scrolling the full region.
    #[serde(default = "default_time_span")]
    pub time_span: f32,
    /// Height of the scroll region in viewport heights.
    #[serde(default = "default_scroll_pages")]
    pub scroll_pages: f32,
}

impl Default for ShadeSection {
    fn default() -> Self {
        Self {
            dpr_cap: default_shade_dpr_cap(),
            intro_duration: default_intro_duration(),
            intro_easing: default_intro_easing(),
            time_span: default_time_span(),
            scroll_pages: default_scroll_pages(),
        }
    }
}

/// Window size written as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl FromStr for WindowSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (w, h) = value
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid width in size '{value}'"))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid height in size '{value}'"))?;
        if width == 0 || height == 0 {
            return Err("window dimensions must be greater than zero".into());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl<'de> Deserialize<'de> for WindowSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Serialize for WindowSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

fn default_version() -> u32 {
    1
}

fn default_prism_dpr_cap() -> f32 {
    2.0
}

fn default_shade_dpr_cap() -> f32 {
    1.0
}

fn default_intro_duration() -> Duration {
    Duration::from_secs(3)
}

fn default_intro_easing() -> String {
    "power2.out".to_string()
}

fn default_time_span() -> f32 {
    200.0
}

fn default_scroll_pages() -> f32 {
    8.0
}

fn default_line_height() -> f32 {
    48.0
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            defaults: Defaults::default(),
            window: WindowSection::default(),
            prism: PrismSection::default(),
            shade: ShadeSection::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` when it exists, otherwise returns the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|err| ConfigError::Invalid(format!("failed to serialize configuration: {err}")))
    }

    pub fn default_scene(&self) -> SceneKind {
        self.defaults.scene.unwrap_or(SceneKind::Shade)
    }

    pub fn dpr_cap(&self, scene: SceneKind) -> f32 {
        match scene {
            SceneKind::Prism => self.prism.dpr_cap,
            SceneKind::Shade => self.shade.dpr_cap,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        validate_dpr_cap("prism", self.prism.dpr_cap)?;
        validate_dpr_cap("shade", self.shade.dpr_cap)?;

        let line_height = self.window.line_height_px;
        if !line_height.is_finite() || line_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "window.line_height_px must be greater than zero".into(),
            ));
        }

        let shade = &self.shade;
        if shade.intro_easing.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "shade.intro_easing must not be empty".into(),
            ));
        }
        if !shade.time_span.is_finite() || shade.time_span <= 0.0 {
            return Err(ConfigError::Invalid(
                "shade.time_span must be greater than zero".into(),
            ));
        }
        if !shade.scroll_pages.is_finite() || shade.scroll_pages <= 1.0 {
            return Err(ConfigError::Invalid(
                "shade.scroll_pages must be greater than 1 so the region can scroll".into(),
            ));
        }

        if let Some(title) = &self.window.title {
            if title.trim().is_empty() {
                return Err(ConfigError::Invalid("window.title must not be empty".into()));
            }
        }

        Ok(())
    }
}

fn validate_dpr_cap(section: &str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 1.0 {
        return Err(ConfigError::Invalid(format!(
            "{section}.dpr_cap must be a finite value >= 1 (got {value})"
        )));
    }
    Ok(())
}
