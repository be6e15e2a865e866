//! On-disk configuration for the pointfade particle field.
//!
//! Every section is optional; a missing file or an empty document resolves to
//! the reference instance (512×512 grid, 4000 scroll scale, one second elastic
//! press tween, manual transition control).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Upper bound on `grid.width * grid.height` (a 4096×4096 lattice).
pub const MAX_GRID_POINTS: u64 = 1 << 24;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub scroll: ScrollSection,
    #[serde(default)]
    pub press: PressSection,
    #[serde(default)]
    pub transition: TransitionSection,
    #[serde(default)]
    pub assets: AssetsSection,
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub shaders: ShaderSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridSection {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollSection {
    /// Wheel units that advance the scroll accumulator by one whole texture.
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PressSection {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub duration: Duration,
    pub amplitude: f32,
    pub period: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionSource {
    /// Blend progress only changes through the debug control.
    #[default]
    Manual,
    /// Blend progress follows the fractional part of the scroll accumulator.
    Scroll,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransitionSection {
    pub source: TransitionSource,
    pub initial: f32,
    pub step: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsSection {
    pub textures: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraSection {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    #[serde(
        deserialize_with = "deserialize_antialias_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub antialias: Option<AntialiasSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShaderSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// Explicit MSAA sample count, or `None` for `Auto`.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

fn default_version() -> u32 {
    1
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            grid: GridSection::default(),
            scroll: ScrollSection::default(),
            press: PressSection::default(),
            transition: TransitionSection::default(),
            assets: AssetsSection::default(),
            camera: CameraSection::default(),
            window: WindowSection::default(),
            shaders: ShaderSection::default(),
        }
    }
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            seed: None,
        }
    }
}

impl Default for ScrollSection {
    fn default() -> Self {
        Self { scale: 4000.0 }
    }
}

impl Default for PressSection {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(1),
            amplitude: 1.0,
            period: 0.3,
        }
    }
}

impl Default for TransitionSection {
    fn default() -> Self {
        Self {
            source: TransitionSource::Manual,
            initial: 0.0,
            step: 0.01,
        }
    }
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            fov: 70.0,
            distance: 1000.0,
            near: 0.1,
            far: 3000.0,
        }
    }
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            antialias: None,
        }
    }
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
            if !v.is_finite() || v.is_sign_negative() {
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
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off`, or an MSAA sample count (`2`, `4`, `8`, `16`).
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" | "samples2" => Ok(AntialiasSetting::Samples2),
        "4" | "samples4" => Ok(AntialiasSetting::Samples4),
        "8" | "samples8" => Ok(AntialiasSetting::Samples8),
        "16" | "samples16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!(
            "invalid antialias setting '{other}'; use auto/off or 2/4/8/16"
        )),
    }
}

impl FieldConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FieldConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` when it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid dimensions must be at least 1x1 (got {}x{})",
                self.grid.width, self.grid.height
            )));
        }

        let points = u64::from(self.grid.width) * u64::from(self.grid.height);
        if points > MAX_GRID_POINTS {
            return Err(ConfigError::Invalid(format!(
                "grid of {}x{} has {points} points; at most {MAX_GRID_POINTS} are supported",
                self.grid.width, self.grid.height
            )));
        }

        if !self.scroll.scale.is_finite() || self.scroll.scale == 0.0 {
            return Err(ConfigError::Invalid(
                "scroll.scale must be a finite, non-zero number".into(),
            ));
        }

        if self.press.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "press.duration must be greater than zero".into(),
            ));
        }

        if !(self.press.period > 0.0 && self.press.period.is_finite()) {
            return Err(ConfigError::Invalid("press.period must be > 0".into()));
        }

        if !(self.press.amplitude >= 1.0 && self.press.amplitude.is_finite()) {
            return Err(ConfigError::Invalid("press.amplitude must be >= 1".into()));
        }

        if !(0.0..=1.0).contains(&self.transition.initial) {
            return Err(ConfigError::Invalid(format!(
                "transition.initial must lie within [0, 1] (got {})",
                self.transition.initial
            )));
        }

        if !(self.transition.step > 0.0 && self.transition.step <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "transition.step must lie within (0, 1] (got {})",
                self.transition.step
            )));
        }

        if self.assets.textures.len() == 1 {
            return Err(ConfigError::Invalid(
                "assets.textures needs at least two entries to crossfade (or none for placeholders)"
                    .into(),
            ));
        }

        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov must lie within (0, 180) degrees (got {})",
                self.camera.fov
            )));
        }

        if !(self.camera.near > 0.0
            && self.camera.near < self.camera.far
            && self.camera.far.is_finite())
        {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes must satisfy 0 < near < far (got near={}, far={})",
                self.camera.near, self.camera.far
            )));
        }

        if !(self.camera.distance > 0.0 && self.camera.distance.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "camera.distance must be a positive, finite number (got {})",
                self.camera.distance
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window dimensions must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
