//! Episode documents: the ordered script plus per-episode voice settings.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker role of a line of dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Guest,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Guest => write!(f, "guest"),
        }
    }
}

/// One value per role. A role missing from a document takes `T::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct RoleMap<T> {
    pub host: T,
    pub guest: T,
}

impl<T> RoleMap<T> {
    pub fn new(host: T, guest: T) -> Self {
        Self { host, guest }
    }

    /// Value bound to `role`.
    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::Host => &self.host,
            Role::Guest => &self.guest,
        }
    }
}

/// Role to engine voice name, fixed for a run.
pub type VoiceBinding = RoleMap<String>;

/// One line of dialogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub role: Role,
    pub text: String,
    /// Delivery style, e.g. "Speak calmly, like an expert explaining concepts."
    #[serde(default, alias = "instruct", skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl Segment {
    pub fn new(role: Role, text: impl Into<String>, instruction: Option<&str>) -> Self {
        Self { role, text: text.into(), instruction: instruction.map(str::to_string) }
    }
}

/// Errors raised while loading or validating an episode document.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read episode file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid episode document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("episode name {0:?} must be non-empty and must not contain path separators")]
    InvalidName(String),

    #[error("segment {index} ({role}) has empty text")]
    EmptyText { index: usize, role: Role },

    #[error("{role} pause must be a finite number of seconds >= 0, got {seconds}")]
    InvalidPause { role: Role, seconds: f64 },

    #[error("speed factor must be a finite number >= 0.25, got {0}")]
    InvalidSpeedFactor(f64),
}

/// Slowest accepted speed factor.
pub const MIN_SPEED_FACTOR: f64 = 0.25;

/// A complete episode: settings and the ordered script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Output file stem (`<output_dir>/<name>.wav`)
    pub name: String,
    /// Language tag passed to the engine for every segment
    pub language: String,
    /// Voice bound to each role
    pub voices: VoiceBinding,
    /// Instruction used when a segment carries none
    #[serde(default)]
    pub instructions: RoleMap<Option<String>>,
    /// Silence appended after each segment, in seconds
    #[serde(default)]
    pub pauses: RoleMap<Option<f64>>,
    /// Nearest-index speed factor applied to every segment
    #[serde(default)]
    pub speed_factor: Option<f64>,
    pub segments: Vec<Segment>,
}

impl Episode {
    /// Load an episode document from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&content)
    }

    /// Parse an episode document from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Check the document for values the driver cannot use.
    ///
    /// An empty segment list passes here; the driver refuses to render it.
    pub fn validate(&self) -> Result<(), ScriptError> {
        validate_name(&self.name)?;

        for (index, segment) in self.segments.iter().enumerate() {
            if segment.text.trim().is_empty() {
                return Err(ScriptError::EmptyText { index, role: segment.role });
            }
        }

        for role in [Role::Host, Role::Guest] {
            if let Some(seconds) = *self.pauses.get(role)
                && (!seconds.is_finite() || seconds < 0.0)
            {
                return Err(ScriptError::InvalidPause { role, seconds });
            }
        }

        if let Some(factor) = self.speed_factor
            && (!factor.is_finite() || factor < MIN_SPEED_FACTOR)
        {
            return Err(ScriptError::InvalidSpeedFactor(factor));
        }

        Ok(())
    }

    /// Number of segments per role.
    pub fn role_counts(&self) -> RoleMap<usize> {
        let host = self.segments.iter().filter(|s| s.role == Role::Host).count();
        RoleMap::new(host, self.segments.len() - host)
    }
}

/// Check an episode name is usable as a file stem.
pub fn validate_name(name: &str) -> Result<(), ScriptError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(ScriptError::InvalidName(name.to_string()));
    }
    Ok(())
}
