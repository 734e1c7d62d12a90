//! Session configuration, loaded from TOML.

use std::path::Path;

use nmg_kernel_classify::ClassifyOptions;
use nmg_kernel_math::Tolerance;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Everything a [`Session`](crate::Session) needs besides the model.
///
/// Every section and field is optional in the TOML; missing ones take
/// their defaults.
///
/// ```
/// use nmg_kernel::NmgConfig;
///
/// let config = NmgConfig::from_toml_str("[tolerance]\ndist = 0.01\n").unwrap();
/// assert_eq!(config.tolerance.dist, 0.01);
/// assert!(config.fuse.verify);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NmgConfig {
    /// Distance and angle thresholds.
    pub tolerance: ToleranceSettings,
    /// Point classifier knobs.
    pub classify: ClassifySettings,
    /// Optional pipeline stages.
    pub fuse: FuseSettings,
}

/// `[tolerance]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceSettings {
    /// Linear distance tolerance.
    pub dist: f64,
    /// Cosine threshold for perpendicularity.
    pub perp: f64,
}

impl Default for ToleranceSettings {
    fn default() -> Self {
        Self {
            dist: Tolerance::DEFAULT.dist,
            perp: Tolerance::DEFAULT.perp,
        }
    }
}

/// `[classify]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifySettings {
    /// Equidistant candidates that disagree are an error instead of a tie-break.
    pub strict_ties: bool,
    /// Crack midpoint nudge, in multiples of `tolerance.dist`.
    pub crack_perturbation: f64,
}

impl Default for ClassifySettings {
    fn default() -> Self {
        let opts = ClassifyOptions::default();
        Self {
            strict_ties: opts.strict_ties,
            crack_perturbation: opts.crack_perturbation,
        }
    }
}

/// `[fuse]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuseSettings {
    /// Split edges at vertices lying on them.
    pub break_edges: bool,
    /// Share plane equations between coplanar faces.
    pub fuse_faces: bool,
    /// Share line equations between collinear edges.
    pub fuse_edge_geometry: bool,
    /// Check structure, vertex uniqueness and radial order afterwards.
    pub verify: bool,
}

impl Default for FuseSettings {
    fn default() -> Self {
        Self {
            break_edges: true,
            fuse_faces: true,
            fuse_edge_geometry: true,
            verify: true,
        }
    }
}

impl NmgConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The validated tolerance record.
    pub fn tolerance(&self) -> Result<Tolerance> {
        Ok(Tolerance::new(self.tolerance.dist, self.tolerance.perp)?)
    }

    /// Classifier options.
    pub fn classify_options(&self) -> Result<ClassifyOptions> {
        let p = self.classify.crack_perturbation;
        if !p.is_finite() || p <= 0.0 {
            return Err(ConfigError::InvalidSetting(format!(
                "classify.crack_perturbation must be positive, got {}",
                p
            )));
        }
        Ok(ClassifyOptions {
            strict_ties: self.classify.strict_ties,
            crack_perturbation: p,
        })
    }
}
