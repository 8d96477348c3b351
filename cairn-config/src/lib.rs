//! Configuration for the cairn compositor.
//!
//! The config is a KDL document decoded with `knuffel`. Parse errors are reported as `miette`
//! diagnostics; values that parse but are out of range are replaced with their defaults by
//! [`Config::sanitize`].

use std::ffi::OsStr;
use std::path::Path;

use miette::{Context as _, IntoDiagnostic as _};
use tracing::warn;

pub mod animations;
pub mod appearance;
pub mod layout;
mod utils;

pub use animations::{Animations, SpringParams, WindowMovementAnim};
pub use appearance::Color;
pub use layout::{Border, Layout, MASTER_RATIO_RANGE};
pub use utils::FloatOrInt;

#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub layout: Layout,
    #[knuffel(child, default)]
    pub animations: Animations,
    #[knuffel(children(name = "workspace"))]
    pub workspaces: Vec<WorkspaceConfig>,
}

/// A named workspace; named workspaces get ids 1, 2, ... in the order they are declared.
#[derive(knuffel::Decode, Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    #[knuffel(argument)]
    pub name: String,
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("error reading {path:?}"))?;

        let filename = path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or("config.kdl");

        let mut config = Self::parse(filename, &contents)
            .map_err(miette::Report::new)
            .wrap_err("error parsing")?;
        config.sanitize();

        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        knuffel::parse(filename, text)
    }

    /// Replaces out-of-range values with their defaults.
    ///
    /// Returns the names of the options that were reset.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let mut reset = Vec::new();
        let default_layout = Layout::default();

        if self.layout.gaps < 0 {
            warn!("layout.gaps must not be negative, using {}", default_layout.gaps);
            self.layout.gaps = default_layout.gaps;
            reset.push("gaps");
        }

        let (min, max) = MASTER_RATIO_RANGE;
        let ratio = self.layout.master_ratio.0;
        if !(ratio > min && ratio < max) {
            warn!(
                "layout.master-ratio must be between {min} and {max}, using {}",
                default_layout.master_ratio.0
            );
            self.layout.master_ratio = default_layout.master_ratio;
            reset.push("master-ratio");
        }

        if self.layout.border.width < 0 {
            warn!(
                "layout.border.width must not be negative, using {}",
                default_layout.border.width
            );
            self.layout.border.width = default_layout.border.width;
            reset.push("border.width");
        }

        let default_spring = SpringParams::default();
        let spring = &mut self.animations.window_movement.spring;
        if !(spring.damping_ratio.0.is_finite() && spring.damping_ratio.0 > 0.) {
            warn!(
                "spring damping-ratio must be positive, using {}",
                default_spring.damping_ratio.0
            );
            spring.damping_ratio = default_spring.damping_ratio;
            reset.push("damping-ratio");
        }
        if !(spring.frequency.0.is_finite() && spring.frequency.0 > 0.) {
            warn!(
                "spring frequency must be positive, using {}",
                default_spring.frequency.0
            );
            spring.frequency = default_spring.frequency;
            reset.push("frequency");
        }

        reset
    }
}
