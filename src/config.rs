//! Run settings, read from an optional TOML file and overridden on the
//! command line.
//!
//! ```toml
//! dimension = 2
//! steps = 500
//! walkers = 10
//! start = [0.0, 0.0]
//! mode = "animate"
//! limits = "growing"
//!
//! [distribution]
//! kind = "gaussian"
//! sigma = 0.5
//!
//! [save]
//! name = "gaussian"
//! gif = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::animation::{Animation, Mode};
use crate::export::{Exporter, Variant};
use crate::layout::Limits;
use crate::walk::{Dimension, StepDistribution, Walk, WalkParams};
use crate::{Error, Result};

/// What the window shows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Walk,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub dimension: Dimension,
    pub steps: usize,
    pub walkers: usize,
    /// Origin when absent.
    pub start: Option<Vec<f64>>,
    pub distribution: StepDistribution,
    /// Base seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    pub mode: Mode,
    pub limits: Limits,
    pub view: View,
    pub bins: usize,
    /// Open the interactive window after saving.
    pub window: bool,
    pub save: Option<SaveConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let params = WalkParams::default();
        Self {
            dimension: params.dimension,
            steps: params.steps,
            walkers: params.walkers,
            start: params.start,
            distribution: params.distribution,
            seed: params.seed,
            mode: Mode::default(),
            limits: Limits::default(),
            view: View::default(),
            bins: Exporter::DEFAULT_BINS,
            window: true,
            save: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveConfig {
    pub name: String,
    #[serde(default = "SaveConfig::default_dir")]
    pub dir: PathBuf,
    #[serde(default = "SaveConfig::default_variants")]
    pub variants: Vec<Variant>,
    /// Also write the animation as a GIF.
    #[serde(default)]
    pub gif: bool,
}

impl SaveConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: Self::default_dir(),
            variants: Self::default_variants(),
            gif: false,
        }
    }

    fn default_dir() -> PathBuf {
        PathBuf::from("images")
    }

    fn default_variants() -> Vec<Variant> {
        Variant::ALL.to_vec()
    }
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |source: Box<dyn std::error::Error + Send + Sync>| Error::Config {
            path: path.to_owned(),
            source,
        };

        let text = fs::read_to_string(path).map_err(|e| config_error(e.into()))?;
        let config: Self = toml::from_str(&text).map_err(|e| config_error(e.into()))?;
        debug!("loaded {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn walk_params(&self) -> WalkParams {
        let params = WalkParams::new(self.dimension)
            .with_steps(self.steps)
            .with_walkers(self.walkers)
            .with_distribution(self.distribution)
            .with_seed(self.seed);
        match &self.start {
            Some(start) => params.with_start(start.clone()),
            None => params,
        }
    }

    /// The frame schedule for the window, if animating.
    pub fn animation(&self, walk: &Walk) -> Option<Animation> {
        match self.mode {
            Mode::Static => None,
            Mode::Animate => Some(Animation::new(walk, self.limits)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.walk_params().validate()?;
        if self.bins == 0 {
            return Err(Error::NotPositive("number of bins"));
        }
        Ok(())
    }
}

/// Parses a start position such as `3`, `0,0`, `(1.5, -2)` or `[0, 0, 1]`.
pub fn parse_position(text: &str) -> Result<Vec<f64>> {
    let malformed = || Error::MalformedStart(text.to_owned());

    let mut inner = text.trim();
    for (open, close) in [('(', ')'), ('[', ']')] {
        if let Some(stripped) = inner
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            inner = stripped;
            break;
        }
    }
    // a trailing comma is how one-element tuples are written
    let inner = inner.trim().trim_end_matches(',');
    if inner.trim().is_empty() {
        return Err(malformed());
    }

    inner
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|_| malformed()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positions() {
        assert_eq!(parse_position("3").unwrap(), vec![3.]);
        assert_eq!(parse_position("(0,)").unwrap(), vec![0.]);
        assert_eq!(parse_position(" (1.5, -2) ").unwrap(), vec![1.5, -2.]);
        assert_eq!(parse_position("[0, 0, 1]").unwrap(), vec![0., 0., 1.]);
        assert_eq!(parse_position("0,0").unwrap(), vec![0., 0.]);
    }

    #[test]
    fn rejects_malformed_positions() {
        for text in ["", "()", "a,b", "1,,2", "(1, 2"] {
            assert!(
                matches!(parse_position(text), Err(Error::MalformedStart(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn defaults_match_a_plain_run() {
        let config = RunConfig::default();
        assert_eq!(config.dimension, Dimension::One);
        assert_eq!(config.steps, 100);
        assert_eq!(config.walkers, 20);
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.limits, Limits::Stable);
        assert!(config.window);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_toml() {
        let config: RunConfig = toml::from_str(
            r#"
            dimension = 3
            steps = 50
            mode = "animate"
            limits = "growing"

            [distribution]
            kind = "uniform"
            half_width = 2.0

            [save]
            name = "cube"
            gif = true
            "#,
        )
        .unwrap();

        assert_eq!(config.dimension, Dimension::Three);
        assert_eq!(config.steps, 50);
        assert_eq!(config.walkers, 20);
        assert_eq!(config.mode, Mode::Animate);
        assert_eq!(
            config.distribution,
            StepDistribution::Uniform { half_width: 2. }
        );
        let save = config.save.unwrap();
        assert_eq!(save.dir, Path::new("images"));
        assert_eq!(save.variants, Variant::ALL.to_vec());
        assert!(save.gif);
    }

    #[test]
    fn rejects_bad_dimension_in_toml() {
        assert!(toml::from_str::<RunConfig>("dimension = 4").is_err());
        assert!(toml::from_str::<RunConfig>("dimensions = 2").is_err());
    }
}
