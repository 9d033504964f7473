use std::path::PathBuf;

use log::{debug, info};

use crate::config::{RunConfig, SaveConfig, View};
use crate::export::Exporter;
use crate::layout::PlotLayout;
use crate::walk::Walk;
use crate::{Animation, Plot, Result, launch};

/// Longest GIF written, in frames.
const MAX_GIF_FRAMES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The base seed the walk was generated from, so an unseeded run can be
    /// repeated.
    pub seed: u64,
    pub files: Vec<PathBuf>,
}

/// Generates the walk described by `config`, writes any requested images
/// and, if enabled, shows it until the window is closed.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    config.validate()?;

    let walk = Walk::generate(&config.walk_params())?;
    info!(
        "generated {} walkers of {} steps in {} (seed {})",
        walk.walkers(),
        walk.steps(),
        walk.dimension(),
        walk.seed()
    );

    let files = match &config.save {
        Some(save) => save_images(config, save, &walk)?,
        None => Vec::new(),
    };

    if config.window {
        show(config, &walk)?;
    }

    Ok(RunReport {
        seed: walk.seed(),
        files,
    })
}

fn save_images(config: &RunConfig, save: &SaveConfig, walk: &Walk) -> Result<Vec<PathBuf>> {
    let exporter = Exporter::new(&save.dir).with_bins(config.bins);
    let mut files = exporter.save_all(walk, &save.variants, &save.name)?;

    if save.gif {
        let stride = walk.steps().div_ceil(MAX_GIF_FRAMES).max(1);
        debug!("gif stride {stride}");
        let animation = Animation::new(walk, config.limits).with_stride(stride);
        files.push(exporter.save_animation(walk, &animation, &save.name)?);
    }
    Ok(files)
}

fn show(config: &RunConfig, walk: &Walk) -> Result<()> {
    let title = format!("Random Walk - {}", walk.dimension());
    let layout = PlotLayout::new();
    match config.view {
        View::Walk => launch(Plot::of_walk(walk, layout), &title, config.animation(walk)),
        View::Histogram => launch(Plot::histogram(walk, config.bins, layout)?, &title, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::walk::Dimension;

    fn headless() -> RunConfig {
        RunConfig {
            window: false,
            ..RunConfig::default()
        }
    }

    #[test]
    fn reports_the_seed_used() {
        let report = run(&RunConfig {
            seed: Some(42),
            ..headless()
        })
        .unwrap();
        assert_eq!(report.seed, 42);
        assert!(report.files.is_empty());
    }

    #[test]
    fn invalid_settings_fail_before_generating() {
        let config = RunConfig {
            dimension: Dimension::Two,
            start: Some(vec![0.]),
            ..headless()
        };
        assert!(matches!(
            run(&config),
            Err(Error::StartMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            run(&RunConfig {
                bins: 0,
                ..headless()
            }),
            Err(Error::NotPositive(_))
        ));
    }
}
