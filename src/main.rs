use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use drunkard::config::{RunConfig, SaveConfig, View, parse_position};
use drunkard::export::Variant;
use drunkard::{Dimension, Limits, Mode, StepDistribution};
use log::{error, info, warn};

/// Simulate random walkers in one to three dimensions and plot their tracks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with run settings; flags override its values
    #[arg(short, long, env = "DRUNKARD_CONFIG")]
    config: Option<PathBuf>,

    /// Number of dimensions (1-3)
    #[arg(short, long)]
    dimension: Option<u8>,

    /// Number of steps per walker
    #[arg(short = 'n', long)]
    steps: Option<usize>,

    /// Number of walkers
    #[arg(short, long)]
    walkers: Option<usize>,

    /// Start position, e.g. "0,0" or "(1, -2, 0)"
    #[arg(long, allow_hyphen_values = true)]
    start: Option<String>,

    /// Step distribution
    #[arg(long, value_enum)]
    distribution: Option<DistributionKind>,

    /// Standard deviation (gaussian) or half width (uniform) of a step
    #[arg(long)]
    scale: Option<f64>,

    /// Base seed; walker `i` uses `seed + i`
    #[arg(long, conflicts_with = "random")]
    seed: Option<u64>,

    /// Draw a fresh base seed
    #[arg(long)]
    random: bool,

    /// Animate the walk instead of showing it complete
    #[arg(short, long)]
    animate: bool,

    /// How the axes follow an animation
    #[arg(long, value_enum)]
    limits: Option<Limits>,

    /// Show the histogram of final positions instead of the tracks
    #[arg(long)]
    histogram: bool,

    /// Number of histogram bins
    #[arg(long)]
    bins: Option<usize>,

    /// Save images under this name
    #[arg(short, long)]
    save: Option<String>,

    /// Directory images are saved under
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Images to save
    #[arg(long, value_enum, value_delimiter = ',')]
    variants: Option<Vec<Variant>>,

    /// Also save the animation as a GIF
    #[arg(long)]
    gif: bool,

    /// Only save images, do not open a window
    #[arg(long)]
    no_window: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DistributionKind {
    Lattice,
    Diagonal,
    Gaussian,
    Uniform,
}

impl Cli {
    fn apply(self, config: &mut RunConfig) -> Result<()> {
        if let Some(dimension) = self.dimension {
            config.dimension = Dimension::try_from(dimension)?;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(walkers) = self.walkers {
            config.walkers = walkers;
        }
        if let Some(start) = &self.start {
            config.start = Some(parse_position(start)?);
        }

        if let Some(kind) = self.distribution {
            // a matching kind keeps the parameter from the config file
            config.distribution = match (kind, config.distribution) {
                (DistributionKind::Gaussian, current @ StepDistribution::Gaussian { .. })
                | (DistributionKind::Uniform, current @ StepDistribution::Uniform { .. }) => current,
                (DistributionKind::Lattice, _) => StepDistribution::Lattice,
                (DistributionKind::Diagonal, _) => StepDistribution::Diagonal,
                (DistributionKind::Gaussian, _) => StepDistribution::Gaussian { sigma: 1.0 },
                (DistributionKind::Uniform, _) => StepDistribution::Uniform { half_width: 1.0 },
            };
        }
        if let Some(scale) = self.scale {
            match &mut config.distribution {
                StepDistribution::Gaussian { sigma } => *sigma = scale,
                StepDistribution::Uniform { half_width } => *half_width = scale,
                other => warn!("--scale has no effect on {other} steps"),
            }
        }

        if self.random {
            config.seed = None;
        } else if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.animate {
            config.mode = Mode::Animate;
        }
        if let Some(limits) = self.limits {
            config.limits = limits;
        }
        if self.histogram {
            config.view = View::Histogram;
        }
        if let Some(bins) = self.bins {
            config.bins = bins;
        }
        if self.no_window {
            config.window = false;
        }

        if let Some(name) = self.save {
            config.save = Some(SaveConfig {
                name,
                ..config.save.take().unwrap_or_else(|| SaveConfig::new(""))
            });
        }
        match &mut config.save {
            Some(save) => {
                if let Some(dir) = self.out_dir {
                    save.dir = dir;
                }
                if let Some(variants) = self.variants {
                    save.variants = variants;
                }
                save.gif |= self.gif;
            }
            None if self.out_dir.is_some() || self.variants.is_some() || self.gif => {
                bail!("--out-dir, --variants and --gif need a name to save under (--save)");
            }
            None => {}
        }

        if !config.window && config.save.is_none() {
            warn!("no window and nothing to save");
        }
        Ok(())
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    cli.apply(&mut config).context("invalid arguments")?;

    let report = drunkard::run(&config)?;
    info!(
        "finished with seed {} ({} files written)",
        report.seed,
        report.files.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config() -> RunConfig {
        toml::from_str(
            r#"
            dimension = 2
            steps = 50
            walkers = 7
            seed = 9

            [distribution]
            kind = "gaussian"
            sigma = 0.5
            "#,
        )
        .unwrap()
    }

    fn apply(args: &[&str]) -> Result<RunConfig> {
        let cli = Cli::try_parse_from(std::iter::once("drunkard").chain(args.iter().copied()))?;
        let mut config = file_config();
        cli.apply(&mut config)?;
        Ok(config)
    }

    #[test]
    fn flags_override_file_values() {
        let config = apply(&["-n", "10", "--limits", "growing", "--no-window"]).unwrap();
        assert_eq!(config.steps, 10);
        assert_eq!(config.limits, Limits::Growing);
        assert!(!config.window);
        // untouched by flags
        assert_eq!(config.walkers, 7);
        assert_eq!(config.dimension, Dimension::Two);
        assert_eq!(config.seed, Some(9));
        // absent from both
        assert_eq!(config.bins, RunConfig::default().bins);
        assert_eq!(config.mode, Mode::Static);
    }

    #[test]
    fn random_clears_the_seed() {
        assert_eq!(apply(&["--random"]).unwrap().seed, None);
        assert_eq!(apply(&["--seed", "4"]).unwrap().seed, Some(4));
        assert!(apply(&["--seed", "4", "--random"]).is_err());
    }

    #[test]
    fn matching_distribution_keeps_its_parameter() {
        let config = apply(&["--distribution", "gaussian"]).unwrap();
        assert_eq!(config.distribution, StepDistribution::Gaussian { sigma: 0.5 });

        let config = apply(&["--distribution", "gaussian", "--scale", "2"]).unwrap();
        assert_eq!(config.distribution, StepDistribution::Gaussian { sigma: 2. });

        let config = apply(&["--distribution", "uniform"]).unwrap();
        assert_eq!(config.distribution, StepDistribution::Uniform { half_width: 1. });
    }

    #[test]
    fn save_options_need_a_name() {
        for args in [&["--gif"][..], &["--out-dir", "plots"], &["--variants", "base"]] {
            let error = apply(args).unwrap_err();
            assert!(error.to_string().contains("--save"), "{args:?}: {error}");
        }

        let config = apply(&["--save", "run", "--gif", "--variants", "base,histogram"]).unwrap();
        let save = config.save.unwrap();
        assert_eq!(save.name, "run");
        assert!(save.gif);
        assert_eq!(save.variants, vec![Variant::Base, Variant::Histogram]);
    }

    #[test]
    fn rejects_bad_dimension_and_start() {
        assert!(apply(&["-d", "4"]).is_err());
        assert!(apply(&["--start", "(1, x)"]).is_err());
    }
}
