//! Saving walks as images.
//!
//! Files land under `<root>/plots{d}d/<variant>/<name>.png`, with animations
//! at `<root>/plots{d}d/animation/<name>.gif`. Directories are created as
//! needed and existing files are overwritten.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::layout::{Extent, Limits};
use crate::palette;
use crate::projection::Projection;
use crate::stats::{FinalDistribution, Histogram};
use crate::walk::{Dimension, Walk};
use crate::{Error, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Tracks on plain axes.
    Base,
    /// Tracks over grid lines.
    Mesh,
    /// Distribution of the final positions with its fit.
    Histogram,
}

impl Variant {
    pub const ALL: [Self; 3] = [Self::Base, Self::Mesh, Self::Histogram];

    pub fn dir_name(self) -> &'static str {
        match self {
            Variant::Base => "base",
            Variant::Mesh => "mesh",
            Variant::Histogram => "histogram",
        }
    }
}

fn render_error(e: impl Display) -> Error {
    Error::Render(e.to_string())
}

/// A file stem chosen by the user: no separators, no parent references.
fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\', '\0'])
    {
        return Err(Error::InvalidName(name.to_owned()));
    }
    Ok(trimmed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exporter {
    root: PathBuf,
    size: (u32, u32),
    bins: usize,
}

impl Exporter {
    pub const DEFAULT_SIZE: (u32, u32) = (1280, 960);
    pub const DEFAULT_BINS: usize = 20;

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            size: Self::DEFAULT_SIZE,
            bins: Self::DEFAULT_BINS,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dimension_dir(&self, dimension: Dimension) -> PathBuf {
        self.root.join(format!("plots{}d", dimension.get()))
    }

    pub fn path_for(&self, dimension: Dimension, variant: Variant, name: &str) -> Result<PathBuf> {
        let name = validate_name(name)?;
        Ok(self
            .dimension_dir(dimension)
            .join(variant.dir_name())
            .join(format!("{name}.png")))
    }

    pub fn animation_path(&self, dimension: Dimension, name: &str) -> Result<PathBuf> {
        let name = validate_name(name)?;
        Ok(self
            .dimension_dir(dimension)
            .join("animation")
            .join(format!("{name}.gif")))
    }

    pub fn save(&self, walk: &Walk, variant: Variant, name: &str) -> Result<PathBuf> {
        let path = self.path_for(walk.dimension(), variant, name)?;
        create_parent(&path)?;

        {
            let root = BitMapBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;
            let drawn = match variant {
                Variant::Base | Variant::Mesh => {
                    let extent = Limits::Stable.extent(walk, walk.steps());
                    draw_walk(&root, walk, extent, walk.steps(), variant == Variant::Mesh)
                }
                Variant::Histogram => {
                    let distribution = FinalDistribution::of_walk(walk);
                    let histogram = distribution.histogram(self.bins)?;
                    draw_histogram(&root, walk, &distribution, &histogram)
                }
            };
            drawn.map_err(render_error)?;
            root.present().map_err(render_error)?;
        }

        info!("saved {}", path.display());
        #[cfg(not(feature = "ttf"))]
        debug!("built without the ttf feature, {} has no text", path.display());
        Ok(path)
    }

    pub fn save_all(&self, walk: &Walk, variants: &[Variant], name: &str) -> Result<Vec<PathBuf>> {
        variants
            .iter()
            .map(|variant| self.save(walk, *variant, name))
            .collect()
    }

    /// Writes every frame `animation` visits into one GIF.
    pub fn save_animation(&self, walk: &Walk, animation: &Animation, name: &str) -> Result<PathBuf> {
        let path = self.animation_path(walk.dimension(), name)?;
        create_parent(&path)?;

        let delay = animation.interval.as_millis().clamp(10, u32::MAX as u128) as u32;
        {
            let root = BitMapBackend::gif(&path, self.size, delay)
                .map_err(render_error)?
                .into_drawing_area();
            let mut frames = 0;
            for frame in animation.schedule() {
                root.fill(&WHITE).map_err(render_error)?;
                let extent = animation.limits.extent(walk, frame);
                draw_walk(&root, walk, extent, frame, true).map_err(render_error)?;
                root.present().map_err(render_error)?;
                frames += 1;
            }
            debug!("encoded {frames} frames");
        }

        info!("saved {}", path.display());
        Ok(path)
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn draw_walk<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    walk: &Walk,
    extent: Extent,
    frame: usize,
    grid: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let title = format!("Random Walk - {}", walk.dimension());
    let marker = palette::plotters(palette::MARKER);

    if walk.dimension() == Dimension::Three {
        let mut chart = ChartBuilder::on(root)
            .caption(&title, ("sans-serif", 28))
            .margin(16)
            .build_cartesian_3d(
                extent.x.min..extent.x.max,
                extent.y.min..extent.y.max,
                extent.z.min..extent.z.max,
            )?;
        chart.with_projection(|mut pb| {
            pb.yaw = Projection::DEFAULT_YAW;
            pb.pitch = Projection::DEFAULT_PITCH;
            pb.scale = 0.85;
            pb.into_matrix()
        });

        let mut axes = chart.configure_axes();
        if grid {
            axes.light_grid_style(BLACK.mix(0.08)).max_light_lines(3);
        } else {
            axes.bold_grid_style(WHITE.mix(0.))
                .light_grid_style(WHITE.mix(0.));
        }
        axes.draw()?;

        for walker in 0..walk.walkers() {
            let color = palette::plotters(palette::walker(walker));
            chart.draw_series(LineSeries::new(
                (0..=frame).map(|t| {
                    let [x, y, z] = walk.plot_point(walker, t);
                    (x, y, z)
                }),
                color.mix(palette::LINE_ALPHA as f64).stroke_width(2),
            ))?;
        }
        return Ok(());
    }

    let (x_desc, y_desc) = match walk.dimension() {
        Dimension::One => ("Step", "x"),
        _ => ("x", "y"),
    };
    let mut chart = ChartBuilder::on(root)
        .caption(&title, ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(extent.x.min..extent.x.max, extent.y.min..extent.y.max)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_desc).y_desc(y_desc);
    if !grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    for walker in 0..walk.walkers() {
        let color = palette::plotters(palette::walker(walker));
        let points = (0..=frame).map(|t| {
            let [x, y, _] = walk.plot_point(walker, t);
            (x, y)
        });
        chart.draw_series(LineSeries::new(
            points.clone(),
            color.mix(palette::LINE_ALPHA as f64).stroke_width(2),
        ))?;
        chart.draw_series(points.map(|point| {
            Circle::new(
                point,
                3,
                marker.mix(palette::MARKER_ALPHA as f64).filled(),
            )
        }))?;
    }
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    walk: &Walk,
    distribution: &FinalDistribution,
    histogram: &Histogram,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let span = histogram.span();
    let samples = 200;
    let curve: Vec<(f64, f64)> = distribution
        .fit
        .map(|fit| {
            (0..=samples)
                .map(|i| {
                    let x = span.min + span.size() * i as f64 / samples as f64;
                    (x, fit.pdf(x))
                })
                .collect()
        })
        .unwrap_or_default();
    let top = curve
        .iter()
        .map(|(_, y)| *y)
        .fold(histogram.max_density(), f64::max)
        * 1.1;

    let title = format!("Random Walk - {} ({} walkers)", walk.dimension(), walk.walkers());
    let mut chart = ChartBuilder::on(root)
        .caption(&title, ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(span.min..span.max, 0.0..top.max(f64::MIN_POSITIVE))?;

    chart
        .configure_mesh()
        .x_desc(distribution.label)
        .y_desc("Density")
        .draw()?;

    let fill = palette::plotters(palette::HISTOGRAM);
    chart.draw_series(histogram.bins().iter().map(|bin| {
        Rectangle::new(
            [(bin.range.min, 0.), (bin.range.max, bin.density)],
            fill.mix(0.6).filled(),
        )
    }))?;

    if !curve.is_empty() {
        let line = palette::plotters(palette::FIT);
        chart.draw_series(LineSeries::new(curve, line.stroke_width(2)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_dimension_and_variant() {
        let exporter = Exporter::new("images");
        assert_eq!(
            exporter
                .path_for(Dimension::Two, Variant::Mesh, "first")
                .unwrap(),
            Path::new("images/plots2d/mesh/first.png")
        );
        assert_eq!(
            exporter.animation_path(Dimension::Three, " spin ").unwrap(),
            Path::new("images/plots3d/animation/spin.gif")
        );
    }

    #[test]
    fn rejects_unsafe_names() {
        let exporter = Exporter::new("images");
        for name in ["", "  ", "..", "a/b", "a\\b"] {
            assert!(matches!(
                exporter.path_for(Dimension::One, Variant::Base, name),
                Err(Error::InvalidName(_))
            ));
        }
    }
}
