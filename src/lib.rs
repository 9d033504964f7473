pub mod animation;
pub mod config;
mod error;
pub mod export;
pub mod layout;
mod palette;
pub mod projection;
pub mod session;
pub mod stats;
pub mod walk;
mod winit;

use itertools::zip_eq;
use vello::{
    Scene,
    kurbo::{self, Affine, BezPath, Cap, Join},
    peniko::{
        self, Mix,
        color::{AlphaColor, Srgb},
    },
};

pub use animation::{Animation, Mode};
pub use error::{Error, Result};
pub use layout::{Bounds, Extent, Interval, Limits, Padding, PlotLayout};
pub use projection::Projection;
pub use session::{RunReport, run};
pub use walk::{Dimension, Frame, StepDistribution, Walk, WalkParams};

use layout::PlotInstanceLayout;
use stats::FinalDistribution;

/// Opens a window showing `plot` and blocks until it is closed.
pub fn launch(plot: Plot, title: &str, animation: Option<Animation>) -> Result<()> {
    let mut plot = plot;
    let mut app = winit::WalkViewer::new(&mut plot, title, animation);
    app.display()
}

/// A vello scene built from walk data.
pub struct Plot {
    pub layout: PlotLayout,
    pub(crate) instance: PlotInstanceLayout,
    pub projection: Projection,
    pub padding_layers: Vec<PaddingLayer>,
    pub data_layers: Vec<DataLayer>,
    /// Number of leading points of each line and scatter layer to draw.
    visible: Option<usize>,
    /// Frame the data bounds were last fitted to.
    fitted: Option<usize>,
    pub scene: Scene,
}

impl Plot {
    pub fn new(layout: PlotLayout, projection: Projection) -> Self {
        let instance = layout.instantiate(1.0, None);
        Self {
            layout,
            instance,
            projection,
            padding_layers: Vec::new(),
            data_layers: Vec::new(),
            visible: None,
            fitted: None,
            scene: Scene::new(),
        }
    }

    /// Every walker's track as a line with markers at each visited point.
    pub fn of_walk(walk: &Walk, layout: PlotLayout) -> Self {
        let projection = match walk.dimension() {
            Dimension::Three => Projection::DEFAULT_ORBIT,
            _ => Projection::Flat,
        };
        let mut plot = Self::new(layout, projection);

        for walker in 0..walk.walkers() {
            let points: Vec<[f64; 3]> = (0..=walk.steps())
                .map(|t| walk.plot_point(walker, t))
                .collect();

            plot.data_layers.push(DataLayer::Line {
                points: points.clone(),
                color: palette::vello(palette::walker(walker), palette::LINE_ALPHA),
                width: 1.5,
            });
            if walk.dimension() != Dimension::Three {
                plot.data_layers.push(DataLayer::Scatter {
                    points,
                    color: palette::vello(palette::MARKER, palette::MARKER_ALPHA),
                    size: 2.,
                });
            }
        }

        plot.padding_layers = match walk.dimension() {
            Dimension::Three => vec![PaddingLayer::Axes3(Extent::of_walk(walk, walk.steps()))],
            _ => vec![PaddingLayer::XAxis, PaddingLayer::YAxis],
        };
        plot.fit(None);
        plot
    }

    /// Histogram of final positions (1D) or final distances (2D, 3D) with
    /// the fitted density drawn on top.
    pub fn histogram(walk: &Walk, bins: usize, layout: PlotLayout) -> Result<Self> {
        let distribution = FinalDistribution::of_walk(walk);
        let histogram = distribution.histogram(bins)?;
        let mut plot = Self::new(layout, Projection::Flat);

        plot.data_layers.push(DataLayer::Bar {
            xs: histogram
                .bins()
                .iter()
                .map(|b| (b.range.min, b.range.max))
                .collect(),
            ys: histogram.bins().iter().map(|b| b.density).collect(),
            colors: vec![palette::vello(palette::HISTOGRAM, 0.6); histogram.bins().len()],
        });

        if let Some(fit) = distribution.fit {
            let span = histogram.span();
            let samples = 200;
            let points = (0..=samples)
                .map(|i| {
                    let x = span.min + span.size() * i as f64 / samples as f64;
                    [x, fit.pdf(x), 0.]
                })
                .collect();
            plot.data_layers.push(DataLayer::Line {
                points,
                color: palette::vello(palette::FIT, 1.0),
                width: 2.,
            });
        }

        plot.padding_layers = vec![PaddingLayer::XAxis, PaddingLayer::YAxis];
        plot.fit(None);
        Ok(plot)
    }

    pub fn width(&self) -> f64 {
        self.layout.width
    }

    pub fn height(&self) -> f64 {
        self.layout.height
    }

    pub fn data_bounds(&self) -> Bounds {
        self.instance.data_bounds
    }

    pub(crate) fn set_scale_factor(&mut self, scale_factor: f64) {
        self.instance.scale_factor = scale_factor;
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.instance.resize(width, height);
    }

    pub(crate) fn drag(&mut self, start: (f64, f64), prior: (f64, f64), current: (f64, f64)) {
        match self.projection {
            Projection::Flat => self.instance.drag(start, prior, current),
            Projection::Orbit { .. } => {
                self.projection = self.projection.rotate(
                    (prior.0 - current.0) * 0.01,
                    (current.1 - prior.1) * 0.01,
                );
                self.fit(self.fitted);
            }
        }
    }

    pub(crate) fn zoom(&mut self, position: (f64, f64), factor: f64) {
        self.instance.zoom(position, factor);
    }

    /// Restrict lines and markers to time points `0..=frame`; `None` shows
    /// everything.
    pub fn show_frame(&mut self, frame: Option<usize>) {
        self.visible = frame.map(|f| f + 1);
    }

    /// Fit the data bounds to the points up to `frame` (all points for
    /// `None`), padded by [`Limits::MARGIN`].
    pub fn fit(&mut self, frame: Option<usize>) {
        self.fitted = frame;
        let take = frame.map_or(usize::MAX, |f| f + 1);
        let projection = self.projection;

        let mut points = Vec::new();
        for layer in &self.data_layers {
            match layer {
                DataLayer::Line { points: data, .. } | DataLayer::Scatter { points: data, .. } => {
                    points.extend(data.iter().take(take).map(|p| projection.project(*p)));
                }
                DataLayer::Bar { xs, ys, .. } => {
                    points.extend(zip_eq(xs, ys).flat_map(|(x, y)| [(x.0, 0.), (x.1, *y)]));
                }
            }
        }

        if let Some(bounds) = Bounds::spanning(points) {
            // densities are far below one unit
            let has_bars = self
                .data_layers
                .iter()
                .any(|layer| matches!(layer, DataLayer::Bar { .. }));
            let margin = if has_bars { 0. } else { Limits::MARGIN };
            let bounds = bounds.padded(margin);
            self.instance.data_bounds = Bounds {
                x: nonempty(bounds.x),
                y: nonempty(bounds.y),
            };
        }
    }

    pub fn redraw(&mut self) {
        let scale_factor = self.instance.scale_factor;
        let mut scene = Scene::new();

        let padding = self.instance.padding;
        let rect = kurbo::Rect {
            x0: scale_factor * padding.left,
            y0: scale_factor * padding.top,
            x1: scale_factor * (self.instance.logical_width - padding.right),
            y1: scale_factor * (self.instance.logical_height - padding.bottom),
        };
        scene.push_layer(Mix::Clip, 1.0, Affine::IDENTITY, &rect);

        let take = self.visible.unwrap_or(usize::MAX);
        for layer in &self.data_layers {
            match layer {
                DataLayer::Bar { xs, ys, colors } => {
                    self.draw_bar(
                        xs.iter().cloned(),
                        ys.iter().cloned(),
                        colors.iter().cloned(),
                        &mut scene,
                    );
                }
                DataLayer::Scatter {
                    points,
                    color,
                    size,
                } => {
                    self.draw_scatter(
                        points.iter().take(take).map(|p| self.projection.project(*p)),
                        *color,
                        *size,
                        &mut scene,
                    );
                }
                DataLayer::Line {
                    points,
                    color,
                    width,
                } => {
                    self.draw_line(
                        points.iter().take(take).map(|p| self.projection.project(*p)),
                        *color,
                        *width,
                        &mut scene,
                    );
                }
            }
        }

        for layer in &self.padding_layers {
            if let PaddingLayer::Axes3(extent) = layer {
                let origin = [extent.x.min, extent.y.min, extent.z.min];
                for end in [
                    [extent.x.max, extent.y.min, extent.z.min],
                    [extent.x.min, extent.y.max, extent.z.min],
                    [extent.x.min, extent.y.min, extent.z.max],
                ] {
                    self.draw_line(
                        [origin, end].into_iter().map(|p| self.projection.project(p)),
                        AlphaColor::BLACK.with_alpha(0.6),
                        1.,
                        &mut scene,
                    );
                }
            }
        }

        scene.pop_layer();

        let bottom = scale_factor * (self.instance.logical_height - padding.bottom);
        let left = scale_factor * padding.left;
        let right = scale_factor * (self.instance.logical_width - padding.right);
        let top = scale_factor * padding.top;
        let tick = 5. * scale_factor;
        let style = kurbo::Stroke::new(1.5 * scale_factor)
            .with_caps(Cap::Square)
            .with_join(Join::Miter);

        for layer in &self.padding_layers {
            let segments: Vec<((f64, f64), (f64, f64))> = match layer {
                PaddingLayer::XAxis => std::iter::once(((left, bottom), (right, bottom)))
                    .chain((1..=9).map(|i| {
                        let x = left + i as f64 * (right - left) / 10.;
                        ((x, bottom), (x, bottom + tick))
                    }))
                    .collect(),
                PaddingLayer::YAxis => std::iter::once(((left, bottom), (left, top)))
                    .chain((1..=9).map(|i| {
                        let y = bottom - i as f64 * (bottom - top) / 10.;
                        ((left - tick, y), (left, y))
                    }))
                    .collect(),
                PaddingLayer::Axes3(_) => continue,
            };

            for (from, to) in segments {
                let path = kurbo::Line::new(from, to);
                scene.stroke(
                    &style,
                    Affine::IDENTITY,
                    peniko::BrushRef::Solid(AlphaColor::BLACK),
                    None,
                    &path,
                );
            }
        }

        self.scene = scene;
    }

    pub fn draw_bar<I, J, K>(&self, xs: I, ys: J, colors: K, scene: &mut Scene)
    where
        I: Iterator<Item = (f64, f64)>,
        J: Iterator<Item = f64>,
        K: Iterator<Item = AlphaColor<Srgb>>,
    {
        zip_eq(zip_eq(xs, ys), colors).for_each(|((x, y), color)| {
            let corner0 = self.instance.to_screen(x.0, 0.);
            let corner1 = self.instance.to_screen(x.1, y);

            scene.fill(
                peniko::Fill::NonZero,
                Affine::IDENTITY,
                peniko::BrushRef::Solid(color),
                None,
                &kurbo::Rect::from_points(corner0, corner1).abs(),
            );
        });
    }

    pub fn draw_scatter<I>(&self, points: I, color: AlphaColor<Srgb>, size: f64, scene: &mut Scene)
    where
        I: Iterator<Item = (f64, f64)>,
    {
        let radius = size * self.instance.scale_factor;
        points.for_each(|(x, y)| {
            scene.fill(
                peniko::Fill::NonZero,
                Affine::IDENTITY,
                peniko::BrushRef::Solid(color),
                None,
                &kurbo::Circle::new(self.instance.to_screen(x, y), radius),
            );
        });
    }

    pub fn draw_line<I>(&self, points: I, colour: AlphaColor<Srgb>, width: f64, scene: &mut Scene)
    where
        I: Iterator<Item = (f64, f64)>,
    {
        let mut path = BezPath::new();
        for (i, (x, y)) in points.enumerate() {
            let point = self.instance.to_screen(x, y);
            if i == 0 {
                path.move_to(point);
            } else {
                path.line_to(point);
            }
        }

        let style = kurbo::Stroke::new(width * self.instance.scale_factor).with_join(Join::Round);
        scene.stroke(
            &style,
            Affine::IDENTITY,
            peniko::BrushRef::Solid(colour),
            None,
            &path,
        );
    }
}

/// Widen a zero-size interval so it can be mapped to the screen.
fn nonempty(interval: Interval) -> Interval {
    if interval.size() > 0. {
        interval
    } else {
        interval.padded(0.5)
    }
}

pub enum PaddingLayer {
    XAxis,
    YAxis,
    /// Projected x, y and z axes from the low corner of the extent.
    Axes3(Extent),
}

pub enum DataLayer {
    Line {
        points: Vec<[f64; 3]>,
        color: AlphaColor<Srgb>,
        width: f64,
    },
    Scatter {
        points: Vec<[f64; 3]>,
        color: AlphaColor<Srgb>,
        size: f64,
    },
    Bar {
        xs: Vec<(f64, f64)>,
        ys: Vec<f64>,
        colors: Vec<AlphaColor<Srgb>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(dimension: Dimension) -> Walk {
        Walk::generate(
            &WalkParams::new(dimension)
                .with_steps(30)
                .with_walkers(4),
        )
        .unwrap()
    }

    #[test]
    fn walk_plot_has_a_line_and_markers_per_walker() {
        let plot = Plot::of_walk(&walk(Dimension::Two), PlotLayout::new());
        assert_eq!(plot.data_layers.len(), 8);
        assert_eq!(plot.projection, Projection::Flat);

        let plot = Plot::of_walk(&walk(Dimension::Three), PlotLayout::new());
        assert_eq!(plot.data_layers.len(), 4);
        assert!(matches!(plot.projection, Projection::Orbit { .. }));
    }

    #[test]
    fn flat_plot_bounds_follow_limits() {
        let walk = walk(Dimension::One);
        let mut plot = Plot::of_walk(&walk, PlotLayout::new());
        assert_eq!(plot.data_bounds(), Limits::Stable.extent(&walk, 0).bounds());

        plot.fit(Some(7));
        assert_eq!(plot.data_bounds(), Limits::Growing.extent(&walk, 7).bounds());
    }

    #[test]
    fn rotating_keeps_stable_bounds_during_animation() {
        let mut plot = Plot::of_walk(&walk(Dimension::Three), PlotLayout::new());
        let bounds = plot.data_bounds();
        plot.show_frame(Some(3));
        plot.drag((100., 100.), (100., 100.), (100., 100.));
        assert_eq!(plot.data_bounds(), bounds);

        plot.fit(Some(3));
        let growing = plot.data_bounds();
        plot.drag((100., 100.), (100., 100.), (100., 100.));
        assert_eq!(plot.data_bounds(), growing);
    }

    #[test]
    fn histogram_plot_starts_at_zero_density() {
        let plot = Plot::histogram(&walk(Dimension::Two), 6, PlotLayout::new()).unwrap();
        assert_eq!(plot.data_bounds().y.min, 0.);
        assert!(matches!(plot.data_layers[0], DataLayer::Bar { .. }));
    }

    #[test]
    fn redraw_builds_a_scene() {
        let mut plot = Plot::of_walk(&walk(Dimension::Three), PlotLayout::new());
        plot.show_frame(Some(3));
        plot.redraw();
        plot.drag((100., 100.), (100., 100.), (110., 90.));
        plot.redraw();
    }
}
