//! Random walk generation.
//!
//! Every walker draws its own increments from an independent [`StdRng`]
//! seeded with `seed + walker`, so a batch is reproducible from a single
//! base seed and individual walkers do not depend on how many others run
//! alongside them. Positions are the running sum of the increments along
//! the step axis, offset by the start position.

use std::fmt;

use itertools::Itertools;
use log::debug;
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayViewMut1, Axis, s};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimension {
    One = 1,
    Two = 2,
    Three = 3,
}

impl Dimension {
    pub const ALL: [Self; 3] = [Self::One, Self::Two, Self::Three];

    #[inline]
    pub fn get(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Dimension {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(Error::InvalidDimension(other)),
        }
    }
}

impl From<Dimension> for u8 {
    fn from(dimension: Dimension) -> Self {
        dimension as u8
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.get())
    }
}

/// How a single step is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepDistribution {
    /// A unit step along one axis, in either direction.
    #[default]
    Lattice,
    /// Any non-zero offset with every coordinate in `{-1, 0, 1}`.
    Diagonal,
    /// Every axis independently normal with standard deviation `sigma`.
    Gaussian { sigma: f64 },
    /// Every axis independently uniform on `[-half_width, half_width)`.
    Uniform { half_width: f64 },
}

impl StepDistribution {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Lattice | Self::Diagonal => Ok(()),
            Self::Gaussian { sigma } if sigma.is_finite() && sigma > 0. => Ok(()),
            Self::Gaussian { sigma } => Err(Error::InvalidDistribution(format!(
                "sigma must be positive and finite, got {sigma}"
            ))),
            Self::Uniform { half_width } if half_width.is_finite() && half_width > 0. => Ok(()),
            Self::Uniform { half_width } => Err(Error::InvalidDistribution(format!(
                "half width must be positive and finite, got {half_width}"
            ))),
        }
    }

    fn sampler(&self, dimension: Dimension) -> Result<Sampler> {
        self.validate()?;
        Ok(match *self {
            Self::Lattice => Sampler::Offsets(offsets(dimension, false)),
            Self::Diagonal => Sampler::Offsets(offsets(dimension, true)),
            Self::Gaussian { sigma } => Sampler::Normal(
                Normal::new(0., sigma).map_err(|e| Error::InvalidDistribution(e.to_string()))?,
            ),
            Self::Uniform { half_width } => Sampler::Uniform(
                Uniform::new(-half_width, half_width)
                    .map_err(|e| Error::InvalidDistribution(e.to_string()))?,
            ),
        })
    }
}

impl fmt::Display for StepDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lattice => f.write_str("lattice"),
            Self::Diagonal => f.write_str("diagonal"),
            Self::Gaussian { sigma } => write!(f, "gaussian(sigma={sigma})"),
            Self::Uniform { half_width } => write!(f, "uniform(half_width={half_width})"),
        }
    }
}

/// Possible lattice moves, axis-aligned first along `+1` then `-1`.
fn offsets(dimension: Dimension, diagonal: bool) -> Vec<Vec<f64>> {
    let d = dimension.get();
    if diagonal {
        (0..d)
            .map(|_| [-1., 0., 1.])
            .multi_cartesian_product()
            .filter(|offset| offset.iter().any(|&v| v != 0.))
            .collect()
    } else {
        [1., -1.]
            .into_iter()
            .cartesian_product(0..d)
            .map(|(direction, axis)| {
                (0..d)
                    .map(|i| if i == axis { direction } else { 0. })
                    .collect()
            })
            .collect()
    }
}

enum Sampler {
    Offsets(Vec<Vec<f64>>),
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
}

impl Sampler {
    fn fill(&self, rng: &mut StdRng, mut out: ArrayViewMut1<'_, f64>) {
        match self {
            Sampler::Offsets(offsets) => {
                let offset = &offsets[rng.random_range(0..offsets.len())];
                out.iter_mut().zip(offset).for_each(|(o, v)| *o = *v);
            }
            Sampler::Normal(normal) => {
                for o in out.iter_mut() {
                    *o = normal.sample(rng);
                }
            }
            Sampler::Uniform(uniform) => {
                for o in out.iter_mut() {
                    *o = uniform.sample(rng);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkParams {
    pub dimension: Dimension,
    pub steps: usize,
    pub walkers: usize,
    /// Defaults to the origin.
    pub start: Option<Vec<f64>>,
    pub distribution: StepDistribution,
    /// Base seed; a random one is drawn when absent.
    pub seed: Option<u64>,
}

impl WalkParams {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_walkers(mut self, walkers: usize) -> Self {
        self.walkers = walkers;
        self
    }

    pub fn with_start(mut self, start: Vec<f64>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_distribution(mut self, distribution: StepDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn start_position(&self) -> Vec<f64> {
        self.start
            .clone()
            .unwrap_or_else(|| vec![0.; self.dimension.get()])
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(Error::NotPositive("number of steps"));
        }
        if self.walkers == 0 {
            return Err(Error::NotPositive("number of walkers"));
        }
        if let Some(start) = &self.start {
            if start.len() != self.dimension.get() {
                return Err(Error::StartMismatch {
                    expected: self.dimension.get(),
                    got: start.len(),
                });
            }
            if start.iter().any(|v| !v.is_finite()) {
                return Err(Error::NonFiniteStart(start.clone()));
            }
        }
        self.distribution.validate()
    }
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            dimension: Dimension::One,
            steps: 100,
            walkers: 20,
            start: None,
            distribution: StepDistribution::Lattice,
            seed: Some(1),
        }
    }
}

/// Positions of all walkers at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub step: usize,
    /// walkers × dimension
    pub positions: Array2<f64>,
}

/// The result of one simulation run.
///
/// `increments` and `positions` both have shape walkers × steps × dimension.
/// The start position is not part of either array; [`Walk::point`] exposes
/// the full track with the start at `t = 0`.
#[derive(Debug, Clone)]
pub struct Walk {
    params: WalkParams,
    seed: u64,
    start: Array1<f64>,
    increments: Array3<f64>,
    positions: Array3<f64>,
}

impl Walk {
    pub fn generate(params: &WalkParams) -> Result<Self> {
        params.validate()?;

        let dimension = params.dimension.get();
        let sampler = params.distribution.sampler(params.dimension)?;
        let seed = params.seed.unwrap_or_else(|| rand::rng().random());

        let mut increments = Array3::zeros((params.walkers, params.steps, dimension));
        for (walker, mut steps) in increments.axis_iter_mut(Axis(0)).enumerate() {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(walker as u64));
            for step in steps.axis_iter_mut(Axis(0)) {
                sampler.fill(&mut rng, step);
            }
        }

        let start = Array1::from(params.start_position());
        let mut positions = increments.clone();
        positions.accumulate_axis_inplace(Axis(1), |prev, curr| *curr += *prev);
        positions += &start;

        debug!(
            "generated {} {} walkers of {} {} steps with seed {}",
            params.walkers, params.dimension, params.steps, params.distribution, seed
        );

        Ok(Self {
            params: params.clone(),
            seed,
            start,
            increments,
            positions,
        })
    }

    pub fn params(&self) -> &WalkParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn dimension(&self) -> Dimension {
        self.params.dimension
    }

    pub fn walkers(&self) -> usize {
        self.params.walkers
    }

    pub fn steps(&self) -> usize {
        self.params.steps
    }

    pub fn start(&self) -> ArrayView1<'_, f64> {
        self.start.view()
    }

    pub fn increments(&self) -> &Array3<f64> {
        &self.increments
    }

    pub fn positions(&self) -> &Array3<f64> {
        &self.positions
    }

    /// Position of `walker` at time `t`, where `t = 0` is the start and
    /// `t = steps` the final position.
    ///
    /// # Panics
    ///
    /// Panics if `walker` or `t` is out of range.
    pub fn point(&self, walker: usize, t: usize) -> ArrayView1<'_, f64> {
        if t == 0 {
            self.start.view()
        } else {
            self.positions.slice(s![walker, t - 1, ..])
        }
    }

    pub fn track(&self, walker: usize) -> impl Iterator<Item = ArrayView1<'_, f64>> + '_ {
        (0..=self.steps()).map(move |t| self.point(walker, t))
    }

    /// The point as drawn on a plot: one dimensional walks are plotted
    /// against the step index.
    pub fn plot_point(&self, walker: usize, t: usize) -> [f64; 3] {
        let p = self.point(walker, t);
        match self.dimension() {
            Dimension::One => [t as f64, p[0], 0.],
            Dimension::Two => [p[0], p[1], 0.],
            Dimension::Three => [p[0], p[1], p[2]],
        }
    }

    pub fn frame(&self, t: usize) -> Option<Frame> {
        if t > self.steps() {
            return None;
        }
        let positions = if t == 0 {
            Array2::from_shape_fn((self.walkers(), self.dimension().get()), |(_, k)| {
                self.start[k]
            })
        } else {
            self.positions.index_axis(Axis(1), t - 1).to_owned()
        };
        Some(Frame { step: t, positions })
    }

    pub fn distance_from_start(&self, walker: usize, t: usize) -> f64 {
        self.point(walker, t)
            .iter()
            .zip(self.start.iter())
            .map(|(p, s)| (p - s).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    pub fn distance_from_origin(&self, walker: usize, t: usize) -> f64 {
        self.point(walker, t).iter().map(|p| p * p).sum::<f64>().sqrt()
    }

    /// walkers × dimension
    pub fn final_positions(&self) -> ArrayView2<'_, f64> {
        self.positions.index_axis(Axis(1), self.steps() - 1)
    }

    pub fn final_distances(&self) -> Vec<f64> {
        (0..self.walkers())
            .map(|walker| self.distance_from_start(walker, self.steps()))
            .collect()
    }

    /// Mean over walkers of the squared distance from the start, for every
    /// `t` in `0..=steps`.
    pub fn mean_squared_displacement(&self) -> Vec<f64> {
        let walkers = self.walkers() as f64;
        (0..=self.steps())
            .map(|t| {
                (0..self.walkers())
                    .map(|walker| self.distance_from_start(walker, t).powi(2))
                    .sum::<f64>()
                    / walkers
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(dimension: Dimension) -> WalkParams {
        WalkParams::new(dimension)
            .with_steps(50)
            .with_walkers(7)
            .with_seed(Some(42))
    }

    #[test]
    fn rejects_dimensions_outside_range() {
        assert!(matches!(
            Dimension::try_from(0u8),
            Err(Error::InvalidDimension(0))
        ));
        assert!(matches!(
            Dimension::try_from(4u8),
            Err(Error::InvalidDimension(4))
        ));
        assert_eq!(Dimension::try_from(2u8).unwrap(), Dimension::Two);
    }

    #[test]
    fn shape_matches_parameters() {
        for dimension in Dimension::ALL {
            let walk = Walk::generate(&params(dimension)).unwrap();
            assert_eq!(walk.positions().dim(), (7, 50, dimension.get()));
            assert_eq!(walk.increments().dim(), (7, 50, dimension.get()));
        }
    }

    #[test]
    fn positions_are_cumulative_sums() {
        for distribution in [
            StepDistribution::Lattice,
            StepDistribution::Diagonal,
            StepDistribution::Gaussian { sigma: 0.5 },
            StepDistribution::Uniform { half_width: 2. },
        ] {
            for dimension in Dimension::ALL {
                let start: Vec<f64> = (0..dimension.get()).map(|i| i as f64 + 0.5).collect();
                let walk = Walk::generate(
                    &params(dimension)
                        .with_start(start.clone())
                        .with_distribution(distribution),
                )
                .unwrap();
                let positions = walk.positions();
                let increments = walk.increments();
                for w in 0..walk.walkers() {
                    for k in 0..dimension.get() {
                        let first = positions[[w, 0, k]] - (start[k] + increments[[w, 0, k]]);
                        assert!(first.abs() < 1e-9);
                        for t in 1..walk.steps() {
                            let expected = positions[[w, t - 1, k]] + increments[[w, t, k]];
                            assert!((positions[[w, t, k]] - expected).abs() < 1e-9);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn same_seed_same_walk() {
        let a = Walk::generate(&params(Dimension::Two)).unwrap();
        let b = Walk::generate(&params(Dimension::Two)).unwrap();
        assert_eq!(a.positions(), b.positions());

        let c = Walk::generate(&params(Dimension::Two).with_seed(Some(43))).unwrap();
        assert_ne!(a.positions(), c.positions());
    }

    #[test]
    fn walkers_are_seeded_independently() {
        // walker 1 of a batch seeded with 42 is walker 0 of a batch seeded with 43
        let a = Walk::generate(&params(Dimension::Three)).unwrap();
        let b = Walk::generate(&params(Dimension::Three).with_seed(Some(43))).unwrap();
        assert_eq!(
            a.positions().index_axis(Axis(0), 1),
            b.positions().index_axis(Axis(0), 0)
        );
    }

    #[test]
    fn unseeded_walk_records_its_seed() {
        let walk = Walk::generate(&params(Dimension::One).with_seed(None)).unwrap();
        let replay = Walk::generate(&params(Dimension::One).with_seed(Some(walk.seed()))).unwrap();
        assert_eq!(walk.positions(), replay.positions());
    }

    #[test]
    fn lattice_steps_move_one_axis_by_one() {
        let walk = Walk::generate(&params(Dimension::Three)).unwrap();
        for step in walk.increments().lanes(Axis(2)) {
            assert_eq!(step.iter().filter(|v| v.abs() == 1.).count(), 1);
            assert_eq!(step.iter().filter(|v| **v == 0.).count(), 2);
        }
    }

    #[test]
    fn diagonal_steps_are_nonzero_unit_offsets() {
        let walk = Walk::generate(
            &params(Dimension::Two).with_distribution(StepDistribution::Diagonal),
        )
        .unwrap();
        for step in walk.increments().lanes(Axis(2)) {
            assert!(step.iter().all(|v| [-1., 0., 1.].contains(v)));
            assert!(step.iter().any(|v| *v != 0.));
        }
    }

    #[test]
    fn offset_tables() {
        assert_eq!(offsets(Dimension::One, false), vec![vec![1.], vec![-1.]]);
        assert_eq!(offsets(Dimension::Two, false).len(), 4);
        assert_eq!(offsets(Dimension::Three, false).len(), 6);
        assert_eq!(offsets(Dimension::One, true).len(), 2);
        assert_eq!(offsets(Dimension::Two, true).len(), 8);
        assert_eq!(offsets(Dimension::Three, true).len(), 26);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            params(Dimension::One).with_steps(0).validate(),
            Err(Error::NotPositive(_))
        ));
        assert!(matches!(
            Walk::generate(&params(Dimension::One).with_walkers(0)),
            Err(Error::NotPositive(_))
        ));
        assert!(matches!(
            params(Dimension::Two).with_start(vec![0.]).validate(),
            Err(Error::StartMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            params(Dimension::One).with_start(vec![f64::NAN]).validate(),
            Err(Error::NonFiniteStart(_))
        ));
        assert!(matches!(
            params(Dimension::One)
                .with_distribution(StepDistribution::Gaussian { sigma: 0. })
                .validate(),
            Err(Error::InvalidDistribution(_))
        ));
    }

    #[test]
    fn track_starts_at_start() {
        let walk = Walk::generate(&params(Dimension::Two).with_start(vec![3., -2.])).unwrap();
        let track: Vec<_> = walk.track(0).collect();
        assert_eq!(track.len(), walk.steps() + 1);
        assert_eq!(track[0].to_vec(), vec![3., -2.]);
        assert_eq!(walk.distance_from_start(0, 0), 0.);
        assert!((walk.distance_from_origin(0, 0) - 13f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn plot_point_uses_step_index_in_one_dimension() {
        let walk = Walk::generate(&params(Dimension::One)).unwrap();
        let p = walk.plot_point(3, 10);
        assert_eq!(p[0], 10.);
        assert_eq!(p[1], walk.positions()[[3, 9, 0]]);
    }

    #[test]
    fn frames_snapshot_every_walker() {
        let walk = Walk::generate(&params(Dimension::Two)).unwrap();
        let first = walk.frame(0).unwrap();
        assert_eq!(first.positions.dim(), (7, 2));
        assert!(first.positions.iter().all(|v| *v == 0.));

        let last = walk.frame(walk.steps()).unwrap();
        assert_eq!(last.positions, walk.final_positions());
        assert!(walk.frame(walk.steps() + 1).is_none());
    }

    #[test]
    fn lattice_displacement_after_one_step_is_one() {
        let walk = Walk::generate(&params(Dimension::Three)).unwrap();
        let msd = walk.mean_squared_displacement();
        assert_eq!(msd.len(), walk.steps() + 1);
        assert_eq!(msd[0], 0.);
        assert!((msd[1] - 1.).abs() < 1e-12);
        assert_eq!(walk.final_distances().len(), 7);
    }
}
