//! Histogram and distribution fits drawn over the final state of a walk.
//!
//! One dimensional walks are summarised by the signed final position, which
//! tends to a normal distribution. In two and three dimensions the final
//! distance from the start is used instead; with independent axes of
//! variance σ² it follows a chi distribution with `d` degrees of freedom
//! scaled by σ.

use std::f64::consts::{PI, SQRT_2};

use crate::layout::Interval;
use crate::walk::{Dimension, Walk};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub range: Interval,
    pub count: usize,
    /// `count / (total * width)`, so the bars integrate to one.
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: Vec<Bin>,
    total: usize,
}

impl Histogram {
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(Error::EmptyHistogram);
        }
        let span = Interval::spanning(values.iter().copied()).ok_or(Error::EmptyHistogram)?;
        // a single distinct value still gets a bar of unit width
        let span = if span.size() == 0. {
            span.padded(0.5)
        } else {
            span
        };

        let width = span.size() / bins as f64;
        let mut counts = vec![0usize; bins];
        for &value in values {
            let index = (((value - span.min) / width) as usize).min(bins - 1);
            counts[index] += 1;
        }

        let total = values.len();
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                range: Interval {
                    min: span.min + i as f64 * width,
                    max: span.min + (i + 1) as f64 * width,
                },
                count,
                density: count as f64 / (total as f64 * width),
            })
            .collect();

        Ok(Self { bins, total })
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn span(&self) -> Interval {
        Interval {
            min: self.bins[0].range.min,
            max: self.bins[self.bins.len() - 1].range.max,
        }
    }

    pub fn max_density(&self) -> f64 {
        self.bins.iter().map(|b| b.density).fold(0., f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalFit {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalFit {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }

    pub fn pdf(&self, x: f64) -> f64 {
        if self.std_dev == 0. {
            return 0.;
        }
        let z = (x - self.mean) / self.std_dev;
        (-0.5 * z * z).exp() / (self.std_dev * (2. * PI).sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiFit {
    pub degrees: usize,
    pub sigma: f64,
}

impl ChiFit {
    /// Maximum likelihood σ for distances from a `degrees`-dimensional
    /// isotropic normal: σ² = mean(r²) / degrees.
    pub fn from_distances(distances: &[f64], degrees: usize) -> Option<Self> {
        if distances.is_empty() || degrees == 0 {
            return None;
        }
        let mean_square = distances.iter().map(|r| r * r).sum::<f64>() / distances.len() as f64;
        Some(Self {
            degrees,
            sigma: (mean_square / degrees as f64).sqrt(),
        })
    }

    pub fn pdf(&self, r: f64) -> f64 {
        if r < 0. || self.sigma == 0. {
            return 0.;
        }
        let s = self.sigma;
        let gauss = (-r * r / (2. * s * s)).exp();
        match self.degrees {
            1 => SQRT_2 / (PI.sqrt() * s) * gauss,
            2 => r / (s * s) * gauss,
            3 => SQRT_2 / PI.sqrt() * r * r / (s * s * s) * gauss,
            // Γ(k/2) by the half-integer recurrence
            k => {
                let half = k as f64 / 2.;
                let gamma = gamma_half_integer(k);
                r.powi(k as i32 - 1) * gauss / (2f64.powf(half - 1.) * gamma * s.powi(k as i32))
            }
        }
    }
}

fn gamma_half_integer(k: usize) -> f64 {
    let (mut x, mut gamma) = if k % 2 == 0 { (1., 1.) } else { (0.5, PI.sqrt()) };
    while x < k as f64 / 2. {
        gamma *= x;
        x += 1.;
    }
    gamma
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fit {
    Normal(NormalFit),
    Chi(ChiFit),
}

impl Fit {
    pub fn pdf(&self, x: f64) -> f64 {
        match self {
            Fit::Normal(fit) => fit.pdf(x),
            Fit::Chi(fit) => fit.pdf(x),
        }
    }
}

/// The values a walk's histogram is built from, with the matching fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalDistribution {
    pub label: &'static str,
    pub values: Vec<f64>,
    pub fit: Option<Fit>,
}

impl FinalDistribution {
    pub fn of_walk(walk: &Walk) -> Self {
        match walk.dimension() {
            Dimension::One => {
                let values: Vec<f64> = walk.final_positions().column(0).to_vec();
                let fit = NormalFit::from_samples(&values).map(Fit::Normal);
                Self {
                    label: "Final position",
                    values,
                    fit,
                }
            }
            dimension => {
                let values = walk.final_distances();
                let fit = ChiFit::from_distances(&values, dimension.get()).map(Fit::Chi);
                Self {
                    label: "Distance from start",
                    values,
                    fit,
                }
            }
        }
    }

    pub fn histogram(&self, bins: usize) -> Result<Histogram> {
        Histogram::from_values(&self.values, bins)
    }
}
