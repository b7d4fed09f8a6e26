//! Random benchmark instances.
//!
//! A fixed grid over item-type count, mean demand and width
//! distribution, producing files in the same plain-text format
//! [`Instance::from_path`](crate::Instance::from_path) reads. Demands
//! are drawn as random proportions of the total demand `T = m * d_bar`,
//! floored to integers, with zero entries bumped to one and the last
//! item absorbing the remainder.

use std::fs;
use std::path::{Path, PathBuf};

use itertools::iproduct;
use rand::Rng;

use crate::error::Result;
use crate::instance::Instance;

/// Roll capacity shared by every generated instance.
pub const CAPACITY: f64 = 10_000.0;

/// Grid of item-type counts.
pub const SIZES: [usize; 5] = [10, 20, 30, 40, 50];

/// Grid of mean demands per item type.
pub const DEMAND_MEANS: [u64; 5] = [10, 20, 30, 40, 50];

/// Width distribution selector: widths are uniform on `1..=max_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthDistribution {
    Quarter,
    Half,
    ThreeQuarter,
    Full,
}

impl WidthDistribution {
    pub const ALL: [WidthDistribution; 4] = [
        WidthDistribution::Quarter,
        WidthDistribution::Half,
        WidthDistribution::ThreeQuarter,
        WidthDistribution::Full,
    ];

    #[must_use]
    pub fn max_width(self) -> u64 {
        match self {
            WidthDistribution::Quarter => 2_500,
            WidthDistribution::Half => 5_000,
            WidthDistribution::ThreeQuarter => 7_500,
            WidthDistribution::Full => 10_000,
        }
    }

    /// Numeric tag used in generated file names.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            WidthDistribution::Quarter => 1,
            WidthDistribution::Half => 2,
            WidthDistribution::ThreeQuarter => 3,
            WidthDistribution::Full => 4,
        }
    }
}

/// Generate one instance for a grid point.
pub fn generate(
    size: usize,
    demand_mean: u64,
    dist: WidthDistribution,
    rng: &mut impl Rng,
) -> Instance {
    let total = (size as u64) * demand_mean;

    let widths: Vec<f64> = (0..size)
        .map(|_| rng.gen_range(1..=dist.max_width()) as f64)
        .collect();

    let proportions: Vec<u64> = (0..size).map(|_| rng.gen_range(0..=total)).collect();
    let weight: u64 = proportions.iter().sum::<u64>().max(1);

    let mut demands: Vec<f64> = proportions[..size - 1]
        .iter()
        .map(|&r| {
            let d = ((r as f64 / weight as f64) * total as f64).floor();
            if d == 0.0 {
                1.0
            } else {
                d
            }
        })
        .collect();
    // the remainder keeps the total at T; the zero bumps can push the
    // partial sum past it, in which case the last demand is clamped
    let assigned: f64 = demands.iter().sum();
    demands.push((total as f64 - assigned).max(0.0));

    Instance {
        name: format!(
            "Instance_size_{size}_d_{demand_mean}_type_{}",
            dist.code()
        ),
        capacity: CAPACITY,
        widths,
        demands,
    }
}

/// The full benchmark grid: every combination of size, mean demand and
/// width distribution, 100 instances in total.
pub fn generate_grid(rng: &mut impl Rng) -> Vec<Instance> {
    iproduct!(SIZES, DEMAND_MEANS, WidthDistribution::ALL)
        .map(|(size, demand_mean, dist)| generate(size, demand_mean, dist, rng))
        .collect()
}

/// Write an instance in the input format: capacity line, then one
/// `width<TAB>demand` line per item. Returns the file path.
pub fn write_instance(instance: &Instance, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.txt", instance.name));
    let mut text = format!("{}", instance.capacity);
    for (w, d) in instance.widths.iter().zip(&instance.demands) {
        text.push_str(&format!("\n{w}\t{d}"));
    }
    fs::write(&path, text)?;
    Ok(path)
}
