//! Durations and schedule layout
//!
//! A node's duration is either absolute (seconds) or relative (a fraction of
//! whatever its parent resolves to). Composites collect a [`Demand`] from each
//! child, solve for their own natural duration bottom-up, and lay out child
//! durations and progress ranges top-down once their own duration is known.

use std::ops::RangeInclusive;

/// Durations and ranges closer than this are considered equal
pub(crate) const EPSILON: f64 = 1e-9;

/// An animation duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Duration {
    /// Fixed length in seconds
    Absolute(f64),
    /// Fraction in `(0, 1]` of the enclosing parent's resolved duration
    Relative(f64),
}

impl Duration {
    /// Absolute duration in seconds (negative and NaN become zero)
    pub fn seconds(seconds: f64) -> Self {
        Duration::Absolute(non_negative(seconds))
    }

    /// Relative duration, clamped to `[0, 1]`
    pub fn relative(fraction: f64) -> Self {
        Duration::Relative(non_negative(fraction).min(1.0))
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Duration::Relative(_))
    }

    /// Seconds if absolute
    pub fn absolute(&self) -> Option<f64> {
        match *self {
            Duration::Absolute(seconds) => Some(seconds),
            Duration::Relative(_) => None,
        }
    }

    /// Fraction if relative
    pub fn fraction(&self) -> Option<f64> {
        match *self {
            Duration::Absolute(_) => None,
            Duration::Relative(fraction) => Some(fraction),
        }
    }

    /// Scale the duration by `k`, relative fractions stay within `[0, 1]`
    pub fn scaled(self, k: f64) -> Self {
        match self {
            Duration::Absolute(seconds) => Duration::seconds(seconds * k),
            Duration::Relative(fraction) => Duration::relative(fraction * k),
        }
    }

    /// Seconds this duration takes inside a parent lasting `parent` seconds
    pub fn resolve(&self, parent: f64) -> f64 {
        match *self {
            Duration::Absolute(seconds) => non_negative(seconds),
            Duration::Relative(fraction) => non_negative(fraction).min(1.0) * non_negative(parent),
        }
    }
}

impl From<std::time::Duration> for Duration {
    fn from(duration: std::time::Duration) -> Self {
        Duration::seconds(duration.as_secs_f64())
    }
}

/// What a child asks of its parent's timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Demand {
    /// Known length in seconds
    Fixed(f64),
    /// Fraction of the parent's duration
    Share(f64),
    /// Nothing known, takes whatever is left
    Flexible,
}

impl Demand {
    /// Demand of a node from its declared duration, falling back to its natural one
    pub fn new(declared: Option<Duration>, natural: Option<f64>) -> Self {
        match declared {
            Some(Duration::Absolute(seconds)) => Demand::Fixed(non_negative(seconds)),
            Some(Duration::Relative(fraction)) => Demand::Share(non_negative(fraction).min(1.0)),
            None => natural.map_or(Demand::Flexible, |seconds| {
                Demand::Fixed(non_negative(seconds))
            }),
        }
    }
}

struct Totals {
    fixed: f64,
    shares: f64,
    open: usize,
}

fn totals(demands: &[Demand]) -> Totals {
    demands.iter().fold(
        Totals {
            fixed: 0.0,
            shares: 0.0,
            open: 0,
        },
        |mut acc, demand| {
            match *demand {
                Demand::Fixed(seconds) => acc.fixed += seconds,
                Demand::Share(fraction) => {
                    acc.shares += fraction;
                    acc.open += 1;
                }
                Demand::Flexible => acc.open += 1,
            }
            acc
        },
    )
}

/// Minimal duration fitting children played one after another.
///
/// Relative children describe a share of the whole, so the whole is solved
/// for: `fixed / (1 - shares)`. Returns `None` when there is nothing
/// absolute to anchor relative or flexible children to.
pub fn sequential_natural(demands: &[Demand]) -> Option<f64> {
    let totals = totals(demands);
    if totals.open == 0 {
        return Some(totals.fixed);
    }
    if totals.fixed <= EPSILON {
        return None;
    }
    if totals.shares >= 1.0 - EPSILON {
        // Shares leave no room for the fixed children. Double the fixed
        // total and let the layout rescale everything proportionally, which
        // leaves the fixed children a third of the sequence.
        tracing::warn!(
            shares = totals.shares,
            fixed = totals.fixed,
            "relative durations claim the whole sequence, rescaling"
        );
        return Some(totals.fixed * 2.0);
    }
    Some(totals.fixed / (1.0 - totals.shares))
}

/// Child durations for a sequence lasting `total` seconds
pub fn sequential_layout(total: f64, demands: &[Demand]) -> Vec<f64> {
    let total = non_negative(total);
    if demands.is_empty() {
        return Vec::new();
    }

    let totals = totals(demands);
    let rel_k = if totals.shares > 1.0 {
        1.0 / totals.shares
    } else {
        1.0
    };

    let mut durations: Vec<f64> = demands
        .iter()
        .map(|demand| match *demand {
            Demand::Fixed(seconds) => seconds,
            Demand::Share(fraction) => fraction * rel_k * total,
            Demand::Flexible => 0.0,
        })
        .collect();

    let claimed: f64 = durations.iter().sum();
    let flexible = demands
        .iter()
        .filter(|d| matches!(d, Demand::Flexible))
        .count();

    if flexible > 0 && claimed <= total + EPSILON {
        let each = (total - claimed).max(0.0) / flexible as f64;
        for (duration, demand) in durations.iter_mut().zip(demands) {
            if matches!(demand, Demand::Flexible) {
                *duration = each;
            }
        }
    } else if claimed > EPSILON {
        let k = total / claimed;
        if (k - 1.0).abs() > EPSILON {
            tracing::debug!(claimed, total, "rescaling sequence children to fit");
        }
        for duration in &mut durations {
            *duration *= k;
        }
    } else {
        let each = total / durations.len() as f64;
        durations.iter_mut().for_each(|d| *d = each);
    }

    durations
}

/// Progress range of each child of a sequence.
///
/// Ranges partition `[0, 1]`: the first starts at 0, each ends where the
/// next begins, the last ends at 1.
pub fn sequential_ranges(durations: &[f64]) -> Vec<RangeInclusive<f64>> {
    let count = durations.len();
    let total: f64 = durations.iter().sum();
    let mut ranges = Vec::with_capacity(count);
    let mut elapsed = 0.0;
    let mut lower = 0.0;

    for (i, duration) in durations.iter().enumerate() {
        elapsed += duration;
        let upper = if i + 1 == count {
            1.0
        } else if total > EPSILON {
            (elapsed / total).clamp(lower, 1.0)
        } else {
            (i + 1) as f64 / count as f64
        };
        ranges.push(lower..=upper);
        lower = upper;
    }
    ranges
}

/// Minimal duration fitting children played together: the longest fixed child
pub fn parallel_natural(demands: &[Demand]) -> Option<f64> {
    if demands.is_empty() {
        return Some(0.0);
    }
    demands
        .iter()
        .filter_map(|demand| match *demand {
            Demand::Fixed(seconds) => Some(seconds),
            _ => None,
        })
        .reduce(f64::max)
}

/// Child durations for a parallel group lasting `total` seconds
pub fn parallel_layout(total: f64, demands: &[Demand]) -> Vec<f64> {
    let total = non_negative(total);
    let longest = demands
        .iter()
        .filter_map(|demand| match *demand {
            Demand::Fixed(seconds) => Some(seconds),
            _ => None,
        })
        .fold(0.0, f64::max);
    let k = if longest > total + EPSILON {
        tracing::debug!(longest, total, "rescaling parallel children to fit");
        total / longest
    } else {
        1.0
    };

    demands
        .iter()
        .map(|demand| match *demand {
            Demand::Fixed(seconds) => seconds * k,
            Demand::Share(fraction) => fraction.min(1.0) * total,
            Demand::Flexible => total,
        })
        .collect()
}

/// Progress range of each child of a parallel group, all anchored at 0
pub fn parallel_ranges(total: f64, durations: &[f64]) -> Vec<RangeInclusive<f64>> {
    durations
        .iter()
        .map(|duration| {
            if total > EPSILON {
                0.0..=(duration / total).clamp(0.0, 1.0)
            } else {
                0.0..=1.0
            }
        })
        .collect()
}

pub(crate) fn non_negative(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else if v == f64::INFINITY {
        f64::MAX
    } else {
        0.0
    }
}
