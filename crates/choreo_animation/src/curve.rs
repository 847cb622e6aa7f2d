//! Cubic bezier easing curves
//!
//! Curves follow the CSS `cubic-bezier()` model: endpoints fixed at `(0, 0)`
//! and `(1, 1)`, two free control points. Besides plain evaluation a curve
//! can be split along its time axis, which is how a composite hands each
//! child the piece of its easing that falls inside the child's slot.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::CurveParseError;

/// Extents smaller than this are treated as empty
const EPSILON: f64 = 1e-9;

/// Default step of the coarse parametric search used by [`Curve::split`]
pub const DEFAULT_SPLIT_STEP: f64 = 0.02;

/// A cubic bezier easing curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// One piece of a split curve
#[derive(Clone, Debug, PartialEq)]
pub struct CurveSlice {
    /// The piece renormalized to the unit square
    pub curve: Curve,
    /// Vertical (progress) extent the piece covers in the original curve
    pub progress: RangeInclusive<f64>,
    /// Fraction of the original horizontal (time) extent the piece consumes
    pub share: f64,
}

impl CurveSlice {
    /// Map a local time value of the piece back to the original curve's progress
    pub fn sample(&self, local: f64) -> f64 {
        let (lo, hi) = (*self.progress.start(), *self.progress.end());
        lo + (hi - lo) * self.curve.evaluate(local)
    }
}

type Point = (f64, f64);

impl Curve {
    pub const LINEAR: Curve = Curve::new(0.0, 0.0, 1.0, 1.0);
    pub const EASE: Curve = Curve::new(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: Curve = Curve::new(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: Curve = Curve::new(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: Curve = Curve::new(0.42, 0.0, 0.58, 1.0);

    /// Create a curve from its two control points
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Both control points on the diagonal make the curve the identity
    pub fn is_linear(&self) -> bool {
        (self.x1 - self.y1).abs() < EPSILON && (self.x2 - self.y2).abs() < EPSILON
    }

    /// Evaluate eased progress for a time value in `[0, 1]`
    pub fn evaluate(&self, x: f64) -> f64 {
        // Endpoints are always exact
        if x.is_nan() || x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        if self.is_linear() {
            return x;
        }
        bezier_sample(self.solve_x(x), self.y1, self.y2)
    }

    /// Point on the curve at parameter `t`
    #[cfg(test)]
    fn point(&self, t: f64) -> Point {
        (
            bezier_sample(t, self.x1, self.x2),
            bezier_sample(t, self.y1, self.y2),
        )
    }

    /// Solve for the parameter `t` where `x(t) == x`.
    ///
    /// Newton-Raphson first, binary search when the slope gets too flat.
    fn solve_x(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..8 {
            let err = bezier_sample(t, self.x1, self.x2) - x;
            if err.abs() < 1e-9 {
                return t;
            }
            let slope = bezier_slope(t, self.x1, self.x2);
            if slope.abs() < 1e-9 {
                break;
            }
            t = (t - err / slope).clamp(0.0, 1.0);
        }

        let mut lo = 0.0_f64;
        let mut hi = 1.0_f64;
        t = x;
        for _ in 0..40 {
            let value = bezier_sample(t, self.x1, self.x2);
            if (value - x).abs() < 1e-9 {
                break;
            }
            if value < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }

    /// Coarse forward search for the parameter whose x equals `x`.
    ///
    /// Walks `t` in fixed steps and interpolates linearly inside the
    /// bracketing step. This is an approximation, not a root solve: with the
    /// default step the error stays well under 2%.
    fn search_x(&self, x: f64, step: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let step = if step.is_finite() {
            step.clamp(1e-4, 0.5)
        } else {
            DEFAULT_SPLIT_STEP
        };

        let (mut prev_t, mut prev_x) = (0.0, 0.0);
        let mut t = step;
        while t < 1.0 {
            let cx = bezier_sample(t, self.x1, self.x2);
            if cx >= x {
                return interpolate(prev_t, prev_x, t, cx, x);
            }
            prev_t = t;
            prev_x = cx;
            t += step;
        }
        interpolate(prev_t, prev_x, 1.0, 1.0, x)
    }

    /// The part of the curve between parameters `t0 <= t1` (De Casteljau)
    fn segment(&self, t0: f64, t1: f64) -> [Point; 4] {
        let points = [(0.0, 0.0), (self.x1, self.y1), (self.x2, self.y2), (1.0, 1.0)];
        let (_, right) = subdivide(points, t0);
        let u = if 1.0 - t0 < EPSILON {
            1.0
        } else {
            (t1 - t0) / (1.0 - t0)
        };
        subdivide(right, u).0
    }

    /// Split the curve at a sub-range of its time axis.
    ///
    /// The returned piece reproduces the shape of the curve restricted to
    /// `range`, renormalized to `[0, 1]` on both axes. `step` controls the
    /// coarse parametric search (see [`DEFAULT_SPLIT_STEP`]).
    pub fn split(&self, range: RangeInclusive<f64>, step: f64) -> CurveSlice {
        let a = clamp_unit(*range.start());
        let b = clamp_unit(*range.end()).max(a);

        if a <= 0.0 && b >= 1.0 {
            return CurveSlice {
                curve: *self,
                progress: 0.0..=1.0,
                share: 1.0,
            };
        }
        if b - a < EPSILON {
            let y = self.evaluate(a);
            return CurveSlice {
                curve: Curve::LINEAR,
                progress: y..=y,
                share: 0.0,
            };
        }

        let ta = self.search_x(a, step);
        let tb = self.search_x(b, step).max(ta);
        let [p0, p1, p2, p3] = self.segment(ta, tb);
        let dx = p3.0 - p0.0;
        let dy = p3.1 - p0.1;

        let curve = if dx.abs() < EPSILON || dy.abs() < EPSILON {
            Curve::LINEAR
        } else {
            Curve::new(
                (p1.0 - p0.0) / dx,
                (p1.1 - p0.1) / dy,
                (p2.0 - p0.0) / dx,
                (p2.1 - p0.1) / dy,
            )
        };

        CurveSlice {
            curve,
            progress: p0.1..=p3.1,
            share: b - a,
        }
    }

    /// Blend two curves' control points, `k = 0` gives `a`, `k = 1` gives `b`
    pub fn between(a: &Curve, b: &Curve, k: f64) -> Curve {
        let mix = |from: f64, to: f64| from + (to - from) * k;
        Curve::new(
            mix(a.x1, b.x1),
            mix(a.y1, b.y1),
            mix(a.x2, b.x2),
            mix(a.y2, b.y2),
        )
    }

    /// The same curve traversed backwards: `r(x) = 1 - c(1 - x)`
    pub fn reversed(&self) -> Curve {
        Curve::new(1.0 - self.x2, 1.0 - self.y2, 1.0 - self.x1, 1.0 - self.y1)
    }

    /// Effective curve of a node from the slice it inherits and its own curve
    pub fn compose(inherited: Option<Curve>, own: Option<Curve>) -> Option<Curve> {
        match (inherited, own) {
            (Some(inherited), Some(own)) => Some(Curve::between(&inherited, &own, 0.5)),
            (inherited, own) => inherited.or(own),
        }
    }

    fn name(&self) -> Option<&'static str> {
        match *self {
            c if c == Curve::LINEAR => Some("linear"),
            c if c == Curve::EASE => Some("ease"),
            c if c == Curve::EASE_IN => Some("ease-in"),
            c if c == Curve::EASE_OUT => Some("ease-out"),
            c if c == Curve::EASE_IN_OUT => Some("ease-in-out"),
            _ => None,
        }
    }
}

impl Default for Curve {
    fn default() -> Self {
        Curve::LINEAR
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(
                f,
                "cubic-bezier({}, {}, {}, {})",
                self.x1, self.y1, self.x2, self.y2
            ),
        }
    }
}

impl FromStr for Curve {
    type Err = CurveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "linear" => return Ok(Curve::LINEAR),
            "ease" => return Ok(Curve::EASE),
            "ease-in" => return Ok(Curve::EASE_IN),
            "ease-out" => return Ok(Curve::EASE_OUT),
            "ease-in-out" => return Ok(Curve::EASE_IN_OUT),
            _ => {}
        }

        let args = s
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| CurveParseError::UnknownName(s.to_string()))?;

        let values = args
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| CurveParseError::Number(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let &[x1, y1, x2, y2] = values.as_slice() else {
            return Err(CurveParseError::Arity(values.len()));
        };
        for x in [x1, x2] {
            if !(0.0..=1.0).contains(&x) {
                return Err(CurveParseError::OutOfRange(x));
            }
        }
        Ok(Curve::new(x1, y1, x2, y2))
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn interpolate(t0: f64, x0: f64, t1: f64, x1: f64, x: f64) -> f64 {
    if (x1 - x0).abs() < EPSILON {
        t1
    } else {
        t0 + (t1 - t0) * (x - x0) / (x1 - x0)
    }
}

fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

fn subdivide(p: [Point; 4], t: f64) -> ([Point; 4], [Point; 4]) {
    let p01 = lerp_point(p[0], p[1], t);
    let p12 = lerp_point(p[1], p[2], t);
    let p23 = lerp_point(p[2], p[3], t);
    let p012 = lerp_point(p01, p12, t);
    let p123 = lerp_point(p12, p23, t);
    let mid = lerp_point(p012, p123, t);
    ([p[0], p01, p012, mid], [mid, p123, p23, p[3]])
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    // Horner form: ((1-3p2+3p1)t + 3p2-6p1)t + 3p1) * t
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: [Curve; 5] = [
        Curve::LINEAR,
        Curve::EASE,
        Curve::EASE_IN,
        Curve::EASE_OUT,
        Curve::EASE_IN_OUT,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for curve in PRESETS {
            assert_eq!(curve.evaluate(0.0), 0.0);
            assert_eq!(curve.evaluate(1.0), 1.0);
            assert_eq!(curve.evaluate(-3.0), 0.0);
            assert_eq!(curve.evaluate(7.0), 1.0);
        }
    }

    #[test]
    fn test_linear_is_identity() {
        for x in [0.1, 0.25, 0.5, 0.9] {
            assert!((Curve::LINEAR.evaluate(x) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let curve = Curve::EASE_IN_OUT;
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        for x in [0.1, 0.2, 0.3, 0.4] {
            let sum = curve.evaluate(x) + curve.evaluate(1.0 - x);
            assert!((sum - 1.0).abs() < 1e-6, "x = {x}");
        }
    }

    #[test]
    fn test_point_matches_evaluate() {
        let curve = Curve::EASE;
        for t in [0.1, 0.4, 0.8] {
            let (x, y) = curve.point(t);
            assert!((curve.evaluate(x) - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_split_full_range_returns_original() {
        let slice = Curve::EASE_IN.split(0.0..=1.0, DEFAULT_SPLIT_STEP);
        assert_eq!(slice.curve, Curve::EASE_IN);
        assert_eq!(slice.progress, 0.0..=1.0);
        assert_eq!(slice.share, 1.0);
    }

    #[test]
    fn test_split_zero_width_is_linear() {
        let slice = Curve::EASE_OUT.split(0.4..=0.4, DEFAULT_SPLIT_STEP);
        assert_eq!(slice.curve, Curve::LINEAR);
        assert_eq!(slice.share, 0.0);
        let y = Curve::EASE_OUT.evaluate(0.4);
        assert!((slice.progress.start() - y).abs() < 1e-9);
    }

    #[test]
    fn test_split_reports_share() {
        let slice = Curve::EASE.split(0.2..=0.7, DEFAULT_SPLIT_STEP);
        assert!((slice.share - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_split_pieces_reconstruct_curve() {
        let partitions: [&[f64]; 3] = [
            &[0.0, 0.5, 1.0],
            &[0.0, 0.2, 0.45, 0.8, 1.0],
            &[0.0, 0.1, 0.3, 0.6, 0.65, 1.0],
        ];
        for curve in PRESETS {
            for bounds in partitions {
                for window in bounds.windows(2) {
                    let (a, b) = (window[0], window[1]);
                    let slice = curve.split(a..=b, DEFAULT_SPLIT_STEP);
                    for i in 0..=20 {
                        let local = i as f64 / 20.0;
                        let x = a + (b - a) * local;
                        let err = (slice.sample(local) - curve.evaluate(x)).abs();
                        assert!(err < 0.02, "{curve} [{a}, {b}] at {local}: err {err}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_split_of_linear_stays_linear() {
        let slice = Curve::LINEAR.split(0.3..=0.6, DEFAULT_SPLIT_STEP);
        for x in [0.0, 0.25, 0.5, 1.0] {
            assert!((slice.curve.evaluate(x) - x).abs() < 1e-3);
        }
    }

    #[test]
    fn test_between_blends_control_points() {
        let a = Curve::EASE_IN;
        let b = Curve::EASE_OUT;
        assert_eq!(Curve::between(&a, &b, 0.0), a);
        assert_eq!(Curve::between(&a, &b, 1.0), b);
        let mid = Curve::between(&a, &b, 0.5);
        assert!((mid.x1 - 0.21).abs() < 1e-12);
        assert!((mid.x2 - 0.79).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_reflects_curve() {
        let curve = Curve::EASE;
        let reversed = curve.reversed();
        let twice = reversed.reversed();
        assert!((twice.y1 - curve.y1).abs() < 1e-12);
        assert!((twice.x2 - curve.x2).abs() < 1e-12);
        for x in [0.1, 0.35, 0.6, 0.9] {
            let expected = 1.0 - curve.evaluate(1.0 - x);
            assert!((reversed.evaluate(x) - expected).abs() < 1e-6);
        }
        let mirrored = Curve::EASE_IN.reversed();
        assert!((mirrored.x1 - Curve::EASE_OUT.x1).abs() < 1e-12);
        assert!((mirrored.x2 - Curve::EASE_OUT.x2).abs() < 1e-12);
    }

    #[test]
    fn test_compose_prefers_blend() {
        assert_eq!(Curve::compose(None, None), None);
        assert_eq!(Curve::compose(Some(Curve::EASE), None), Some(Curve::EASE));
        assert_eq!(Curve::compose(None, Some(Curve::EASE)), Some(Curve::EASE));
        assert_eq!(
            Curve::compose(Some(Curve::EASE_IN), Some(Curve::EASE_OUT)),
            Some(Curve::between(&Curve::EASE_IN, &Curve::EASE_OUT, 0.5))
        );
    }

    #[test]
    fn test_parse_names_and_bezier() {
        assert_eq!("ease-in-out".parse::<Curve>(), Ok(Curve::EASE_IN_OUT));
        assert_eq!(
            "cubic-bezier(0.1, 0.7, 1.0, 0.1)".parse::<Curve>(),
            Ok(Curve::new(0.1, 0.7, 1.0, 0.1))
        );
        assert_eq!(
            "bouncy".parse::<Curve>(),
            Err(CurveParseError::UnknownName("bouncy".into()))
        );
        assert_eq!(
            "cubic-bezier(0.1, 0.2)".parse::<Curve>(),
            Err(CurveParseError::Arity(2))
        );
        assert_eq!(
            "cubic-bezier(1.5, 0, 0, 1)".parse::<Curve>(),
            Err(CurveParseError::OutOfRange(1.5))
        );
        assert_eq!(
            "cubic-bezier(a, 0, 0, 1)".parse::<Curve>(),
            Err(CurveParseError::Number("a".into()))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for curve in [Curve::EASE_OUT, Curve::new(0.3, -0.2, 0.6, 1.4)] {
            assert_eq!(curve.to_string().parse::<Curve>(), Ok(curve));
        }
    }
}
