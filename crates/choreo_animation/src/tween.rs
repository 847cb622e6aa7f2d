//! Linear interpolation of animatable values

/// A value that can be interpolated between two states
pub trait Tweenable: Clone {
    /// Interpolate towards `to`, `t = 0` yields `self` and `t = 1` yields `to`
    fn lerp(&self, to: &Self, t: f64) -> Self;
}

/// Interpolate between `a` and `b`
pub fn lerp<T: Tweenable>(a: &T, b: &T, t: f64) -> T {
    a.lerp(b, t)
}

impl Tweenable for f64 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Tweenable for f32 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t as f32
    }
}

impl<A: Tweenable, B: Tweenable> Tweenable for (A, B) {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        (self.0.lerp(&to.0, t), self.1.lerp(&to.1, t))
    }
}

impl<A: Tweenable, B: Tweenable, C: Tweenable> Tweenable for (A, B, C) {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        (
            self.0.lerp(&to.0, t),
            self.1.lerp(&to.1, t),
            self.2.lerp(&to.2, t),
        )
    }
}

impl<T: Tweenable, const N: usize> Tweenable for [T; N] {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        std::array::from_fn(|i| self[i].lerp(&to[i], t))
    }
}

/// A missing side holds the value of the present one
impl<T: Tweenable> Tweenable for Option<T> {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        }
    }
}
