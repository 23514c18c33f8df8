//! Normalized signals that bias generation.
//!
//! A [`Modificator`] adds up weighted event counters (rooms cleared,
//! deaths, keys found, ...) into one scalar and scales it against the
//! largest value it expects to see. The generator does not care where a
//! signal comes from, only that it can read a number in `[0, 1]` through
//! [`Bias`].

use serde::{Deserialize, Serialize};

/// Source of a normalized scalar in `[0, 1]`.
pub trait Bias {
    fn normalized(&self) -> f32;
}

/// Clamp a raw bias reading into `[0, 1]`; NaN reads as 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Constant bias.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixed(pub f32);

impl Bias for Fixed {
    fn normalized(&self) -> f32 {
        clamp_unit(self.0)
    }
}

impl<F: Fn() -> f32> Bias for F {
    fn normalized(&self) -> f32 {
        clamp_unit(self())
    }
}

/// A named running total that contributes `count × weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    pub count: f32,
    pub weight: f32,
}

impl Counter {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            count: 0.0,
            weight,
        }
    }

    pub fn trigger(&mut self, amount: f32) {
        self.count += amount;
    }

    pub fn reset(&mut self) {
        self.count = 0.0;
    }

    pub fn contribution(&self) -> f32 {
        self.count * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modificator {
    pub name: String,
    pub counters: Vec<Counter>,
    pub max_expected_value: f32,
}

impl Modificator {
    pub fn new(name: impl Into<String>, max_expected_value: f32) -> Self {
        Self {
            name: name.into(),
            counters: Vec::new(),
            max_expected_value,
        }
    }

    pub fn with_counter(mut self, counter: Counter) -> Self {
        self.counters.push(counter);
        self
    }

    /// `sum(count × weight)` over every counter.
    pub fn value(&self) -> f32 {
        self.counters.iter().map(Counter::contribution).sum()
    }

    /// Add `amount` to the named counter. Returns `false` if no counter has
    /// that name.
    pub fn trigger(&mut self, counter: &str, amount: f32) -> bool {
        match self.counters.iter_mut().find(|c| c.name == counter) {
            Some(c) => {
                c.trigger(amount);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.counters.iter_mut().for_each(Counter::reset);
    }
}

impl Bias for Modificator {
    /// `clamp(value / max_expected_value, 0, 1)`, or 0 when the expected
    /// maximum is not positive.
    fn normalized(&self) -> f32 {
        if self.max_expected_value <= 0.0 {
            return 0.0;
        }
        clamp_unit(self.value() / self.max_expected_value)
    }
}

/// The three independent signals read by the generator.
pub struct Modifiers {
    /// Preferred room size (0 = smallest in the pool, 1 = largest).
    pub size: Box<dyn Bias>,
    /// Preference for growing along North/South or East/West doors.
    pub shape: Box<dyn Bias>,
    /// Pushes the target room count down (0) or up (1) by the configured variance.
    pub count: Box<dyn Bias>,
}

impl Modifiers {
    pub fn new(size: impl Bias + 'static, shape: impl Bias + 'static, count: impl Bias + 'static) -> Self {
        Self {
            size: Box::new(size),
            shape: Box::new(shape),
            count: Box::new(count),
        }
    }
}

impl Default for Modifiers {
    /// Every signal at 0.5: medium rooms and no count jitter. A shape of
    /// exactly 0.5 reads as low.
    fn default() -> Self {
        Self::new(Fixed(0.5), Fixed(0.5), Fixed(0.5))
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modifiers")
            .field("size", &self.size.normalized())
            .field("shape", &self.shape.normalized())
            .field("count", &self.count.normalized())
            .finish()
    }
}

/// Which doors the shape signal favours when it is high.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapePolarity {
    /// Above 0.5, North/South doors weigh 2 and East/West 1; below, the reverse.
    #[default]
    VerticalWhenHigh,
    /// Above 0.5, East/West doors weigh 2 and North/South 1; below, the reverse.
    HorizontalWhenHigh,
}

impl ShapePolarity {
    /// Frontier weight of a door, given whether it leads vertically.
    pub fn door_weight(self, shape: f32, vertical: bool) -> f32 {
        let high = clamp_unit(shape) > 0.5;
        let favoured = match self {
            ShapePolarity::VerticalWhenHigh => vertical == high,
            ShapePolarity::HorizontalWhenHigh => vertical != high,
        };
        if favoured {
            2.0
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deaths() -> Modificator {
        Modificator::new("difficulty", 10.0)
            .with_counter(Counter::new("deaths", 2.0))
            .with_counter(Counter::new("keys", 0.5))
    }

    #[test]
    fn test_value_is_weighted_sum() {
        let mut m = deaths();
        assert_eq!(m.value(), 0.0);
        assert!(m.trigger("deaths", 2.0));
        assert!(m.trigger("keys", 4.0));
        assert_eq!(m.value(), 6.0);
        assert!((m.normalized() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_clamps() {
        let mut m = deaths();
        m.trigger("deaths", 100.0);
        assert_eq!(m.normalized(), 1.0);
        m.reset();
        m.trigger("deaths", -3.0);
        assert_eq!(m.normalized(), 0.0);
    }

    #[test]
    fn test_unknown_counter_is_ignored() {
        let mut m = deaths();
        assert!(!m.trigger("coins", 1.0));
        assert_eq!(m.value(), 0.0);
    }

    #[test]
    fn test_non_positive_max_reads_zero() {
        let mut m = Modificator::new("broken", 0.0).with_counter(Counter::new("x", 1.0));
        m.trigger("x", 5.0);
        assert_eq!(m.normalized(), 0.0);
    }

    #[test]
    fn test_fixed_and_closure_biases() {
        assert_eq!(Fixed(1.7).normalized(), 1.0);
        assert_eq!(Fixed(f32::NAN).normalized(), 0.0);
        let reading = || 0.25;
        assert_eq!(reading.normalized(), 0.25);
    }

    #[test]
    fn test_vertical_polarity_mapping() {
        let p = ShapePolarity::VerticalWhenHigh;
        assert_eq!(p.door_weight(0.9, true), 2.0);
        assert_eq!(p.door_weight(0.9, false), 1.0);
        assert_eq!(p.door_weight(0.1, true), 1.0);
        assert_eq!(p.door_weight(0.1, false), 2.0);
        // exactly 0.5 is not "high"
        assert_eq!(p.door_weight(0.5, true), 1.0);
    }

    #[test]
    fn test_horizontal_polarity_is_inverse() {
        let v = ShapePolarity::VerticalWhenHigh;
        let h = ShapePolarity::HorizontalWhenHigh;
        for shape in [0.0, 0.3, 0.5, 0.51, 1.0] {
            for vertical in [true, false] {
                assert_ne!(v.door_weight(shape, vertical), h.door_weight(shape, vertical));
            }
        }
    }
}
