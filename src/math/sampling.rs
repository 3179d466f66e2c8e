//! Operator parameter ranges
//!
//! Ranges are fixed when a pipeline is built; a fresh value is drawn from
//! them every time an operator runs.

use crate::io::error::{Result, invalid_parameter};
use crate::math::probability::try_probability;
use rand::Rng;
use rand::distr::uniform::SampleUniform;

/// A non-empty set of values picked uniformly at random
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<T> {
    head: T,
    tail: Vec<T>,
}

impl<T: Copy + std::fmt::Debug> Choice<T> {
    /// Build a choice over `values`
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty
    pub fn new(values: &[T]) -> Result<Self> {
        let (head, tail) = values.split_first().ok_or_else(|| {
            invalid_parameter("choice", &"[]", &"at least one value is required")
        })?;
        Ok(Self {
            head: *head,
            tail: tail.to_vec(),
        })
    }

    /// A choice over `first` and every entry of `rest`
    pub fn of(first: T, rest: &[T]) -> Self {
        Self {
            head: first,
            tail: rest.to_vec(),
        }
    }

    /// A choice with exactly one outcome
    pub const fn single(value: T) -> Self {
        Self {
            head: value,
            tail: Vec::new(),
        }
    }

    /// Number of distinct entries
    pub const fn len(&self) -> usize {
        self.tail.len() + 1
    }

    /// Always false, a choice holds at least one value
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Pick one entry uniformly
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        let index = rng.random_range(0..self.len());
        index
            .checked_sub(1)
            .and_then(|i| self.tail.get(i))
            .copied()
            .unwrap_or(self.head)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Repr<T> {
    Fixed(T),
    Uniform(T, T),
    Discrete(Choice<T>),
}

/// A numeric operator parameter: a constant, a closed interval or a discrete set
#[derive(Debug, Clone, PartialEq)]
pub struct Param<T>(Repr<T>);

impl<T> Param<T>
where
    T: SampleUniform + PartialOrd + Copy + std::fmt::Debug,
{
    /// Always yield `value`
    pub const fn fixed(value: T) -> Self {
        Self(Repr::Fixed(value))
    }

    /// Sample uniformly from the closed interval spanned by `a` and `b`
    pub fn uniform(a: T, b: T) -> Self {
        if a <= b {
            Self(Repr::Uniform(a, b))
        } else {
            Self(Repr::Uniform(b, a))
        }
    }

    /// Sample uniformly from a discrete set
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty
    pub fn choice(values: &[T]) -> Result<Self> {
        Ok(Self(Repr::Discrete(Choice::new(values)?)))
    }

    /// Draw one value
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        match &self.0 {
            Repr::Fixed(v) => *v,
            Repr::Uniform(lo, hi) => rng.random_range(*lo..=*hi),
            Repr::Discrete(choice) => choice.sample(rng),
        }
    }

    /// Draw one value per RGB channel, or one shared value, as `per_channel` decides
    pub fn sample_channels<R: Rng + ?Sized>(&self, per_channel: PerChannel, rng: &mut R) -> [T; 3] {
        if per_channel.resolve(rng) {
            [self.sample(rng), self.sample(rng), self.sample(rng)]
        } else {
            let value = self.sample(rng);
            [value; 3]
        }
    }
}

/// Probability that an operator samples its parameter separately for each channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerChannel(f64);

impl PerChannel {
    /// Never sample per channel
    pub const NEVER: Self = Self(0.0);
    /// Always sample per channel
    pub const ALWAYS: Self = Self(1.0);

    /// Build from a probability in `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns an error if `p` is not a probability
    pub fn new(p: f64) -> Result<Self> {
        Ok(Self(try_probability("per_channel", p)?))
    }

    /// The configured probability
    pub const fn probability(self) -> f64 {
        self.0
    }

    /// Decide for one invocation whether channels are sampled independently
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        rng.random_bool(self.0)
    }
}
