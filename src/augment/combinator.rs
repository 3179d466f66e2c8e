//! Randomized composition of operators
//!
//! A pipeline is a tree of [`Augmenter`] nodes. Leaves wrap an [`Operator`],
//! inner nodes decide per invocation which children run and in which order.

use crate::augment::Operator;
use crate::augment::blend::NoiseMask;
use crate::io::error::{Result, invalid_parameter};
use crate::math::probability::try_probability;
use crate::math::raster::blend;
use image::RgbImage;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom, index};

/// One node of an augmentation tree
#[derive(Debug)]
pub enum Augmenter {
    /// Apply the operator unconditionally
    Always(Box<dyn Operator>),

    /// Apply `inner` with probability `p`, otherwise pass the image through
    WithProbability {
        /// Probability of running `inner`
        p: f64,
        /// The gated subtree
        inner: Box<Augmenter>,
    },

    /// Apply exactly one uniformly chosen child
    OneOf(Vec<Augmenter>),

    /// Apply a random subset of `min..=max` children
    SomeOf {
        /// Smallest subset size
        min: usize,
        /// Largest subset size, clamped to the number of children
        max: usize,
        /// Candidate subtrees
        children: Vec<Augmenter>,
        /// Shuffle the chosen subset instead of keeping declaration order
        random_order: bool,
    },

    /// Apply every child in turn
    Sequence {
        /// Subtrees to run
        children: Vec<Augmenter>,
        /// Shuffle the children on each invocation
        random_order: bool,
    },

    /// Blend two branches through a freshly sampled noise mask
    ///
    /// Where the mask is 1 the foreground result shows, where it is 0 the
    /// background result (or the untouched input when there is no
    /// background branch) shows.
    NoiseAlpha {
        /// Source of the per-pixel blend weights
        mask: NoiseMask,
        /// Branch shown where the mask is high
        foreground: Box<Augmenter>,
        /// Branch shown where the mask is low
        background: Option<Box<Augmenter>>,
    },
}

impl Augmenter {
    /// Wrap an operator as an unconditional leaf
    pub fn always(operator: impl Operator + 'static) -> Self {
        Self::Always(Box::new(operator))
    }

    /// Gate `inner` behind probability `p`
    ///
    /// # Errors
    ///
    /// Returns an error if `p` is not in `[0, 1]`
    pub fn with_probability(p: f64, inner: Self) -> Result<Self> {
        Ok(Self::WithProbability {
            p: try_probability("p", p)?,
            inner: Box::new(inner),
        })
    }

    /// Shorthand for a 50% gate
    pub fn sometimes(inner: Self) -> Self {
        Self::WithProbability {
            p: 0.5,
            inner: Box::new(inner),
        }
    }

    /// Pick one child per invocation
    pub const fn one_of(children: Vec<Self>) -> Self {
        Self::OneOf(children)
    }

    /// Pick between `min` and `max` children per invocation
    ///
    /// # Errors
    ///
    /// Returns an error if `min` exceeds `max`
    pub fn some_of(
        min: usize,
        max: usize,
        children: Vec<Self>,
        random_order: bool,
    ) -> Result<Self> {
        if min > max {
            return Err(invalid_parameter(
                "some_of",
                &format!("{min}..={max}"),
                &"lower bound exceeds upper bound",
            ));
        }
        Ok(Self::SomeOf {
            min,
            max,
            children,
            random_order,
        })
    }

    /// Run all children, optionally in shuffled order
    pub const fn sequence(children: Vec<Self>, random_order: bool) -> Self {
        Self::Sequence {
            children,
            random_order,
        }
    }

    /// Blend `foreground` over `background` (or the input) through `mask`
    pub fn noise_alpha(mask: NoiseMask, foreground: Self, background: Option<Self>) -> Self {
        Self::NoiseAlpha {
            mask,
            foreground: Box::new(foreground),
            background: background.map(Box::new),
        }
    }

    /// Number of operator leaves in this subtree
    pub fn operator_count(&self) -> usize {
        match self {
            Self::Always(_) => 1,
            Self::WithProbability { inner, .. } => inner.operator_count(),
            Self::OneOf(children)
            | Self::SomeOf { children, .. }
            | Self::Sequence { children, .. } => children.iter().map(Self::operator_count).sum(),
            Self::NoiseAlpha {
                foreground,
                background,
                ..
            } => {
                foreground.operator_count()
                    + background.as_ref().map_or(0, |b| b.operator_count())
            }
        }
    }

    /// Evaluate this subtree once on `image`
    ///
    /// # Errors
    ///
    /// Propagates the first operator failure; nothing is retried
    pub fn sample(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        match self {
            Self::Always(operator) => operator.apply(image, rng),
            Self::WithProbability { p, inner } => {
                if rng.random_bool(*p) {
                    inner.sample(image, rng)
                } else {
                    Ok(image)
                }
            }
            Self::OneOf(children) => match children.choose(rng) {
                Some(child) => child.sample(image, rng),
                None => Ok(image),
            },
            Self::SomeOf {
                min,
                max,
                children,
                random_order,
            } => {
                let upper = (*max).min(children.len());
                let lower = (*min).min(upper);
                let amount = rng.random_range(lower..=upper);
                let mut picked = index::sample(rng, children.len(), amount).into_vec();
                if *random_order {
                    picked.shuffle(rng);
                } else {
                    picked.sort_unstable();
                }
                run_in_order(children, &picked, image, rng)
            }
            Self::Sequence {
                children,
                random_order,
            } => {
                let mut order: Vec<usize> = (0..children.len()).collect();
                if *random_order {
                    order.shuffle(rng);
                }
                run_in_order(children, &order, image, rng)
            }
            Self::NoiseAlpha {
                mask,
                foreground,
                background,
            } => {
                let front = foreground.sample(image.clone(), rng)?;
                let back = match background {
                    Some(branch) => branch.sample(image, rng)?,
                    None => image,
                };
                let (width, height) = front.dimensions();
                let alpha = mask.generate(width, height, rng);
                blend(&front, &back, &alpha)
            }
        }
    }
}

fn run_in_order(
    children: &[Augmenter],
    order: &[usize],
    image: RgbImage,
    rng: &mut StdRng,
) -> Result<RgbImage> {
    order
        .iter()
        .filter_map(|&i| children.get(i))
        .try_fold(image, |current, child| child.sample(current, rng))
}
