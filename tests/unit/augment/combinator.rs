//! Tests for the combinator tree and its recursive sampler

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use spriteaug::Result;
    use spriteaug::augment::Operator;
    use spriteaug::augment::blend::NoiseMask;
    use spriteaug::augment::combinator::Augmenter;
    use spriteaug::io::error::operator_error;
    use spriteaug::math::sampling::Param;

    #[derive(Debug)]
    struct Fill(u8);

    impl Operator for Fill {
        fn name(&self) -> &'static str {
            "fill"
        }

        fn apply(&self, image: RgbImage, _rng: &mut StdRng) -> Result<RgbImage> {
            Ok(RgbImage::from_pixel(image.width(), image.height(), Rgb([self.0; 3])))
        }
    }

    #[derive(Debug)]
    struct Increment;

    impl Operator for Increment {
        fn name(&self) -> &'static str {
            "increment"
        }

        fn apply(&self, mut image: RgbImage, _rng: &mut StdRng) -> Result<RgbImage> {
            image.pixels_mut().for_each(|p| p.0[0] = p.0[0].saturating_add(1));
            Ok(image)
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Operator for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _image: RgbImage, _rng: &mut StdRng) -> Result<RgbImage> {
            Err(operator_error(self.name(), &"always fails"))
        }
    }

    fn red(image: &RgbImage) -> u8 {
        image.get_pixel(0, 0).0[0]
    }

    // Tests a leaf applies its operator every time
    // Verified by returning the input from Always
    #[test]
    fn test_always_applies() {
        let mut rng = StdRng::seed_from_u64(1);
        let node = Augmenter::always(Fill(9));
        let out = node.sample(RgbImage::new(2, 2), &mut rng).expect("fill");
        assert_eq!(red(&out), 9);
    }

    // Tests probability gates at both extremes and validation of p
    // Verified by comparing the draw against 1 - p
    #[test]
    fn test_with_probability() {
        let mut rng = StdRng::seed_from_u64(2);
        let never = Augmenter::with_probability(0.0, Augmenter::always(Fill(9))).expect("valid");
        let always = Augmenter::with_probability(1.0, Augmenter::always(Fill(9))).expect("valid");

        for _ in 0..20 {
            assert_eq!(red(&never.sample(RgbImage::new(1, 1), &mut rng).expect("ok")), 0);
            assert_eq!(red(&always.sample(RgbImage::new(1, 1), &mut rng).expect("ok")), 9);
        }
        assert!(Augmenter::with_probability(1.5, Augmenter::always(Fill(1))).is_err());
    }

    // Tests sometimes fires roughly half of the time
    // Verified by gating at a fixed probability of one
    #[test]
    fn test_sometimes_is_half() {
        let mut rng = StdRng::seed_from_u64(3);
        let node = Augmenter::sometimes(Augmenter::always(Fill(9)));
        let fired = (0..1000)
            .filter(|_| red(&node.sample(RgbImage::new(1, 1), &mut rng).expect("ok")) == 9)
            .count();
        assert!((400..600).contains(&fired), "fired {fired} times");
    }

    // Tests one-of applies exactly one child and reaches every child
    // Verified by applying all children
    #[test]
    fn test_one_of() {
        let mut rng = StdRng::seed_from_u64(4);
        let node = Augmenter::one_of(vec![
            Augmenter::always(Fill(10)),
            Augmenter::always(Fill(20)),
            Augmenter::always(Fill(30)),
        ]);
        let mut seen = Vec::new();
        for _ in 0..100 {
            let v = red(&node.sample(RgbImage::new(1, 1), &mut rng).expect("ok"));
            assert!([10, 20, 30].contains(&v));
            if !seen.contains(&v) {
                seen.push(v);
            }
        }
        assert_eq!(seen.len(), 3);

        let empty = Augmenter::one_of(Vec::new());
        assert_eq!(red(&empty.sample(RgbImage::new(1, 1), &mut rng).expect("ok")), 0);
    }

    // Tests some-of applies between min and max distinct children
    // Verified by sampling children with replacement
    #[test]
    fn test_some_of_counts() {
        let mut rng = StdRng::seed_from_u64(5);
        let children = || (0..5).map(|_| Augmenter::always(Increment)).collect::<Vec<_>>();

        let node = Augmenter::some_of(0, 5, children(), true).expect("valid bounds");
        let mut counts = [0usize; 6];
        for _ in 0..600 {
            let applied = red(&node.sample(RgbImage::new(1, 1), &mut rng).expect("ok"));
            counts[applied as usize] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0), "{counts:?}");

        let exact = Augmenter::some_of(2, 2, children(), false).expect("valid bounds");
        for _ in 0..20 {
            assert_eq!(red(&exact.sample(RgbImage::new(1, 1), &mut rng).expect("ok")), 2);
        }

        let clamped = Augmenter::some_of(9, 12, children(), false).expect("valid bounds");
        assert_eq!(red(&clamped.sample(RgbImage::new(1, 1), &mut rng).expect("ok")), 5);
    }

    // Tests an inverted some-of range is rejected at construction
    // Verified by swapping the bounds silently
    #[test]
    fn test_some_of_rejects_inverted_range() {
        assert!(Augmenter::some_of(3, 1, Vec::new(), false).is_err());
    }

    // Tests sequences keep declaration order unless shuffled
    // Verified by always shuffling
    #[test]
    fn test_sequence_order() {
        let mut rng = StdRng::seed_from_u64(6);
        let ordered = Augmenter::sequence(
            vec![Augmenter::always(Fill(10)), Augmenter::always(Increment)],
            false,
        );
        for _ in 0..20 {
            assert_eq!(red(&ordered.sample(RgbImage::new(1, 1), &mut rng).expect("ok")), 11);
        }

        let shuffled = Augmenter::sequence(
            vec![Augmenter::always(Fill(10)), Augmenter::always(Increment)],
            true,
        );
        let outcomes: Vec<u8> = (0..100)
            .map(|_| red(&shuffled.sample(RgbImage::new(1, 1), &mut rng).expect("ok")))
            .collect();
        assert!(outcomes.contains(&10));
        assert!(outcomes.contains(&11));
    }

    // Tests noise alpha output stays between the two branches
    // Verified by returning the foreground unblended
    #[test]
    fn test_noise_alpha_blends_branches() {
        let mut rng = StdRng::seed_from_u64(7);
        let node = Augmenter::noise_alpha(
            NoiseMask::frequency(Param::uniform(-4.0, 0.0)),
            Augmenter::always(Fill(200)),
            Some(Augmenter::always(Fill(100))),
        );
        let out = node.sample(RgbImage::new(32, 32), &mut rng).expect("blend");

        assert_eq!(out.dimensions(), (32, 32));
        assert!(out.pixels().all(|p| (100..=200).contains(&p.0[0])));
    }

    // Tests operator failures propagate without retry
    // Verified by swallowing child errors in sequences
    #[test]
    fn test_errors_propagate() {
        let mut rng = StdRng::seed_from_u64(8);
        let node = Augmenter::sequence(
            vec![Augmenter::always(Increment), Augmenter::always(Failing)],
            false,
        );
        assert!(node.sample(RgbImage::new(1, 1), &mut rng).is_err());
    }

    // Tests leaves are counted through every node kind
    // Verified by ignoring the background branch
    #[test]
    fn test_operator_count() {
        let tree = Augmenter::sequence(
            vec![
                Augmenter::sometimes(Augmenter::always(Increment)),
                Augmenter::one_of(vec![Augmenter::always(Fill(1)), Augmenter::always(Fill(2))]),
                Augmenter::noise_alpha(
                    NoiseMask::simplex(),
                    Augmenter::always(Increment),
                    Some(Augmenter::always(Increment)),
                ),
            ],
            true,
        );
        assert_eq!(tree.operator_count(), 5);
    }
}
