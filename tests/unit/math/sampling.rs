//! Tests for parameter ranges, discrete choices and per-channel decisions

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use spriteaug::math::sampling::{Choice, Param, PerChannel};

    // Tests uniform draws stay within the closed interval regardless of argument order
    // Verified by not normalising reversed bounds
    #[test]
    fn test_uniform_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let param = Param::uniform(1.2_f64, 0.8);
        let draws: Vec<f64> = (0..500).map(|_| param.sample(&mut rng)).collect();
        assert!(draws.iter().all(|v| (0.8..=1.2).contains(v)));
        assert!(draws.iter().any(|&v| v < 0.9));
        assert!(draws.iter().any(|&v| v > 1.1));
    }

    // Tests integer ranges are inclusive at both ends
    // Verified by sampling from a half-open range
    #[test]
    fn test_uniform_integer_inclusive() {
        let mut rng = StdRng::seed_from_u64(2);
        let param = Param::uniform(-1_i32, 1);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let v = param.sample(&mut rng);
            seen[(v + 1) as usize] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    // Tests fixed parameters always yield the same value
    // Verified by sampling around the fixed value
    #[test]
    fn test_fixed() {
        let mut rng = StdRng::seed_from_u64(3);
        let param = Param::fixed(7_u32);
        assert!((0..50).all(|_| param.sample(&mut rng) == 7));
    }

    // Tests discrete choices only produce listed values and reject empty sets
    // Verified by skipping the head entry when sampling
    #[test]
    fn test_choice() {
        let mut rng = StdRng::seed_from_u64(4);
        let param = Param::choice(&[3_u32, 9, 5]).expect("non-empty choice");

        let mut seen = Vec::new();
        for _ in 0..200 {
            let v = param.sample(&mut rng);
            assert!([3, 5, 9].contains(&v));
            if !seen.contains(&v) {
                seen.push(v);
            }
        }
        assert_eq!(seen.len(), 3);

        assert!(Param::<u32>::choice(&[]).is_err());
        assert!(Choice::<u8>::new(&[]).is_err());
    }

    // Tests choice helpers report their size
    // Verified by counting only the tail
    #[test]
    fn test_choice_len() {
        let single = Choice::single('a');
        let of = Choice::of('a', &['b', 'c']);
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(single.len(), 1);
        assert_eq!(of.len(), 3);
        assert!(!of.is_empty());
        assert_eq!(single.sample(&mut rng), 'a');
    }

    // Tests per-channel probabilities control shared versus independent draws
    // Verified by ignoring the per-channel decision
    #[test]
    fn test_sample_channels() {
        let mut rng = StdRng::seed_from_u64(6);
        let param = Param::uniform(0.0_f32, 1000.0);

        for _ in 0..20 {
            let [a, b, c] = param.sample_channels(PerChannel::NEVER, &mut rng);
            assert!((a - b).abs() < f32::EPSILON && (b - c).abs() < f32::EPSILON);
        }
        let independent = (0..20)
            .filter(|_| {
                let [a, b, _] = param.sample_channels(PerChannel::ALWAYS, &mut rng);
                (a - b).abs() > f32::EPSILON
            })
            .count();
        assert!(independent > 15);
    }

    // Tests per-channel probability validation
    // Verified by accepting values above one
    #[test]
    fn test_per_channel_validation() {
        assert!(PerChannel::new(0.5).is_ok());
        assert!(PerChannel::new(1.2).is_err());
        assert!(PerChannel::new(-0.2).is_err());
        assert!((PerChannel::ALWAYS.probability() - 1.0).abs() < f64::EPSILON);
    }
}
