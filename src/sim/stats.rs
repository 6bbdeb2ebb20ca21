//! Random distributions used by generation and spawning
//!
//! All of these are total functions over their domains: no input can make
//! them fail at runtime. Everything is generic over [`rand::Rng`] so the
//! simulation can thread its seeded `Pcg32` through.

use rand::Rng;

/// Sample a normally distributed value with the given mean and standard
/// deviation, via the Box-Muller transform.
pub fn normal<R: Rng>(rng: &mut R, mean: f32, sigma: f32) -> f32 {
    // (0, 1]: keeps the sample inside the domain of ln
    let u0: f32 = 1.0 - rng.random::<f32>();
    let u1: f32 = rng.random();
    let z0 = (-2.0 * u0.ln()).sqrt() * (std::f32::consts::TAU * u1).cos();
    sigma * z0 + mean
}

/// Like [`normal`], but rounded and absolute-valued. Not suitable for
/// distributions centered on negative values.
pub fn normal_discrete<R: Rng>(rng: &mut R, mean: f32, sigma: f32) -> i32 {
    normal(rng, mean, sigma).round().abs() as i32
}

/// Boolean trial with probability `p` of success
pub fn bernoulli<R: Rng>(rng: &mut R, p: f32) -> bool {
    rng.random::<f32>() < p
}

/// Weighted discrete choice: returns an index into `weights`, biased by the
/// weights (they need not sum to one).
pub fn choice<R: Rng>(rng: &mut R, weights: &[f32]) -> usize {
    let sum: f32 = weights.iter().sum();
    let mut u = rng.random::<f32>() * sum;
    for (i, &w) in weights.iter().enumerate() {
        u -= w;
        if u <= 0.0 {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

/// Uniformly distributed value in `[min, max)`
pub fn uniform<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    rng.random::<f32>() * (max - min) + min
}

/// Discrete uniformly distributed value in `[min, max)`
pub fn uniform_discrete<R: Rng>(rng: &mut R, min: i32, max: i32) -> i32 {
    (rng.random::<f32>() * (max - min) as f32).floor() as i32 + min
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_normal_discrete_non_negative() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(normal_discrete(&mut rng, 0.0, 3.0) >= 0);
        }
    }

    #[test]
    fn test_choice_respects_zero_weight() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..1000 {
            let i = choice(&mut rng, &[0.0, 1.0, 0.0]);
            assert_eq!(i, 1);
        }
    }

    #[test]
    fn test_choice_in_range() {
        let mut rng = Pcg32::seed_from_u64(42);
        let weights = [0.3, 0.7];
        for _ in 0..1000 {
            assert!(choice(&mut rng, &weights) < weights.len());
        }
    }

    #[test]
    fn test_uniform_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..1000 {
            let v = uniform(&mut rng, 2.0, 5.0);
            assert!((2.0..5.0).contains(&v));
        }
    }

    #[test]
    fn test_uniform_discrete_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..1000 {
            let v = uniform_discrete(&mut rng, 1, 4);
            assert!((1..4).contains(&v));
        }
    }

    #[test]
    fn test_bernoulli_extremes() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..100 {
            assert!(!bernoulli(&mut rng, 0.0));
            assert!(bernoulli(&mut rng, 1.1));
        }
    }
}
