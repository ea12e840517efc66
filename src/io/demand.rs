// src/io/demand.rs

use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};

/// Distribution used to realise each item's daily demand around its mean.
///
/// Every variant yields whole, non-negative units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DemandModel {
    /// Poisson with rate equal to the daily mean.
    #[default]
    Poisson,
    /// Normal with standard deviation `cv * mean`, truncated at zero.
    Normal { cv: f64 },
    /// Uniform over `[mean * (1 - spread), mean * (1 + spread)]`.
    Uniform { spread: f64 },
}

impl DemandModel {
    /// Draws one day's demand for an item with the given daily mean.
    pub fn sample<R: Rng + ?Sized>(&self, mean: f64, rng: &mut R) -> f64 {
        if !(mean > 0.0) {
            return 0.0;
        }

        let val = match *self {
            DemandModel::Poisson => match Poisson::new(mean) {
                Ok(poisson) => poisson.sample(rng),
                Err(_) => mean,
            },
            DemandModel::Normal { cv } => {
                let std_dev = (cv * mean).max(0.0);
                match Normal::new(mean, std_dev) {
                    Ok(normal) => normal.sample(rng),
                    Err(_) => mean,
                }
            }
            DemandModel::Uniform { spread } => {
                let spread = spread.clamp(0.0, 1.0);
                let low = mean * (1.0 - spread);
                let high = mean * (1.0 + spread);
                if high > low {
                    rng.gen_range(low..=high)
                } else {
                    mean
                }
            }
        };

        // Round to whole units; demand cannot be negative.
        let int_val = val.round();
        if int_val < 0.0 {
            0.0
        } else {
            int_val
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match *self {
            DemandModel::Poisson => Ok(()),
            DemandModel::Normal { cv } if cv.is_finite() && cv >= 0.0 => Ok(()),
            DemandModel::Normal { cv } => Err(format!("cv must be finite and >= 0, got {}", cv)),
            DemandModel::Uniform { spread } if (0.0..=1.0).contains(&spread) => Ok(()),
            DemandModel::Uniform { spread } => {
                Err(format!("spread must be within [0, 1], got {}", spread))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_mean(model: DemandModel, mean: f64) -> f64 {
        let mut rng = StdRng::seed_from_u64(99);
        let draws: Vec<f64> = (0..5000).map(|_| model.sample(mean, &mut rng)).collect();
        assert!(draws.iter().all(|d| *d >= 0.0 && d.fract() == 0.0));
        draws.iter().sum::<f64>() / draws.len() as f64
    }

    #[test]
    fn models_center_on_the_mean() {
        for model in [
            DemandModel::Poisson,
            DemandModel::Normal { cv: 0.3 },
            DemandModel::Uniform { spread: 0.5 },
        ] {
            let avg = sample_mean(model, 10.0);
            assert!((avg - 10.0).abs() < 0.5, "{:?} averaged {}", model, avg);
        }
    }

    #[test]
    fn wide_normal_never_goes_negative() {
        let mut rng = StdRng::seed_from_u64(4);
        let model = DemandModel::Normal { cv: 3.0 };
        for _ in 0..2000 {
            assert!(model.sample(2.0, &mut rng) >= 0.0);
        }
    }

    #[test]
    fn zero_mean_yields_zero() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(DemandModel::Poisson.sample(0.0, &mut rng), 0.0);
    }

    #[test]
    fn validation_rejects_bad_shapes() {
        assert!(DemandModel::Normal { cv: -1.0 }.validate().is_err());
        assert!(DemandModel::Uniform { spread: 1.5 }.validate().is_err());
        assert!(DemandModel::Poisson.validate().is_ok());
    }
}
