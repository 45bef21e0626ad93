use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::gym::forex::{
    action::{DECISION_COMPONENTS, Decision, Decisions},
    config::EnvConfig,
};

/// Box space of decision vectors: `[-1, 1]` per component, shape `(4, num_symbols)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpace {
    num_symbols: usize,
}

impl ActionSpace {
    pub const LOW: f64 = -1.0;
    pub const HIGH: f64 = 1.0;

    pub fn new(num_symbols: usize) -> Self {
        Self { num_symbols }
    }

    pub fn shape(&self) -> (usize, usize) {
        (DECISION_COMPONENTS, self.num_symbols)
    }

    pub fn contains(&self, decisions: &Decisions) -> bool {
        decisions.validate(self.num_symbols).is_ok()
    }

    /// Draws one uniformly distributed decision per symbol.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Decisions {
        (0..self.num_symbols)
            .map(|_| {
                let mut component = || rng.random_range(Self::LOW..=Self::HIGH);
                Decision {
                    take_profit: component(),
                    stop_loss: component(),
                    volume: component(),
                    direction: component(),
                }
            })
            .collect()
    }
}

impl From<&EnvConfig> for ActionSpace {
    fn from(cfg: &EnvConfig) -> Self {
        Self::new(cfg.num_symbols())
    }
}

/// Shape of the observation tensor as advertised to learning frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub window_size: usize,
    pub num_components: usize,
    pub num_features: usize,
}

impl ObservationSpace {
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.window_size, self.num_components, self.num_features)
    }
}

impl From<&EnvConfig> for ObservationSpace {
    fn from(cfg: &EnvConfig) -> Self {
        Self {
            window_size: cfg.window_size(),
            num_components: cfg.num_components(),
            num_features: cfg.num_features(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_samples_stay_inside_the_box() {
        let space = ActionSpace::new(3);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let sample = space.sample(&mut rng);
            assert_eq!(sample.len(), 3);
            assert!(space.contains(&sample), "sample outside space: {sample:?}");
        }
    }

    #[test]
    fn test_sampling_is_reproducible_with_seed() {
        let space = ActionSpace::new(2);
        let a = space.sample(&mut StdRng::seed_from_u64(42));
        let b = space.sample(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_contains_rejects_wrong_shape() {
        let space = ActionSpace::new(2);
        assert!(!space.contains(&Decisions::no_op(1)));
        assert!(space.contains(&Decisions::no_op(2)));
    }

    #[test]
    fn test_spaces_from_config() {
        let cfg = EnvConfig::default()
            .with_num_symbols(2)
            .with_num_features(5)
            .with_num_components(3)
            .with_window_size(16);
        assert_eq!(ActionSpace::from(&cfg).shape(), (4, 2));
        assert_eq!(ObservationSpace::from(&cfg).shape(), (16, 3, 5));
    }
}
