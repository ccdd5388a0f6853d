use std::fmt;
use std::sync::Mutex;

use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

const NAME_PREFIX: &str = "spark";
const NAME_SUFFIX_LENGTH: usize = 5;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Driver,
    Service,
    Job,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ResourceKind::Driver => "driver",
            ResourceKind::Service => "svc",
            ResourceKind::Job => "job",
        };
        write!(f, "{kind}")
    }
}

/// Generates resource names of the form `spark-<kind>-<suffix>`.
///
/// Names are not checked for collisions. The random suffix only makes
/// collisions unlikely.
pub trait NameGenerator: Send + Sync + 'static {
    fn generate(&self, kind: ResourceKind) -> String;
}

pub struct RandomNameGenerator<R = StdRng> {
    rng: Mutex<R>,
}

impl RandomNameGenerator<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }
}

impl Default for RandomNameGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomNameGenerator<ChaCha8Rng> {
    /// A generator that produces the same sequence of names for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl<R: RngCore + Send + 'static> NameGenerator for RandomNameGenerator<R> {
    fn generate(&self, kind: ResourceKind) -> String {
        // The RNG state stays valid even if another thread panicked while holding the lock.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let suffix = (0..NAME_SUFFIX_LENGTH)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect::<String>();
        format!("{NAME_PREFIX}-{kind}-{suffix}").to_lowercase()
    }
}

/// The names of the resources created for one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchIdentities {
    pub driver_name: String,
    pub service_name: String,
    pub job_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid_name(name: &str, kind: &str) {
        let prefix = format!("spark-{kind}-");
        let Some(suffix) = name.strip_prefix(&prefix) else {
            panic!("unexpected name: {name}");
        };
        assert_eq!(suffix.len(), NAME_SUFFIX_LENGTH);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_random_names() {
        let generator = RandomNameGenerator::new();
        for _ in 0..100 {
            assert_valid_name(&generator.generate(ResourceKind::Driver), "driver");
            assert_valid_name(&generator.generate(ResourceKind::Service), "svc");
            assert_valid_name(&generator.generate(ResourceKind::Job), "job");
        }
    }

    #[test]
    fn test_seeded_names() {
        let a = RandomNameGenerator::seeded(42);
        let b = RandomNameGenerator::seeded(42);
        for kind in [ResourceKind::Driver, ResourceKind::Service, ResourceKind::Job] {
            let name = a.generate(kind);
            assert_valid_name(&name, &kind.to_string());
            assert_eq!(name, b.generate(kind));
        }
    }
}
