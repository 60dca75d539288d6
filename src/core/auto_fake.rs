//! Auto-populating generator for whole object graphs.
//!
//! Any type deriving `fake::Dummy` can be filled in one call; nested
//! structs, options and collections are populated recursively by the
//! derive. Field-level rules (`#[dummy(faker = "1..100")]`) live on the type
//! itself; per-call overrides go through [`AutoFaker::generate_with`].

use fake::{Dummy, Faker};
use rand::Rng;

use super::faker::FakeGenerator;
use crate::config::FixtureConfig;
use crate::error::{FixtureError, Result};

/// Settings for an [`AutoFaker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoFakerConfig {
    /// Seed for the random source. Random when unset.
    pub seed: Option<u64>,
    /// Fewest elements [`AutoFaker::generate_many`] produces.
    pub min_collection_len: usize,
    /// Most elements [`AutoFaker::generate_many`] produces (inclusive).
    pub max_collection_len: usize,
}

impl Default for AutoFakerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            min_collection_len: 1,
            max_collection_len: 3,
        }
    }
}

impl From<&FixtureConfig> for AutoFakerConfig {
    fn from(config: &FixtureConfig) -> Self {
        Self {
            seed: config.seed,
            min_collection_len: config.min_collection_len,
            max_collection_len: config.max_collection_len,
        }
    }
}

/// Generates fully populated values of any `Dummy<Faker>` type.
#[derive(Debug, Clone)]
pub struct AutoFaker {
    faker: FakeGenerator,
    min_collection_len: usize,
    max_collection_len: usize,
}

impl AutoFaker {
    /// Default configuration with a random seed.
    #[must_use]
    pub fn new() -> Self {
        let defaults = AutoFakerConfig::default();
        Self {
            faker: FakeGenerator::new(),
            min_collection_len: defaults.min_collection_len,
            max_collection_len: defaults.max_collection_len,
        }
    }

    /// Default configuration with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            faker: FakeGenerator::with_seed(seed),
            ..Self::new()
        }
    }

    /// Build from explicit settings.
    pub fn from_config(config: &AutoFakerConfig) -> Result<Self> {
        if config.min_collection_len > config.max_collection_len {
            return Err(FixtureError::InvalidConfig {
                field: "min_collection_len",
                reason: format!(
                    "{} exceeds max_collection_len {}",
                    config.min_collection_len, config.max_collection_len
                ),
            });
        }
        Ok(Self::from_validated(config))
    }

    /// Build from settings whose range has already been checked.
    pub(crate) fn from_validated(config: &AutoFakerConfig) -> Self {
        let faker = config
            .seed
            .map_or_else(FakeGenerator::new, FakeGenerator::with_seed);
        Self {
            faker,
            min_collection_len: config.min_collection_len,
            max_collection_len: config.max_collection_len,
        }
    }

    /// The underlying generator; it shares this auto-faker's random source.
    #[must_use]
    pub const fn faker(&self) -> &FakeGenerator {
        &self.faker
    }

    /// Seed of the shared random source.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.faker.seed()
    }

    /// Generate one fully populated value.
    #[must_use]
    pub fn generate<T: Dummy<Faker>>(&self) -> T {
        self.faker.fake()
    }

    /// Generate a value, then apply an override.
    ///
    /// The override receives the shared generator for any replacement values.
    #[must_use]
    pub fn generate_with<T, F>(&self, configure: F) -> T
    where
        T: Dummy<Faker>,
        F: FnOnce(&mut T, &FakeGenerator),
    {
        let mut value = self.generate();
        configure(&mut value, &self.faker);
        value
    }

    /// Generate exactly `count` values.
    #[must_use]
    pub fn generate_vec<T: Dummy<Faker>>(&self, count: usize) -> Vec<T> {
        (0..count).map(|_| self.generate()).collect()
    }

    /// Generate a collection whose length falls in the configured range.
    #[must_use]
    pub fn generate_many<T: Dummy<Faker>>(&self) -> Vec<T> {
        let (min, max) = (self.min_collection_len, self.max_collection_len);
        let count = self.faker.with_rng(|rng| rng.gen_range(min..=max));
        self.generate_vec(count)
    }
}

impl Default for AutoFaker {
    fn default() -> Self {
        Self::new()
    }
}
