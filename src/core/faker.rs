//! Fake-data generator over a shared, seeded random source.
//!
//! Generation itself is delegated to the `fake` crate; this type owns the
//! random source and records its seed so a failing run can be replayed
//! with `UNIT_FIXTURE_SEED`.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::{Dummy, Fake, Faker};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random structured-value generator.
///
/// Clones share the same random source.
#[derive(Clone)]
pub struct FakeGenerator {
    rng: Arc<Mutex<StdRng>>,
    seed: u64,
}

impl FakeGenerator {
    /// Create a generator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a generator whose output is fully determined by `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            seed,
        }
    }

    /// Seed the random source was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether `other` draws from the same random source.
    #[must_use]
    pub fn shares_source_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rng, &other.rng)
    }

    /// Run `f` with exclusive access to the random source.
    ///
    /// `f` must not call back into this generator.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Generate any `Dummy<Faker>` value.
    #[must_use]
    pub fn fake<T: Dummy<Faker>>(&self) -> T {
        self.fake_with(Faker)
    }

    /// Generate a value from a specific faker, e.g. `fake_with(Name())` or `fake_with(1..10)`.
    #[must_use]
    pub fn fake_with<T, F>(&self, faker: F) -> T
    where
        T: Dummy<F>,
    {
        self.with_rng(|rng| faker.fake_with_rng(rng))
    }

    /// Full name, e.g. "Ada Lovelace".
    #[must_use]
    pub fn name(&self) -> String {
        self.fake_with(Name())
    }

    /// Given name.
    #[must_use]
    pub fn first_name(&self) -> String {
        self.fake_with(FirstName())
    }

    /// Family name.
    #[must_use]
    pub fn last_name(&self) -> String {
        self.fake_with(LastName())
    }

    /// Email address on a reserved example domain.
    #[must_use]
    pub fn email(&self) -> String {
        self.fake_with(SafeEmail())
    }

    /// A single lorem word.
    #[must_use]
    pub fn word(&self) -> String {
        self.fake_with(Word())
    }

    /// A sentence of 3 to 8 words.
    #[must_use]
    pub fn sentence(&self) -> String {
        self.fake_with(Sentence(3..8))
    }

    /// Random alphanumeric string of exactly `len` characters.
    #[must_use]
    pub fn alphanumeric(&self, len: usize) -> String {
        self.with_rng(|rng| {
            rng.sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
    }

    /// Integer in `[lo, hi]`; bounds given in either order.
    #[must_use]
    pub fn int_between(&self, lo: i64, hi: i64) -> i64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.with_rng(|rng| rng.gen_range(lo..=hi))
    }

    /// A fair coin flip.
    #[must_use]
    pub fn boolean(&self) -> bool {
        self.with_rng(|rng| rng.gen_bool(0.5))
    }

    /// Pick one element, or `None` for an empty slice.
    #[must_use]
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.with_rng(|rng| items.choose(rng))
    }

    /// A timestamp within the last `days` days.
    #[must_use]
    pub fn recent_datetime(&self, days: u32) -> DateTime<Utc> {
        let window = i64::from(days) * 86_400;
        let offset = self.with_rng(|rng| rng.gen_range(0..=window));
        Utc::now() - TimeDelta::seconds(offset)
    }
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FakeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeGenerator")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
