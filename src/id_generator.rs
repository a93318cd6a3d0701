//! Element id generation for annotations, primers and cut sites.

use rand::{Rng, SeedableRng, distributions::Alphanumeric};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;

const ID_LENGTH: usize = 10;

pub trait IdGenerator: fmt::Debug {
    fn next_id(&mut self) -> String;
}

/// Random alphanumeric ids from the thread-local generator.
#[derive(Clone, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect()
    }
}

/// Reproducible random-looking ids.
pub struct SeededIds {
    rng: Xoshiro256PlusPlus,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl fmt::Debug for SeededIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededIds").finish_non_exhaustive()
    }
}

impl IdGenerator for SeededIds {
    fn next_id(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect()
    }
}

/// `prefix-0`, `prefix-1`, ...
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: usize,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
