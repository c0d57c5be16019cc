// Draw registry: the process-wide Entry Set of uniquely drawn numbers.
//
// The Entry Set and the RNG that feeds it sit behind a single mutex, so each
// operation below runs as one critical section. In particular the
// "is it already drawn?" check and the append in `draw_unique` can never
// interleave with another caller.

use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::DrawError;

/// Outcome of a plain draw (no uniqueness constraint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw<T> {
    /// 1-based position of `value` in `entries`.
    #[serde(rename = "randomIndex")]
    pub index: usize,
    #[serde(rename = "randomValue")]
    pub value: T,
    /// The list that was drawn from, unmodified.
    pub entries: Vec<T>,
}

struct Inner {
    entries: Vec<u64>,
    rng: StdRng,
}

/// Thread-safe owner of the Entry Set.
///
/// Share it between request handlers as `Arc<Registry>`; all methods take
/// `&self`.
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry backed by an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty registry with a deterministic RNG. Two registries
    /// built from the same seed produce the same sequence of draws.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Registry {
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                rng,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("registry mutex poisoned")
    }

    /// Draw a number from `[1, max]` that is not yet in the Entry Set and
    /// record it.
    ///
    /// The exhaustion check runs before any sampling: once `max` or more
    /// numbers are recorded the loop below could never terminate, so this
    /// guard is what bounds it.
    pub fn draw_unique(&self, max: u64) -> Result<u64, DrawError> {
        if max == 0 {
            return Err(DrawError::InvalidMax);
        }

        let mut inner = self.lock();
        if inner.entries.len() as u64 >= max {
            return Err(DrawError::Exhausted);
        }

        let Inner { entries, rng } = &mut *inner;
        let mut attempts = 0u32;
        let number = loop {
            attempts += 1;
            let candidate = rng.gen_range(1..=max);
            if !entries.contains(&candidate) {
                break candidate;
            }
        };

        entries.push(number);
        info!(
            "Drew {number} from [1, {max}] after {attempts} attempt(s); {} entries recorded",
            entries.len()
        );
        Ok(number)
    }

    /// Draw one value, uniformly, from a caller-supplied list. The Entry Set
    /// is not touched and repeats across calls are expected.
    pub fn draw_from_given(&self, list: Vec<i64>) -> Result<Draw<i64>, DrawError> {
        let (index, value) = pick(&mut self.lock().rng, &list).ok_or(DrawError::InvalidArray)?;
        debug!("Picked {value} at position {index} of a given list of {}", list.len());
        Ok(Draw {
            index,
            value,
            entries: list,
        })
    }

    /// Draw one value, uniformly, from the Entry Set itself. Read-only.
    pub fn draw_from_stored(&self) -> Result<Draw<u64>, DrawError> {
        let mut inner = self.lock();
        let Inner { entries, rng } = &mut *inner;
        let (index, value) = pick(rng, entries.as_slice()).ok_or(DrawError::NoEntries)?;
        debug!("Picked stored entry {value} at position {index}");
        Ok(Draw {
            index,
            value,
            entries: entries.clone(),
        })
    }

    /// Snapshot of the Entry Set in insertion order.
    pub fn entries(&self) -> Vec<u64> {
        self.lock().entries.clone()
    }

    /// Forget every recorded entry. Returns the now-empty set.
    pub fn clear(&self) -> Vec<u64> {
        let mut inner = self.lock();
        let dropped = inner.entries.len();
        inner.entries = Vec::new();
        info!("Cleared {dropped} entries");
        inner.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pick a uniformly random element of `items`, returning its 1-based
/// position and the element. `None` when `items` is empty.
pub fn pick<T: Copy, R: Rng>(rng: &mut R, items: &[T]) -> Option<(usize, T)> {
    if items.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..items.len());
    Some((idx + 1, items[idx]))
}
