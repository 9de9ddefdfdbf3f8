use rand::Rng;
use rand::rngs::ThreadRng;

use crate::model::TaskRoot;
use crate::ops::tree_ops::find_task;

/// Source of new task ids
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Length of generated ids
const ID_LEN: usize = 9;

/// Random 9-character base-36 ids (`k3j9x0qaz`)
pub struct RandomIds<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomIds {
    pub fn new() -> Self {
        RandomIds {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        RandomIds::new()
    }
}

impl<R: Rng> RandomIds<R> {
    pub fn with_rng(rng: R) -> Self {
        RandomIds { rng }
    }
}

impl<R: Rng> IdSource for RandomIds<R> {
    fn next_id(&mut self) -> String {
        (0..ID_LEN)
            .map(|_| {
                let digit = self.rng.gen_range(0..36u32);
                std::char::from_digit(digit, 36).unwrap_or('0')
            })
            .collect()
    }
}

/// Predictable ids: `<prefix>1`, `<prefix>2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Draw ids until one is not already used in `root`.
pub fn fresh_id(root: &TaskRoot, ids: &mut dyn IdSource) -> String {
    loop {
        let id = ids.next_id();
        if find_task(root, &id).is_none() {
            return id;
        }
        tracing::debug!(id = %id, "generated id already in use, drawing again");
    }
}
