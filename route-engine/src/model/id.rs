//! Generation of unique numeric ids.

/// Error returned when an id generator has issued every id of its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unique id space exhausted")]
pub struct IdSpaceExhausted;

/// Hands out ids `0, 1, 2, ...` and never the same one twice.
///
/// Once `u32::MAX` has been issued every further call fails instead of
/// wrapping around, since a wrapped id would collide with a live one.
///
/// # Examples
///
/// ```
/// use route_engine::model::UniqueIdGenerator;
///
/// let mut ids = UniqueIdGenerator::new();
/// assert_eq!(ids.generate().unwrap(), 0);
/// assert_eq!(ids.generate().unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UniqueIdGenerator {
    next: Option<u32>,
    exhausted: bool,
}

impl UniqueIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose first id is `first`.
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: Some(first),
            exhausted: false,
        }
    }

    /// Issue the next id.
    pub fn generate(&mut self) -> Result<u32, IdSpaceExhausted> {
        if self.exhausted {
            return Err(IdSpaceExhausted);
        }
        let id = self.next.unwrap_or(0);
        match id.checked_add(1) {
            Some(next) => self.next = Some(next),
            None => self.exhausted = true,
        }
        Ok(id)
    }

    /// Make sure `id`, and every id below it, is never issued from now on.
    ///
    /// Used when ids are assigned outside the generator, e.g. by a loader.
    pub fn reserve(&mut self, id: u32) {
        if self.exhausted || self.next.is_some_and(|next| next > id) {
            return;
        }
        match id.checked_add(1) {
            Some(next) => self.next = Some(next),
            None => self.exhausted = true,
        }
    }

    /// The most recently issued id, if any.
    pub fn last_issued(&self) -> Option<u32> {
        if self.exhausted {
            return Some(u32::MAX);
        }
        match self.next {
            Some(next) => next.checked_sub(1),
            None => None,
        }
    }
}
