use std::time::SystemTime;

/// A stored value together with its optional deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    value: String,
    deadline: Option<SystemTime>,
}

impl Entry {
    /// Creates a new entry. A `None` deadline never expires.
    pub fn new(value: impl Into<String>, deadline: Option<SystemTime>) -> Self {
        Self {
            value: value.into(),
            deadline,
        }
    }

    /// Returns the stored value as a string slice
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the deadline, if any
    pub fn deadline(&self) -> Option<SystemTime> {
        self.deadline
    }

    /// Checks if this entry is expired as of `now`.
    ///
    /// An entry whose deadline equals `now` is expired.
    #[inline]
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    /// Checks if this entry has expired against the wall clock
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }
}
