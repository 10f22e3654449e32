// vim: tw=80
//! Call counting

use std::{
    fmt,
    ops::Range,
    sync::atomic::{AtomicUsize, Ordering}
};

/// How the next count given to an expectation builder is interpreted
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Bound {
    Exactly,
    AtLeast,
    AtMost,
}

#[derive(Debug)]
pub(crate) struct Times {
    /// How many times has the expectation already been called?
    count: AtomicUsize,
    /// Half-open: `end` is one past the maximum allowed count
    range: Range<usize>
}

impl Times {
    /// Record one call and return the new count.
    pub(crate) fn call(&self) -> usize {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn uncall(&self) {
        self.count.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub(crate) fn any(&mut self) {
        self.range = 0..usize::MAX;
    }

    /// Has this expectation already been called the maximum allowed number of
    /// times?
    pub(crate) fn is_done(&self) -> bool {
        self.count() >= self.range.end.saturating_sub(1)
    }

    /// Is the current count within the allowed range?
    pub(crate) fn is_satisfied(&self) -> bool {
        self.range.contains(&self.count())
    }

    pub(crate) fn set(&mut self, bound: Bound, n: usize) {
        self.range = match bound {
            Bound::Exactly => n..n.saturating_add(1),
            Bound::AtLeast => n..usize::MAX,
            Bound::AtMost => 0..n.saturating_add(1),
        };
    }

    pub(crate) fn never(&mut self) {
        self.range = 0..1;
    }

    pub(crate) fn range(&mut self, range: Range<usize>) {
        assert!(range.start < range.end, "Empty call count range");
        self.range = range;
    }

    /// The allowed range, rendered for humans
    pub(crate) fn expected(&self) -> Expected {
        Expected(self.range.clone())
    }
}

impl Default for Times {
    fn default() -> Self {
        // By default, allow any number of calls
        let count = AtomicUsize::default();
        let range = 0..usize::MAX;
        Times{count, range}
    }
}

/// An allowed call-count range, as shown in verification reports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expected(Range<usize>);

impl Expected {
    pub fn min(&self) -> usize {
        self.0.start
    }

    /// The maximum allowed count, or `None` if unbounded.
    pub fn max(&self) -> Option<usize> {
        if self.0.end == usize::MAX {
            None
        } else {
            Some(self.0.end - 1)
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.min(), self.max()) {
            (0, None) => write!(f, "any number"),
            (min, None) => write!(f, "at least {min}"),
            (0, Some(max)) if max > 0 => write!(f, "at most {max}"),
            (min, Some(max)) if min == max => write!(f, "{min}"),
            (min, Some(max)) => write!(f, "between {min} and {max}"),
        }
    }
}
