// vim: tw=80
//! Verification reports

use std::fmt;

use crate::times::Expected;

/// An expectation whose call count ended up outside its declared range.
#[derive(Clone, Debug)]
pub struct Violation {
    /// Label of the handle that owns the expectation
    pub handle: String,
    pub method: String,
    /// Description of the argument constraint
    pub constraint: String,
    pub expected: Expected,
    pub actual: usize,
    /// The most recent argument lists, oldest first
    pub recent: Vec<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}: expected {}, got {} (with {})", self.handle,
               self.method, self.expected, self.actual, self.constraint)?;
        if !self.recent.is_empty() {
            write!(f, "; recent calls: {}", self.recent.join(" "))?;
        }
        Ok(())
    }
}

/// Every violation found by one verification pass.
#[derive(Clone, Debug, Default)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    pub(crate) fn push(&mut self, v: Violation) {
        self.violations.push(v);
    }

    pub(crate) fn extend(&mut self, other: Report) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations of the given handle and method
    pub fn find(&self, handle: &str, method: &str) -> Option<&Violation> {
        self.violations.iter()
            .find(|v| v.handle == handle && v.method == method)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} unsatisfied expectation(s):", self.violations.len())?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}
