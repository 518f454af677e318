//! Formatting utilities
use std::fmt;

/// Pretty-print a float, switching to exponent notation for very large or small magnitudes.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
pub struct PrettyPrint(pub f64);

impl fmt::Display for PrettyPrint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let magnitude = self.0.abs();
        if (magnitude >= 1e6 || magnitude <= 1e-4) && self.0 != 0.0 {
            fmt::LowerExp::fmt(&self.0, f)
        } else {
            fmt::Display::fmt(&self.0, f)
        }
    }
}

/// Wraps a closure as the Display implementation
#[derive(Debug)]
pub struct DisplayFn<F>(pub F)
where
    // Bounded here so that the closure type does not have to be specified on creation
    F: Fn(&mut fmt::Formatter) -> fmt::Result;

impl<F> fmt::Display for DisplayFn<F>
where
    F: Fn(&mut fmt::Formatter) -> fmt::Result,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (self.0)(f)
    }
}
