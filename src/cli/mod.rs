//! Command-line interface
mod options;

pub use options::Options;

/// Update a configuration from a source of overrides.
pub trait Update<T> {
    fn update(&mut self, source: T);
}

/// Apply an [`Update`] by value.
pub trait WithUpdate<T> {
    #[must_use]
    fn with_update(self, source: T) -> Self;
}

impl<T, U: Update<T>> WithUpdate<T> for U {
    fn with_update(mut self, source: T) -> Self {
        self.update(source);
        self
    }
}
