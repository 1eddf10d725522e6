//! Explicit lazy navigation cells.
//!
//! References loaded from a persistence backend go through a three-state
//! wrapper with an explicit load operation; nothing triggers on access.

/// Load state of a lazily resolved navigation value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState<T> {
    /// Nothing resolved yet.
    #[default]
    Unloaded,
    /// A load has been started and not yet completed.
    Loading,
    /// The value is available.
    Loaded(T),
}

/// A navigation value resolved through an explicit `load` step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationCell<T> {
    state: LoadState<T>,
}

impl<T> NavigationCell<T> {
    /// Create an unloaded cell.
    pub fn new() -> Self {
        Self {
            state: LoadState::Unloaded,
        }
    }

    /// Create a cell that already holds a value.
    pub fn loaded(value: T) -> Self {
        Self {
            state: LoadState::Loaded(value),
        }
    }

    /// The current load state.
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    /// Whether the value is available.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// The value, if loaded.
    pub fn get(&self) -> Option<&T> {
        match &self.state {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Mark a load as started. Used by backends that resolve the value
    /// out of band and finish with [`complete`](Self::complete) or
    /// [`fail`](Self::fail).
    pub fn begin_load(&mut self) {
        if !self.is_loaded() {
            self.state = LoadState::Loading;
        }
    }

    /// Finish an out-of-band load with the resolved value.
    pub fn complete(&mut self, value: T) {
        self.state = LoadState::Loaded(value);
    }

    /// Abandon an out-of-band load.
    pub fn fail(&mut self) {
        if !self.is_loaded() {
            self.state = LoadState::Unloaded;
        }
    }

    /// Resolve the value through the given loader, unless already loaded.
    ///
    /// On loader failure the cell returns to `Unloaded`.
    pub fn load_with<E>(&mut self, loader: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if !self.is_loaded() {
            self.begin_load();
            match loader() {
                Ok(value) => self.complete(value),
                Err(e) => {
                    self.fail();
                    return Err(e);
                }
            }
        }
        match &self.state {
            LoadState::Loaded(value) => Ok(value),
            _ => unreachable!("cell was just loaded"),
        }
    }

    /// Drop the value and return to `Unloaded`.
    pub fn unload(&mut self) -> Option<T> {
        match std::mem::take(&mut self.state) {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_starts_unloaded() {
        let cell: NavigationCell<Vec<u32>> = NavigationCell::new();
        assert!(!cell.is_loaded());
        assert!(cell.get().is_none());
        assert_eq!(*cell.state(), LoadState::Unloaded);
    }

    #[test]
    fn test_load_with_resolves_once() {
        let mut cell = NavigationCell::new();
        let mut calls = 0;

        let value = cell
            .load_with(|| -> Result<_, ()> {
                calls += 1;
                Ok(vec![1, 2])
            })
            .unwrap();
        assert_eq!(value, &vec![1, 2]);

        cell.load_with(|| -> Result<_, ()> {
            calls += 1;
            Ok(vec![3])
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(cell.get(), Some(&vec![1, 2]));
    }

    #[test]
    fn test_failed_load_returns_to_unloaded() {
        let mut cell: NavigationCell<Vec<u32>> = NavigationCell::new();

        let result = cell.load_with(|| Err("backend offline"));
        assert_eq!(result.unwrap_err(), "backend offline");
        assert!(!cell.is_loaded());
        assert!(!cell.is_loading());
    }

    #[test]
    fn test_out_of_band_load_protocol() {
        let mut cell = NavigationCell::new();

        cell.begin_load();
        assert!(cell.is_loading());

        cell.complete(42);
        assert_eq!(cell.get(), Some(&42));

        // A completed cell ignores a late failure signal.
        cell.fail();
        assert!(cell.is_loaded());

        assert_eq!(cell.unload(), Some(42));
        assert!(!cell.is_loaded());
    }
}
