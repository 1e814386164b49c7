//! Result window settings.

/// The `from`/`size` window of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    /// Leave `from`/`size` out and let the engine apply its default window.
    #[default]
    Unbounded,
    /// An explicit window starting at `from` with at most `size` hits.
    Window { from: usize, size: usize },
}

impl Pagination {
    /// The first `size` hits.
    pub fn first(size: usize) -> Self {
        Self::Window { from: 0, size }
    }

    /// `size` hits starting at offset `from`.
    pub fn window(from: usize, size: usize) -> Self {
        Self::Window { from, size }
    }

    /// Whether a window was set explicitly.
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Window { .. })
    }
}
