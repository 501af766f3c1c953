use std::fmt;

/// A pin decision: either bind work to the CPU behind `H`, or leave it unpinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuPin<H> {
    /// No pinning requested or possible
    Noop,

    /// Pin to the CPU represented by the handle
    Cpu(H),
}

impl<H> CpuPin<H> {
    #[inline]
    pub fn is_noop(&self) -> bool {
        matches!(self, CpuPin::Noop)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        !self.is_noop()
    }

    pub fn handle(&self) -> Option<&H> {
        match self {
            CpuPin::Noop => None,
            CpuPin::Cpu(handle) => Some(handle),
        }
    }

    pub fn map<U, F: FnOnce(H) -> U>(self, f: F) -> CpuPin<U> {
        match self {
            CpuPin::Noop => CpuPin::Noop,
            CpuPin::Cpu(handle) => CpuPin::Cpu(f(handle)),
        }
    }
}

impl<H: Clone> CpuPin<&H> {
    /// Detach a borrowed pin from its selector
    pub fn cloned(self) -> CpuPin<H> {
        self.map(H::clone)
    }
}

impl<H> Default for CpuPin<H> {
    fn default() -> Self {
        CpuPin::Noop
    }
}

impl<H> From<Option<H>> for CpuPin<H> {
    fn from(handle: Option<H>) -> Self {
        handle.map_or(CpuPin::Noop, CpuPin::Cpu)
    }
}

impl<H: fmt::Display> fmt::Display for CpuPin<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuPin::Noop => write!(f, "noop"),
            CpuPin::Cpu(handle) => write!(f, "cpu:{}", handle),
        }
    }
}
