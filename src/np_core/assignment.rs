use std::fmt::Display;

/// Resource chosen for one link of a lightpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkAssignment {
    /// The wavelength with this index is locked on the link.
    RealChannel(usize),
    /// No wavelength; this many keys were drawn from the link's key pool.
    KeyPoolFallback(usize),
}

impl LinkAssignment {
    pub fn channel(&self) -> Option<usize> {
        match self {
            LinkAssignment::RealChannel(w) => Some(*w),
            LinkAssignment::KeyPoolFallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LinkAssignment::KeyPoolFallback(_))
    }
}

impl Display for LinkAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkAssignment::RealChannel(w) => write!(f, "λ{w}"),
            LinkAssignment::KeyPoolFallback(q) => write!(f, "K{q}"),
        }
    }
}
