use std::{fmt::Display, ops::{ BitOr, BitOrAssign, Index, IndexMut }};

/// Channel occupancy of one directed link.
///
/// `true` means the wavelength is locked by a lightpath, `false` means free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMatrix(Vec<bool>);

impl BitOr for StateMatrix {
    type Output = StateMatrix;

    fn bitor(mut self, rhs: Self) -> Self::Output {
        self |= &rhs;
        self
    }
}

impl BitOrAssign<&StateMatrix> for StateMatrix {
    fn bitor_assign(&mut self, rhs: &StateMatrix) {
        for (self_s, &rhs_s) in self.0.iter_mut().zip(rhs.0.iter()) {
            *self_s |= rhs_s;
        }
    }
}

impl Index<usize> for StateMatrix {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for StateMatrix {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl StateMatrix {
    /// All `channels` wavelengths free.
    pub fn new(channels: usize) -> StateMatrix {
        Self(vec![false; channels])
    }

    pub fn new_fulfilled(channels: usize) -> StateMatrix {
        Self(vec![true; channels])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|x| !*x)
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(|x| *x)
    }

    pub fn is_free(&self, channel: usize) -> bool {
        !self.0[channel]
    }

    pub fn iter(&self) -> std::slice::Iter<bool> {
        self.0.iter()
    }

    /// Lowest free wavelength (first-fit).
    pub fn first_free(&self) -> Option<usize> {
        self.0.iter().position(|x| !*x)
    }

    pub fn free_channels(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &s)| !s)
            .map(|(w, _)| w)
            .collect()
    }

    pub fn count_used(&self) -> usize {
        self.0.iter().filter(|x| **x).count()
    }
}

impl Display for StateMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for element in &self.0 {
            if *element {
                write!(f, "█")?;
            } else {
                write!(f, "▏")?;
            }
        }
        Ok(())
    }
}
