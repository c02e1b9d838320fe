//! Per-slot metadata: index kind, valence, frame and dimension.

use std::fmt;

/// Whether a slot ranges over space only or over spacetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexKind {
    /// Ranges over `dim` components
    Spatial,
    /// Ranges over `dim + 1` components; component 0 is time
    Spacetime,
}

/// Upper (contravariant) or lower (covariant) position of an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Valence {
    Up,
    Lo,
}

impl Valence {
    pub fn opposite(self) -> Self {
        match self {
            Valence::Up => Valence::Lo,
            Valence::Lo => Valence::Up,
        }
    }
}

/// Coordinate system an index is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frame {
    Inertial,
    Grid,
    Distorted,
    BlockLogical,
    ElementLogical,
    NoFrame,
}

/// Metadata of one tensor slot.
///
/// `dim` is the spatial dimension; a spacetime slot has one extra (time)
/// component, see [`SlotSpec::extent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotSpec {
    pub kind: IndexKind,
    pub valence: Valence,
    pub dim: usize,
    pub frame: Frame,
}

impl SlotSpec {
    pub fn spatial(dim: usize, valence: Valence, frame: Frame) -> Self {
        Self {
            kind: IndexKind::Spatial,
            valence,
            dim,
            frame,
        }
    }

    pub fn spacetime(dim: usize, valence: Valence, frame: Frame) -> Self {
        Self {
            kind: IndexKind::Spacetime,
            valence,
            dim,
            frame,
        }
    }

    /// Number of components this slot ranges over.
    pub fn extent(&self) -> usize {
        match self.kind {
            IndexKind::Spatial => self.dim,
            IndexKind::Spacetime => self.dim + 1,
        }
    }

    pub fn with_valence(self, valence: Valence) -> Self {
        Self { valence, ..self }
    }

    pub fn with_kind(self, kind: IndexKind) -> Self {
        Self { kind, ..self }
    }
}

impl fmt::Display for SlotSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            IndexKind::Spatial => "spatial",
            IndexKind::Spacetime => "spacetime",
        };
        let valence = match self.valence {
            Valence::Up => "up",
            Valence::Lo => "lo",
        };
        write!(f, "{}<{}, {}, {:?}>", kind, self.dim, valence, self.frame)
    }
}
