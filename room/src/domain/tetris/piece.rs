// Piece kinds, orientations, and the cell offsets each orientation
// occupies relative to the piece's `(x, y)` anchor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// The 1..=7 colour code painted into board cells on lock; `0` is
    /// reserved for empty.
    pub fn colour_code(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }
}

/// Orientation 0..=3, matching SRS's "spawn state" convention.
pub type Orientation = u8;

/// The four `(x, y)` cell offsets for `kind` at `orientation`, relative
/// to the piece's anchor.
pub fn cells(kind: PieceKind, orientation: Orientation) -> [(i32, i32); 4] {
    let o = orientation % 4;
    match kind {
        PieceKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
        PieceKind::I => match o {
            0 => [(-1, 0), (0, 0), (1, 0), (2, 0)],
            1 => [(1, -1), (1, 0), (1, 1), (1, 2)],
            2 => [(-1, 1), (0, 1), (1, 1), (2, 1)],
            _ => [(0, -1), (0, 0), (0, 1), (0, 2)],
        },
        PieceKind::T => match o {
            0 => [(-1, 0), (0, 0), (1, 0), (0, -1)],
            1 => [(0, -1), (0, 0), (0, 1), (1, 0)],
            2 => [(-1, 0), (0, 0), (1, 0), (0, 1)],
            _ => [(0, -1), (0, 0), (0, 1), (-1, 0)],
        },
        PieceKind::S => match o {
            0 => [(-1, 0), (0, 0), (0, -1), (1, -1)],
            1 => [(0, -1), (0, 0), (1, 0), (1, 1)],
            2 => [(-1, 1), (0, 1), (0, 0), (1, 0)],
            _ => [(-1, -1), (-1, 0), (0, 0), (0, 1)],
        },
        PieceKind::Z => match o {
            0 => [(-1, -1), (0, -1), (0, 0), (1, 0)],
            1 => [(1, -1), (1, 0), (0, 0), (0, 1)],
            2 => [(-1, 0), (0, 0), (0, 1), (1, 1)],
            _ => [(0, -1), (0, 0), (-1, 0), (-1, 1)],
        },
        PieceKind::J => match o {
            0 => [(-1, -1), (-1, 0), (0, 0), (1, 0)],
            1 => [(0, -1), (1, -1), (0, 0), (0, 1)],
            2 => [(-1, 0), (0, 0), (1, 0), (1, 1)],
            _ => [(0, -1), (0, 0), (0, 1), (-1, 1)],
        },
        PieceKind::L => match o {
            0 => [(-1, 0), (0, 0), (1, 0), (1, -1)],
            1 => [(0, -1), (0, 0), (0, 1), (1, 1)],
            2 => [(-1, 1), (-1, 0), (0, 0), (1, 0)],
            _ => [(-1, -1), (0, -1), (0, 0), (0, 1)],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_and_orientation_has_exactly_four_cells() {
        for kind in PieceKind::ALL {
            for o in 0..4 {
                assert_eq!(cells(kind, o).len(), 4);
            }
        }
    }

    #[test]
    fn o_piece_is_identical_across_orientations() {
        let first = cells(PieceKind::O, 0);
        for o in 1..4 {
            assert_eq!(cells(PieceKind::O, o), first);
        }
    }
}
