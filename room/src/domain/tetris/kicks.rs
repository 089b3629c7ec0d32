// SRS wall-kick offset tables. Each table maps an (from, to)
// orientation pair to the ordered list of `(dx, dy)` offsets attempted
// in sequence; the first offset whose translated cells are
// collision-free wins.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::piece::PieceKind;

type KickTable = HashMap<(u8, u8), [(i32, i32); 5]>;

fn jlstz_kicks() -> &'static KickTable {
    static TABLE: OnceLock<KickTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ((0, 1), [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
            ((1, 0), [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
            ((1, 2), [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
            ((2, 1), [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
            ((2, 3), [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
            ((3, 2), [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
            ((3, 0), [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
            ((0, 3), [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
        ])
    })
}

fn i_kicks() -> &'static KickTable {
    static TABLE: OnceLock<KickTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ((0, 1), [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)]),
            ((1, 0), [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)]),
            ((1, 2), [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)]),
            ((2, 1), [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)]),
            ((2, 3), [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)]),
            ((3, 2), [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)]),
            ((3, 0), [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)]),
            ((0, 3), [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)]),
        ])
    })
}

/// The ordered kick offsets attempted when rotating `kind` from
/// orientation `from` to `to`. `O` always yields a single `(0,0)`
/// offset; missing keys in the JLSTZ/I tables degrade the same way.
pub fn kicks_for(kind: PieceKind, from: u8, to: u8) -> Vec<(i32, i32)> {
    let key = (from % 4, to % 4);
    let table = match kind {
        PieceKind::O => return vec![(0, 0)],
        PieceKind::I => i_kicks(),
        _ => jlstz_kicks(),
    };
    table.get(&key).map(|offsets| offsets.to_vec()).unwrap_or_else(|| vec![(0, 0)])
}
