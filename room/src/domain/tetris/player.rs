// One player's board, active piece, and the piece state machine
// (falling -> grounded -> locked).

use std::collections::VecDeque;
use std::time::Instant;

use super::bag::BagGenerator;
use super::board::Board;
use super::piece::{PieceKind, Orientation, cells};

pub const SPAWN_X: i32 = 4;
pub const SPAWN_Y: i32 = -1;
const QUEUE_MIN_DEPTH: usize = 7;

#[derive(Debug, Clone, Copy)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
    pub orientation: Orientation,
}

pub struct PlayerState {
    pub board: Board,
    pub current: ActivePiece,
    pub next: VecDeque<PieceKind>,
    pub hold: Option<PieceKind>,
    pub hold_used: bool,
    pub score: u32,
    pub lines: u32,
    pub alive: bool,
    pub lock_timer: Option<Instant>,
}

pub struct LockOutcome {
    pub lines_cleared: u32,
    pub score_added: u32,
    pub topped_out: bool,
}

impl PlayerState {
    pub fn new(bag: &mut BagGenerator) -> Self {
        let mut next = VecDeque::new();
        while next.len() < QUEUE_MIN_DEPTH {
            next.push_back(bag.next());
        }
        let kind = next.pop_front().expect("queue just filled");
        refill(&mut next, bag);

        Self {
            board: Board::empty(),
            current: ActivePiece {
                kind,
                x: SPAWN_X,
                y: SPAWN_Y,
                orientation: 0,
            },
            next,
            hold: None,
            hold_used: false,
            score: 0,
            lines: 0,
            alive: true,
            lock_timer: None,
        }
    }

    fn active_cells(&self) -> [(i32, i32); 4] {
        translate(cells(self.current.kind, self.current.orientation), self.current.x, self.current.y)
    }

    pub fn move_horizontal(&mut self, dx: i32) -> bool {
        let attempt = translate(cells(self.current.kind, self.current.orientation), self.current.x + dx, self.current.y);
        if self.board.collides(&attempt) {
            return false;
        }
        self.current.x += dx;
        self.lock_timer = None;
        true
    }

    pub fn rotate(&mut self, clockwise: bool) -> bool {
        let from = self.current.orientation;
        let to = if clockwise { (from + 1) % 4 } else { (from + 3) % 4 };
        for (dx, dy) in super::kicks::kicks_for(self.current.kind, from, to) {
            let attempt = translate(cells(self.current.kind, to), self.current.x + dx, self.current.y + dy);
            if !self.board.collides(&attempt) {
                self.current.x += dx;
                self.current.y += dy;
                self.current.orientation = to;
                self.lock_timer = None;
                return true;
            }
        }
        false
    }

    /// Returns `true` if the piece moved down, `false` if it landed
    /// (and the lock timer was started).
    pub fn soft_drop(&mut self) -> bool {
        let attempt = translate(cells(self.current.kind, self.current.orientation), self.current.x, self.current.y + 1);
        if self.board.collides(&attempt) {
            self.lock_timer.get_or_insert_with(Instant::now);
            false
        } else {
            self.current.y += 1;
            self.score += 1;
            self.lock_timer = None;
            true
        }
    }

    /// Drops to the floor, adds the flat hard-drop bonus, and locks.
    pub fn hard_drop(&mut self, bag: &mut BagGenerator) -> LockOutcome {
        loop {
            let attempt = translate(cells(self.current.kind, self.current.orientation), self.current.x, self.current.y + 1);
            if self.board.collides(&attempt) {
                break;
            }
            self.current.y += 1;
        }
        let mut outcome = self.lock(bag);
        outcome.score_added += 10;
        self.score += 10;
        outcome
    }

    /// Gravity advances the piece one row; on landing, starts or
    /// checks the lock-delay timer and locks once it has elapsed.
    pub fn gravity_tick(&mut self, bag: &mut BagGenerator, lock_delay: std::time::Duration) -> Option<LockOutcome> {
        let attempt = translate(cells(self.current.kind, self.current.orientation), self.current.x, self.current.y + 1);
        if !self.board.collides(&attempt) {
            self.current.y += 1;
            self.lock_timer = None;
            return None;
        }

        match self.lock_timer {
            None => {
                self.lock_timer = Some(Instant::now());
                None
            }
            Some(started) if started.elapsed() >= lock_delay => Some(self.lock(bag)),
            Some(_) => None,
        }
    }

    pub fn hold_piece(&mut self, bag: &mut BagGenerator) -> Result<(), ()> {
        if self.hold_used {
            return Err(());
        }
        let incoming = match self.hold.replace(self.current.kind) {
            Some(previous) => previous,
            None => {
                let drawn = self.next.pop_front().expect("queue kept non-empty");
                refill(&mut self.next, bag);
                drawn
            }
        };
        self.spawn(incoming);
        self.hold_used = true;
        Ok(())
    }

    fn spawn(&mut self, kind: PieceKind) {
        self.current = ActivePiece {
            kind,
            x: SPAWN_X,
            y: SPAWN_Y,
            orientation: 0,
        };
        if self.board.collides(&self.active_cells()) {
            self.alive = false;
        }
    }

    fn lock(&mut self, bag: &mut BagGenerator) -> LockOutcome {
        let colour = self.current.kind.colour_code();
        self.board.paint(&self.active_cells(), colour);
        let lines_cleared = self.board.clear_full_rows();
        let score_added = match lines_cleared {
            0 => 0,
            1 => 100,
            2 => 300,
            3 => 500,
            4 => 800,
            n => n * 200,
        };
        self.score += score_added;
        self.lines += lines_cleared;

        let next_kind = self.next.pop_front().expect("queue kept non-empty");
        refill(&mut self.next, bag);
        self.lock_timer = None;
        self.hold_used = false;
        self.spawn(next_kind);

        LockOutcome {
            lines_cleared,
            score_added,
            topped_out: !self.alive,
        }
    }
}

fn refill(queue: &mut VecDeque<PieceKind>, bag: &mut BagGenerator) {
    while queue.len() < QUEUE_MIN_DEPTH {
        queue.push_back(bag.next());
    }
}

fn translate(cells: [(i32, i32); 4], x: i32, y: i32) -> [(i32, i32); 4] {
    cells.map(|(cx, cy)| (cx + x, cy + y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerState {
        let mut bag = BagGenerator::new(1);
        PlayerState::new(&mut bag)
    }

    #[test]
    fn new_player_has_a_full_next_queue_and_a_current_piece() {
        let p = player();
        assert_eq!(p.next.len(), QUEUE_MIN_DEPTH);
        assert_eq!(p.current.x, SPAWN_X);
        assert_eq!(p.current.y, SPAWN_Y);
    }

    #[test]
    fn hard_drop_into_a_tetris_ready_well_scores_800_plus_10_and_4_lines() {
        let mut bag = BagGenerator::new(7);
        let mut p = PlayerState::new(&mut bag);

        // Fill the bottom four rows except one column, leaving a well.
        for y in (super::super::board::BOARD_H - 4)..super::super::board::BOARD_H {
            for x in 0..super::super::board::BOARD_W {
                if x != 0 {
                    p.board.paint(&[(x, y), (x, y), (x, y), (x, y)], 1);
                }
            }
        }

        // Force the current piece to be an I piece oriented vertically in column 0
        // (orientation 1's cell offsets sit one column right of the anchor).
        p.current = ActivePiece { kind: PieceKind::I, x: -1, y: -1, orientation: 1 };

        let outcome = p.hard_drop(&mut bag);
        assert_eq!(outcome.lines_cleared, 4);
        assert_eq!(outcome.score_added, 810);
    }

    #[test]
    fn lock_delay_resets_on_successful_horizontal_move() {
        let mut bag = BagGenerator::new(3);
        let mut p = PlayerState::new(&mut bag);
        // Drop onto the floor directly below.
        for y in 0..super::super::board::BOARD_H {
            let _ = y;
        }
        while p.soft_drop() {}
        assert!(p.lock_timer.is_some());
        let moved = p.move_horizontal(1) || p.move_horizontal(-1);
        assert!(moved);
        assert!(p.lock_timer.is_none());
    }

    #[test]
    fn top_out_is_detected_on_spawn_collision() {
        let mut bag = BagGenerator::new(5);
        let mut p = PlayerState::new(&mut bag);
        for x in 0..super::super::board::BOARD_W {
            p.board.paint(&[(x, 0), (x, 0), (x, 0), (x, 0)], 1);
        }
        p.spawn(PieceKind::O);
        assert!(!p.alive);
    }
}
