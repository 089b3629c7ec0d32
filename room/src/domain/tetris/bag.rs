// Deterministic 7-bag randomizer: each bag is a Fisher-Yates shuffle of
// all seven piece kinds, refilled whole whenever the queue empties so
// a piece can appear at most twice in any 14-draw window.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::piece::PieceKind;

pub struct BagGenerator {
    rng: StdRng,
    queue: VecDeque<PieceKind>,
}

impl BagGenerator {
    pub fn new(seed: u64) -> Self {
        let mut generator = Self {
            rng: StdRng::seed_from_u64(seed),
            queue: VecDeque::new(),
        };
        generator.refill();
        generator
    }

    fn refill(&mut self) {
        let mut bag = PieceKind::ALL;
        bag.shuffle(&mut self.rng);
        self.queue.extend(bag);
    }

    pub fn next(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.refill();
        }
        self.queue.pop_front().expect("just refilled")
    }
}
