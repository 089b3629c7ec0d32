// The authoritative per-room game state: both seats, any spectators,
// the shared bag, and the lobby/running phase. Mutated exclusively
// through this type's methods, all of which a caller reaches only
// after taking the room-wide `tokio::sync::Mutex` that wraps it.

use std::collections::HashMap;
use std::time::Duration;

use crate::domain::tetris::{BagGenerator, LockOutcome, Move, PlayerState};
use crate::domain::{Phase, RoomError, Seat};

pub struct RoomState {
    pub players: HashMap<Seat, PlayerState>,
    pub spectators: Vec<String>,
    pub names: HashMap<Seat, String>,
    bag: BagGenerator,
    pub phase: Phase,
    pub seed: u64,
}

/// What happened to a seat on a gravity tick, for the caller to turn
/// into push frames.
pub struct GravityStep {
    pub seat: Seat,
    pub outcome: LockOutcome,
}

impl RoomState {
    pub fn new(seed: u64) -> Self {
        Self {
            players: HashMap::new(),
            spectators: Vec::new(),
            names: HashMap::new(),
            bag: BagGenerator::new(seed),
            phase: Phase::Lobby,
            seed,
        }
    }

    /// Attempts to seat `name` as `seat`. Fails if the seat is already
    /// occupied.
    pub fn claim_seat(&mut self, seat: Seat, name: String) -> Result<(), RoomError> {
        if self.players.contains_key(&seat) {
            return Err(RoomError::SeatTaken);
        }
        self.players.insert(seat, PlayerState::new(&mut self.bag));
        self.names.insert(seat, name);
        Ok(())
    }

    pub fn add_spectator(&mut self, name: String) {
        self.spectators.push(name);
    }

    /// Starts the match once both seats are filled; idempotent no-op
    /// has already been rejected by the caller checking `phase`.
    pub fn start(&mut self) -> Result<(), RoomError> {
        if self.phase == Phase::Running {
            return Err(RoomError::AlreadyStarted);
        }
        if !self.players.contains_key(&Seat::P1) || !self.players.contains_key(&Seat::P2) {
            return Err(RoomError::NotEnoughPlayers);
        }
        self.phase = Phase::Running;
        Ok(())
    }

    pub fn apply_move(&mut self, seat: Seat, mv: Move) -> Result<Option<LockOutcome>, RoomError> {
        let bag = &mut self.bag;
        let player = self.players.get_mut(&seat).ok_or(RoomError::SpectatorAction)?;
        if !player.alive {
            return Ok(None);
        }
        let outcome = match mv {
            Move::Left => {
                player.move_horizontal(-1);
                None
            }
            Move::Right => {
                player.move_horizontal(1);
                None
            }
            Move::RotateCW => {
                player.rotate(true);
                None
            }
            Move::RotateCCW => {
                player.rotate(false);
                None
            }
            Move::SoftDrop => {
                player.soft_drop();
                None
            }
            Move::HardDrop => Some(player.hard_drop(bag)),
            Move::Hold => {
                player.hold_piece(bag).map_err(|()| RoomError::HoldUsed)?;
                None
            }
        };
        Ok(outcome)
    }

    /// Advances gravity for every living player, returning the lock
    /// outcomes (if any) for players that landed and locked this tick.
    pub fn gravity_tick(&mut self, lock_delay: Duration) -> Vec<GravityStep> {
        let bag = &mut self.bag;
        let mut steps = Vec::new();
        for (&seat, player) in self.players.iter_mut() {
            if !player.alive {
                continue;
            }
            if let Some(outcome) = player.gravity_tick(bag, lock_delay) {
                steps.push(GravityStep { seat, outcome });
            }
        }
        steps
    }

    /// Seats still alive. Used to decide whether the match has ended.
    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.alive).count()
    }

    /// The surviving player's name, if exactly one remains; `None` for
    /// a draw (zero alive) or an ongoing match.
    pub fn winner(&self) -> Option<&str> {
        let mut alive = self.players.iter().filter(|(_, p)| p.alive);
        let (seat, _) = alive.next()?;
        if alive.next().is_some() {
            return None;
        }
        self.names.get(seat).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claiming_an_occupied_seat_fails() {
        let mut state = RoomState::new(1);
        state.claim_seat(Seat::P1, "alice".into()).unwrap();
        assert!(state.claim_seat(Seat::P1, "bob".into()).is_err());
    }

    #[test]
    fn start_requires_both_seats() {
        let mut state = RoomState::new(1);
        assert!(state.start().is_err());
        state.claim_seat(Seat::P1, "alice".into()).unwrap();
        assert!(state.start().is_err());
        state.claim_seat(Seat::P2, "bob".into()).unwrap();
        assert!(state.start().is_ok());
    }

    #[test]
    fn winner_is_none_while_both_players_are_alive() {
        let mut state = RoomState::new(1);
        state.claim_seat(Seat::P1, "alice".into()).unwrap();
        state.claim_seat(Seat::P2, "bob".into()).unwrap();
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn winner_is_the_sole_survivor() {
        let mut state = RoomState::new(1);
        state.claim_seat(Seat::P1, "alice".into()).unwrap();
        state.claim_seat(Seat::P2, "bob".into()).unwrap();
        state.players.get_mut(&Seat::P2).unwrap().alive = false;
        assert_eq!(state.winner(), Some("alice"));
    }
}
