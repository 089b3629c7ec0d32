// Domain-level shape of the document store: four open-map collections.

use serde_json::{Map, Value};
use std::fmt;

/// A single record. The store keeps records as open maps — it never
/// validates per-collection shape; that responsibility sits with the
/// lobby (see Design Notes: "No-schema store").
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Player,
    Developer,
    Game,
    Room,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Player,
        Collection::Developer,
        Collection::Game,
        Collection::Room,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Player => "Player",
            Collection::Developer => "Developer",
            Collection::Game => "Game",
            Collection::Room => "Room",
        }
    }

    pub fn parse(name: &str) -> Option<Collection> {
        match name {
            "Player" => Some(Collection::Player),
            "Developer" => Some(Collection::Developer),
            "Game" => Some(Collection::Game),
            "Room" => Some(Collection::Room),
            _ => None,
        }
    }

    /// `Player`/`Developer` records get identity/session bookkeeping
    /// fields stamped on create that `Game`/`Room` do not.
    pub fn is_identity_collection(self) -> bool {
        matches!(self, Collection::Player | Collection::Developer)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
