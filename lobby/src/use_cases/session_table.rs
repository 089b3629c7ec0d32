// In-memory session table, explicitly owned and lifecycled by the
// lobby process (Design Notes §9: no ambient globals).

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::Session;

#[derive(Default)]
pub struct SessionTable {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session);
    }

    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &str) -> Option<Session> {
        self.sessions.write().await.remove(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> Session {
        Session {
            session_id: id.to_string(),
            user_id: "u1".to_string(),
            name: "bob".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let table = SessionTable::new();
        table.insert(session("s1")).await;
        assert!(table.get("s1").await.is_some());
    }

    #[tokio::test]
    async fn remove_clears_the_session() {
        let table = SessionTable::new();
        table.insert(session("s1")).await;
        table.remove("s1").await;
        assert!(table.get("s1").await.is_none());
    }
}
