/// Connection Management Module
///
/// This module owns the single active session of a database handle and the
/// ordered fallback across candidate connection strings.
///
/// `ConnectionManager` is not meant to be shared between threads without
/// external synchronization: sessions are not reentrant, and every method
/// that touches the session takes `&mut self`. Wrap the manager (or the
/// facade that owns it) in a `Mutex` when several callers need it.

use crate::core::db::query::Executor;
use crate::core::{MdbError, Result};
use crate::resolver::ConnectionSpec;
use tracing::{debug, info, warn};

/// The session that won the fallback, with where it came from
#[derive(Debug)]
pub struct ActiveConnection<S> {
    /// Open executor session
    pub session: S,
    /// Connection string that succeeded
    pub connection_string: String,
    /// Target database file
    pub path: String,
}

/// Connection manager for one database handle.
///
/// Invariant: the handle is connected exactly when `active` holds a session.
pub struct ConnectionManager<E: Executor> {
    executor: E,
    active: Option<ActiveConnection<E::Session>>,
}

impl<E: Executor> ConnectionManager<E> {
    /// Creates a disconnected manager
    pub fn new(executor: E) -> Self {
        ConnectionManager {
            executor,
            active: None,
        }
    }

    /// Tries each connection string in order and keeps the first session
    /// that opens.
    ///
    /// Any existing session is closed first. Candidate faults are absorbed;
    /// `false` means every candidate failed (or there were none).
    pub fn open(&mut self, spec: &ConnectionSpec) -> bool {
        self.close();

        for connection_string in &spec.connection_strings {
            debug!("Trying {}", connection_string);
            match self.executor.connect(connection_string) {
                Ok(session) => {
                    info!("Connected to {} via {}", spec.path, connection_string);
                    self.active = Some(ActiveConnection {
                        session,
                        connection_string: connection_string.clone(),
                        path: spec.path.clone(),
                    });
                    return true;
                }
                Err(e) => debug!("Candidate failed: {}", e),
            }
        }

        warn!(
            "No driver could open {} ({} candidates tried)",
            spec.path,
            spec.connection_strings.len()
        );
        false
    }

    /// Releases the active session; does nothing when disconnected
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            info!("Closing connection to {}", active.path);
            drop(active);
        }
    }

    /// Checks if there's an active session
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Connection string of the active session
    pub fn connection_string(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.connection_string.as_str())
    }

    /// Path of the open database file
    pub fn current_path(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.path.as_str())
    }

    /// The active session, or `NotConnected`
    pub fn session(&mut self) -> Result<&mut E::Session> {
        self.active
            .as_mut()
            .map(|a| &mut a.session)
            .ok_or(MdbError::NotConnected)
    }

    /// Transaction start hook.
    ///
    /// The file format has no usable transactions, so this does nothing and
    /// statements between begin and commit are not atomic.
    pub fn begin_transaction(&mut self) {
        debug!("begin transaction (no-op)");
    }

    /// Transaction commit hook; does nothing, see `begin_transaction`
    pub fn commit_transaction(&mut self) {
        debug!("commit transaction (no-op)");
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: Executor> Drop for ConnectionManager<E> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedExecutor;

    fn spec(strings: &[&str]) -> ConnectionSpec {
        ConnectionSpec {
            path: "people.mdb".to_string(),
            connection_strings: strings.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_first_success_wins() {
        let executor = ScriptedExecutor::accepting(&["b"]);
        let mut conn_mgr = ConnectionManager::new(executor.clone());

        assert!(conn_mgr.open(&spec(&["a", "b", "c"])));
        assert!(conn_mgr.is_connected());
        assert_eq!(conn_mgr.connection_string(), Some("b"));
        assert_eq!(conn_mgr.current_path(), Some("people.mdb"));
        assert_eq!(executor.attempts(), vec!["a", "b"]);
    }

    #[test]
    fn test_all_candidates_fail() {
        let executor = ScriptedExecutor::accepting(&[]);
        let mut conn_mgr = ConnectionManager::new(executor.clone());

        assert!(!conn_mgr.open(&spec(&["a", "b"])));
        assert!(!conn_mgr.is_connected());
        assert!(matches!(conn_mgr.session(), Err(MdbError::NotConnected)));
        assert_eq!(executor.attempts().len(), 2);
    }

    #[test]
    fn test_empty_connection_spec() {
        let mut conn_mgr = ConnectionManager::new(ScriptedExecutor::accepting(&["a"]));
        assert!(!conn_mgr.open(&spec(&[])));
        assert!(!conn_mgr.is_connected());
    }

    #[test]
    fn test_reopen_releases_previous_session() {
        let executor = ScriptedExecutor::accepting(&["a"]);
        let mut conn_mgr = ConnectionManager::new(executor.clone());

        assert!(conn_mgr.open(&spec(&["a"])));
        assert!(conn_mgr.open(&spec(&["a"])));
        assert_eq!(executor.released(), 1);

        // A failed reopen still leaves the handle closed
        assert!(!conn_mgr.open(&spec(&["x"])));
        assert!(!conn_mgr.is_connected());
        assert_eq!(executor.released(), 2);
    }

    #[test]
    fn test_close_is_idempotent() {
        let executor = ScriptedExecutor::accepting(&["a"]);
        let mut conn_mgr = ConnectionManager::new(executor.clone());

        conn_mgr.close();
        assert!(conn_mgr.open(&spec(&["a"])));
        conn_mgr.close();
        conn_mgr.close();
        assert!(!conn_mgr.is_connected());
        assert_eq!(executor.released(), 1);
    }

    #[test]
    fn test_drop_releases_session() {
        let executor = ScriptedExecutor::accepting(&["a"]);
        {
            let mut conn_mgr = ConnectionManager::new(executor.clone());
            assert!(conn_mgr.open(&spec(&["a"])));
        }
        assert_eq!(executor.released(), 1);
    }
}
