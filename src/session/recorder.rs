// Append-only session recorder, keyed by project id
//
// Every mutation rewrites the whole session collection through the storage
// backend and only commits to the in-memory copy once the write succeeded, so
// a storage failure never leaves partial state visible.

use log::{debug, info};

use crate::errors::ProtoscopeError;
use crate::session::{ClickEvent, ScreenViewEvent, Session};
use crate::storage::SessionStorage;

pub struct SessionRecorder<S: SessionStorage> {
    storage: S,
    sessions: Vec<Session>,
}

impl<S: SessionStorage> SessionRecorder<S> {
    /// Open the recorder over a storage backend, loading the existing log
    pub fn new(storage: S) -> Result<Self, ProtoscopeError> {
        let sessions = storage.load_sessions()?;
        debug!("Loaded {} recorded sessions", sessions.len());
        Ok(Self { storage, sessions })
    }

    /// All recorded sessions, in creation order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Sessions recorded for one project, in creation order
    pub fn project_sessions(&self, project_id: &str) -> Vec<Session> {
        self.sessions
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect()
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    /// Begin a new session for a project and return its id
    pub fn start_session(&mut self, project_id: &str) -> Result<String, ProtoscopeError> {
        let session = Session::new(project_id);
        let session_id = session.id.clone();

        let mut updated = self.sessions.clone();
        updated.push(session);
        self.commit(updated)?;

        info!("Started session {} for project {}", session_id, project_id);
        Ok(session_id)
    }

    /// Finalize a session. Ending an already-ended session is a no-op, which
    /// keeps player exit idempotent.
    pub fn end_session(&mut self, session_id: &str) -> Result<(), ProtoscopeError> {
        let index = self.require_session(session_id)?;
        if self.sessions[index].is_finished() {
            return Ok(());
        }

        let mut updated = self.sessions.clone();
        updated[index].ended_at = Some(chrono::Utc::now());
        self.commit(updated)?;

        info!("Ended session {}", session_id);
        Ok(())
    }

    /// Append a click event. Re-appending an event id already present in the
    /// session is a no-op, so retried appends never double count.
    pub fn append_click(
        &mut self,
        session_id: &str,
        click: ClickEvent,
    ) -> Result<(), ProtoscopeError> {
        let index = self.require_session(session_id)?;
        if self.sessions[index].clicks.iter().any(|c| c.id == click.id) {
            debug!("Click {} already recorded, skipping", click.id);
            return Ok(());
        }

        let mut updated = self.sessions.clone();
        updated[index].clicks.push(click);
        self.commit(updated)
    }

    /// Append a screen-view event
    pub fn append_screen_view(
        &mut self,
        session_id: &str,
        view: ScreenViewEvent,
    ) -> Result<(), ProtoscopeError> {
        let index = self.require_session(session_id)?;

        let mut updated = self.sessions.clone();
        updated[index].screen_views.push(view);
        self.commit(updated)
    }

    /// Delete every session recorded for a project, leaving other projects'
    /// sessions untouched
    pub fn clear_sessions(&mut self, project_id: &str) -> Result<(), ProtoscopeError> {
        let updated: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| s.project_id != project_id)
            .cloned()
            .collect();
        let removed = self.sessions.len() - updated.len();
        self.commit(updated)?;

        info!("Cleared {} sessions for project {}", removed, project_id);
        Ok(())
    }

    fn require_session(&self, session_id: &str) -> Result<usize, ProtoscopeError> {
        self.sessions
            .iter()
            .position(|s| s.id == session_id)
            .ok_or_else(|| ProtoscopeError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    fn commit(&mut self, updated: Vec<Session>) -> Result<(), ProtoscopeError> {
        self.storage.store_sessions(&updated)?;
        self.sessions = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileBackedStorage;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn create_test_recorder(temp_dir: &TempDir) -> SessionRecorder<FileBackedStorage> {
        let storage = FileBackedStorage::new(temp_dir.path().to_path_buf()).unwrap();
        SessionRecorder::new(storage).unwrap()
    }

    fn create_test_click(screen_id: &str) -> ClickEvent {
        ClickEvent {
            id: Uuid::new_v4().to_string(),
            screen_id: screen_id.to_string(),
            x: 50.0,
            y: 50.0,
            is_hotspot: false,
            hotspot_id: None,
            target_screen_id: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_start_and_end_session() {
        let temp_dir = TempDir::new().unwrap();
        let mut recorder = create_test_recorder(&temp_dir);

        let session_id = recorder.start_session("project-1").unwrap();
        assert!(!recorder.session(&session_id).unwrap().is_finished());

        recorder.end_session(&session_id).unwrap();
        assert!(recorder.session(&session_id).unwrap().is_finished());
    }

    #[test]
    fn test_end_session_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut recorder = create_test_recorder(&temp_dir);

        let session_id = recorder.start_session("project-1").unwrap();
        recorder.end_session(&session_id).unwrap();
        let first_ended_at = recorder.session(&session_id).unwrap().ended_at;

        recorder.end_session(&session_id).unwrap();
        assert_eq!(recorder.session(&session_id).unwrap().ended_at, first_ended_at);
    }

    #[test]
    fn test_append_to_unknown_session_fails_without_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let mut recorder = create_test_recorder(&temp_dir);

        let session_id = recorder.start_session("project-1").unwrap();

        let result = recorder.append_click("no-such-session", create_test_click("screen-1"));
        assert!(matches!(
            result,
            Err(ProtoscopeError::SessionNotFound { .. })
        ));

        // Other sessions are untouched
        assert!(recorder.session(&session_id).unwrap().clicks.is_empty());
    }

    #[test]
    fn test_append_click_is_idempotent_on_event_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut recorder = create_test_recorder(&temp_dir);

        let session_id = recorder.start_session("project-1").unwrap();
        let click = create_test_click("screen-1");

        recorder.append_click(&session_id, click.clone()).unwrap();
        recorder.append_click(&session_id, click).unwrap();

        assert_eq!(recorder.session(&session_id).unwrap().clicks.len(), 1);
    }

    #[test]
    fn test_events_preserve_append_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut recorder = create_test_recorder(&temp_dir);

        let session_id = recorder.start_session("project-1").unwrap();
        recorder
            .append_screen_view(&session_id, ScreenViewEvent::now("screen-a"))
            .unwrap();
        recorder
            .append_screen_view(&session_id, ScreenViewEvent::now("screen-b"))
            .unwrap();

        let session = recorder.session(&session_id).unwrap();
        assert_eq!(session.screen_views[0].screen_id, "screen-a");
        assert_eq!(session.screen_views[1].screen_id, "screen-b");
    }

    #[test]
    fn test_clear_sessions_is_scoped_to_project() {
        let temp_dir = TempDir::new().unwrap();
        let mut recorder = create_test_recorder(&temp_dir);

        recorder.start_session("project-1").unwrap();
        recorder.start_session("project-1").unwrap();
        recorder.start_session("project-2").unwrap();

        recorder.clear_sessions("project-1").unwrap();

        assert!(recorder.project_sessions("project-1").is_empty());
        assert_eq!(recorder.project_sessions("project-2").len(), 1);
    }

    #[test]
    fn test_sessions_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let session_id;
        {
            let mut recorder = create_test_recorder(&temp_dir);
            session_id = recorder.start_session("project-1").unwrap();
            recorder
                .append_click(&session_id, create_test_click("screen-1"))
                .unwrap();
        }

        let recorder = create_test_recorder(&temp_dir);
        let session = recorder.session(&session_id).unwrap();
        assert_eq!(session.clicks.len(), 1);
    }
}
