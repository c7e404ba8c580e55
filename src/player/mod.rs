// Player engine: resolves clicks against hotspots, maintains the navigation
// history stack, and drives the session recorder
//
// One engine instance serves a single logical user: each click is handled to
// completion (hit-test, record, navigate) before the next input is accepted.

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use crate::errors::ProtoscopeError;
use crate::project::{Project, Screen};
use crate::session::{ClickEvent, ScreenViewEvent, SessionRecorder};
use crate::storage::SessionStorage;

/// Outcome of resolving one click against a screen's hotspots.
///
/// The navigation target is carried only when the matched hotspot's target id
/// resolves to a screen of the played project; a dangling target behaves
/// exactly like a hotspot with no target at all.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickResolution {
    pub screen_id: String,
    pub x: f32,
    pub y: f32,
    pub is_hotspot: bool,
    pub hotspot_id: Option<String>,
    pub target_screen_id: Option<String>,
    pub target_index: Option<usize>,
}

pub struct PlayerEngine<'a, S: SessionStorage> {
    project: &'a Project,
    recorder: &'a mut SessionRecorder<S>,
    current_screen_index: usize,
    /// Navigation history as screen indices. Never empty; push-only except
    /// for `back`.
    history: Vec<usize>,
    session_id: Option<String>,
}

impl<'a, S: SessionStorage> PlayerEngine<'a, S> {
    pub fn new(project: &'a Project, recorder: &'a mut SessionRecorder<S>) -> Self {
        Self {
            project,
            recorder,
            current_screen_index: 0,
            history: vec![0],
            session_id: None,
        }
    }

    /// Begin a player run: create a session and record the view of the first
    /// screen. Callers validate that the project has screens before starting;
    /// an empty project is refused rather than played.
    ///
    /// Calling `start` on an already-running engine keeps the active session
    /// and returns its id.
    pub fn start(&mut self) -> Result<String, ProtoscopeError> {
        if let Some(session_id) = &self.session_id {
            return Ok(session_id.clone());
        }
        if self.project.screens.is_empty() {
            return Err(ProtoscopeError::EmptyProject {
                project_id: self.project.id.clone(),
            });
        }

        let session_id = self.recorder.start_session(&self.project.id)?;
        self.session_id = Some(session_id.clone());
        self.history = vec![0];
        self.current_screen_index = 0;
        self.record_current_view()?;

        info!(
            "Player started for project {} with session {}",
            self.project.id, session_id
        );
        Ok(session_id)
    }

    pub fn current_screen_index(&self) -> usize {
        self.current_screen_index
    }

    pub fn current_screen(&self) -> &Screen {
        &self.project.screens[self.current_screen_index]
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Classify a click against a screen's hotspots. Pure: the same screen
    /// and position always produce the same resolution.
    ///
    /// Hotspots are scanned in declaration order and the first rectangle
    /// containing the position wins, so overlaps resolve deterministically by
    /// order, never by area or z-order. Containment is edge-inclusive.
    pub fn resolve_click(&self, screen: &Screen, x: f32, y: f32) -> ClickResolution {
        let matched = screen.hotspots.iter().find(|h| h.rect.contains(x, y));

        // A dangling target id is treated identically to "no target"
        let target = matched
            .and_then(|h| h.target_screen_id.as_deref())
            .and_then(|target_id| {
                self.project
                    .screen_index(target_id)
                    .map(|index| (target_id.to_string(), index))
            });

        ClickResolution {
            screen_id: screen.id.clone(),
            x,
            y,
            is_hotspot: matched.is_some(),
            hotspot_id: matched.map(|h| h.id.clone()),
            target_screen_id: target.as_ref().map(|(id, _)| id.clone()),
            target_index: target.map(|(_, index)| index),
        }
    }

    /// Handle one click on the current screen: resolve it, append the click
    /// event (misses included), then apply any navigation
    pub fn click(&mut self, x: f32, y: f32) -> Result<ClickResolution, ProtoscopeError> {
        let resolution = self.resolve_click(self.current_screen(), x, y);

        if let Some(session_id) = self.session_id.clone() {
            let click = ClickEvent {
                id: Uuid::new_v4().to_string(),
                screen_id: resolution.screen_id.clone(),
                x: resolution.x,
                y: resolution.y,
                is_hotspot: resolution.is_hotspot,
                hotspot_id: resolution.hotspot_id.clone(),
                target_screen_id: resolution.target_screen_id.clone(),
                timestamp: Utc::now(),
            };
            self.recorder.append_click(&session_id, click)?;
        }

        self.apply_navigation(&resolution)?;
        Ok(resolution)
    }

    /// Navigate to the click's resolved target, if any: push the target index
    /// onto the history stack and record the arrival. A click with no
    /// resolvable target leaves the engine state unchanged.
    pub fn apply_navigation(&mut self, resolution: &ClickResolution) -> Result<(), ProtoscopeError> {
        let Some(target_index) = resolution.target_index else {
            return Ok(());
        };

        self.history.push(target_index);
        self.current_screen_index = target_index;
        debug!("Navigated to screen index {}", target_index);
        self.record_current_view()
    }

    /// Pop the history stack and return to the previous screen, recording the
    /// re-arrival as a view. No-op at the root of history.
    pub fn back(&mut self) -> Result<(), ProtoscopeError> {
        if self.history.len() <= 1 {
            return Ok(());
        }

        self.history.pop();
        // The stack is non-empty by the guard above
        self.current_screen_index = *self.history.last().unwrap_or(&0);
        self.record_current_view()
    }

    /// Return to the first screen and collapse the history stack. The
    /// current session continues: restart is intra-session.
    pub fn restart(&mut self) -> Result<(), ProtoscopeError> {
        self.history = vec![0];
        self.current_screen_index = 0;
        self.record_current_view()
    }

    /// Finalize the session and detach from it. Idempotent: exiting an
    /// already-exited or never-started engine is a no-op.
    pub fn exit(&mut self) -> Result<(), ProtoscopeError> {
        if let Some(session_id) = self.session_id.take() {
            self.recorder.end_session(&session_id)?;
            info!("Player exited, session {} ended", session_id);
        }
        Ok(())
    }

    fn record_current_view(&mut self) -> Result<(), ProtoscopeError> {
        if let Some(session_id) = self.session_id.clone() {
            let screen_id = self.current_screen().id.clone();
            self.recorder
                .append_screen_view(&session_id, ScreenViewEvent::now(screen_id))?;
        }
        Ok(())
    }
}
