// Prototype store: authoring surface over the durable project collection
//
// Mutators follow a persist-then-commit discipline: the updated collection is
// written through the storage backend first and replaces the in-memory copy
// only on success, so a storage failure leaves the previous state intact.

use log::{debug, info};

use crate::errors::ProtoscopeError;
use crate::project::{Hotspot, HotspotRect, HotspotUpdate, Project, Screen, ScreenUpdate};
use crate::storage::ProjectStorage;

pub struct PrototypeStore<S: ProjectStorage> {
    storage: S,
    projects: Vec<Project>,
}

impl<S: ProjectStorage> PrototypeStore<S> {
    /// Open the store over a storage backend, loading the existing collection
    pub fn new(storage: S) -> Result<Self, ProtoscopeError> {
        let projects = storage.load_projects()?;
        debug!("Loaded {} projects", projects.len());
        Ok(Self { storage, projects })
    }

    /// All projects, in creation order
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get_project(&self, project_id: &str) -> Result<&Project, ProtoscopeError> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| ProtoscopeError::ProjectNotFound {
                project_id: project_id.to_string(),
            })
    }

    pub fn create_project(&mut self, name: &str) -> Result<Project, ProtoscopeError> {
        let project = Project::new(name);

        let mut updated = self.projects.clone();
        updated.push(project.clone());
        self.commit(updated)?;

        info!("Created project {} ({})", project.name, project.id);
        Ok(project)
    }

    pub fn rename_project(&mut self, project_id: &str, name: &str) -> Result<(), ProtoscopeError> {
        self.mutate_project(project_id, |project| {
            project.name = name.to_string();
            Ok(())
        })
    }

    pub fn delete_project(&mut self, project_id: &str) -> Result<(), ProtoscopeError> {
        // Verify existence first so a bad id is a NotFound, not a silent no-op
        self.get_project(project_id)?;

        let updated: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.id != project_id)
            .cloned()
            .collect();
        self.commit(updated)?;

        info!("Deleted project {}", project_id);
        Ok(())
    }

    /// Append a screen to a project. The order index is the screen count at
    /// insertion time, which keeps order indices unique within the project.
    pub fn add_screen(
        &mut self,
        project_id: &str,
        name: &str,
        image_id: &str,
    ) -> Result<Screen, ProtoscopeError> {
        self.mutate_project(project_id, |project| {
            let screen = Screen::new(name, image_id, project.screens.len());
            project.screens.push(screen.clone());
            Ok(screen)
        })
    }

    pub fn update_screen(
        &mut self,
        project_id: &str,
        screen_id: &str,
        update: ScreenUpdate,
    ) -> Result<(), ProtoscopeError> {
        self.mutate_screen(project_id, screen_id, |screen| {
            if let Some(name) = update.name {
                screen.name = name;
            }
            if let Some(image_id) = update.image_id {
                screen.image_id = image_id;
            }
            Ok(())
        })
    }

    /// Delete a screen, cascading to its own hotspots by ownership. Hotspots
    /// on other screens that targeted the deleted screen are NOT rewritten:
    /// their target ids become dangling weak references, resolved as "no
    /// navigation" at click time.
    pub fn delete_screen(&mut self, project_id: &str, screen_id: &str) -> Result<(), ProtoscopeError> {
        self.mutate_project(project_id, |project| {
            let initial_len = project.screens.len();
            project.screens.retain(|s| s.id != screen_id);
            if project.screens.len() == initial_len {
                return Err(ProtoscopeError::ScreenNotFound {
                    project_id: project.id.clone(),
                    screen_id: screen_id.to_string(),
                });
            }
            Ok(())
        })
    }

    /// Create a hotspot from a drawn rectangle. Invalid geometry (negative
    /// or sub-minimum dimensions, origin outside the image) is rejected
    /// before anything is stored.
    pub fn add_hotspot(
        &mut self,
        project_id: &str,
        screen_id: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        target_screen_id: Option<String>,
        label: Option<String>,
    ) -> Result<Hotspot, ProtoscopeError> {
        let rect = HotspotRect::new(x, y, width, height)
            .map_err(|reason| ProtoscopeError::InvalidHotspotGeometry { reason })?;
        self.mutate_screen(project_id, screen_id, |screen| {
            let hotspot = Hotspot::new(rect, target_screen_id, label);
            screen.hotspots.push(hotspot.clone());
            Ok(hotspot)
        })
    }

    pub fn update_hotspot(
        &mut self,
        project_id: &str,
        screen_id: &str,
        hotspot_id: &str,
        update: HotspotUpdate,
    ) -> Result<(), ProtoscopeError> {
        self.mutate_screen(project_id, screen_id, |screen| {
            let hotspot = screen.hotspot_mut(hotspot_id).ok_or_else(|| {
                ProtoscopeError::HotspotNotFound {
                    screen_id: screen_id.to_string(),
                    hotspot_id: hotspot_id.to_string(),
                }
            })?;
            if let Some(rect) = update.rect {
                hotspot.rect = rect;
            }
            if let Some(target) = update.target_screen_id {
                hotspot.target_screen_id = target;
            }
            if let Some(label) = update.label {
                hotspot.label = label;
            }
            Ok(())
        })
    }

    pub fn delete_hotspot(
        &mut self,
        project_id: &str,
        screen_id: &str,
        hotspot_id: &str,
    ) -> Result<(), ProtoscopeError> {
        self.mutate_screen(project_id, screen_id, |screen| {
            let initial_len = screen.hotspots.len();
            screen.hotspots.retain(|h| h.id != hotspot_id);
            if screen.hotspots.len() == initial_len {
                return Err(ProtoscopeError::HotspotNotFound {
                    screen_id: screen_id.to_string(),
                    hotspot_id: hotspot_id.to_string(),
                });
            }
            Ok(())
        })
    }

    /// Run a mutation against a copy of one project, touch its updated_at,
    /// persist the collection, then commit to memory
    fn mutate_project<F, R>(&mut self, project_id: &str, mutate: F) -> Result<R, ProtoscopeError>
    where
        F: FnOnce(&mut Project) -> Result<R, ProtoscopeError>,
    {
        let mut updated = self.projects.clone();
        let project = updated
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| ProtoscopeError::ProjectNotFound {
                project_id: project_id.to_string(),
            })?;

        let result = mutate(project)?;
        project.touch();
        self.commit(updated)?;
        Ok(result)
    }

    fn mutate_screen<F, R>(
        &mut self,
        project_id: &str,
        screen_id: &str,
        mutate: F,
    ) -> Result<R, ProtoscopeError>
    where
        F: FnOnce(&mut Screen) -> Result<R, ProtoscopeError>,
    {
        let project_id_owned = project_id.to_string();
        self.mutate_project(project_id, |project| {
            let screen = project.screen_mut(screen_id).ok_or_else(|| {
                ProtoscopeError::ScreenNotFound {
                    project_id: project_id_owned,
                    screen_id: screen_id.to_string(),
                }
            })?;
            mutate(screen)
        })
    }

    fn commit(&mut self, updated: Vec<Project>) -> Result<(), ProtoscopeError> {
        self.storage.store_projects(&updated)?;
        self.projects = updated;
        Ok(())
    }
}
