//! Workspace membership and the single active workspace.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(pub u32);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug)]
pub struct Workspace {
    id: WorkspaceId,
    pub name: String,
    /// Stack order, most recently focused first.
    windows: Vec<WindowId>,
    master: Option<WindowId>,
}

impl Workspace {
    pub fn new(id: WorkspaceId, name: String) -> Self {
        Self {
            id,
            name,
            windows: Vec::new(),
            master: None,
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn windows(&self) -> &[WindowId] {
        &self.windows
    }

    pub fn master(&self) -> Option<WindowId> {
        self.master
    }

    /// Records the master. Ignored for windows that are not members.
    pub fn set_master(&mut self, window: WindowId) {
        if self.windows.contains(&window) {
            self.master = Some(window);
        }
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.windows.contains(&window)
    }

    fn add_front(&mut self, window: WindowId) {
        self.windows.retain(|w| *w != window);
        self.windows.insert(0, window);
    }

    fn remove(&mut self, window: WindowId) -> bool {
        let len = self.windows.len();
        self.windows.retain(|w| *w != window);
        if self.master == Some(window) {
            self.master = None;
        }
        self.windows.len() != len
    }
}

#[derive(Debug)]
pub struct WorkspaceManager {
    workspaces: BTreeMap<WorkspaceId, Workspace>,
    active: WorkspaceId,
}

impl WorkspaceManager {
    /// Creates workspaces 1..=n for the given names, or a single workspace 1 without names.
    ///
    /// Workspace 1 starts active.
    pub fn new(names: &[String]) -> Self {
        let mut this = Self {
            workspaces: BTreeMap::new(),
            active: WorkspaceId(1),
        };
        this.ensure(WorkspaceId(1));
        this.apply_names(names);
        this
    }

    /// Gives workspaces 1..=n the configured names, creating missing ones.
    pub fn apply_names(&mut self, names: &[String]) {
        for (idx, name) in names.iter().enumerate() {
            let id = WorkspaceId(idx as u32 + 1);
            self.ensure(id);
            if let Some(ws) = self.workspaces.get_mut(&id) {
                ws.name.clone_from(name);
            }
        }
    }

    pub fn active_id(&self) -> WorkspaceId {
        self.active
    }

    pub fn active(&self) -> &Workspace {
        &self.workspaces[&self.active]
    }

    pub fn active_mut(&mut self) -> &mut Workspace {
        self.workspaces
            .get_mut(&self.active)
            .expect("active workspace always exists")
    }

    pub fn get(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(&id)
    }

    pub fn get_mut(&mut self, id: WorkspaceId) -> Option<&mut Workspace> {
        self.workspaces.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.values()
    }

    /// Creates an empty workspace if absent. Returns `true` if it was created.
    pub fn ensure(&mut self, id: WorkspaceId) -> bool {
        if self.workspaces.contains_key(&id) {
            return false;
        }

        debug!("creating workspace {id}");
        self.workspaces
            .insert(id, Workspace::new(id, id.to_string()));
        true
    }

    /// Makes `id` the active workspace, creating it if needed.
    ///
    /// Returns the previously active workspace, or `None` if `id` was already active.
    pub fn activate(&mut self, id: WorkspaceId) -> Option<WorkspaceId> {
        self.ensure(id);
        if self.active == id {
            return None;
        }
        Some(std::mem::replace(&mut self.active, id))
    }

    /// Adds the window at the front of the workspace, removing it from any other workspace.
    pub fn add_front(&mut self, id: WorkspaceId, window: WindowId) {
        self.remove(window);
        self.ensure(id);
        if let Some(ws) = self.workspaces.get_mut(&id) {
            ws.add_front(window);
        }
    }

    /// Moves a member to the front of its workspace. Returns its workspace.
    pub fn move_to_front(&mut self, window: WindowId) -> Option<WorkspaceId> {
        let ws = self.workspaces.values_mut().find(|ws| ws.contains(window))?;
        ws.add_front(window);
        Some(ws.id)
    }

    /// Removes the window from whichever workspace holds it, clearing it as master.
    pub fn remove(&mut self, window: WindowId) -> Option<WorkspaceId> {
        self.workspaces
            .values_mut()
            .find_map(|ws| ws.remove(window).then_some(ws.id))
    }

    pub fn workspace_of(&self, window: WindowId) -> Option<WorkspaceId> {
        self.workspaces
            .values()
            .find_map(|ws| ws.contains(window).then_some(ws.id))
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn ids(n: usize) -> Vec<WindowId> {
        let mut map = SlotMap::<WindowId, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn named_workspaces_get_sequential_ids() {
        let manager = WorkspaceManager::new(&[String::from("web"), String::from("code")]);
        let names: Vec<_> = manager.iter().map(|ws| (ws.id().0, ws.name.as_str())).collect();
        assert_eq!(names, [(1, "web"), (2, "code")]);
        assert_eq!(manager.active_id(), WorkspaceId(1));
    }

    #[test]
    fn window_belongs_to_one_workspace() {
        let w = ids(1);
        let mut manager = WorkspaceManager::new(&[]);
        manager.add_front(WorkspaceId(1), w[0]);
        manager.add_front(WorkspaceId(2), w[0]);

        assert!(manager.get(WorkspaceId(1)).unwrap().windows().is_empty());
        assert_eq!(manager.workspace_of(w[0]), Some(WorkspaceId(2)));
    }

    #[test]
    fn removing_master_clears_it() {
        let w = ids(3);
        let mut manager = WorkspaceManager::new(&[]);
        for id in &w {
            manager.add_front(WorkspaceId(1), *id);
        }
        manager.active_mut().set_master(w[0]);

        assert_eq!(manager.remove(w[1]), Some(WorkspaceId(1)));
        assert_eq!(manager.active().master(), Some(w[0]));

        manager.remove(w[0]);
        assert_eq!(manager.active().master(), None);
        assert_eq!(manager.active().windows(), [w[2]]);
        assert_eq!(manager.remove(w[0]), None);
    }

    #[test]
    fn master_must_be_member() {
        let w = ids(2);
        let mut manager = WorkspaceManager::new(&[]);
        manager.add_front(WorkspaceId(1), w[0]);
        manager.active_mut().set_master(w[1]);
        assert_eq!(manager.active().master(), None);
    }

    #[test]
    fn move_to_front_reorders() {
        let w = ids(3);
        let mut manager = WorkspaceManager::new(&[]);
        for id in &w {
            manager.add_front(WorkspaceId(1), *id);
        }
        assert_eq!(manager.active().windows(), [w[2], w[1], w[0]]);

        manager.move_to_front(w[0]);
        assert_eq!(manager.active().windows(), [w[0], w[2], w[1]]);
    }

    #[test]
    fn activate_creates_and_reports_previous() {
        let mut manager = WorkspaceManager::new(&[]);
        assert_eq!(manager.activate(WorkspaceId(2)), Some(WorkspaceId(1)));
        assert_eq!(manager.active_id(), WorkspaceId(2));
        assert!(manager.active().windows().is_empty());
        assert_eq!(manager.activate(WorkspaceId(2)), None);
    }
}
