//! Surface lifecycle handlers.
//!
//! Every handler tolerates events for surfaces it does not know: the protocol collaborator may
//! deliver a destroy after the compositor already gave up on a surface, or an unmap twice.

use cairn_ipc::Event;
use tracing::{debug, warn};

use super::State;
use crate::layer::{self, Layer, LayerSurface, LayerSurfaceState};
use crate::protocol::{ClientRequest, SurfaceEvent, SurfaceId};
use crate::registry::SurfaceRole;
use crate::scene::{NodeOwner, SceneError};
use crate::utils::{Point, Rectangle, Size};
use crate::window::popup::{Popup, PopupParent};
use crate::window::{Window, WindowId, WindowNodes, WindowState};

impl State {
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        let _span = tracy_client::span!("State::handle_surface_event");

        match event {
            SurfaceEvent::NewToplevel {
                surface,
                title,
                app_id,
            } => self.on_new_toplevel(surface, title, app_id),
            SurfaceEvent::ToplevelMapped { surface } => self.on_toplevel_mapped(surface),
            SurfaceEvent::ToplevelCommitted { surface, size } => {
                self.on_toplevel_committed(surface, size)
            }
            SurfaceEvent::ToplevelUnmapped { surface } => self.on_toplevel_unmapped(surface),
            SurfaceEvent::ToplevelDestroyed { surface } => self.on_toplevel_destroyed(surface),
            SurfaceEvent::TitleChanged { surface, title } => {
                if let Some(win) = self.window_mut(surface) {
                    win.title = title;
                    self.window_changed(surface);
                }
            }
            SurfaceEvent::AppIdChanged { surface, app_id } => {
                if let Some(win) = self.window_mut(surface) {
                    win.app_id = app_id;
                    self.window_changed(surface);
                }
            }
            SurfaceEvent::RequestMove { surface } => {
                if let Some(window) = self.grab_candidate(surface) {
                    self.begin_move(window);
                }
            }
            SurfaceEvent::RequestResize { surface, edges } => {
                if let Some(window) = self.grab_candidate(surface) {
                    self.begin_resize(window, edges);
                }
            }
            SurfaceEvent::NewSubsurface {
                parent,
                surface,
                offset,
                size,
            } => self.on_new_subsurface(parent, surface, offset, size),
            SurfaceEvent::SubsurfaceDestroyed { surface } => self.on_subsurface_destroyed(surface),
            SurfaceEvent::NewPopup {
                surface,
                parent,
                geometry,
            } => self.on_new_popup(surface, parent, geometry),
            SurfaceEvent::PopupMapped { surface } => self.set_popup_mapped(surface, true),
            SurfaceEvent::PopupUnmapped { surface } => self.set_popup_mapped(surface, false),
            SurfaceEvent::PopupDestroyed { surface } => self.on_popup_destroyed(surface),
            SurfaceEvent::NewLayerSurface {
                surface,
                output,
                layer,
                namespace,
            } => self.on_new_layer_surface(surface, output, layer, namespace),
            SurfaceEvent::LayerCommitted {
                surface,
                state,
                has_buffer,
            } => self.on_layer_committed(surface, state, has_buffer),
            SurfaceEvent::LayerUnmapped { surface } => self.on_layer_unmapped(surface),
            SurfaceEvent::LayerDestroyed { surface } => self.on_layer_destroyed(surface),
        }

        self.flush_layout();
    }

    fn window_mut(&mut self, surface: SurfaceId) -> Option<&mut Window> {
        let id = self.registry.window_for_surface(surface)?;
        self.registry.windows.get_mut(id)
    }

    // =========================================================================
    // Toplevels
    // =========================================================================

    fn on_new_toplevel(
        &mut self,
        surface: SurfaceId,
        title: Option<String>,
        app_id: Option<String>,
    ) {
        if let Some(role) = self.registry.role(surface) {
            warn!("new toplevel {surface:?} already has role {role:?}");
            return;
        }

        let border = &self.config.layout.border;
        let scene = &mut self.scene;
        let result = self
            .registry
            .windows
            .try_insert_with_key(|id| -> Result<Window, SceneError> {
                let nodes = WindowNodes::create(scene, id, surface, border)?;
                Ok(Window::new(id, surface, nodes, title, app_id))
            });

        let id = match result {
            Ok(id) => id,
            Err(err) => {
                warn!("error creating window for {surface:?}: {err}");
                return;
            }
        };

        debug!("new toplevel {surface:?} as {id:?}");
        self.registry
            .assign_role(surface, SurfaceRole::Toplevel(id));

        // Hidden until mapped.
        if let Some(win) = self.registry.windows.get(id) {
            win.set_visible(&mut self.scene, false);
        }

        // Let the client pick its initial size.
        self.send(ClientRequest::ConfigureToplevel {
            surface,
            size: Size::default(),
        });
    }

    fn on_toplevel_mapped(&mut self, surface: SurfaceId) {
        let Some(id) = self.registry.window_for_surface(surface) else {
            debug!("map of unknown toplevel {surface:?}");
            return;
        };
        let active = self.workspaces.active_id();

        let win = &mut self.registry.windows[id];
        if win.is_mapped() {
            return;
        }
        win.set_state(WindowState::Mapped);
        win.workspace = Some(active);
        win.set_visible(&mut self.scene, true);

        self.workspaces.add_front(active, id);
        self.queue_layout();
        self.focus_view(id, surface, false);
        self.window_changed(surface);
    }

    fn on_toplevel_committed(&mut self, surface: SurfaceId, size: Size<i32>) {
        let Some(id) = self.registry.window_for_surface(surface) else {
            return;
        };
        self.registry.windows[id].set_buffer_size(&mut self.scene, size);
    }

    fn on_toplevel_unmapped(&mut self, surface: SurfaceId) {
        let Some(id) = self.registry.window_for_surface(surface) else {
            debug!("unmap of unknown toplevel {surface:?}");
            return;
        };
        self.unmap_window(id);
    }

    fn unmap_window(&mut self, id: WindowId) {
        let win = &mut self.registry.windows[id];
        if !win.is_mapped() {
            return;
        }

        debug!("unmapping {id:?}");
        win.set_state(WindowState::Unmapped);
        win.workspace = None;
        win.set_visible(&mut self.scene, false);

        self.workspaces.remove(id);
        self.animations.cancel(id);
        self.window_left_layout(id);
        self.emit(Event::WindowClosed { id: id.to_u64() });
    }

    fn on_toplevel_destroyed(&mut self, surface: SurfaceId) {
        let Some(id) = self.registry.window_for_surface(surface) else {
            debug!("destroy of unknown toplevel {surface:?}");
            return;
        };

        // Clients may destroy without unmapping first.
        self.unmap_window(id);

        debug!("destroying {id:?}");
        self.animations.cancel(id);
        self.registry.forget_surface(surface);
        let Some(mut win) = self.registry.windows.remove(id) else {
            return;
        };
        win.set_state(WindowState::Destroyed);

        for subsurface in win.subsurfaces.drain(..) {
            self.registry.forget_surface(subsurface.surface);
            self.forget_pointer_surface(subsurface.surface);
        }
        win.nodes().destroy(&mut self.scene);
        self.forget_pointer_surface(surface);
        self.window_left_layout(id);
    }

    /// Sends a property update for a mapped window.
    fn window_changed(&mut self, surface: SurfaceId) {
        let Some(id) = self.registry.window_for_surface(surface) else {
            return;
        };
        if let Some(window) = self.ipc_window(id) {
            self.emit(Event::WindowOpenedOrChanged { window });
        }
    }

    /// Window whose surface currently has pointer focus, so a client cannot start a grab while
    /// the pointer is elsewhere.
    fn grab_candidate(&self, surface: SurfaceId) -> Option<WindowId> {
        let id = self.registry.window_for_surface(surface)?;
        let focus = self.input.pointer_focus?;
        let focus_window = match self.registry.role(focus)? {
            SurfaceRole::Toplevel(window) | SurfaceRole::Subsurface(window) => window,
            SurfaceRole::Popup(popup) => self.registry.popup_root(popup)?,
            SurfaceRole::Layer(_) => return None,
        };

        if focus_window != id {
            debug!("ignoring grab request from {surface:?} without pointer focus");
            return None;
        }
        Some(id)
    }

    fn forget_pointer_surface(&mut self, surface: SurfaceId) {
        if self.input.pointer_focus == Some(surface) {
            self.input.pointer_focus = None;
        }
    }

    // =========================================================================
    // Subsurfaces
    // =========================================================================

    fn on_new_subsurface(
        &mut self,
        parent: SurfaceId,
        surface: SurfaceId,
        offset: Point<i32>,
        size: Size<i32>,
    ) {
        let window = match self.registry.role(parent) {
            Some(SurfaceRole::Toplevel(window) | SurfaceRole::Subsurface(window)) => window,
            role => {
                debug!("ignoring subsurface {surface:?} of {parent:?} with role {role:?}");
                return;
            }
        };
        if self.registry.role(surface).is_some() {
            warn!("subsurface {surface:?} already has a role");
            return;
        }

        let Some(win) = self.registry.windows.get_mut(window) else {
            return;
        };
        if let Err(err) = win.add_subsurface(&mut self.scene, surface, offset, size) {
            warn!("error creating subsurface {surface:?}: {err}");
            return;
        }
        self.registry
            .assign_role(surface, SurfaceRole::Subsurface(window));
    }

    fn on_subsurface_destroyed(&mut self, surface: SurfaceId) {
        let Some(SurfaceRole::Subsurface(window)) = self.registry.role(surface) else {
            return;
        };
        self.registry.forget_surface(surface);
        self.forget_pointer_surface(surface);
        if let Some(win) = self.registry.windows.get_mut(window) {
            win.remove_subsurface(&mut self.scene, surface);
        }
    }

    // =========================================================================
    // Popups
    // =========================================================================

    fn on_new_popup(&mut self, surface: SurfaceId, parent: SurfaceId, geometry: Rectangle<i32>) {
        if self.registry.role(surface).is_some() {
            warn!("popup {surface:?} already has a role");
            return;
        }

        let (parent, root, parent_node) = match self.registry.role(parent) {
            Some(SurfaceRole::Toplevel(window)) => {
                let Some(win) = self.registry.windows.get(window) else {
                    return;
                };
                (PopupParent::Window(window), window, win.nodes().popups)
            }
            Some(SurfaceRole::Popup(popup)) => {
                let Some(p) = self.registry.popups.get(popup) else {
                    return;
                };
                (PopupParent::Popup(popup), p.root, p.node)
            }
            Some(SurfaceRole::Layer(_)) => {
                warn!("popups of layer surfaces are not supported, ignoring {surface:?}");
                return;
            }
            role => {
                debug!("ignoring popup {surface:?} of {parent:?} with role {role:?}");
                return;
            }
        };

        let scene = &mut self.scene;
        let result = self
            .registry
            .popups
            .try_insert_with_key(|id| -> Result<Popup, SceneError> {
                let node = scene.create_tree(parent_node)?;
                let content = match scene.create_buffer(node, surface, geometry.size) {
                    Ok(content) => content,
                    Err(err) => {
                        scene.destroy(node);
                        return Err(err);
                    }
                };
                scene.set_position(node, geometry.loc);
                scene.set_enabled(node, false);
                scene.set_owner(node, NodeOwner::Popup(id));

                Ok(Popup {
                    surface,
                    parent,
                    root,
                    geometry,
                    node,
                    content,
                    mapped: false,
                })
            });

        match result {
            Ok(id) => {
                debug!("new popup {surface:?} as {id:?}");
                self.registry.assign_role(surface, SurfaceRole::Popup(id));
            }
            Err(err) => warn!("error creating popup {surface:?}: {err}"),
        }
    }

    fn set_popup_mapped(&mut self, surface: SurfaceId, mapped: bool) {
        let Some(id) = self.registry.popup_for_surface(surface) else {
            return;
        };
        let popup = &mut self.registry.popups[id];
        popup.mapped = mapped;
        self.scene.set_enabled(popup.node, mapped);
        if !mapped {
            self.forget_pointer_surface(surface);
        }
    }

    fn on_popup_destroyed(&mut self, surface: SurfaceId) {
        let Some(id) = self.registry.popup_for_surface(surface) else {
            return;
        };
        self.registry.forget_surface(surface);
        self.forget_pointer_surface(surface);
        if let Some(popup) = self.registry.popups.remove(id) {
            // Takes nested popups' nodes along; their records go with their own destroy.
            self.scene.destroy(popup.node);
        }
    }

    // =========================================================================
    // Layer surfaces
    // =========================================================================

    fn on_new_layer_surface(
        &mut self,
        surface: SurfaceId,
        output: Option<String>,
        layer: Layer,
        namespace: String,
    ) {
        if self.registry.role(surface).is_some() {
            warn!("layer surface {surface:?} already has a role");
            return;
        }

        let output_id = match &output {
            Some(name) => self.registry.output_by_name(name),
            None => self.registry.first_output(),
        };
        let Some(output_id) = output_id else {
            warn!("no output {output:?} for layer surface {namespace}, ignoring");
            return;
        };

        let scene = &mut self.scene;
        let tier = scene.tier(layer.tier());
        let result = self
            .registry
            .layers
            .try_insert_with_key(|id| -> Result<LayerSurface, SceneError> {
                let node = scene.create_tree(tier)?;
                let content = match scene.create_buffer(node, surface, Size::default()) {
                    Ok(content) => content,
                    Err(err) => {
                        scene.destroy(node);
                        return Err(err);
                    }
                };
                scene.set_enabled(node, false);
                scene.set_owner(node, NodeOwner::Layer(id));

                Ok(LayerSurface {
                    surface,
                    output: output_id,
                    layer,
                    namespace,
                    state: LayerSurfaceState::default(),
                    configured: false,
                    mapped: false,
                    node,
                    content,
                    geometry: Rectangle::default(),
                })
            });

        match result {
            Ok(id) => {
                debug!("new layer surface {surface:?} as {id:?}");
                self.registry.assign_role(surface, SurfaceRole::Layer(id));
            }
            Err(err) => warn!("error creating layer surface {surface:?}: {err}"),
        }
    }

    fn on_layer_committed(&mut self, surface: SurfaceId, state: LayerSurfaceState, has_buffer: bool) {
        let Some(id) = self.registry.layer_for_surface(surface) else {
            return;
        };
        let output_id = self.registry.layers[id].output;
        let Some(output) = self.registry.outputs.get(output_id) else {
            return;
        };

        let Some(geometry) = layer::place(output.geometry, &state) else {
            warn!("layer surface {surface:?} committed with zero size, ignoring");
            return;
        };

        let layer = &mut self.registry.layers[id];
        layer.state = state;

        let needs_configure = !layer.configured || layer.geometry.size != geometry.size;
        layer.geometry = geometry;
        layer.configured = true;
        self.scene.set_position(layer.node, geometry.loc);
        self.scene.set_buffer_size(layer.content, geometry.size);

        if has_buffer && !layer.mapped {
            debug!("mapping layer surface {}", layer.namespace);
            layer.mapped = true;
        } else if !has_buffer && layer.mapped {
            // A null buffer unmaps.
            layer.mapped = false;
        }
        self.scene.set_enabled(layer.node, layer.mapped);
        let mapped = layer.mapped;

        if needs_configure {
            self.send(ClientRequest::ConfigureLayer {
                surface,
                size: geometry.size,
            });
        }
        if !mapped {
            self.forget_pointer_surface(surface);
        }
        self.update_reserved(output_id);
    }

    fn on_layer_unmapped(&mut self, surface: SurfaceId) {
        let Some(id) = self.registry.layer_for_surface(surface) else {
            return;
        };
        let layer = &mut self.registry.layers[id];
        layer.mapped = false;
        self.scene.set_enabled(layer.node, false);
        let output = layer.output;

        self.forget_pointer_surface(surface);
        self.update_reserved(output);
    }

    fn on_layer_destroyed(&mut self, surface: SurfaceId) {
        let Some(id) = self.registry.layer_for_surface(surface) else {
            return;
        };
        self.registry.forget_surface(surface);
        self.forget_pointer_surface(surface);
        if let Some(layer) = self.registry.layers.remove(id) {
            self.scene.destroy(layer.node);
            self.update_reserved(layer.output);
        }
    }
}
