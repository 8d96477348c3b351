//! Boundary with the display-protocol collaborator.
//!
//! Wire encoding lives outside this crate. The collaborator turns client messages into
//! [`SurfaceEvent`]s for [`State::handle_surface_event`](crate::state::State::handle_surface_event)
//! and receives [`ClientRequest`]s through a [`ProtocolHandle`].

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::input::{Axis, ButtonState, KeyState, Modifiers};
use crate::layer::{Layer, LayerSurfaceState};
use crate::utils::{Point, Rectangle, ResizeEdge, Size};

/// Opaque identifier of a client surface, assigned by the protocol collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Surface lifecycle events, delivered in arrival order per surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    NewToplevel {
        surface: SurfaceId,
        title: Option<String>,
        app_id: Option<String>,
    },
    ToplevelMapped {
        surface: SurfaceId,
    },
    /// The toplevel committed a buffer of the given size.
    ToplevelCommitted {
        surface: SurfaceId,
        size: Size<i32>,
    },
    ToplevelUnmapped {
        surface: SurfaceId,
    },
    ToplevelDestroyed {
        surface: SurfaceId,
    },
    TitleChanged {
        surface: SurfaceId,
        title: Option<String>,
    },
    AppIdChanged {
        surface: SurfaceId,
        app_id: Option<String>,
    },
    RequestMove {
        surface: SurfaceId,
    },
    RequestResize {
        surface: SurfaceId,
        edges: ResizeEdge,
    },
    NewSubsurface {
        parent: SurfaceId,
        surface: SurfaceId,
        offset: Point<i32>,
        size: Size<i32>,
    },
    SubsurfaceDestroyed {
        surface: SurfaceId,
    },
    /// A popup positioned relative to its parent's origin.
    NewPopup {
        surface: SurfaceId,
        parent: SurfaceId,
        geometry: Rectangle<i32>,
    },
    PopupMapped {
        surface: SurfaceId,
    },
    PopupUnmapped {
        surface: SurfaceId,
    },
    PopupDestroyed {
        surface: SurfaceId,
    },
    NewLayerSurface {
        surface: SurfaceId,
        output: Option<String>,
        layer: Layer,
        namespace: String,
    },
    LayerCommitted {
        surface: SurfaceId,
        state: LayerSurfaceState,
        has_buffer: bool,
    },
    LayerUnmapped {
        surface: SurfaceId,
    },
    LayerDestroyed {
        surface: SurfaceId,
    },
}

/// Cursor images the compositor asks the input collaborator to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorIcon {
    Default,
    Grabbing,
    NResize,
    SResize,
    EResize,
    WResize,
    NeResize,
    NwResize,
    SeResize,
    SwResize,
}

/// Requests the core issues towards clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    ConfigureToplevel {
        surface: SurfaceId,
        size: Size<i32>,
    },
    ConfigureLayer {
        surface: SurfaceId,
        size: Size<i32>,
    },
    SetActivated {
        surface: SurfaceId,
        activated: bool,
    },
    Close {
        surface: SurfaceId,
    },
    PointerEnter {
        surface: SurfaceId,
        location: Point<f64>,
    },
    PointerLeave {
        surface: SurfaceId,
    },
    PointerMotion {
        surface: SurfaceId,
        time: u32,
        location: Point<f64>,
    },
    PointerButton {
        surface: SurfaceId,
        time: u32,
        button: u32,
        state: ButtonState,
    },
    PointerAxis {
        surface: SurfaceId,
        time: u32,
        axis: Axis,
        amount: f64,
    },
    KeyboardEnter {
        surface: SurfaceId,
        modifiers: Modifiers,
    },
    KeyboardLeave {
        surface: SurfaceId,
    },
    KeyboardKey {
        surface: SurfaceId,
        time: u32,
        keycode: u32,
        state: KeyState,
    },
    KeyboardModifiers {
        surface: SurfaceId,
        modifiers: Modifiers,
    },
    SetCursor {
        icon: CursorIcon,
    },
}

impl ClientRequest {
    /// Surface the request is addressed to, if any.
    pub fn surface(&self) -> Option<SurfaceId> {
        match self {
            Self::ConfigureToplevel { surface, .. }
            | Self::ConfigureLayer { surface, .. }
            | Self::SetActivated { surface, .. }
            | Self::Close { surface }
            | Self::PointerEnter { surface, .. }
            | Self::PointerLeave { surface }
            | Self::PointerMotion { surface, .. }
            | Self::PointerButton { surface, .. }
            | Self::PointerAxis { surface, .. }
            | Self::KeyboardEnter { surface, .. }
            | Self::KeyboardLeave { surface }
            | Self::KeyboardKey { surface, .. }
            | Self::KeyboardModifiers { surface, .. } => Some(*surface),
            Self::SetCursor { .. } => None,
        }
    }
}

/// Outgoing half of the protocol collaborator.
pub trait ProtocolHandle {
    fn send(&mut self, request: ClientRequest);
}

/// Protocol handle that keeps every request, shared between clones.
///
/// Tests use it to observe what clients would receive.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    requests: Rc<RefCell<Vec<ClientRequest>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all recorded requests.
    pub fn take(&self) -> Vec<ClientRequest> {
        self.requests.take()
    }
}

impl ProtocolHandle for Recorder {
    fn send(&mut self, request: ClientRequest) {
        trace!("client request: {request:?}");
        self.requests.borrow_mut().push(request);
    }
}
