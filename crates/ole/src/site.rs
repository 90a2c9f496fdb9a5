/// Client site of the hosted component.
///
/// This is the object the hosted component calls back into while it is
/// being activated and for as long as it stays active: capability queries,
/// window context, activation notifications, command dispatch and the inert
/// storage surface. All state lives behind one `RefCell`; borrows are never
/// held across a call into the component because the component re-enters
/// the site from inside those calls.
use std::cell::RefCell;
use std::rc::Rc;

use webhost_domain::{ActivationState, PixelRect, WindowHandle};

use crate::component::{HostedComponent, InPlaceObject};
use crate::error::{ComponentError, ComponentResult, HostError, Refusal, E_UNEXPECTED};
use crate::geometry::Geometry;
use crate::identity::{CapabilityId, Dispatch, Facet};
use crate::storage_stub::{MonikerAssign, MonikerKind, StorageOp, StorageStub};

/// `CGID_DocHostCommandHandler`
pub const DOC_HOST_COMMAND_GROUP: u128 = 0xf38bc242_b950_11d1_8918_00c04fc2c836;
/// `OLECMDID_SHOWSCRIPTERROR`
pub const SHOW_SCRIPT_ERROR: u32 = 40;

/// Placement answer for `IOleInPlaceSite::GetWindowContext`.
///
/// No frame or document window object is ever provided; the hosted component
/// gets null for both and only this placement data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowContext {
    pub position: PixelRect,
    pub clip: PixelRect,
    pub frame: FrameInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub mdi_app: bool,
    pub frame_window: WindowHandle,
    pub accelerator_entries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The command was consumed; for script errors this means "keep running
    /// scripts, do not show a dialog".
    Handled,
    Acknowledged,
}

struct SiteState {
    state: ActivationState,
    rect: PixelRect,
    component: Option<Rc<dyn HostedComponent>>,
    in_place: Option<Rc<dyn InPlaceObject>>,
    control_window: Option<WindowHandle>,
}

pub struct HostSite {
    parent: WindowHandle,
    dispatch: Dispatch,
    geometry: Geometry,
    storage: StorageStub,
    inner: RefCell<SiteState>,
}

impl HostSite {
    pub fn new(parent: WindowHandle, rect: PixelRect, geometry: Geometry) -> Rc<Self> {
        Rc::new(Self {
            parent,
            dispatch: Dispatch::new(),
            geometry,
            storage: StorageStub,
            inner: RefCell::new(SiteState {
                state: ActivationState::Unbound,
                rect,
                component: None,
                in_place: None,
                control_window: None,
            }),
        })
    }

    pub fn parent(&self) -> WindowHandle {
        self.parent
    }

    pub fn state(&self) -> ActivationState {
        self.inner.borrow().state
    }

    pub fn bounding_rect(&self) -> PixelRect {
        self.inner.borrow().rect
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn set_state(&self, next: ActivationState) {
        let previous = std::mem::replace(&mut self.inner.borrow_mut().state, next);
        if previous != next {
            tracing::debug!(from = previous.as_str(), to = next.as_str(), "activation state");
        }
    }

    pub(crate) fn component(&self) -> Option<Rc<dyn HostedComponent>> {
        self.inner.borrow().component.clone()
    }

    pub(crate) fn in_place_object(&self) -> Option<Rc<dyn InPlaceObject>> {
        self.inner.borrow().in_place.clone()
    }

    pub(crate) fn attach_component(&self, component: Rc<dyn HostedComponent>) {
        self.inner.borrow_mut().component = Some(component);
        self.set_state(ActivationState::Created);
    }

    /// Forget every handle and hand back the component for teardown.
    pub(crate) fn detach(&self) -> Option<Rc<dyn HostedComponent>> {
        let mut inner = self.inner.borrow_mut();
        inner.in_place = None;
        inner.control_window = None;
        if inner.state != ActivationState::Unbound {
            inner.state = ActivationState::Deactivated;
        }
        inner.component.take()
    }

    // ---- identity ----
    //
    // The capability table and use count of the neutral hosting contract.
    // On Windows the COM identity of `OleSite` (QueryInterface, AddRef,
    // Release) is generated by `windows-core` and does not pass through here.

    pub fn query_capability(&self, id: CapabilityId) -> Result<Facet, HostError> {
        self.dispatch.query(id)
    }

    pub fn add_reference(&self) -> u32 {
        self.dispatch.add_ref()
    }

    pub fn release_reference(&self) -> u32 {
        self.dispatch.release()
    }

    pub fn reference_count(&self) -> u32 {
        self.dispatch.count()
    }

    // ---- geometry ----

    pub fn window_context(&self) -> WindowContext {
        let rect = self.bounding_rect();
        WindowContext {
            position: rect,
            clip: rect,
            frame: FrameInfo {
                mdi_app: false,
                frame_window: self.parent,
                accelerator_entries: 0,
            },
        }
    }

    /// Store `rect`, push its HiMetric size as the content extent and, when
    /// in-place active, push it as both position and clip rect.
    pub fn set_bounding_rect(&self, rect: PixelRect) {
        self.inner.borrow_mut().rect = rect;

        let extent = self.geometry.to_metric(rect).size();
        if let Some(component) = self.component() {
            if let Err(error) = component.set_extent(extent) {
                tracing::warn!(%error, cx = extent.cx, cy = extent.cy, "SetExtent failed");
            }
        }

        if let Some(in_place) = self.in_place_object() {
            if let Err(error) = in_place.set_object_rects(rect, rect) {
                tracing::warn!(%error, ?rect, "SetObjectRects failed");
            }
        }
    }

    /// Window created by the hosted component, looked up once it is in-place
    /// active and cached until in-place deactivation.
    pub fn resolve_control_window(&self) -> Option<WindowHandle> {
        if let Some(window) = self.inner.borrow().control_window {
            return Some(window);
        }

        let in_place = self.in_place_object()?;
        match in_place.window() {
            Ok(window) if !window.is_null() => {
                self.inner.borrow_mut().control_window = Some(window);
                Some(window)
            }
            Ok(_) => None,
            Err(error) => {
                tracing::debug!(%error, "control window not available");
                None
            }
        }
    }

    pub(crate) fn show_control_window(&self) {
        if let Some(in_place) = self.in_place_object() {
            if let Err(error) = in_place.show() {
                tracing::warn!(%error, "failed to show control window");
            }
        }
    }

    // ---- in-place site ----

    pub fn window(&self) -> WindowHandle {
        self.parent
    }

    pub fn can_in_place_activate(&self) -> Result<(), Refusal> {
        Ok(())
    }

    /// Lock the component running, bind its in-place object and push the
    /// current rect to it.
    ///
    /// A deactivated site stays deactivated; a late notification is refused.
    pub fn on_in_place_activate(&self) -> ComponentResult<()> {
        if self.state() == ActivationState::Deactivated {
            tracing::warn!("in-place activation after deactivation refused");
            return Err(ComponentError::new(E_UNEXPECTED, "site already deactivated"));
        }

        let Some(component) = self.component() else {
            tracing::warn!("in-place activation notified before the component was attached");
            return Ok(());
        };

        if let Err(error) = component.lock_running(true) {
            tracing::warn!(%error, "OleLockRunning failed");
        }

        let in_place = component.in_place_object()?;
        self.inner.borrow_mut().in_place = Some(in_place.clone());
        self.set_state(ActivationState::InPlaceActive);

        let rect = self.bounding_rect();
        in_place.set_object_rects(rect, rect)
    }

    pub fn on_ui_activate(&self) {
        if self.state().is_in_place() {
            self.set_state(ActivationState::UiActive);
        }
    }

    /// UI deactivation drops back to plain in-place activity; the component
    /// keeps rendering (and navigating) until it is in-place deactivated.
    pub fn on_ui_deactivate(&self, _undoable: bool) {
        if self.state() == ActivationState::UiActive {
            self.set_state(ActivationState::InPlaceActive);
        }
    }

    pub fn on_in_place_deactivate(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.in_place = None;
            inner.control_window = None;
        }
        self.set_state(ActivationState::Deactivated);
    }

    pub fn on_pos_rect_change(&self, _rect: PixelRect) -> Result<(), Refusal> {
        Err(Refusal::NotImplemented)
    }

    pub fn scroll(&self) -> Result<(), Refusal> {
        Err(Refusal::NotImplemented)
    }

    pub fn discard_undo_state(&self) -> Result<(), Refusal> {
        Err(Refusal::NotImplemented)
    }

    pub fn deactivate_and_undo(&self) -> Result<(), Refusal> {
        Err(Refusal::NotImplemented)
    }

    pub fn context_sensitive_help(&self) -> Result<(), Refusal> {
        Err(Refusal::NotImplemented)
    }

    // ---- client site ----

    pub fn save_object(&self) -> Result<(), Refusal> {
        Err(Refusal::NotImplemented)
    }

    pub fn moniker(&self, assign: Option<MonikerAssign>, which: Option<MonikerKind>) -> Refusal {
        self.storage.moniker(assign, which)
    }

    pub fn container(&self) -> Result<(), Refusal> {
        Err(Refusal::NoInterface)
    }

    pub fn show_object(&self) -> Result<(), Refusal> {
        Ok(())
    }

    pub fn on_show_window(&self, _show: bool) -> Result<(), Refusal> {
        Ok(())
    }

    pub fn request_new_object_layout(&self) -> Result<(), Refusal> {
        Err(Refusal::NotImplemented)
    }

    // ---- command target ----

    pub fn exec(&self, group: Option<u128>, command_id: u32) -> ExecOutcome {
        if group == Some(DOC_HOST_COMMAND_GROUP) && command_id == SHOW_SCRIPT_ERROR {
            tracing::debug!("suppressing script error dialog");
            return ExecOutcome::Handled;
        }
        ExecOutcome::Acknowledged
    }

    pub fn query_status(&self, _group: Option<u128>) -> Result<(), Refusal> {
        Ok(())
    }

    // ---- storage ----

    pub fn storage(&self, op: StorageOp) -> Result<(), Refusal> {
        self.storage.call(op)
    }
}

impl std::fmt::Debug for HostSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HostSite")
            .field("parent", &self.parent)
            .field("state", &inner.state)
            .field("rect", &inner.rect)
            .field("in_place", &inner.in_place.is_some())
            .field("control_window", &inner.control_window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FixedDpi;

    fn site() -> Rc<HostSite> {
        HostSite::new(
            WindowHandle(0x42),
            PixelRect::new(0, 0, 800, 600),
            Geometry::new(Box::new(FixedDpi::default())),
        )
    }

    #[test]
    fn window_context_reports_parent_frame_and_identical_rects() {
        let site = site();
        let context = site.window_context();

        assert_eq!(context.position, PixelRect::new(0, 0, 800, 600));
        assert_eq!(context.clip, context.position);
        assert!(!context.frame.mdi_app);
        assert_eq!(context.frame.frame_window, WindowHandle(0x42));
        assert_eq!(context.frame.accelerator_entries, 0);
    }

    #[test]
    fn rect_is_stored_before_any_component_exists() {
        let site = site();
        site.set_bounding_rect(PixelRect::new(0, 0, 0, 0));
        assert_eq!(site.window_context().position, PixelRect::new(0, 0, 0, 0));
        assert_eq!(site.state(), ActivationState::Unbound);
    }

    #[test]
    fn control_window_is_none_before_activation() {
        assert_eq!(site().resolve_control_window(), None);
    }

    #[test]
    fn script_error_command_is_handled() {
        let site = site();
        assert_eq!(
            site.exec(Some(DOC_HOST_COMMAND_GROUP), SHOW_SCRIPT_ERROR),
            ExecOutcome::Handled
        );
        assert_eq!(site.exec(None, SHOW_SCRIPT_ERROR), ExecOutcome::Acknowledged);
        assert_eq!(
            site.exec(Some(DOC_HOST_COMMAND_GROUP), 2),
            ExecOutcome::Acknowledged
        );
        assert_eq!(site.query_status(None), Ok(()));
    }

    #[test]
    fn client_site_answers_are_fixed() {
        let site = site();
        assert_eq!(site.save_object(), Err(Refusal::NotImplemented));
        assert_eq!(site.container(), Err(Refusal::NoInterface));
        assert_eq!(site.show_object(), Ok(()));
        assert_eq!(site.on_show_window(true), Ok(()));
        assert_eq!(site.request_new_object_layout(), Err(Refusal::NotImplemented));
        assert_eq!(site.can_in_place_activate(), Ok(()));
        assert_eq!(site.scroll(), Err(Refusal::NotImplemented));
        assert_eq!(site.window(), WindowHandle(0x42));
    }

    #[test]
    fn activation_notification_without_component_is_ignored() {
        let site = site();
        site.on_in_place_activate().expect("ignored");
        assert_eq!(site.state(), ActivationState::Unbound);
    }
}
