/// The hosting object: caller-facing lifecycle and navigation surface.
///
/// Construction drives the hosted component from `Unbound` through
/// `Created` to `InPlaceActive`. A failed construction leaves an inert object
/// whose navigation calls all fail with [`HostError::NotActive`].
use std::rc::Rc;

use webhost_domain::{ActivationState, PixelRect, WindowHandle};

use crate::component::ComponentFactory;
use crate::error::{ComponentError, HostError};
use crate::geometry::Geometry;
use crate::navigation::Navigator;
use crate::site::HostSite;

pub const BLANK_PAGE: &str = "about:blank";

pub struct HostingObject {
    site: Rc<HostSite>,
    navigator: Navigator,
    destroyed: bool,
}

impl HostingObject {
    /// An inert hosting object over `parent`; call [`activate`](Self::activate)
    /// to bring up the hosted component.
    pub fn new(parent: WindowHandle, rect: PixelRect) -> Self {
        Self::with_geometry(parent, rect, Geometry::default())
    }

    pub fn with_geometry(parent: WindowHandle, rect: PixelRect, geometry: Geometry) -> Self {
        Self {
            site: HostSite::new(parent, rect, geometry),
            navigator: Navigator::unbound(),
            destroyed: false,
        }
    }

    /// Create, activate and navigate to a blank page in one step.
    pub fn create(
        parent: WindowHandle,
        rect: PixelRect,
        factory: &dyn ComponentFactory,
    ) -> Result<Self, HostError> {
        let mut host = Self::new(parent, rect);
        host.activate(factory)?;
        Ok(host)
    }

    pub fn activate(&mut self, factory: &dyn ComponentFactory) -> Result<(), HostError> {
        if self.destroyed {
            return Err(HostError::Destroyed);
        }
        let state = self.site.state();
        if state != ActivationState::Unbound {
            return Err(HostError::InvalidState(state));
        }

        tracing::info!(parent = self.site.parent().0, rect = ?self.site.bounding_rect(), "creating hosted browser");

        self.create_hosted_component(factory)?;
        self.activate_in_place()?;
        self.bind_browsing_control()?;

        self.site.show_control_window();
        if let Err(error) = self.navigator.navigate(BLANK_PAGE) {
            tracing::warn!(%error, "initial navigation failed");
        }

        let control_window = self.site.resolve_control_window();
        tracing::info!(?control_window, "hosted browser in-place active");
        Ok(())
    }

    fn create_hosted_component(&mut self, factory: &dyn ComponentFactory) -> Result<(), HostError> {
        let component = factory.create(&self.site).map_err(|error| {
            tracing::error!(%error, "hosted component could not be instantiated");
            HostError::Construction(error)
        })?;

        if let Err(error) = component.set_client_site(Some(&self.site)) {
            tracing::error!(%error, "SetClientSite failed");
            let _ = component.close();
            return Err(HostError::Construction(error));
        }

        if let Err(error) = component.set_contained(true) {
            tracing::warn!(%error, "OleSetContainedObject failed");
        }

        self.site.attach_component(component);
        Ok(())
    }

    fn activate_in_place(&self) -> Result<(), HostError> {
        let Some(component) = self.site.component() else {
            return Err(HostError::InvalidState(self.site.state()));
        };

        let rect = self.site.bounding_rect();
        component
            .activate_in_place(self.site.parent(), rect)
            .map_err(|error| {
                tracing::error!(%error, "in-place activation verb failed");
                HostError::Activation(error)
            })?;

        if !self.site.state().is_in_place() {
            tracing::error!(state = ?self.site.state(), "component never reported in-place activation");
            return Err(HostError::Activation(ComponentError::failed(
                "component did not report in-place activation",
            )));
        }
        Ok(())
    }

    fn bind_browsing_control(&mut self) -> Result<(), HostError> {
        let Some(component) = self.site.component() else {
            return Err(HostError::InvalidState(self.site.state()));
        };

        let control = component.browsing_control().map_err(|error| {
            tracing::error!(%error, "navigation interface unavailable");
            HostError::Construction(error)
        })?;
        self.navigator.bind(control);
        Ok(())
    }

    fn ensure_navigable(&self) -> Result<&Navigator, HostError> {
        if self.destroyed {
            return Err(HostError::Destroyed);
        }
        if !self.site.state().is_in_place() || !self.navigator.is_bound() {
            return Err(HostError::NotActive);
        }
        Ok(&self.navigator)
    }

    pub fn navigate(&self, url: &str) -> Result<(), HostError> {
        self.ensure_navigable()?.navigate(url)
    }

    pub fn go_back(&self) -> Result<(), HostError> {
        self.ensure_navigable()?.go_back()
    }

    pub fn go_forward(&self) -> Result<(), HostError> {
        self.ensure_navigable()?.go_forward()
    }

    pub fn refresh(&self) -> Result<(), HostError> {
        self.ensure_navigable()?.refresh()
    }

    pub fn current_location(&self) -> Result<String, HostError> {
        self.ensure_navigable()?.current_location()
    }

    pub fn set_bounding_rect(&self, rect: PixelRect) -> Result<(), HostError> {
        if self.destroyed {
            return Err(HostError::Destroyed);
        }
        self.site.set_bounding_rect(rect);
        Ok(())
    }

    pub fn resolve_control_window(&self) -> Option<WindowHandle> {
        if self.destroyed {
            return None;
        }
        self.site.resolve_control_window()
    }

    /// Re-read screen DPI and push the current rect again.
    pub fn refresh_dpi(&self) -> Result<(), HostError> {
        self.site.geometry().refresh_dpi();
        self.set_bounding_rect(self.site.bounding_rect())
    }

    pub fn state(&self) -> ActivationState {
        self.site.state()
    }

    pub fn bounding_rect(&self) -> PixelRect {
        self.site.bounding_rect()
    }

    /// Use count of the capability contract driven through [`HostSite`].
    /// This is not the COM reference count of the Windows site object.
    pub fn reference_count(&self) -> u32 {
        self.site.reference_count()
    }

    pub fn site(&self) -> &Rc<HostSite> {
        &self.site
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Tear down from any state. Idempotent; also run on drop.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.navigator.release();

        if let Some(in_place) = self.site.in_place_object() {
            if let Err(error) = in_place.in_place_deactivate() {
                tracing::warn!(%error, "InPlaceDeactivate failed");
            }
        }

        let Some(component) = self.site.detach() else {
            tracing::debug!("hosting object destroyed before a component was bound");
            return;
        };

        if let Err(error) = component.lock_running(false) {
            tracing::debug!(%error, "unlock running failed");
        }
        if let Err(error) = component.close() {
            tracing::warn!(%error, "closing hosted component failed");
        }
        if let Err(error) = component.set_client_site(None) {
            tracing::debug!(%error, "detaching client site failed");
        }

        tracing::info!("hosted browser destroyed");
    }
}

impl Drop for HostingObject {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for HostingObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostingObject")
            .field("site", &self.site)
            .field("navigator", &self.navigator)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
