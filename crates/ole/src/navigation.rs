use bitflags::bitflags;

use crate::component::BrowsingControl;
use crate::error::HostError;

bitflags! {
    /// `BrowserNavConstants` bits passed to `IWebBrowser2::Navigate`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct NavigateFlags: u32 {
        const OPEN_IN_NEW_WINDOW = 0x01;
        const NO_HISTORY = 0x02;
        const NO_READ_FROM_CACHE = 0x04;
        const NO_WRITE_TO_CACHE = 0x08;
    }
}

/// Holds the navigation capability once bound. Every call on an unbound
/// navigator fails with [`HostError::NotActive`]; component errors are passed
/// through untranslated inside [`HostError::Navigation`].
#[derive(Default)]
pub struct Navigator {
    control: Option<Box<dyn BrowsingControl>>,
}

impl Navigator {
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, control: Box<dyn BrowsingControl>) {
        self.control = Some(control);
    }

    pub fn release(&mut self) {
        self.control = None;
    }

    pub fn is_bound(&self) -> bool {
        self.control.is_some()
    }

    fn control(&self) -> Result<&dyn BrowsingControl, HostError> {
        self.control.as_deref().ok_or(HostError::NotActive)
    }

    /// Load `url` without adding it to the travel log.
    pub fn navigate(&self, url: &str) -> Result<(), HostError> {
        tracing::debug!(url, "navigate");
        self.control()?
            .navigate(url, NavigateFlags::NO_HISTORY)
            .map_err(HostError::Navigation)
    }

    pub fn go_back(&self) -> Result<(), HostError> {
        self.control()?.go_back().map_err(HostError::Navigation)
    }

    pub fn go_forward(&self) -> Result<(), HostError> {
        self.control()?.go_forward().map_err(HostError::Navigation)
    }

    pub fn refresh(&self) -> Result<(), HostError> {
        self.control()?.refresh().map_err(HostError::Navigation)
    }

    pub fn current_location(&self) -> Result<String, HostError> {
        self.control()?.location_url().map_err(HostError::Navigation)
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("bound", &self.is_bound())
            .finish()
    }
}
