/// Seam between the hosting object and the hosted rendering component.
///
/// On Windows these are implemented over `IOleObject`, `IOleInPlaceObject`
/// and `IWebBrowser2` (see `web_browser.rs`). Every method may re-enter the
/// [`HostSite`] synchronously, so callers must not hold a borrow of site
/// state across a call.
use std::rc::Rc;

use webhost_domain::{MetricSize, PixelRect, WindowHandle};

use crate::error::ComponentResult;
use crate::navigation::NavigateFlags;
use crate::site::HostSite;

/// The "create-and-bind" primitive: instantiates the component with the
/// given site as its client site and storage.
pub trait ComponentFactory {
    fn create(&self, site: &Rc<HostSite>) -> ComponentResult<Rc<dyn HostedComponent>>;
}

/// Top-level control object of the hosted component.
pub trait HostedComponent {
    /// Attach or detach the client site.
    fn set_client_site(&self, site: Option<&Rc<HostSite>>) -> ComponentResult<()>;

    fn set_contained(&self, contained: bool) -> ComponentResult<()>;

    /// Run the in-place activation verb inside `parent` at `rect`.
    fn activate_in_place(&self, parent: WindowHandle, rect: PixelRect) -> ComponentResult<()>;

    fn lock_running(&self, lock: bool) -> ComponentResult<()>;

    fn set_extent(&self, extent: MetricSize) -> ComponentResult<()>;

    fn in_place_object(&self) -> ComponentResult<Rc<dyn InPlaceObject>>;

    fn browsing_control(&self) -> ComponentResult<Box<dyn BrowsingControl>>;

    /// Close without saving.
    fn close(&self) -> ComponentResult<()>;
}

/// In-place sub-interface, valid between activation and deactivation.
pub trait InPlaceObject {
    fn set_object_rects(&self, position: PixelRect, clip: PixelRect) -> ComponentResult<()>;

    fn window(&self) -> ComponentResult<WindowHandle>;

    fn in_place_deactivate(&self) -> ComponentResult<()>;

    fn show(&self) -> ComponentResult<()>;
}

/// Navigation-capable sub-interface.
pub trait BrowsingControl {
    fn navigate(&self, url: &str, flags: NavigateFlags) -> ComponentResult<()>;

    fn go_back(&self) -> ComponentResult<()>;

    fn go_forward(&self) -> ComponentResult<()>;

    fn refresh(&self) -> ComponentResult<()>;

    fn location_url(&self) -> ComponentResult<String>;
}
