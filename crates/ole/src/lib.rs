mod component;
mod emulation;
mod error;
mod geometry;
mod host;
mod identity;
mod navigation;
mod site;
mod storage_stub;

#[cfg(windows)]
mod com_interfaces;
#[cfg(windows)]
mod ole_site;
#[cfg(windows)]
mod web_browser;

pub use component::{BrowsingControl, ComponentFactory, HostedComponent, InPlaceObject};
pub use emulation::{apply_browser_emulation, emulation_value_name, EMULATION_KEY};
pub use error::{ComponentError, ComponentResult, HostError, Refusal, E_FAIL, E_NOINTERFACE, E_NOTIMPL, E_UNEXPECTED};
pub use geometry::{
    default_dpi_source, mul_div, pixel_to_himetric, DpiSource, FixedDpi, Geometry, PixelsPerInch,
    HIMETRIC_PER_INCH,
};
pub use host::{HostingObject, BLANK_PAGE};
pub use identity::{CapabilityId, Dispatch, Facet};
pub use navigation::{NavigateFlags, Navigator};
pub use site::{ExecOutcome, FrameInfo, HostSite, WindowContext, DOC_HOST_COMMAND_GROUP, SHOW_SCRIPT_ERROR};
pub use storage_stub::{MonikerAssign, MonikerKind, StorageOp, StorageStub};

#[cfg(windows)]
pub use geometry::ScreenDpi;
#[cfg(windows)]
pub use web_browser::WebBrowserFactory;
