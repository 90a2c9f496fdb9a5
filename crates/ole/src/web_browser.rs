/// The WebBrowser control behind the component traits.
///
/// `WebBrowserFactory` is the create-and-bind primitive: `OleCreate` with the
/// site's COM face as both client site and storage. The wrappers below
/// translate each trait call into the matching `IOleObject`,
/// `IOleInPlaceObject` or `IWebBrowser2` call and nothing more; sequencing
/// lives in `HostingObject`.
use std::rc::Rc;

use windows::core::{Interface, BSTR};
use windows::Win32::Foundation::SIZE;
use windows::Win32::System::Com::StructuredStorage::IStorage;
use windows::Win32::System::Com::DVASPECT_CONTENT;
use windows::Win32::System::Ole::{
    IOleClientSite, IOleInPlaceObject, IOleObject, OleCreate, OleLockRunning,
    OleSetContainedObject, OLECLOSE_NOSAVE, OLEIVERB_INPLACEACTIVATE, OLERENDER_DRAW,
};
use windows::Win32::System::Variant::{VARIANT, VT_I4};
use windows::Win32::UI::Shell::IWebBrowser2;
use windows::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_SHOW};

use webhost_domain::{MetricSize, PixelRect, WindowHandle};

use crate::com_interfaces::{from_hwnd, to_hwnd, to_win_rect, CLSID_WEB_BROWSER};
use crate::component::{BrowsingControl, ComponentFactory, HostedComponent, InPlaceObject};
use crate::error::ComponentResult;
use crate::navigation::NavigateFlags;
use crate::ole_site::OleSite;
use crate::site::HostSite;

/// Creates `CLSID_WebBrowser` instances. OLE must already be initialised on
/// the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebBrowserFactory;

impl ComponentFactory for WebBrowserFactory {
    fn create(&self, site: &Rc<HostSite>) -> ComponentResult<Rc<dyn HostedComponent>> {
        let client_site: IOleClientSite = OleSite::new(Rc::clone(site)).into();
        let storage: IStorage = client_site.cast()?;

        let ole_object = unsafe {
            let mut raw = core::ptr::null_mut();
            OleCreate(
                &CLSID_WEB_BROWSER,
                &IOleObject::IID,
                OLERENDER_DRAW,
                core::ptr::null(),
                &client_site,
                &storage,
                &mut raw,
            )?;
            IOleObject::from_raw(raw)
        };

        tracing::debug!("WebBrowser control instantiated");
        Ok(Rc::new(WebBrowserComponent {
            ole_object,
            client_site,
        }))
    }
}

struct WebBrowserComponent {
    ole_object: IOleObject,
    client_site: IOleClientSite,
}

impl HostedComponent for WebBrowserComponent {
    fn set_client_site(&self, site: Option<&Rc<HostSite>>) -> ComponentResult<()> {
        unsafe {
            match site {
                Some(_) => self.ole_object.SetClientSite(&self.client_site)?,
                None => self.ole_object.SetClientSite(None)?,
            }
        }
        Ok(())
    }

    fn set_contained(&self, contained: bool) -> ComponentResult<()> {
        unsafe { OleSetContainedObject(&self.ole_object, contained)? };
        Ok(())
    }

    fn activate_in_place(&self, parent: WindowHandle, rect: PixelRect) -> ComponentResult<()> {
        let rect = to_win_rect(rect);
        unsafe {
            self.ole_object.DoVerb(
                OLEIVERB_INPLACEACTIVATE.0,
                core::ptr::null(),
                &self.client_site,
                -1,
                to_hwnd(parent),
                &rect,
            )?;
        }
        Ok(())
    }

    fn lock_running(&self, lock: bool) -> ComponentResult<()> {
        unsafe { OleLockRunning(&self.ole_object, lock, false)? };
        Ok(())
    }

    fn set_extent(&self, extent: MetricSize) -> ComponentResult<()> {
        let size = SIZE {
            cx: extent.cx,
            cy: extent.cy,
        };
        unsafe { self.ole_object.SetExtent(DVASPECT_CONTENT, &size)? };
        Ok(())
    }

    fn in_place_object(&self) -> ComponentResult<Rc<dyn InPlaceObject>> {
        let inner: IOleInPlaceObject = self.ole_object.cast()?;
        Ok(Rc::new(WebBrowserInPlace { inner }))
    }

    fn browsing_control(&self) -> ComponentResult<Box<dyn BrowsingControl>> {
        let browser: IWebBrowser2 = self.ole_object.cast()?;
        Ok(Box::new(WebBrowserControl { browser }))
    }

    fn close(&self) -> ComponentResult<()> {
        unsafe { self.ole_object.Close(OLECLOSE_NOSAVE)? };
        Ok(())
    }
}

struct WebBrowserInPlace {
    inner: IOleInPlaceObject,
}

impl InPlaceObject for WebBrowserInPlace {
    fn set_object_rects(&self, position: PixelRect, clip: PixelRect) -> ComponentResult<()> {
        let position = to_win_rect(position);
        let clip = to_win_rect(clip);
        unsafe { self.inner.SetObjectRects(&position, &clip)? };
        Ok(())
    }

    fn window(&self) -> ComponentResult<WindowHandle> {
        let hwnd = unsafe { self.inner.GetWindow()? };
        Ok(from_hwnd(hwnd))
    }

    fn in_place_deactivate(&self) -> ComponentResult<()> {
        unsafe { self.inner.InPlaceDeactivate()? };
        Ok(())
    }

    fn show(&self) -> ComponentResult<()> {
        let hwnd = unsafe { self.inner.GetWindow()? };
        // Return value is the previous visibility, not an error
        let _ = unsafe { ShowWindow(hwnd, SW_SHOW) };
        Ok(())
    }
}

struct WebBrowserControl {
    browser: IWebBrowser2,
}

fn flags_variant(flags: NavigateFlags) -> VARIANT {
    let mut value = VARIANT::default();
    unsafe {
        let inner = &mut *value.Anonymous.Anonymous;
        inner.vt = VT_I4;
        inner.Anonymous.lVal = flags.bits() as i32;
    }
    value
}

impl BrowsingControl for WebBrowserControl {
    fn navigate(&self, url: &str, flags: NavigateFlags) -> ComponentResult<()> {
        let url = BSTR::from(url);
        let flags = flags_variant(flags);
        let empty = VARIANT::default();
        unsafe {
            self.browser
                .Navigate(&url, &flags, &empty, &empty, &empty)?;
        }
        Ok(())
    }

    fn go_back(&self) -> ComponentResult<()> {
        unsafe { self.browser.GoBack()? };
        Ok(())
    }

    fn go_forward(&self) -> ComponentResult<()> {
        unsafe { self.browser.GoForward()? };
        Ok(())
    }

    fn refresh(&self) -> ComponentResult<()> {
        unsafe { self.browser.Refresh()? };
        Ok(())
    }

    fn location_url(&self) -> ComponentResult<String> {
        let location = unsafe { self.browser.LocationURL()? };
        Ok(location.to_string())
    }
}
