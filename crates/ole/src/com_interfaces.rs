/// Class ids and Win32 conversions used by the COM adapter.
///
/// `exdisp.h` class ids are not exposed as constants by the `windows` crate
/// metadata, so the ones we need are declared locally.
use windows::core::GUID;
use windows::Win32::Foundation::{HWND, RECT};
use webhost_domain::{PixelRect, WindowHandle};

/// CLSID for the WebBrowser control (`CLSID_WebBrowser`).
pub const CLSID_WEB_BROWSER: GUID = GUID::from_u128(0x8856f961_340a_11d0_a96b_00c04fd705a2);

pub fn to_win_rect(rect: PixelRect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

pub fn from_win_rect(rect: &RECT) -> PixelRect {
    PixelRect::new(rect.left, rect.top, rect.right, rect.bottom)
}

pub fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut _)
}

pub fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}
