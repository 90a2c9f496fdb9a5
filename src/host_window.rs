/// Top-level window that hosts one browser control.
///
/// Runs on the main thread, which is initialised as an OLE STA for the
/// lifetime of the message loop. The hosting object lives in a thread-local
/// slot so the window procedure can forward resize and DPI notifications.
use std::cell::RefCell;

use anyhow::{bail, Context, Result};
use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, HBRUSH, WHITE_BRUSH};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Ole::{OleInitialize, OleUninitialize};
use windows::Win32::UI::WindowsAndMessaging::*;

use webhost_domain::{HostConfig, PixelRect, WindowHandle};
use webhost_ole::{apply_browser_emulation, HostingObject, WebBrowserFactory, BLANK_PAGE};

const HOST_WINDOW_CLASS: PCWSTR = w!("WebhostWindow");

thread_local! {
    static HOST: RefCell<Option<HostingObject>> = const { RefCell::new(None) };
}

pub fn run(config: &HostConfig) -> Result<()> {
    if let Err(error) = apply_browser_emulation(config.emulation) {
        tracing::warn!(error = format!("{error:#}"), "browser emulation not applied");
    }

    unsafe {
        OleInitialize(None).context("OleInitialize failed")?;
        let result = run_window(config);
        OleUninitialize();
        result
    }
}

unsafe fn run_window(config: &HostConfig) -> Result<()> {
    register_host_window_class()?;

    let title = HSTRING::from(config.title.as_str());
    let hwnd = CreateWindowExW(
        WINDOW_EX_STYLE(0),
        HOST_WINDOW_CLASS,
        &title,
        WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
        CW_USEDEFAULT,
        CW_USEDEFAULT,
        config.width.min(i32::MAX as u32) as i32,
        config.height.min(i32::MAX as u32) as i32,
        None,
        None,
        None,
        None,
    )
    .context("creating host window")?;

    let host = match HostingObject::create(window_handle(hwnd), client_rect(hwnd), &WebBrowserFactory) {
        Ok(host) => host,
        Err(error) => {
            tracing::error!(%error, "hosted browser could not be created");
            let _ = DestroyWindow(hwnd);
            return Err(error).context("creating hosted browser");
        }
    };

    if config.initial_url != BLANK_PAGE {
        if let Err(error) = host.navigate(&config.initial_url) {
            tracing::warn!(%error, url = %config.initial_url, "initial navigation failed");
        }
    }

    HOST.with(|slot| *slot.borrow_mut() = Some(host));
    let _ = ShowWindow(hwnd, SW_SHOW);

    let mut msg = MSG::default();
    loop {
        let status = GetMessageW(&mut msg, None, 0, 0);
        match status.0 {
            0 => break,
            -1 => bail!("GetMessageW failed: {:?}", GetLastError()),
            _ => {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    // WM_DESTROY normally took it already
    drop(HOST.with(|slot| slot.borrow_mut().take()));
    tracing::info!("message loop finished");
    Ok(())
}

unsafe fn register_host_window_class() -> Result<()> {
    let instance = GetModuleHandleW(None).context("GetModuleHandleW failed")?;
    let wc = WNDCLASSEXW {
        cbSize: core::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(host_wndproc),
        hInstance: instance.into(),
        hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
        lpszClassName: HOST_WINDOW_CLASS,
        hbrBackground: HBRUSH(GetStockObject(WHITE_BRUSH).0),
        ..Default::default()
    };
    if RegisterClassExW(&wc) == 0 {
        bail!("RegisterClassExW failed: {:?}", GetLastError());
    }
    Ok(())
}

fn window_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

unsafe fn client_rect(hwnd: HWND) -> PixelRect {
    let mut rect = RECT::default();
    if let Err(error) = GetClientRect(hwnd, &mut rect) {
        tracing::warn!(%error, "GetClientRect failed");
    }
    PixelRect::new(rect.left, rect.top, rect.right, rect.bottom)
}

/// Run `f` against the hosted browser unless it is gone or already borrowed
/// further up the stack.
fn with_host(f: impl FnOnce(&HostingObject)) {
    HOST.with(|slot| {
        if let Ok(host) = slot.try_borrow() {
            if let Some(host) = host.as_ref() {
                f(host);
            }
        }
    });
}

unsafe extern "system" fn host_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_SIZE => {
            let rect = client_rect(hwnd);
            with_host(|host| {
                if let Err(error) = host.set_bounding_rect(rect) {
                    tracing::warn!(%error, "resize not forwarded");
                }
            });
            LRESULT(0)
        }
        WM_DPICHANGED => {
            with_host(|host| {
                if let Err(error) = host.refresh_dpi() {
                    tracing::warn!(%error, "dpi refresh not forwarded");
                }
            });
            if let Some(suggested) = (lparam.0 as *const RECT).as_ref() {
                let _ = SetWindowPos(
                    hwnd,
                    None,
                    suggested.left,
                    suggested.top,
                    suggested.right - suggested.left,
                    suggested.bottom - suggested.top,
                    SWP_NOZORDER | SWP_NOACTIVATE,
                );
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            let host = HOST.with(|slot| slot.try_borrow_mut().ok().and_then(|mut slot| slot.take()));
            if let Some(mut host) = host {
                host.destroy();
            }
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
