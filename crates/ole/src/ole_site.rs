/// COM face of the [`HostSite`].
///
/// Implements IOleClientSite, IOleInPlaceSite, IOleCommandTarget and IStorage
/// for the WebBrowser control and forwards every call to the platform-neutral
/// site. Nothing here holds state of its own.
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use windows::core::{implement, Error, OutRef, Ref, BOOL, GUID, HRESULT, PCWSTR};
use windows::Win32::Foundation::{FILETIME, HWND, RECT, SIZE, VARIANT_TRUE};
use windows::Win32::System::Com::StructuredStorage::{
    IEnumSTATSTG, IStorage, IStorage_Impl, STGMOVE,
};
use windows::Win32::System::Com::{IMoniker, IStream, STATFLAG, STATSTG, STGM};
use windows::Win32::System::Ole::{
    IOleClientSite, IOleClientSite_Impl, IOleCommandTarget, IOleCommandTarget_Impl,
    IOleContainer, IOleInPlaceFrame, IOleInPlaceSite, IOleInPlaceSite_Impl, IOleInPlaceUIWindow,
    IOleWindow_Impl, OLECMD, OLECMDTEXT, OLEGETMONIKER, OLEINPLACEFRAMEINFO, OLEWHICHMK,
};
use windows::Win32::System::Variant::{VariantClear, VARIANT, VT_BOOL};
use windows::Win32::UI::WindowsAndMessaging::HACCEL;

use crate::com_interfaces::{from_win_rect, to_hwnd, to_win_rect};
use crate::error::{ComponentError, Refusal, E_FAIL};
use crate::site::{ExecOutcome, HostSite};
use crate::storage_stub::{MonikerAssign, MonikerKind, StorageOp};

#[derive(Debug)]
#[implement(IOleClientSite, IOleInPlaceSite, IOleCommandTarget, IStorage)]
pub struct OleSite {
    site: Rc<HostSite>,
}

impl OleSite {
    pub fn new(site: Rc<HostSite>) -> Self {
        Self { site }
    }
}

fn refused(refusal: Refusal) -> Error {
    Error::from(HRESULT(refusal.hresult() as i32))
}

fn answer(result: Result<(), Refusal>) -> windows::core::Result<()> {
    result.map_err(refused)
}

fn component_failure(error: ComponentError) -> Error {
    Error::new(HRESULT(error.code as i32), error.message)
}

fn catch_unwind_com<T>(
    context: &'static str,
    f: impl FnOnce() -> windows::core::Result<T>,
) -> windows::core::Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(context, "panic prevented from crossing COM callback boundary");
            Err(Error::from(HRESULT(E_FAIL as i32)))
        }
    }
}

// ---- IOleClientSite ----

impl IOleClientSite_Impl for OleSite_Impl {
    fn SaveObject(&self) -> windows::core::Result<()> {
        answer(self.site.save_object())
    }

    fn GetMoniker(
        &self,
        dwassign: &OLEGETMONIKER,
        dwwhichmoniker: &OLEWHICHMK,
    ) -> windows::core::Result<IMoniker> {
        let refusal = self.site.moniker(
            MonikerAssign::from_raw(dwassign.0),
            MonikerKind::from_raw(dwwhichmoniker.0),
        );
        Err(refused(refusal))
    }

    fn GetContainer(&self) -> windows::core::Result<IOleContainer> {
        let refusal = self.site.container().err().unwrap_or(Refusal::NoInterface);
        Err(refused(refusal))
    }

    fn ShowObject(&self) -> windows::core::Result<()> {
        answer(self.site.show_object())
    }

    fn OnShowWindow(&self, fshow: BOOL) -> windows::core::Result<()> {
        answer(self.site.on_show_window(fshow.as_bool()))
    }

    fn RequestNewObjectLayout(&self) -> windows::core::Result<()> {
        answer(self.site.request_new_object_layout())
    }
}

// ---- IOleWindow (base of IOleInPlaceSite) ----

impl IOleWindow_Impl for OleSite_Impl {
    fn GetWindow(&self) -> windows::core::Result<HWND> {
        Ok(to_hwnd(self.site.window()))
    }

    fn ContextSensitiveHelp(&self, _fentermode: BOOL) -> windows::core::Result<()> {
        answer(self.site.context_sensitive_help())
    }
}

// ---- IOleInPlaceSite ----

impl IOleInPlaceSite_Impl for OleSite_Impl {
    fn CanInPlaceActivate(&self) -> windows::core::Result<()> {
        answer(self.site.can_in_place_activate())
    }

    fn OnInPlaceActivate(&self) -> windows::core::Result<()> {
        catch_unwind_com("OleSite::OnInPlaceActivate", || {
            self.site.on_in_place_activate().map_err(component_failure)
        })
    }

    fn OnUIActivate(&self) -> windows::core::Result<()> {
        self.site.on_ui_activate();
        Ok(())
    }

    fn GetWindowContext(
        &self,
        ppframe: OutRef<'_, IOleInPlaceFrame>,
        ppdoc: OutRef<'_, IOleInPlaceUIWindow>,
        lprcposrect: *mut RECT,
        lprccliprect: *mut RECT,
        lpframeinfo: *mut OLEINPLACEFRAMEINFO,
    ) -> windows::core::Result<()> {
        catch_unwind_com("OleSite::GetWindowContext", || unsafe {
            let context = self.site.window_context();

            // No frame or document chrome is provided by this host
            if !ppframe.is_null() {
                ppframe.write(None)?;
            }
            if !ppdoc.is_null() {
                ppdoc.write(None)?;
            }

            if !lprcposrect.is_null() {
                *lprcposrect = to_win_rect(context.position);
            }
            if !lprccliprect.is_null() {
                *lprccliprect = to_win_rect(context.clip);
            }

            if !lpframeinfo.is_null() {
                let info = &mut *lpframeinfo;
                info.fMDIApp = BOOL::from(context.frame.mdi_app);
                info.hwndFrame = to_hwnd(context.frame.frame_window);
                info.haccel = HACCEL(core::ptr::null_mut());
                info.cAccelEntries = context.frame.accelerator_entries;
            }
            Ok(())
        })
    }

    fn Scroll(&self, _scrollextant: &SIZE) -> windows::core::Result<()> {
        answer(self.site.scroll())
    }

    fn OnUIDeactivate(&self, fundoable: BOOL) -> windows::core::Result<()> {
        self.site.on_ui_deactivate(fundoable.as_bool());
        Ok(())
    }

    fn OnInPlaceDeactivate(&self) -> windows::core::Result<()> {
        catch_unwind_com("OleSite::OnInPlaceDeactivate", || {
            self.site.on_in_place_deactivate();
            Ok(())
        })
    }

    fn DiscardUndoState(&self) -> windows::core::Result<()> {
        answer(self.site.discard_undo_state())
    }

    fn DeactivateAndUndo(&self) -> windows::core::Result<()> {
        answer(self.site.deactivate_and_undo())
    }

    fn OnPosRectChange(&self, lprcposrect: *const RECT) -> windows::core::Result<()> {
        let rect = unsafe { lprcposrect.as_ref() }.map(from_win_rect).unwrap_or_default();
        answer(self.site.on_pos_rect_change(rect))
    }
}

// ---- IOleCommandTarget ----

impl IOleCommandTarget_Impl for OleSite_Impl {
    fn QueryStatus(
        &self,
        pguidcmdgroup: *const GUID,
        _ccmds: u32,
        _prgcmds: *mut OLECMD,
        _pcmdtext: *mut OLECMDTEXT,
    ) -> windows::core::Result<()> {
        let group = unsafe { pguidcmdgroup.as_ref() }.map(GUID::to_u128);
        answer(self.site.query_status(group))
    }

    fn Exec(
        &self,
        pguidcmdgroup: *const GUID,
        ncmdid: u32,
        _ncmdexecopt: u32,
        _pvain: *const VARIANT,
        pvaout: *mut VARIANT,
    ) -> windows::core::Result<()> {
        catch_unwind_com("OleSite::Exec", || {
            let group = unsafe { pguidcmdgroup.as_ref() }.map(GUID::to_u128);
            if self.site.exec(group, ncmdid) == ExecOutcome::Handled && !pvaout.is_null() {
                // Continue running scripts on the page
                unsafe {
                    VariantClear(pvaout)?;
                    let inner = &mut *(*pvaout).Anonymous.Anonymous;
                    inner.vt = VT_BOOL;
                    inner.Anonymous.boolVal = VARIANT_TRUE;
                }
            }
            Ok(())
        })
    }
}

// ---- IStorage ----

impl IStorage_Impl for OleSite_Impl {
    fn CreateStream(
        &self,
        _pwcsname: &PCWSTR,
        _grfmode: STGM,
        _reserved1: u32,
        _reserved2: u32,
    ) -> windows::core::Result<IStream> {
        Err(storage_refusal(&self.site, StorageOp::CreateStream))
    }

    fn OpenStream(
        &self,
        _pwcsname: &PCWSTR,
        _reserved1: *const core::ffi::c_void,
        _grfmode: STGM,
        _reserved2: u32,
    ) -> windows::core::Result<IStream> {
        Err(storage_refusal(&self.site, StorageOp::OpenStream))
    }

    fn CreateStorage(
        &self,
        _pwcsname: &PCWSTR,
        _grfmode: STGM,
        _reserved1: u32,
        _reserved2: u32,
    ) -> windows::core::Result<IStorage> {
        Err(storage_refusal(&self.site, StorageOp::CreateStorage))
    }

    fn OpenStorage(
        &self,
        _pwcsname: &PCWSTR,
        _pstgpriority: Ref<'_, IStorage>,
        _grfmode: STGM,
        _snbexclude: *const *const u16,
        _reserved: u32,
    ) -> windows::core::Result<IStorage> {
        Err(storage_refusal(&self.site, StorageOp::OpenStorage))
    }

    fn CopyTo(
        &self,
        _ciidexclude: u32,
        _rgiidexclude: *const GUID,
        _snbexclude: *const *const u16,
        _pstgdest: Ref<'_, IStorage>,
    ) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::CopyTo))
    }

    fn MoveElementTo(
        &self,
        _pwcsname: &PCWSTR,
        _pstgdest: Ref<'_, IStorage>,
        _pwcsnewname: &PCWSTR,
        _grfflags: &STGMOVE,
    ) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::MoveElementTo))
    }

    fn Commit(&self, _grfcommitflags: u32) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::Commit))
    }

    fn Revert(&self) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::Revert))
    }

    fn EnumElements(
        &self,
        _reserved1: u32,
        _reserved2: *const core::ffi::c_void,
        _reserved3: u32,
    ) -> windows::core::Result<IEnumSTATSTG> {
        Err(storage_refusal(&self.site, StorageOp::EnumElements))
    }

    fn DestroyElement(&self, _pwcsname: &PCWSTR) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::DestroyElement))
    }

    fn RenameElement(
        &self,
        _pwcsoldname: &PCWSTR,
        _pwcsnewname: &PCWSTR,
    ) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::RenameElement))
    }

    fn SetElementTimes(
        &self,
        _pwcsname: &PCWSTR,
        _pctime: *const FILETIME,
        _patime: *const FILETIME,
        _pmtime: *const FILETIME,
    ) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::SetElementTimes))
    }

    fn SetClass(&self, _clsid: *const GUID) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::SetClass))
    }

    fn SetStateBits(&self, _grfstatebits: u32, _grfmask: u32) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::SetStateBits))
    }

    fn Stat(&self, _pstatstg: *mut STATSTG, _grfstatflag: &STATFLAG) -> windows::core::Result<()> {
        answer(self.site.storage(StorageOp::Stat))
    }
}

/// Error for storage calls that must hand back an interface; the stub never
/// produces one.
fn storage_refusal(site: &HostSite, op: StorageOp) -> Error {
    refused(site.storage(op).err().unwrap_or(Refusal::NotImplemented))
}

#[cfg(test)]
mod tests {
    use std::mem::ManuallyDrop;

    use webhost_domain::{PixelRect, WindowHandle};
    use windows::core::BSTR;
    use windows::Win32::System::Variant::VT_BSTR;

    use super::*;
    use crate::geometry::{FixedDpi, Geometry};
    use crate::site::{DOC_HOST_COMMAND_GROUP, SHOW_SCRIPT_ERROR};

    fn command_target() -> IOleCommandTarget {
        let site = HostSite::new(
            WindowHandle(0x42),
            PixelRect::from_size(800, 600),
            Geometry::new(Box::new(FixedDpi::default())),
        );
        OleSite::new(site).into()
    }

    #[test]
    fn script_error_exec_replaces_previous_out_value() {
        let target = command_target();
        let group = GUID::from_u128(DOC_HOST_COMMAND_GROUP);

        let mut out = VARIANT::default();
        unsafe {
            let inner = &mut *out.Anonymous.Anonymous;
            inner.vt = VT_BSTR;
            inner.Anonymous.bstrVal = ManuallyDrop::new(BSTR::from("stale"));
        }

        unsafe { target.Exec(&group, SHOW_SCRIPT_ERROR, 0, core::ptr::null(), &mut out) }
            .expect("exec");

        unsafe {
            let inner = &*out.Anonymous.Anonymous;
            assert_eq!(inner.vt, VT_BOOL);
            assert_eq!(inner.Anonymous.boolVal, VARIANT_TRUE);
        }
    }

    #[test]
    fn unrelated_exec_leaves_out_value_alone() {
        let target = command_target();
        let mut out = VARIANT::default();

        unsafe { target.Exec(core::ptr::null(), 2, 0, core::ptr::null(), &mut out) }.expect("exec");

        let vt = unsafe { (*out.Anonymous.Anonymous).vt };
        assert_ne!(vt, VT_BOOL);
    }
}
