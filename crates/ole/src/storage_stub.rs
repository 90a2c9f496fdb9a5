/// Structured-storage surface the hosting contract requires.
///
/// The host persists nothing. Every storage operation is refused with
/// `NotImplemented`, except `SetClass` which is acknowledged. Moniker lookup
/// answers `Unavailable` for the container moniker when asked "only if
/// already assigned"; the WebBrowser control checks exactly that pair during
/// activation.
use crate::error::Refusal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    CreateStream,
    OpenStream,
    CreateStorage,
    OpenStorage,
    CopyTo,
    MoveElementTo,
    Commit,
    Revert,
    EnumElements,
    DestroyElement,
    RenameElement,
    SetElementTimes,
    SetClass,
    SetStateBits,
    Stat,
}

impl StorageOp {
    pub const ALL: [StorageOp; 15] = [
        Self::CreateStream,
        Self::OpenStream,
        Self::CreateStorage,
        Self::OpenStorage,
        Self::CopyTo,
        Self::MoveElementTo,
        Self::Commit,
        Self::Revert,
        Self::EnumElements,
        Self::DestroyElement,
        Self::RenameElement,
        Self::SetElementTimes,
        Self::SetClass,
        Self::SetStateBits,
        Self::Stat,
    ];
}

/// `OLEGETMONIKER` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonikerAssign {
    OnlyIfThere,
    ForceAssign,
    Unassign,
    TempForUser,
}

impl MonikerAssign {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::OnlyIfThere),
            2 => Some(Self::ForceAssign),
            3 => Some(Self::Unassign),
            4 => Some(Self::TempForUser),
            _ => None,
        }
    }
}

/// `OLEWHICHMK` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonikerKind {
    Container,
    ObjectRelative,
    ObjectFull,
}

impl MonikerKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::Container),
            2 => Some(Self::ObjectRelative),
            3 => Some(Self::ObjectFull),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StorageStub;

impl StorageStub {
    pub fn call(&self, op: StorageOp) -> Result<(), Refusal> {
        match op {
            StorageOp::SetClass => Ok(()),
            _ => {
                tracing::trace!(?op, "storage operation refused");
                Err(Refusal::NotImplemented)
            }
        }
    }

    pub fn moniker(&self, assign: Option<MonikerAssign>, which: Option<MonikerKind>) -> Refusal {
        match (assign, which) {
            (Some(MonikerAssign::OnlyIfThere), Some(MonikerKind::Container)) => Refusal::Unavailable,
            _ => Refusal::NotImplemented,
        }
    }
}
