use thiserror::Error;
use webhost_domain::ActivationState;

use crate::identity::CapabilityId;

pub const E_NOTIMPL: u32 = 0x8000_4001;
pub const E_NOINTERFACE: u32 = 0x8000_4002;
pub const E_FAIL: u32 = 0x8000_4005;
pub const E_UNEXPECTED: u32 = 0x8000_FFFF;

/// Failure reported by the hosted component, HRESULT-shaped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (hresult {code:#010X})")]
pub struct ComponentError {
    pub code: u32,
    pub message: String,
}

impl ComponentError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(E_FAIL, message)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for ComponentError {
    fn from(error: windows::core::Error) -> Self {
        Self::new(error.code().0 as u32, error.message())
    }
}

pub type ComponentResult<T> = Result<T, ComponentError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to create hosted component: {0}")]
    Construction(#[source] ComponentError),
    #[error("in-place activation failed: {0}")]
    Activation(#[source] ComponentError),
    #[error("capability {0} is not supported")]
    CapabilityUnsupported(CapabilityId),
    #[error("navigation failed: {0}")]
    Navigation(#[source] ComponentError),
    #[error("hosted component is not active")]
    NotActive,
    #[error("operation not valid in state {0:?}")]
    InvalidState(ActivationState),
    #[error("hosting object has been destroyed")]
    Destroyed,
}

/// Deliberate refusal returned from the inert parts of the hosting contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("not implemented")]
    NotImplemented,
    #[error("not available")]
    Unavailable,
    #[error("no such interface")]
    NoInterface,
}

impl Refusal {
    pub fn hresult(&self) -> u32 {
        match self {
            Self::NotImplemented => E_NOTIMPL,
            Self::Unavailable => E_FAIL,
            Self::NoInterface => E_NOINTERFACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusals_map_to_conventional_hresults() {
        assert_eq!(Refusal::NotImplemented.hresult(), 0x8000_4001);
        assert_eq!(Refusal::NoInterface.hresult(), 0x8000_4002);
        assert_eq!(Refusal::Unavailable.hresult(), 0x8000_4005);
    }

    #[test]
    fn component_error_shows_hresult() {
        let error = ComponentError::new(0x8004_0154, "class not registered");
        assert_eq!(error.to_string(), "class not registered (hresult 0x80040154)");
    }

    #[test]
    fn host_error_keeps_component_source() {
        use std::error::Error as _;

        let error = HostError::Navigation(ComponentError::failed("boom"));
        let source = error.source().expect("source attached");
        assert!(source.to_string().starts_with("boom"));
    }
}
