/// Capability query and use counting for the hosting object.
///
/// The hosted component discovers what the host supports by interface id.
/// Only three ids are answered; the lookup is a flat table, not a chain.
use std::cell::Cell;
use std::fmt;

use crate::error::HostError;

/// Interface id in its 128-bit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityId(pub u128);

impl CapabilityId {
    pub const UNKNOWN: Self = Self(0x00000000_0000_0000_c000_000000000046);
    pub const OLE_CLIENT_SITE: Self = Self(0x00000118_0000_0000_c000_000000000046);
    pub const OLE_IN_PLACE_SITE: Self = Self(0x00000119_0000_0000_c000_000000000046);
    pub const OLE_COMMAND_TARGET: Self = Self(0xb722bccb_4e68_101b_a2bc_00aa00404770);
    pub const STORAGE: Self = Self(0x0000000b_0000_0000_c000_000000000046);
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{{{:08x}-{:04x}-{:04x}-{:04x}-{:012x}}}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xffff_ffff_ffff
        )
    }
}

/// A capability facet exposed through [`Dispatch::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Identity,
    InPlaceSite,
    CommandTarget,
}

const FACETS: [(CapabilityId, Facet); 3] = [
    (CapabilityId::UNKNOWN, Facet::Identity),
    (CapabilityId::OLE_IN_PLACE_SITE, Facet::InPlaceSite),
    (CapabilityId::OLE_COMMAND_TARGET, Facet::CommandTarget),
];

/// Capability lookup plus a plain use counter.
///
/// The counter never owns the hosting object: reaching zero has no effect,
/// the embedding caller decides when the object goes away.
#[derive(Debug, Default)]
pub struct Dispatch {
    count: Cell<u32>,
}

impl Dispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self, id: CapabilityId) -> Result<Facet, HostError> {
        let Some((_, facet)) = FACETS.iter().find(|(known, _)| *known == id) else {
            tracing::trace!(capability = %id, "capability query rejected");
            return Err(HostError::CapabilityUnsupported(id));
        };

        self.add_ref();
        Ok(*facet)
    }

    pub fn add_ref(&self) -> u32 {
        let count = self.count.get().saturating_add(1);
        self.count.set(count);
        count
    }

    pub fn release(&self) -> u32 {
        let current = self.count.get();
        if current == 0 {
            tracing::warn!("release called with a zero use count");
            return 0;
        }
        self.count.set(current - 1);
        current - 1
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_ids_map_to_distinct_stable_facets() {
        let dispatch = Dispatch::new();

        let identity = dispatch.query(CapabilityId::UNKNOWN).expect("identity");
        let site = dispatch.query(CapabilityId::OLE_IN_PLACE_SITE).expect("site");
        let command = dispatch.query(CapabilityId::OLE_COMMAND_TARGET).expect("command");

        assert_eq!(identity, Facet::Identity);
        assert_eq!(site, Facet::InPlaceSite);
        assert_eq!(command, Facet::CommandTarget);
        assert_eq!(
            dispatch.query(CapabilityId::OLE_IN_PLACE_SITE).expect("site again"),
            site
        );
        assert_eq!(dispatch.count(), 4);
    }

    #[test]
    fn unsupported_id_leaves_count_untouched() {
        let dispatch = Dispatch::new();
        dispatch.add_ref();

        let result = dispatch.query(CapabilityId::STORAGE);
        assert!(matches!(
            result,
            Err(HostError::CapabilityUnsupported(id)) if id == CapabilityId::STORAGE
        ));

        let result = dispatch.query(CapabilityId::OLE_CLIENT_SITE);
        assert!(result.is_err());
        assert_eq!(dispatch.count(), 1);
    }

    #[test]
    fn release_never_goes_below_zero() {
        let dispatch = Dispatch::new();
        assert_eq!(dispatch.add_ref(), 1);
        assert_eq!(dispatch.release(), 0);
        assert_eq!(dispatch.release(), 0);
    }

    #[test]
    fn capability_id_formats_as_registry_guid() {
        assert_eq!(
            CapabilityId::OLE_COMMAND_TARGET.to_string(),
            "{b722bccb-4e68-101b-a2bc-00aa00404770}"
        );
    }
}
