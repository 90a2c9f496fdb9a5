use serde::{Deserialize, Serialize};

/// Rectangle in screen pixels, edges as in a Win32 `RECT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    /// Build a rect from its edges, ordering them so `right >= left` and
    /// `bottom >= top`.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_extent(width), clamp_extent(height))
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

fn clamp_extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Rectangle in HiMetric units (0.01 mm, 2540 per inch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl MetricRect {
    pub fn size(&self) -> MetricSize {
        MetricSize {
            cx: self.right.saturating_sub(self.left),
            cy: self.bottom.saturating_sub(self.top),
        }
    }
}

/// Object extent in HiMetric units, as handed to `IOleObject::SetExtent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSize {
    pub cx: i32,
    pub cy: i32,
}

/// Opaque native window handle.
///
/// Stored as an integer so the owning types stay plain data; the handle is
/// never dereferenced or destroyed outside the platform adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationState {
    Unbound,
    Created,
    InPlaceActive,
    UiActive,
    Deactivated,
}

impl ActivationState {
    /// Whether the hosted component currently renders into the host window.
    pub fn is_in_place(&self) -> bool {
        matches!(self, Self::InPlaceActive | Self::UiActive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Created => "created",
            Self::InPlaceActive => "in_place_active",
            Self::UiActive => "ui_active",
            Self::Deactivated => "deactivated",
        }
    }
}

/// Rendering-engine compatibility level requested for the hosted browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmulationMode {
    None,
    Ie7,
    Ie8,
    Ie9,
    Ie10,
    Ie11,
    Ie11Edge,
}

impl EmulationMode {
    /// DWORD stored under `FEATURE_BROWSER_EMULATION`, if any.
    pub fn registry_value(&self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Ie7 => Some(7000),
            Self::Ie8 => Some(8000),
            Self::Ie9 => Some(9000),
            Self::Ie10 => Some(10000),
            Self::Ie11 => Some(11000),
            Self::Ie11Edge => Some(11001),
        }
    }
}

impl Default for EmulationMode {
    fn default() -> Self {
        Self::Ie11Edge
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    pub initial_url: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub emulation: EmulationMode,
}

impl HostConfig {
    pub fn initial_rect(&self) -> PixelRect {
        PixelRect::from_size(self.width, self.height)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            initial_url: "about:blank".into(),
            title: "webhost".into(),
            width: 800,
            height: 600,
            emulation: EmulationMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_edges() {
        let rect = PixelRect::new(10, 20, 0, 5);
        assert_eq!(rect, PixelRect { left: 0, top: 5, right: 10, bottom: 20 });
        assert_eq!(rect.width(), 10);
        assert_eq!(rect.height(), 15);
    }

    #[test]
    fn degenerate_rect_is_empty_not_negative() {
        let rect = PixelRect::new(5, 5, 5, 5);
        assert!(rect.is_empty());
        assert_eq!(rect.width(), 0);

        let inverted = PixelRect { left: 10, top: 0, right: 0, bottom: 10 };
        assert_eq!(inverted.width(), 0);
    }

    #[test]
    fn from_size_clamps_huge_extents() {
        let rect = PixelRect::from_size(u32::MAX, 1);
        assert_eq!(rect.right, i32::MAX);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: HostConfig =
            serde_json::from_str(r#"{ "initialUrl": "https://example.test", "emulation": "ie10" }"#)
                .expect("parse config");

        assert_eq!(config.initial_url, "https://example.test");
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.emulation, EmulationMode::Ie10);
        assert_eq!(config.initial_rect(), PixelRect::new(0, 0, 800, 600));
    }

    #[test]
    fn emulation_none_has_no_registry_value() {
        assert_eq!(EmulationMode::None.registry_value(), None);
        assert_eq!(EmulationMode::default().registry_value(), Some(11001));
    }
}
