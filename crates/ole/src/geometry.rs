/// Pixel to HiMetric conversion for extent negotiation.
///
/// The hosted component sizes itself in HiMetric (2540 units per inch) while
/// the host window works in pixels. Screen DPI is read once per `Geometry`
/// and cached until [`Geometry::refresh_dpi`] is called.
use std::cell::Cell;

use webhost_domain::{MetricRect, PixelRect};

pub const HIMETRIC_PER_INCH: i32 = 2540;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelsPerInch {
    pub x: i32,
    pub y: i32,
}

impl Default for PixelsPerInch {
    fn default() -> Self {
        Self { x: 96, y: 96 }
    }
}

pub trait DpiSource {
    fn pixels_per_inch(&self) -> PixelsPerInch;
}

/// DPI source with a constant answer, for non-Windows builds and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDpi(pub PixelsPerInch);

impl DpiSource for FixedDpi {
    fn pixels_per_inch(&self) -> PixelsPerInch {
        self.0
    }
}

/// Logical pixels per inch of the primary screen.
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenDpi;

#[cfg(windows)]
impl DpiSource for ScreenDpi {
    fn pixels_per_inch(&self) -> PixelsPerInch {
        use windows::Win32::Graphics::Gdi::{GetDC, GetDeviceCaps, ReleaseDC, LOGPIXELSX, LOGPIXELSY};

        unsafe {
            let hdc = GetDC(None);
            if hdc.is_invalid() {
                tracing::warn!("GetDC failed, assuming 96 dpi");
                return PixelsPerInch::default();
            }
            let x = GetDeviceCaps(Some(hdc), LOGPIXELSX);
            let y = GetDeviceCaps(Some(hdc), LOGPIXELSY);
            ReleaseDC(None, hdc);
            PixelsPerInch { x, y }
        }
    }
}

pub fn default_dpi_source() -> Box<dyn DpiSource> {
    #[cfg(windows)]
    {
        Box::new(ScreenDpi)
    }

    #[cfg(not(windows))]
    {
        Box::new(FixedDpi::default())
    }
}

/// `number * numerator / denominator` rounded half away from zero, with the
/// Win32 `MulDiv` convention of returning -1 on a zero denominator or when the
/// result does not fit. Extent conversion uses the clamping variant below.
pub fn mul_div(number: i32, numerator: i32, denominator: i32) -> i32 {
    if denominator == 0 {
        return -1;
    }
    i32::try_from(scaled(number, numerator, denominator)).unwrap_or(-1)
}

/// Rounded quotient in 64 bits; `denominator` must be non-zero.
fn scaled(number: i32, numerator: i32, denominator: i32) -> i64 {
    let product = i64::from(number) * i64::from(numerator);
    let divisor = i64::from(denominator).abs();
    let magnitude = (product.abs() + divisor / 2) / divisor;
    if (product < 0) != (denominator < 0) {
        -magnitude
    } else {
        magnitude
    }
}

/// One pixel coordinate in HiMetric, clamped to the `i32` range so the
/// conversion stays monotonic at the edges.
fn to_himetric(pixels: i32, ppi: i32) -> i32 {
    if ppi <= 0 {
        return 0;
    }
    let value = scaled(HIMETRIC_PER_INCH, pixels, ppi);
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

pub fn pixel_to_himetric(rect: PixelRect, ppi: PixelsPerInch) -> MetricRect {
    MetricRect {
        left: to_himetric(rect.left, ppi.x),
        top: to_himetric(rect.top, ppi.y),
        right: to_himetric(rect.right, ppi.x),
        bottom: to_himetric(rect.bottom, ppi.y),
    }
}

pub struct Geometry {
    source: Box<dyn DpiSource>,
    cached: Cell<Option<PixelsPerInch>>,
}

impl Geometry {
    pub fn new(source: Box<dyn DpiSource>) -> Self {
        Self {
            source,
            cached: Cell::new(None),
        }
    }

    pub fn pixels_per_inch(&self) -> PixelsPerInch {
        if let Some(ppi) = self.cached.get() {
            return ppi;
        }

        let mut ppi = self.source.pixels_per_inch();
        if ppi.x <= 0 || ppi.y <= 0 {
            tracing::warn!(x = ppi.x, y = ppi.y, "invalid screen dpi, assuming 96");
            ppi = PixelsPerInch::default();
        }
        tracing::debug!(x = ppi.x, y = ppi.y, "screen dpi cached");
        self.cached.set(Some(ppi));
        ppi
    }

    pub fn to_metric(&self, rect: PixelRect) -> MetricRect {
        pixel_to_himetric(rect, self.pixels_per_inch())
    }

    /// Forget the cached DPI so the next conversion reads it again.
    pub fn refresh_dpi(&self) {
        self.cached.set(None);
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(default_dpi_source())
    }
}

impl std::fmt::Debug for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometry")
            .field("cached", &self.cached.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    struct CountingDpi {
        calls: Rc<Cell<u32>>,
        ppi: PixelsPerInch,
    }

    impl DpiSource for CountingDpi {
        fn pixels_per_inch(&self) -> PixelsPerInch {
            self.calls.set(self.calls.get() + 1);
            self.ppi
        }
    }

    #[test]
    fn mul_div_rounds_half_away_from_zero() {
        assert_eq!(mul_div(2540, 800, 96), 21167);
        assert_eq!(mul_div(2540, 600, 96), 15875);
        assert_eq!(mul_div(2540, -300, 96), -7938);
        assert_eq!(mul_div(1, 1, 2), 1);
        assert_eq!(mul_div(-1, 1, 2), -1);
    }

    #[test]
    fn mul_div_zero_denominator_is_minus_one() {
        assert_eq!(mul_div(2540, 10, 0), -1);
    }

    #[test]
    fn conversion_is_monotonic_per_edge() {
        let ppi = PixelsPerInch { x: 96, y: 120 };
        let mut previous = pixel_to_himetric(PixelRect::new(-500, -500, -500, -500), ppi);

        for v in -499..=500 {
            let metric = pixel_to_himetric(
                PixelRect {
                    left: v,
                    top: v,
                    right: v,
                    bottom: v,
                },
                ppi,
            );
            assert!(metric.left >= previous.left);
            assert!(metric.top >= previous.top);
            assert!(metric.right >= previous.right);
            assert!(metric.bottom >= previous.bottom);
            previous = metric;
        }
    }

    #[test]
    fn conversion_saturates_instead_of_wrapping() {
        let ppi = PixelsPerInch::default();
        let edges = [0, 1_000_000, 10_000_000, 100_000_000, 1_000_000_000, i32::MAX];

        let mut previous = i32::MIN;
        for edge in edges {
            let metric = pixel_to_himetric(PixelRect { left: 0, top: 0, right: edge, bottom: edge }, ppi);
            assert!(metric.right >= previous, "{edge} px went backwards");
            assert!(metric.right >= 0);
            previous = metric.right;
        }
        assert_eq!(previous, i32::MAX);

        let negative = pixel_to_himetric(
            PixelRect { left: i32::MIN, top: i32::MIN, right: 0, bottom: 0 },
            ppi,
        );
        assert_eq!(negative.left, i32::MIN);
        assert_eq!(negative.size().cx, i32::MAX);
    }

    #[test]
    fn huge_rect_yields_positive_extent() {
        let geometry = Geometry::new(Box::new(FixedDpi::default()));
        let size = geometry.to_metric(PixelRect::from_size(100_000_000, 100_000_000)).size();
        assert_eq!(size.cx, i32::MAX);
        assert_eq!(size.cy, i32::MAX);
    }

    #[test]
    fn zero_area_rect_converts_to_zero_extent() {
        let geometry = Geometry::new(Box::new(FixedDpi::default()));
        let metric = geometry.to_metric(PixelRect::new(40, 40, 40, 40));
        assert_eq!(metric.size().cx, 0);
        assert_eq!(metric.size().cy, 0);
    }

    #[test]
    fn dpi_is_read_once_until_refreshed() {
        let calls = Rc::new(Cell::new(0));
        let geometry = Geometry::new(Box::new(CountingDpi {
            calls: calls.clone(),
            ppi: PixelsPerInch { x: 144, y: 144 },
        }));

        geometry.to_metric(PixelRect::from_size(10, 10));
        geometry.to_metric(PixelRect::from_size(20, 20));
        assert_eq!(calls.get(), 1);

        geometry.refresh_dpi();
        geometry.to_metric(PixelRect::from_size(20, 20));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn nonsense_dpi_falls_back_to_96() {
        let geometry = Geometry::new(Box::new(FixedDpi(PixelsPerInch { x: 0, y: 0 })));
        assert_eq!(geometry.pixels_per_inch(), PixelsPerInch::default());
    }
}
