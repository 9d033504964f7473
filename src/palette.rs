use plotters::style::RGBColor;
use vello::peniko::color::{AlphaColor, Srgb};

const WALKERS: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

pub(crate) const MARKER: (u8, u8, u8) = (214, 39, 40);
pub(crate) const HISTOGRAM: (u8, u8, u8) = (31, 119, 180);
pub(crate) const FIT: (u8, u8, u8) = (0, 0, 0);

pub(crate) const LINE_ALPHA: f32 = 0.7;
pub(crate) const MARKER_ALPHA: f32 = 0.2;

#[inline]
pub(crate) fn walker(index: usize) -> (u8, u8, u8) {
    WALKERS[index % WALKERS.len()]
}

#[inline]
pub(crate) fn vello((r, g, b): (u8, u8, u8), alpha: f32) -> AlphaColor<Srgb> {
    AlphaColor::from_rgba8(r, g, b, 255).with_alpha(alpha)
}

#[inline]
pub(crate) fn plotters((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walker_colours_cycle() {
        assert_eq!(walker(0), walker(10));
        assert_ne!(walker(0), walker(1));
    }
}
