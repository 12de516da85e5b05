//! Inputs for the chart collaborators: the daily chart's y-axis ceiling and
//! the weekly pie's completion color ramp.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Dark green, the fully-completed end of the ramp.
    pub const DARKEST: Rgb = Rgb {
        r: 6,
        g: 78,
        b: 59,
    };
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Y-axis ceiling for the daily star chart: one above the series maximum,
/// with a floor of 1 applied to the maximum so an all-zero series still
/// renders a visible scale.
pub fn axis_ceiling(counts: &[u32]) -> u32 {
    counts.iter().copied().max().unwrap_or(0).max(1) + 1
}

/// Linear ramp from white (no stars) to dark green (all stars). Darkness is
/// monotonically non-decreasing in `count`; counts past `max` clamp.
pub fn completion_color(count: u32, max: u32) -> Rgb {
    if count == 0 || max == 0 {
        return Rgb::WHITE;
    }
    let ratio = (count as f64 / max as f64).min(1.0);
    let lerp = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * ratio).round() as u8;
    Rgb {
        r: lerp(Rgb::WHITE.r, Rgb::DARKEST.r),
        g: lerp(Rgb::WHITE.g, Rgb::DARKEST.g),
        b: lerp(Rgb::WHITE.b, Rgb::DARKEST.b),
    }
}
