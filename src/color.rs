use eframe::egui::{Color32, ColorImage};
use palette::{Hsl, IntoColor, Mix, Srgb};

use crate::data::model::IntensityMatrix;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used for the D2 overlay lines.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32(Hsl::new((i as f32 / n as f32) * 300.0, 0.75, 0.55)))
        .collect()
}

// ---------------------------------------------------------------------------
// Colour maps
// ---------------------------------------------------------------------------

/// Colour maps offered for the heat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Jet,
    Viridis,
    Plasma,
    Grayscale,
}

// (position, r, g, b), matplotlib anchor colours.
const JET: [(f32, f32, f32, f32); 6] = [
    (0.0, 0.0, 0.0, 0.5),
    (0.125, 0.0, 0.0, 1.0),
    (0.375, 0.0, 1.0, 1.0),
    (0.625, 1.0, 1.0, 0.0),
    (0.875, 1.0, 0.0, 0.0),
    (1.0, 0.5, 0.0, 0.0),
];
const VIRIDIS: [(f32, f32, f32, f32); 5] = [
    (0.0, 0.267, 0.004, 0.329),
    (0.25, 0.282, 0.141, 0.458),
    (0.5, 0.127, 0.567, 0.551),
    (0.75, 0.454, 0.820, 0.322),
    (1.0, 0.993, 0.906, 0.144),
];
const PLASMA: [(f32, f32, f32, f32); 5] = [
    (0.0, 0.050, 0.030, 0.530),
    (0.25, 0.417, 0.001, 0.658),
    (0.5, 0.798, 0.125, 0.424),
    (0.75, 0.973, 0.434, 0.098),
    (1.0, 0.940, 0.975, 0.131),
];
const GRAYSCALE: [(f32, f32, f32, f32); 2] = [(0.0, 0.0, 0.0, 0.0), (1.0, 1.0, 1.0, 1.0)];

impl Colormap {
    pub const ALL: [Colormap; 4] = [
        Colormap::Jet,
        Colormap::Viridis,
        Colormap::Plasma,
        Colormap::Grayscale,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Colormap::Jet => "jet",
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Grayscale => "gray",
        }
    }

    fn anchors(self) -> &'static [(f32, f32, f32, f32)] {
        match self {
            Colormap::Jet => &JET,
            Colormap::Viridis => &VIRIDIS,
            Colormap::Plasma => &PLASMA,
            Colormap::Grayscale => &GRAYSCALE,
        }
    }

    /// Colour at position `t` in `[0, 1]`, linear between anchors.
    pub fn at(self, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let anchors = self.anchors();
        let i = anchors
            .windows(2)
            .position(|w| t <= w[1].0)
            .unwrap_or(anchors.len() - 2);
        let (t0, r0, g0, b0) = anchors[i];
        let (t1, r1, g1, b1) = anchors[i + 1];
        let frac = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };

        let rgb = Srgb::new(r0, g0, b0).mix(Srgb::new(r1, g1, b1), frac);
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgb(to_u8(rgb.red), to_u8(rgb.green), to_u8(rgb.blue))
    }
}

// ---------------------------------------------------------------------------
// Heat map: intensity → Color32
// ---------------------------------------------------------------------------

/// Linear colour scale between two intensity limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatScale {
    pub lo: f64,
    pub hi: f64,
}

impl HeatScale {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Position of `value` on the scale, in `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f32 {
        let range = self.hi - self.lo;
        if range.abs() < f64::EPSILON {
            return 0.0;
        }
        ((value - self.lo) / range).clamp(0.0, 1.0) as f32
    }
}

/// How the heat map is painted: the colour map plus the colours used for
/// values below and above the limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatStyle {
    pub colormap: Colormap,
    pub under: Color32,
    pub over: Color32,
}

impl Default for HeatStyle {
    fn default() -> Self {
        Self {
            colormap: Colormap::default(),
            under: Color32::from_rgb(0x00, 0x00, 0xFF),
            over: Color32::from_rgb(0xFF, 0x00, 0x00),
        }
    }
}

impl HeatStyle {
    /// Colour for `value`; missing samples are transparent.
    pub fn color_for(&self, scale: &HeatScale, value: f64) -> Color32 {
        if !value.is_finite() {
            Color32::TRANSPARENT
        } else if value < scale.lo {
            self.under
        } else if value > scale.hi {
            self.over
        } else {
            self.colormap.at(scale.normalize(value))
        }
    }

    /// Render the matrix with D2 along x and D1 increasing upwards.
    pub fn render(&self, scale: &HeatScale, matrix: &IntensityMatrix) -> ColorImage {
        let (n_rows, n_cols) = matrix.shape();
        let mut img = ColorImage::new([n_cols.max(1), n_rows.max(1)], Color32::TRANSPARENT);
        for (n, row) in matrix.rows().enumerate() {
            let y = n_rows - 1 - n;
            for (x, &v) in row.iter().enumerate() {
                img.pixels[y * n_cols + x] = self.color_for(scale, v);
            }
        }
        img
    }
}
