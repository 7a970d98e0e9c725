//! Luminance quantization steps for a given JPEG quality.
//!
//! The standard IJG luminance table scaled with the libjpeg quality curve,
//! the same derivation baseline JPEG encoders use. Embedding works in units
//! of these steps so a coefficient lands in the middle of the bin the
//! encoder will snap it to.

/// Standard IJG luminance quantization table, row-major order.
#[rustfmt::skip]
const LUMA_BASE: [u16; 64] = [
    16,  11,  10,  16,  24,  40,  51,  61,
    12,  12,  14,  19,  26,  58,  60,  55,
    14,  13,  16,  24,  40,  57,  69,  56,
    14,  17,  22,  29,  51,  87,  80,  62,
    18,  22,  37,  56,  68, 109, 103,  77,
    24,  35,  55,  64,  81, 104, 113,  92,
    49,  64,  78,  87, 103, 121, 120, 101,
    72,  92,  95,  98, 112, 100, 103,  99,
];

/// Luminance quantization steps at one quality level, row-major order.
#[derive(Debug, Clone)]
pub struct LumaTable([f64; 64]);

impl LumaTable {
    pub fn for_quality(quality: u8) -> Self {
        let quality = u32::from(quality.clamp(1, 100));
        let scale = if quality < 50 {
            5000 / quality
        } else {
            200 - quality * 2
        };

        let mut steps = [0.0; 64];
        for (step, &base) in steps.iter_mut().zip(LUMA_BASE.iter()) {
            *step = ((u32::from(base) * scale + 50) / 100).clamp(1, 255) as f64;
        }
        LumaTable(steps)
    }

    /// Quantization step at a row-major coefficient position.
    pub fn step(&self, nat: usize) -> f64 {
        self.0[nat]
    }
}
