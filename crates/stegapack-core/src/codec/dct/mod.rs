//! Content-adaptive DCT codec.
//!
//! The framed blob's bits are carried by mid-frequency AC coefficients of
//! the luminance plane, 8x8 block by block. Coefficients are measured in
//! units of the JPEG quantization step for the preset's quality; candidates
//! are ranked by a magnitude-based cost (textured regions first) and each
//! selected coefficient takes one bit in the LSB of its quantized index. A
//! 32-bit big-endian frame length occupies the first positions of the
//! ranking so extraction can size the rest of the read before scanning
//! further.
//!
//! Embedding is verified, not hoped for: the embedder encodes the stego
//! pixel grid through the real JPEG codec at the target quality, decodes it
//! back, and keeps nudging coefficients until every in-band index derived
//! from the decoded pixels equals the intended one. The bytes returned are
//! the verified encode itself, so extraction re-deriving the same indices
//! from the same bytes is exact by construction.

mod preset;
mod quant;
mod transform;
mod zigzag;

pub use preset::ChannelPreset;

use quant::LumaTable;

use image::RgbImage;
use log::{debug, info};

use crate::error::StegaError;
use crate::media;
use crate::result::Result;
use transform::N;
use zigzag::ZIGZAG;

/// Bits reserved for the frame length ahead of the frame itself.
const HEADER_BITS: usize = 32;

/// Eligibility floor for the quantized index. Writing a bit clears the LSB,
/// so anything below 2 could collapse to zero and vanish from the candidate
/// scan on extraction.
const MIN_INDEX: i64 = 2;

/// Positions whose quantization step is this small leave no headroom for
/// codec noise between the bit grid and the encoder's own rounding.
const MIN_STEP: f64 = 2.0;

/// Upper bound a recovered length header is trusted to.
const MAX_FRAME_BYTES: usize = 1 << 28;

/// Iterations of the per-block settling loop.
const MAX_SETTLE: usize = 8;

/// Full encode-decode verification passes before giving up. Converged
/// embeds return after the first clean pass; the headroom only costs time
/// on covers that are genuinely hard to stabilise.
const MAX_PASSES: usize = 10;

/// A settled coefficient may sit this far from its aim: a quarter of the
/// quantization bin, floored at about the noise the RGB8 quantization
/// injects.
fn settle_tolerance(step: f64) -> f64 {
    (0.25 * step).max(0.35)
}

/// One eligible coefficient in the embedding order. `index_floor` is the
/// LSB-cleared quantized index: the order key must not move when a bit is
/// written, and clearing the LSB is exactly the part of the index the
/// modulation preserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    index_floor: u32,
    block: u32,
    zz: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct EmbedStats {
    pub block_count: usize,
    pub eligible: usize,
    pub used: usize,
}

/// The luminance plane as DCT coefficient blocks, plus everything needed to
/// put the image back together.
struct CoefficientGrid {
    blocks: Vec<[f64; N * N]>,
    cols: usize,
    rows: usize,
    width: usize,
    height: usize,
    cb: Vec<u8>,
    cr: Vec<u8>,
}

impl CoefficientGrid {
    fn from_image(img: &RgbImage) -> Self {
        let planes = media::split_ycbcr(img);
        let cols = planes.width.div_ceil(N);
        let rows = planes.height.div_ceil(N);

        let mut blocks = Vec::with_capacity(cols * rows);
        for br in 0..rows {
            for bc in 0..cols {
                let mut block = [0.0f64; N * N];
                for r in 0..N {
                    // edge replication for blocks that overhang the image
                    let sy = (br * N + r).min(planes.height - 1);
                    for c in 0..N {
                        let sx = (bc * N + c).min(planes.width - 1);
                        block[r * N + c] = planes.y[sy * planes.width + sx] as f64 - 128.0;
                    }
                }
                blocks.push(transform::forward(&block));
            }
        }

        CoefficientGrid {
            blocks,
            cols,
            rows,
            width: planes.width,
            height: planes.height,
            cb: planes.cb,
            cr: planes.cr,
        }
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks that overhang the right or bottom edge only exist through
    /// replicated pixels that are never persisted, so they cannot be
    /// re-derived from the stego image and carry no data.
    fn is_full_block(&self, b: usize) -> bool {
        let br = b / self.cols;
        let bc = b % self.cols;
        (bc + 1) * N <= self.width && (br + 1) * N <= self.height
    }

    /// Eligible coefficients in embedding order: cost ascending (larger
    /// quantized indices first), then block row, block column and zig-zag
    /// index.
    fn candidates(&self, (lo, hi): (usize, usize), table: &LumaTable) -> Vec<Candidate> {
        let mut out = Vec::new();
        for (b, block) in self.blocks.iter().enumerate() {
            if !self.is_full_block(b) {
                continue;
            }
            for zz in lo..=hi {
                let nat = ZIGZAG[zz];
                let step = table.step(nat);
                if step < MIN_STEP {
                    continue;
                }
                let index = (block[nat] / step).round().abs() as i64;
                if index >= MIN_INDEX {
                    out.push(Candidate {
                        index_floor: (index & !1) as u32,
                        block: b as u32,
                        zz: zz as u8,
                    });
                }
            }
        }
        out.sort_unstable_by(|a, b| {
            b.index_floor
                .cmp(&a.index_floor)
                .then(a.block.cmp(&b.block))
                .then(a.zz.cmp(&b.zz))
        });
        out
    }

    /// Snap every workable in-band coefficient of every full block onto the
    /// quantization grid. Pinning the whole band keeps the candidate set
    /// derived from the stego image identical to the one derived from the
    /// cover.
    fn quantize_band(&mut self, positions: &[usize], table: &LumaTable) {
        for b in 0..self.blocks.len() {
            if !self.is_full_block(b) {
                continue;
            }
            for &nat in positions {
                let step = table.step(nat);
                self.blocks[b][nat] = (self.blocks[b][nat] / step).round() * step;
            }
        }
    }

    /// Write one bit per candidate into the LSB of the quantized index,
    /// preserving sign.
    fn write_bits<I: Iterator<Item = bool>>(
        &mut self,
        order: &[Candidate],
        bits: I,
        table: &LumaTable,
    ) {
        for (cand, bit) in order.iter().zip(bits) {
            let block = &mut self.blocks[cand.block as usize];
            let nat = ZIGZAG[cand.zz as usize];
            let step = table.step(nat);
            let index = (block[nat] / step).round();
            let magnitude = index.abs() as i64;
            debug_assert!(magnitude >= MIN_INDEX);
            let new_magnitude = ((magnitude & !1) | i64::from(bit)) as f64;
            block[nat] = if index < 0.0 { -new_magnitude } else { new_magnitude } * step;
        }
    }

    fn read_bit(&self, cand: &Candidate, table: &LumaTable) -> bool {
        let nat = ZIGZAG[cand.zz as usize];
        let index = (self.blocks[cand.block as usize][nat] / table.step(nat)).round();
        (index.abs() as i64) & 1 == 1
    }

    fn read_bytes(&self, order: &[Candidate], table: &LumaTable) -> Vec<u8> {
        let mut out = vec![0u8; order.len() / 8];
        for (i, cand) in order.iter().enumerate() {
            if self.read_bit(cand, table) {
                out[i / 8] |= 1 << (7 - i % 8);
            }
        }
        out
    }

    /// Nudge one block's coefficients until the luminance reconstructed
    /// from its RGB8 pixels lands within tolerance of each aim. Returns the
    /// block's pixel values.
    fn settle_block(&mut self, b: usize, aims: &[f64; N * N], checks: &[(usize, f64)]) -> [f64; N * N] {
        let base_r = (b / self.cols) * N;
        let base_c = (b % self.cols) * N;

        let mut pixels = [0.0; N * N];
        for _ in 0..MAX_SETTLE {
            pixels = transform::inverse(&self.blocks[b]);
            for v in pixels.iter_mut() {
                *v += 128.0;
            }

            let mut seen = [0.0f64; N * N];
            for r in 0..N {
                let idx = (base_r + r) * self.width + base_c;
                for c in 0..N {
                    let luma = media::rgb_roundtrip_luma(
                        pixels[r * N + c] as f32,
                        self.cb[idx + c],
                        self.cr[idx + c],
                    );
                    seen[r * N + c] = luma as f64 - 128.0;
                }
            }
            let observed = transform::forward(&seen);

            let mut settled = true;
            for &(nat, tolerance) in checks {
                let err = aims[nat] - observed[nat];
                if err.abs() > tolerance {
                    settled = false;
                    self.blocks[b][nat] += err;
                }
            }
            if settled {
                break;
            }
        }
        pixels
    }

    /// Paint one block's luminance into the output image through the shared
    /// YCbCr-to-RGB quantization.
    fn blit_block(&self, img: &mut RgbImage, b: usize, pixels: &[f64; N * N]) {
        let base_r = (b / self.cols) * N;
        let base_c = (b % self.cols) * N;
        for r in 0..N {
            let row = base_r + r;
            if row >= self.height {
                break;
            }
            for c in 0..N {
                let col = base_c + c;
                if col >= self.width {
                    break;
                }
                let idx = row * self.width + col;
                let px = media::ycbcr_pixel_to_rgb(
                    pixels[r * N + c] as f32,
                    self.cb[idx],
                    self.cr[idx],
                );
                img.put_pixel(col as u32, row as u32, image::Rgb(px));
            }
        }
    }
}

/// Number of coefficients actually used at a given rate: `ceil(rate * n)`.
fn used_from_rate(rate: f64, eligible: usize) -> usize {
    ((rate * eligible as f64).ceil() as usize).min(eligible)
}

/// Bit stream for an embed: 32-bit big-endian frame length, then the frame
/// bytes MSB first.
fn frame_bits(frame: &[u8]) -> impl Iterator<Item = bool> + '_ {
    let header = (frame.len() as u32).to_be_bytes();
    header
        .into_iter()
        .flat_map(byte_bits)
        .chain(frame.iter().flat_map(|&b| byte_bits(b)))
}

fn byte_bits(byte: u8) -> impl Iterator<Item = bool> {
    (0..8).map(move |i| (byte >> (7 - i)) & 1 == 1)
}

/// Zig-zag band positions (row-major indices) workable at this quality.
fn band_positions((lo, hi): (usize, usize), table: &LumaTable) -> Vec<usize> {
    (lo..=hi)
        .map(|zz| ZIGZAG[zz])
        .filter(|&nat| table.step(nat) >= MIN_STEP)
        .collect()
}

/// One embed, from capacity negotiation to verified JPEG bytes. Built once
/// per cover so capacity figures can go into the metadata record before the
/// frame is committed.
pub struct DctEmbedder {
    grid: CoefficientGrid,
    order: Vec<Candidate>,
    preset: ChannelPreset,
    table: LumaTable,
    rate: f64,
    used: usize,
}

impl DctEmbedder {
    pub fn new(cover: &RgbImage, rate: f64, preset: ChannelPreset) -> Result<Self> {
        let rate = preset.clamp_rate(rate)?;
        let table = LumaTable::for_quality(preset.quality());
        let grid = CoefficientGrid::from_image(cover);
        let order = grid.candidates(preset.band(), &table);
        let used = used_from_rate(rate, order.len());

        Ok(DctEmbedder {
            grid,
            order,
            preset,
            table,
            rate,
            used,
        })
    }

    /// The rate after clamping to the preset's cap.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn stats(&self) -> EmbedStats {
        EmbedStats {
            block_count: self.grid.block_count(),
            eligible: self.order.len(),
            used: self.used,
        }
    }

    /// Modulate the framed blob into the grid and return the verified JPEG
    /// encoding of the stego pixel grid.
    pub fn embed(mut self, frame: &[u8]) -> Result<Vec<u8>> {
        let required = HEADER_BITS + frame.len() * 8;
        if required > self.used {
            return Err(StegaError::NotEnoughCapacity {
                required,
                available: self.used,
            });
        }
        info!(
            "dct embed: {} blocks, {} eligible coefficients, rate {} -> {} usable bits, writing {required}",
            self.grid.block_count(),
            self.order.len(),
            self.rate,
            self.used,
        );

        let positions = band_positions(self.preset.band(), &self.table);
        let checks: Vec<(usize, f64)> = positions
            .iter()
            .map(|&nat| (nat, settle_tolerance(self.table.step(nat))))
            .collect();
        self.grid.quantize_band(&positions, &self.table);
        self.grid
            .write_bits(&self.order[..required], frame_bits(frame), &self.table);

        // In-band entries now sit on the quantization grid and are the
        // values extraction must re-derive; aims drift off the bin centers
        // as verification compensates for the codec's own arithmetic.
        let targets: Vec<[f64; N * N]> = self.grid.blocks.clone();
        let mut aims = targets.clone();

        let mut img = RgbImage::new(self.grid.width as u32, self.grid.height as u32);
        for b in 0..self.grid.block_count() {
            let pixels = if self.grid.is_full_block(b) {
                self.grid.settle_block(b, &aims[b], &checks)
            } else {
                let mut px = transform::inverse(&self.grid.blocks[b]);
                for v in px.iter_mut() {
                    *v += 128.0;
                }
                px
            };
            self.grid.blit_block(&mut img, b, &pixels);
        }

        let mut unstable = 0;
        for pass in 0..MAX_PASSES {
            let jpeg = media::encode_jpeg(&img, self.preset.quality())?;
            let decoded = media::decode_rgb(&jpeg)?;
            let observed = CoefficientGrid::from_image(&decoded);

            let mut failing = Vec::new();
            for b in 0..self.grid.block_count() {
                if !self.grid.is_full_block(b) {
                    continue;
                }
                let mut block_ok = true;
                for &nat in &positions {
                    let step = self.table.step(nat);
                    let center = targets[b][nat];
                    let seen = observed.blocks[b][nat];
                    if (center / step).round() != (seen / step).round() {
                        block_ok = false;
                        // shift the aim by the measured residual so the
                        // codec's drift lands the value back in its bin;
                        // the clamp keeps the aim itself inside the bin
                        let shifted = aims[b][nat] + (center - seen);
                        aims[b][nat] = shifted.clamp(center - 0.45 * step, center + 0.45 * step);
                    }
                }
                if !block_ok {
                    failing.push(b);
                }
            }

            if failing.is_empty() {
                debug!("dct embed verified against the produced jpeg after {pass} correction pass(es)");
                return Ok(jpeg);
            }
            unstable = failing.len();
            debug!(
                "dct embed pass {pass}: {unstable} block(s) disagree with the jpeg codec, re-settling"
            );

            for &b in &failing {
                let pixels = self.grid.settle_block(b, &aims[b], &checks);
                self.grid.blit_block(&mut img, b, &pixels);
            }
        }

        Err(StegaError::EmbeddingUnstable { blocks: unstable })
    }
}

/// Recover a framed blob from a stego pixel grid. The embedding band and
/// quality are not recorded outside the frame, so each preset is tried
/// until one yields a stream that opens with the payload marker.
pub fn extract_frame(stego: &RgbImage) -> Result<Vec<u8>> {
    let grid = CoefficientGrid::from_image(stego);

    for pre in ChannelPreset::ALL {
        let table = LumaTable::for_quality(pre.quality());
        if let Some(frame) = try_band(&grid, pre.band(), &table) {
            debug!("dct extract: frame recovered with the {pre} preset");
            return Ok(frame);
        }
        debug!("dct extract: no frame with the {pre} preset");
    }
    Err(StegaError::MarkerNotFound)
}

fn try_band(grid: &CoefficientGrid, band: (usize, usize), table: &LumaTable) -> Option<Vec<u8>> {
    let order = grid.candidates(band, table);
    if order.len() < HEADER_BITS {
        return None;
    }

    let header = grid.read_bytes(&order[..HEADER_BITS], table);
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if len == 0 || len > MAX_FRAME_BYTES {
        return None;
    }
    let need = len.checked_mul(8)?;
    if HEADER_BITS + need > order.len() {
        return None;
    }

    let frame = grid.read_bytes(&order[HEADER_BITS..HEADER_BITS + need], table);
    frame.starts_with(crate::frame::MARKER).then_some(frame)
}
