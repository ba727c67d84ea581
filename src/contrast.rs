//! Contrast-limited adaptive histogram equalisation (CLAHE) for 8-bit images.
//!
//! The image is split into a `tiles_x` × `tiles_y` grid. Every tile gets its
//! own equalisation lookup table built from a clipped histogram, and each
//! pixel blends the tables of the four nearest tile centres bilinearly.
//! When the image size is not a multiple of the grid, tiles are sized for
//! the image padded right and bottom with reflect-101 samples.
//!
//! `clip_limit` is relative to a flat histogram: a bin keeps at most
//! `clip_limit * tile_area / 256` samples (at least one) and the excess is
//! spread over all bins. `clip_limit <= 0` turns clipping off, which is
//! plain adaptive equalisation.
use crate::error::{OrientationError, Result};
use crate::filters::reflect_101;
use crate::image::{GrayImageU8, ImageU8, ImageView};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const HIST_SIZE: usize = 256;

/// CLAHE settings. Defaults are the conventional clip limit 2 on an 8×8 grid.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClaheParams {
    pub clip_limit: f64,
    pub tiles_x: usize,
    pub tiles_y: usize,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles_x: 8,
            tiles_y: 8,
        }
    }
}

/// Equalise `src` tile by tile. Fails on a non-finite clip limit and on a
/// grid with a zero dimension or more tiles than pixels along an axis.
pub fn clahe(src: &ImageU8<'_>, clip_limit: f64, tiles_x: usize, tiles_y: usize) -> Result<GrayImageU8> {
    if !clip_limit.is_finite() {
        return Err(OrientationError::InvalidClipLimit(clip_limit));
    }
    let (w, h) = (src.w, src.h);
    if tiles_x == 0 || tiles_y == 0 || tiles_x > w || tiles_y > h {
        return Err(OrientationError::InvalidTileGrid { tiles_x, tiles_y });
    }
    let tile_w = w.div_ceil(tiles_x);
    let tile_h = h.div_ceil(tiles_y);
    let area = tile_w * tile_h;
    let limit = (clip_limit > 0.0)
        .then(|| ((clip_limit * area as f64 / HIST_SIZE as f64) as usize).max(1));
    debug!(
        "clahe: {w}x{h} grid={tiles_x}x{tiles_y} tile={tile_w}x{tile_h} limit={limit:?}"
    );

    let luts: Vec<[u8; HIST_SIZE]> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|t| {
            let (tx, ty) = (t % tiles_x, t / tiles_x);
            let mut hist = [0usize; HIST_SIZE];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let row = src.row(reflect_101(y as isize, h));
                for x in tx * tile_w..(tx + 1) * tile_w {
                    hist[row[reflect_101(x as isize, w)] as usize] += 1;
                }
            }
            if let Some(limit) = limit {
                clip_histogram(&mut hist, limit);
            }
            equalisation_lut(&hist, area)
        })
        .collect();

    let inv_tw = 1.0 / tile_w as f64;
    let inv_th = 1.0 / tile_h as f64;
    let mut out = vec![0u8; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, dst)| {
        let (ty1, ty2, ya) = neighbours(y as f64 * inv_th - 0.5, tiles_y);
        let (top, bottom) = (&luts[ty1 * tiles_x..], &luts[ty2 * tiles_x..]);
        let row = src.row(y);
        for (x, d) in dst.iter_mut().enumerate() {
            let (tx1, tx2, xa) = neighbours(x as f64 * inv_tw - 0.5, tiles_x);
            let v = row[x] as usize;
            let upper = f64::from(top[tx1][v]) * (1.0 - xa) + f64::from(top[tx2][v]) * xa;
            let lower = f64::from(bottom[tx1][v]) * (1.0 - xa) + f64::from(bottom[tx2][v]) * xa;
            *d = (upper * (1.0 - ya) + lower * ya).round().clamp(0.0, 255.0) as u8;
        }
    });
    GrayImageU8::new(w, h, out)
}

/// Cap every bin at `limit` and hand the excess back evenly; the remainder
/// goes one sample at a time to bins spread across the range.
fn clip_histogram(hist: &mut [usize; HIST_SIZE], limit: usize) {
    let mut clipped = 0;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }
    let batch = clipped / HIST_SIZE;
    let mut residual = clipped - batch * HIST_SIZE;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (HIST_SIZE / residual).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn equalisation_lut(hist: &[usize; HIST_SIZE], area: usize) -> [u8; HIST_SIZE] {
    let scale = 255.0 / area as f64;
    let mut lut = [0u8; HIST_SIZE];
    let mut sum = 0;
    for (l, &count) in lut.iter_mut().zip(hist) {
        sum += count;
        *l = (sum as f64 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Lower/upper tile index around a position in tile units and the weight of
/// the upper one. Positions outside the outer tile centres clamp.
#[inline]
fn neighbours(pos: f64, tiles: usize) -> (usize, usize, f64) {
    let lo = pos.floor();
    let frac = pos - lo;
    let last = tiles as isize - 1;
    let lo = lo as isize;
    (lo.clamp(0, last) as usize, (lo + 1).clamp(0, last) as usize, frac)
}
