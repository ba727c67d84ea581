#![allow(dead_code)]

/// Black left half, white from column `split` on.
pub fn vertical_step_u8(width: usize, height: usize, split: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in split..width {
            img[y * width + x] = 255;
        }
    }
    img
}

/// Black top half, white from row `split` on.
pub fn horizontal_step_u8(width: usize, height: usize, split: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![0u8; width * height];
    for v in img.iter_mut().skip(split * width) {
        *v = 255;
    }
    img
}

/// Sinusoidal stripes whose intensity varies along the direction
/// `gradient_deg` (degrees from +x, y pointing down). The stripes themselves
/// run perpendicular to that direction.
pub fn oriented_stripes_u8(width: usize, height: usize, period: f64, gradient_deg: f64) -> Vec<u8> {
    assert!(period > 0.0, "period must be positive");
    let (s, c) = gradient_deg.to_radians().sin_cos();
    let k = 2.0 * std::f64::consts::PI / period;
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let phase = k * (x as f64 * c + y as f64 * s);
            img[y * width + x] = (127.0 + 100.0 * phase.cos()).round() as u8;
        }
    }
    img
}

/// Deterministic white noise.
pub fn noise_u8(width: usize, height: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..width * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Swap rows and columns of a row-major buffer.
pub fn transpose_u8(width: usize, height: usize, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = data[y * width + x];
        }
    }
    out
}
