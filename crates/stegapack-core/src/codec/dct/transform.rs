//! Separable 8x8 DCT-II with the orthonormal scaling.
//!
//! The basis matrix `B[k][n] = a(k) * cos(pi/N * (n + 1/2) * k)` with
//! `a(0) = sqrt(1/N)` and `a(k) = sqrt(2/N)` is precomputed once; then
//! `DCT2(X) = B * X * B^T` and `IDCT2(Y) = B^T * Y * B`.

use std::sync::OnceLock;

pub const N: usize = 8;

fn basis() -> &'static [[f64; N]; N] {
    static BASIS: OnceLock<[[f64; N]; N]> = OnceLock::new();
    BASIS.get_or_init(|| {
        let mut b = [[0.0; N]; N];
        let scale0 = (1.0 / N as f64).sqrt();
        let scale = (2.0 / N as f64).sqrt();
        for (k, row) in b.iter_mut().enumerate() {
            let a = if k == 0 { scale0 } else { scale };
            for (n, cell) in row.iter_mut().enumerate() {
                *cell = a * (std::f64::consts::PI / N as f64 * (n as f64 + 0.5) * k as f64).cos();
            }
        }
        b
    })
}

pub fn forward(block: &[f64; N * N]) -> [f64; N * N] {
    let b = basis();
    // tmp = B * X
    let mut tmp = [0.0; N * N];
    for k in 0..N {
        for n in 0..N {
            let mut acc = 0.0;
            for m in 0..N {
                acc += b[k][m] * block[m * N + n];
            }
            tmp[k * N + n] = acc;
        }
    }
    // out = tmp * B^T
    let mut out = [0.0; N * N];
    for k in 0..N {
        for l in 0..N {
            let mut acc = 0.0;
            for n in 0..N {
                acc += tmp[k * N + n] * b[l][n];
            }
            out[k * N + l] = acc;
        }
    }
    out
}

pub fn inverse(coefs: &[f64; N * N]) -> [f64; N * N] {
    let b = basis();
    // tmp = B^T * Y
    let mut tmp = [0.0; N * N];
    for n in 0..N {
        for l in 0..N {
            let mut acc = 0.0;
            for k in 0..N {
                acc += b[k][n] * coefs[k * N + l];
            }
            tmp[n * N + l] = acc;
        }
    }
    // out = tmp * B
    let mut out = [0.0; N * N];
    for n in 0..N {
        for m in 0..N {
            let mut acc = 0.0;
            for l in 0..N {
                acc += tmp[n * N + l] * b[l][m];
            }
            out[n * N + m] = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_accurate_on_random_blocks() {
        let mut rng = fastrand::Rng::with_seed(1234);
        for _ in 0..100 {
            let mut block = [0.0; N * N];
            for cell in block.iter_mut() {
                *cell = rng.f64() * 255.0 - 128.0;
            }

            let back = inverse(&forward(&block));
            for (a, b) in block.iter().zip(back.iter()) {
                assert!((a - b).abs() < 1e-6, "roundtrip error: {a} vs {b}");
            }
        }
    }

    #[test]
    fn constant_block_concentrates_in_dc() {
        let block = [64.0; N * N];
        let coefs = forward(&block);

        // DC of a constant block is value * N for the orthonormal 2-D scaling.
        assert!((coefs[0] - 64.0 * N as f64).abs() < 1e-9);
        for &ac in &coefs[1..] {
            assert!(ac.abs() < 1e-9);
        }
    }

    #[test]
    fn transform_is_linear() {
        let mut rng = fastrand::Rng::with_seed(5);
        let mut x = [0.0; N * N];
        let mut y = [0.0; N * N];
        for i in 0..N * N {
            x[i] = rng.f64() * 100.0;
            y[i] = rng.f64() * 100.0;
        }

        let mut sum = [0.0; N * N];
        for i in 0..N * N {
            sum[i] = x[i] + y[i];
        }

        let fx = forward(&x);
        let fy = forward(&y);
        let fsum = forward(&sum);
        for i in 0..N * N {
            assert!((fsum[i] - fx[i] - fy[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn energy_is_preserved() {
        let mut rng = fastrand::Rng::with_seed(77);
        let mut block = [0.0; N * N];
        for cell in block.iter_mut() {
            *cell = rng.f64() * 255.0 - 128.0;
        }

        let coefs = forward(&block);
        let pixel_energy: f64 = block.iter().map(|v| v * v).sum();
        let coef_energy: f64 = coefs.iter().map(|v| v * v).sum();
        assert!((pixel_energy - coef_energy).abs() / pixel_energy < 1e-9);
    }
}
