/// Poids BT.601, en millièmes.
pub const WEIGHT_R: u32 = 299;
pub const WEIGHT_G: u32 = 587;
pub const WEIGHT_B: u32 = 114;

/// Luminance BT.601 d'un pixel RGB, dans [0, 255], non clampée.
///
/// Somme entière puis une seule division : un gris `v` donne exactement `v`.
///
/// # Example
/// ```
/// use gc_ascii::luminance::luma;
/// assert!((luma(255, 255, 255) - 255.0).abs() < 1e-3);
/// assert_eq!(luma(0, 0, 0), 0.0);
/// ```
#[inline(always)]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    let sum = WEIGHT_R * u32::from(r) + WEIGHT_G * u32::from(g) + WEIGHT_B * u32::from(b);
    sum as f32 / 1000.0
}

/// Extract a luminance plane from a packed RGB buffer.
///
/// `out` is resized to one value per pixel.
///
/// # Example
/// ```
/// use gc_ascii::luminance::extract_luminance;
/// let mut out = Vec::new();
/// extract_luminance(&[255, 0, 0, 0, 0, 255], &mut out);
/// assert_eq!(out.len(), 2);
/// assert!((out[0] - 76.245).abs() < 1e-3);
/// ```
pub fn extract_luminance(rgb: &[u8], out: &mut Vec<f32>) {
    out.clear();
    out.extend(rgb.chunks_exact(3).map(|px| luma(px[0], px[1], px[2])));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        assert_eq!(WEIGHT_R + WEIGHT_G + WEIGHT_B, 1000);
    }

    #[test]
    fn green_dominates() {
        assert!(luma(0, 255, 0) > luma(255, 0, 0));
        assert!(luma(255, 0, 0) > luma(0, 0, 255));
    }

    #[test]
    fn gray_is_fixed_point() {
        for v in [0u8, 17, 128, 200, 255] {
            assert_eq!(luma(v, v, v), f32::from(v));
        }
    }
}
