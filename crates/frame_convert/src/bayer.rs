//! Bayer demosaic
//!
//! Each 2x2 cell yields one RGB value shared by its four pixels. Cheap and
//! good enough for preview and alignment checks.

use contracts::ColorMode;

/// Offsets of (R, G1, G2, B) inside a 2x2 cell as (dx, dy)
fn cell_layout(mode: ColorMode) -> [(usize, usize); 4] {
    match mode {
        ColorMode::BayerGr => [(1, 0), (0, 0), (1, 1), (0, 1)],
        ColorMode::BayerGb => [(0, 1), (0, 0), (1, 1), (1, 0)],
        ColorMode::BayerBg => [(1, 1), (1, 0), (0, 1), (0, 0)],
        _ => [(0, 0), (1, 0), (0, 1), (1, 1)],
    }
}

pub(crate) fn demosaic(samples: &[u8], width: usize, height: usize, mode: ColorMode) -> Vec<u8> {
    let layout = cell_layout(mode);
    let mut rgb = vec![0u8; width * height * 3];

    // Cells hanging over an odd edge reuse the last row/column.
    let at = |x: usize, y: usize| samples[y.min(height - 1) * width + x.min(width - 1)];

    for cy in (0..height).step_by(2) {
        for cx in (0..width).step_by(2) {
            let [(rx, ry), (g1x, g1y), (g2x, g2y), (bx, by)] = layout;
            let r = at(cx + rx, cy + ry);
            let g = ((u16::from(at(cx + g1x, cy + g1y)) + u16::from(at(cx + g2x, cy + g2y))) / 2)
                as u8;
            let b = at(cx + bx, cy + by);

            for y in cy..(cy + 2).min(height) {
                for x in cx..(cx + 2).min(width) {
                    let offset = (y * width + x) * 3;
                    rgb[offset..offset + 3].copy_from_slice(&[r, g, b]);
                }
            }
        }
    }
    rgb
}
