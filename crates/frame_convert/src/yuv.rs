//! YUYV 4:2:2 to RGB (BT.601, limited range)

pub(crate) fn yuyv_to_rgb(samples: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixels = width * height;
    let mut rgb = Vec::with_capacity(pixels * 3);

    for quad in samples.chunks_exact(4) {
        let (y0, u, y1, v) = (quad[0], quad[1], quad[2], quad[3]);
        push_rgb(&mut rgb, y0, u, v);
        push_rgb(&mut rgb, y1, u, v);
    }

    // odd width: the last pixel of the buffer has no pair
    rgb.resize(pixels * 3, 0);
    rgb
}

fn push_rgb(out: &mut Vec<u8>, y: u8, u: u8, v: u8) {
    let c = i32::from(y) - 16;
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;

    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;

    out.extend_from_slice(&[clamp(r), clamp(g), clamp(b)]);
}

fn clamp(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white() {
        let rgb = yuyv_to_rgb(&[16, 128, 235, 128], 2, 1);
        assert_eq!(&rgb[0..3], &[0, 0, 0]);
        assert_eq!(&rgb[3..6], &[255, 255, 255]);
    }

    #[test]
    fn test_output_len() {
        let rgb = yuyv_to_rgb(&[128; 8], 4, 1);
        assert_eq!(rgb.len(), 12);
    }
}
