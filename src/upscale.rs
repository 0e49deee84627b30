use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Source column for every destination column, source row for every
/// destination row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        Self {
            src_x: axis(dst_w, src_w),
            src_y: axis(dst_h, src_h),
        }
    }

    pub fn dst_size(&self) -> (usize, usize) {
        (self.src_x.len(), self.src_y.len())
    }
}

fn axis(dst: usize, src: usize) -> Vec<usize> {
    if src == 0 {
        return vec![0; dst];
    }
    // sample pixel centers so edges get an even share
    let scale = src as f32 / dst as f32;
    (0..dst)
        .map(|d| (((d as f32 + 0.5) * scale) as usize).min(src - 1))
        .collect()
}

/// Nearest-neighbour stretch of `src` onto `dst`.
/// Rows are processed in parallel for cache friendly writes
pub fn blit_nearest(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    if dw == 0 || sw == 0 {
        return;
    }
    dst.par_chunks_mut(dw)
        .zip(lut.src_y.par_iter())
        .for_each(|(dst_row, &sy)| {
            let row = &src[sy * sw..(sy + 1) * sw];
            for (out, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
                *out = row[sx];
            }
        });
}

/// Internal framebuffer width for a fixed internal height, following the
/// window aspect. Kept even and at least 160.
pub fn internal_width(dst_w: usize, dst_h: usize, target_h: usize) -> usize {
    let aspect = if dst_h > 0 {
        dst_w as f32 / dst_h as f32
    } else {
        1.0
    };

    let mut w = (target_h as f32 * aspect).round() as usize;
    if w < 160 {
        w = 160;
    }
    if w % 2 != 0 {
        w += 1;
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubling_repeats_pixels() {
        let src = [1, 2, 3, 4];
        let lut = ScaleLut::new(4, 4, 2, 2);
        let mut dst = vec![0; 16];
        blit_nearest(&mut dst, 4, &src, 2, &lut);
        assert_eq!(
            dst,
            vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
        );
    }

    #[test]
    fn shrinking_stays_in_bounds() {
        let lut = ScaleLut::new(3, 1, 10, 7);
        assert_eq!(lut.dst_size(), (3, 1));
        let src: Vec<u32> = (0..70).collect();
        let mut dst = vec![0; 3];
        blit_nearest(&mut dst, 3, &src, 10, &lut);
        assert!(dst.iter().all(|&p| p < 70));
    }

    #[test]
    fn internal_width_follows_aspect() {
        assert_eq!(internal_width(960, 720, 240), 320);
        assert_eq!(internal_width(1001, 1000, 240), 240);
        assert_eq!(internal_width(100, 1000, 240), 160);
        assert_eq!(internal_width(0, 0, 240), 240);
        assert_eq!(internal_width(1282, 1000, 240), 308);
    }
}
