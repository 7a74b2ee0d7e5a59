//! 合成的分割预测体数据, 用于在没有真实数据集的情况下运行消融实验.
//!
//! 体数据包含两个椭球形器官, 一个附着在器官上的病灶, 若干游离病灶,
//! 以及沿 z 方向均匀撒布的小器官碎块 (假阳性).

use mask_berry::consts::gray::{BACKGROUND, LESION, ORGAN};
use mask_berry::{Idx3d, LabelVolume};
use std::ops::RangeInclusive;

/// 球心为 `center`, 三个半轴为 `radii` 的实心椭球.
#[derive(Copy, Clone, Debug)]
struct Ellipsoid {
    center: [f64; 3],
    radii: [f64; 3],
}

impl Ellipsoid {
    #[inline]
    fn contains(&self, (z, h, w): Idx3d) -> bool {
        [z, h, w]
            .iter()
            .zip(self.center.iter().zip(self.radii.iter()))
            .map(|(&p, (&c, &r))| ((p as f64 - c) / r).powi(2))
            .sum::<f64>()
            <= 1.0
    }

    /// 椭球包围盒在某一轴上的索引范围, 已截断到 `[0, len)`.
    fn span(&self, axis: usize, len: usize) -> RangeInclusive<usize> {
        let lo = (self.center[axis] - self.radii[axis]).floor().max(0.0) as usize;
        let hi = (self.center[axis] + self.radii[axis]).ceil() as usize;
        lo..=hi.min(len.saturating_sub(1))
    }

    fn paint(&self, data: &mut ndarray::Array3<u8>, label: u8) {
        let (zn, hn, wn) = data.dim();
        if zn == 0 || hn == 0 || wn == 0 {
            return;
        }
        for z in self.span(0, zn) {
            for h in self.span(1, hn) {
                for w in self.span(2, wn) {
                    if self.contains((z, h, w)) {
                        data[(z, h, w)] = label;
                    }
                }
            }
        }
    }
}

/// 生成形状为 `shape` 的合成分割预测.
///
/// `specks` 为撒布的假阳性器官碎块个数. 结果只取决于参数, 多次调用完全一致.
pub fn kidney_phantom(shape: Idx3d, specks: usize) -> LabelVolume {
    let (zn, hn, wn) = shape;
    let (zf, hf, wf) = (zn as f64, hn as f64, wn as f64);
    let mut data = ndarray::Array3::<u8>::from_elem(shape, BACKGROUND);

    let left = Ellipsoid {
        center: [zf * 0.5, hf * 0.5, wf * 0.28],
        radii: [zf * 0.3, hf * 0.22, wf * 0.12],
    };
    let right = Ellipsoid {
        center: [zf * 0.48, hf * 0.52, wf * 0.72],
        radii: [zf * 0.28, hf * 0.2, wf * 0.11],
    };
    left.paint(&mut data, ORGAN);
    right.paint(&mut data, ORGAN);

    // 附着于左侧器官下缘的病灶.
    Ellipsoid {
        center: [zf * 0.5, hf * 0.5 + hf * 0.22, wf * 0.28],
        radii: [zf * 0.06 + 1.0, hf * 0.05 + 1.0, wf * 0.05 + 1.0],
    }
    .paint(&mut data, LESION);

    // 远离器官的游离病灶.
    Ellipsoid {
        center: [zf * 0.15, hf * 0.12, wf * 0.5],
        radii: [2.0, 2.0, 2.0],
    }
    .paint(&mut data, LESION);

    // 沿 z 方向等距撒布的器官碎块, 每块 2 x 2 x 2.
    for i in 0..specks {
        let z = (i * zn) / specks.max(1);
        let (h, w) = ((hn * 7) / 8, (wn * (i % 5 + 1)) / 6);
        for (dz, dh, dw) in (0..2).flat_map(|a| (0..2).flat_map(move |b| (0..2).map(move |c| (a, b, c)))) {
            if let Some(p) = data.get_mut((z + dz, h + dh, w + dw)) {
                *p = ORGAN;
            }
        }
    }

    // 由上述构造保证取值合法.
    LabelVolume::new(data).expect("phantom only paints valid labels")
}

#[cfg(test)]
mod tests {
    use super::kidney_phantom;
    use mask_berry::prelude::*;

    #[test]
    fn test_phantom_post_process() {
        let v = kidney_phantom((40, 48, 64), 6);
        let [_, organ, lesion] = v.numeric_statistics();
        assert!(organ > 0 && lesion > 0);

        let (out, report) = process_with_report(&v, &PostProcessConfig::new(64, true));
        assert_eq!(report.organ.kept.len(), 2);
        assert!(!report.organ.undersized.is_empty());
        assert!(report.lesion.removed_voxels() > 0);
        assert!(out.count(LESION) > 0);
    }
}
