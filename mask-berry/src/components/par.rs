//! 按 z 方向分块的并行连通域标记.
//!
//! 各分块独立做临时标记, 随后在一个全局标签空间中串行合并相邻分块的接缝.
//! 分块的临时标签依次平移, 因此全局临时标签仍按行优先扫描顺序递增,
//! 最终编号与串行版本完全一致.

use ndarray::{s, Array3, ArrayView3, Axis, Zip};
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};

use super::union_find::UnionFind;
use super::{check_binary, scan_provisional, Components};
use crate::error::ValidateResult;
use crate::Predicate;

/// 将 `[0, len_z)` 切分为至多 `parts` 个连续区间.
fn slab_ranges(len_z: usize, parts: usize) -> Vec<(usize, usize)> {
    let depth = len_z.div_ceil(parts.max(1)).max(1);
    (0..len_z)
        .step_by(depth)
        .map(|z0| (z0, (z0 + depth).min(len_z)))
        .collect()
}

/// 借助 `rayon`, 并行地标记 `mask` 中满足 `pred` 的体素构成的 26-连通域.
///
/// 结果与 [`super::label_where`] 完全一致 (编号, 成员, 体素个数).
pub fn par_label_where(mask: ArrayView3<'_, u8>, pred: Predicate) -> Components {
    let shape = mask.dim();
    let ranges = slab_ranges(shape.0, rayon::current_num_threads());

    let slabs: Vec<(Array3<u32>, UnionFind)> = ranges
        .par_iter()
        .map(|&(z0, z1)| scan_provisional(mask.slice(s![z0..z1, .., ..]), pred))
        .collect();

    // 串行合并: 平移各分块标签.
    let mut uf = UnionFind::new();
    let mut labels = Array3::<u32>::zeros(shape);
    for (&(z0, z1), (slab, slab_uf)) in ranges.iter().zip(slabs.iter()) {
        let offset = uf.append(slab_uf);
        Zip::from(labels.slice_mut(s![z0..z1, .., ..]))
            .and(slab)
            .par_for_each(|dst, &l| *dst = if l == 0 { 0 } else { l + offset });
    }
    drop(slabs);

    // 串行合并: 缝合接缝两侧的 9-邻居.
    let (_, len_h, len_w) = shape;
    for &(z0, _) in ranges.iter().skip(1) {
        for ((h, w), &l) in labels.index_axis(Axis(0), z0).indexed_iter() {
            if l == 0 {
                continue;
            }
            for dh in -1isize..=1 {
                for dw in -1isize..=1 {
                    let Some(nh) = h.checked_add_signed(dh).filter(|v| *v < len_h) else {
                        continue;
                    };
                    let Some(nw) = w.checked_add_signed(dw).filter(|v| *v < len_w) else {
                        continue;
                    };
                    let below = labels[(z0 - 1, nh, nw)];
                    if below != 0 {
                        uf.union(l, below);
                    }
                }
            }
        }
    }
    log::trace!("provisional labels: {} in {} slabs", uf.len(), ranges.len());

    let (table, n) = uf.resolve();
    labels.par_mapv_inplace(|l| table[l as usize]);
    let volumes = labels
        .axis_iter(Axis(0))
        .into_par_iter()
        .fold(
            || vec![0usize; n as usize],
            |mut acc, sli| {
                for &id in sli.iter().filter(|id| **id != 0) {
                    acc[id as usize - 1] += 1;
                }
                acc
            },
        )
        .reduce(
            || vec![0usize; n as usize],
            |mut a, b| {
                a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                a
            },
        );
    Components { labels, volumes }
}

/// 借助 `rayon`, 并行地标记二值 (0/1) 三维数据中值为 1 的体素构成的 26-连通域.
pub fn par_label_binary(mask: ArrayView3<'_, u8>) -> ValidateResult<Components> {
    check_binary(mask)?;
    Ok(par_label_where(mask, |p| p == 1))
}
