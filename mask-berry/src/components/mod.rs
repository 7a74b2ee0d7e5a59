//! 26-邻域三维连通域标记.
//!
//! 两个体素相邻, 当且仅当它们不重合, 且在三个坐标轴上的差都不超过 1.
//! 连通域编号从 1 开始, 按行优先序 (`z`, `h`, `w`) 下各连通域第一个体素出现的
//! 先后分配; 0 代表不属于任何连通域.

mod union_find;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        mod par;

        pub use par::{par_label_binary, par_label_where};
    }
}

use itertools::iproduct;
use ndarray::{Array3, ArrayView3};
use once_cell::sync::Lazy;

use crate::error::{ValidateResult, ValidationError};
use crate::{Idx3d, Predicate};
use union_find::UnionFind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 三维偏移量 `(dz, dh, dw)`.
pub(crate) type Offset3d = (isize, isize, isize);

/// 全部 26 个邻居偏移量, 按字典序排列.
pub(crate) static NEIGHBOUR26: Lazy<Vec<Offset3d>> = Lazy::new(|| {
    iproduct!(-1isize..=1, -1isize..=1, -1isize..=1)
        .filter(|o| *o != (0, 0, 0))
        .collect()
});

/// 行优先扫描时已经访问过的 13 个邻居偏移量.
static BACKWARD13: Lazy<Vec<Offset3d>> = Lazy::new(|| {
    NEIGHBOUR26
        .iter()
        .copied()
        .filter(|o| *o < (0, 0, 0))
        .collect()
});

/// 计算 `pos + offset`. 越界时返回 `None`.
#[inline]
pub(crate) fn shift(
    (z, h, w): Idx3d,
    (dz, dh, dw): Offset3d,
    (zn, hn, wn): Idx3d,
) -> Option<Idx3d> {
    let z = z.checked_add_signed(dz).filter(|v| *v < zn)?;
    let h = h.checked_add_signed(dh).filter(|v| *v < hn)?;
    let w = w.checked_add_signed(dw).filter(|v| *v < wn)?;
    Some((z, h, w))
}

/// 获取 `pos` 在 `shape` 范围内的所有 26-邻居.
#[inline]
pub fn neighbours26(pos: Idx3d, shape: Idx3d) -> impl Iterator<Item = Idx3d> {
    NEIGHBOUR26.iter().filter_map(move |o| shift(pos, *o, shape))
}

/// 单个连通域的记录: 编号和体素个数.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentRecord {
    /// 连通域编号, 从 1 开始.
    pub id: u32,

    /// 连通域体素个数.
    pub volume: usize,
}

/// 连通域标记结果.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Components {
    labels: Array3<u32>,
    // 第 `i` 个元素为编号 `i + 1` 的连通域体素个数.
    volumes: Vec<usize>,
}

impl Components {
    /// 连通域个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// 是否不存在任何连通域.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// 编号图. 与输入同形状, 背景为 0.
    #[inline]
    pub fn labels(&self) -> ArrayView3<'_, u32> {
        self.labels.view()
    }

    /// 取出编号图.
    #[inline]
    pub fn into_labels(self) -> Array3<u32> {
        self.labels
    }

    /// 编号为 `id` 的连通域体素个数. 编号不存在时返回 `None`.
    #[inline]
    pub fn volume(&self, id: u32) -> Option<usize> {
        (id as usize)
            .checked_sub(1)
            .and_then(|i| self.volumes.get(i).copied())
    }

    /// 获取 `pos` 处体素所属的连通域编号. 越界时 panic.
    #[inline]
    pub fn id_at(&self, pos: Idx3d) -> u32 {
        self.labels[pos]
    }

    /// 按编号升序迭代全部连通域记录.
    pub fn records(&self) -> impl ExactSizeIterator<Item = ComponentRecord> + '_ {
        self.volumes
            .iter()
            .enumerate()
            .map(|(i, &volume)| ComponentRecord {
                id: i as u32 + 1,
                volume,
            })
    }

    /// 由临时标签图和并查集生成最终结果.
    fn finish(mut labels: Array3<u32>, mut uf: UnionFind) -> Self {
        let (table, n) = uf.resolve();
        labels.mapv_inplace(|l| table[l as usize]);
        let mut volumes = vec![0usize; n as usize];
        for &id in labels.iter().filter(|id| **id != 0) {
            volumes[id as usize - 1] += 1;
        }
        Self { labels, volumes }
    }
}

/// 对 `mask` 中满足 `pred` 的体素做一遍行优先扫描, 分配临时标签.
///
/// 每个被选中的体素只查看 13 个已访问邻居: 若都未标记则分配新标签,
/// 否则沿用第一个已标记邻居的标签, 并与其余邻居的标签合并.
pub(crate) fn scan_provisional(mask: ArrayView3<'_, u8>, pred: Predicate) -> (Array3<u32>, UnionFind) {
    let shape = mask.dim();
    let mut labels = Array3::<u32>::zeros(shape);
    let mut uf = UnionFind::new();
    let backward = &*BACKWARD13;

    for (pos, &p) in mask.indexed_iter() {
        if !pred(p) {
            continue;
        }
        let mut cur = 0u32;
        for n in backward.iter().filter_map(|o| shift(pos, *o, shape)) {
            match labels[n] {
                0 => {}
                l if cur == 0 => cur = l,
                l if l != cur => uf.union(cur, l),
                _ => {}
            }
        }
        if cur == 0 {
            cur = uf.make_set();
        }
        labels[pos] = cur;
    }
    (labels, uf)
}

/// 标记 `mask` 中满足 `pred` 的体素构成的 26-连通域.
///
/// 等价于先按 `pred` 生成二值 mask 再调用 [`label_binary`], 但不需要额外的
/// 二值 mask 缓冲区.
pub fn label_where(mask: ArrayView3<'_, u8>, pred: Predicate) -> Components {
    let (labels, uf) = scan_provisional(mask, pred);
    log::trace!("provisional labels: {}", uf.len());
    Components::finish(labels, uf)
}

/// 检查 `mask` 是否为二值 (0/1) 数据.
pub(crate) fn check_binary(mask: ArrayView3<'_, u8>) -> ValidateResult<()> {
    match mask.indexed_iter().find(|(_, p)| **p > 1) {
        Some((pos, &value)) => Err(ValidationError::NonBinary { pos, value }),
        None => Ok(()),
    }
}

/// 标记二值 (0/1) 三维数据中值为 1 的体素构成的 26-连通域.
///
/// 如果存在 0, 1 以外的值, 返回 [`ValidationError::NonBinary`].
pub fn label_binary(mask: ArrayView3<'_, u8>) -> ValidateResult<Components> {
    check_binary(mask)?;
    Ok(label_where(mask, |p| p == 1))
}
