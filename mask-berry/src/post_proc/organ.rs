//! 器官离群连通域去除.

use std::cmp::Reverse;

use binary_heap_plus::BinaryHeap;
use log::{debug, trace};

use super::Exec;
use crate::components::ComponentRecord;
use crate::consts::gray::*;
use crate::consts::MAX_ORGAN_COMPONENTS;
use crate::LabelVolume;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 去除器官假阳性连通域.
///
/// 算法流程依次为:
///
/// 1. 按照 26-相邻规则标记所有器官 (`ORGAN`) 连通域.
/// 2. 体素个数严格小于 `volume_threshold` 的连通域被去除.
/// 3. 若 `keep_max_two` 为 `true`, 且剩余连通域多于两个,
///   则反复去除体积最小的连通域, 直到只剩两个. 若有多个连通域体积相同且最小,
///   编号最小 (即行优先序下最先出现) 的那个先被去除.
/// 4. 输出中存活的器官体素为 `ORGAN`; 输入中所有病灶 (`LESION`) 体素原样保留;
///   其余体素为 `BACKGROUND`.
///
/// 返回值的第二个分量描述了每个器官连通域的去留.
pub fn remove_outlier_organ(
    volume: &LabelVolume,
    volume_threshold: u64,
    keep_max_two: bool,
) -> (LabelVolume, OrganReport) {
    filter_organ(volume, volume_threshold, keep_max_two, Exec::Serial)
}

/// 同 [`remove_outlier_organ`], 但不返回对去除结果的描述.
#[inline]
pub fn remove_outlier_organ0(
    volume: &LabelVolume,
    volume_threshold: u64,
    keep_max_two: bool,
) -> LabelVolume {
    remove_outlier_organ(volume, volume_threshold, keep_max_two).0
}

/// 借助 `rayon` 运行 [`remove_outlier_organ`]. 结果与串行版本一致.
#[cfg(feature = "rayon")]
pub fn par_remove_outlier_organ(
    volume: &LabelVolume,
    volume_threshold: u64,
    keep_max_two: bool,
) -> (LabelVolume, OrganReport) {
    filter_organ(volume, volume_threshold, keep_max_two, Exec::Parallel)
}

/// 器官过滤结果描述. 各列表均按连通域编号升序排列.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrganReport {
    /// 保留下来的连通域.
    pub kept: Vec<ComponentRecord>,

    /// 因体积低于门限而被去除的连通域.
    pub undersized: Vec<ComponentRecord>,

    /// 因超出个数上限而被去除的连通域.
    pub excess: Vec<ComponentRecord>,
}

impl OrganReport {
    /// 被去除的器官体素总数.
    pub fn removed_voxels(&self) -> usize {
        self.undersized
            .iter()
            .chain(self.excess.iter())
            .map(|r| r.volume)
            .sum()
    }
}

pub(super) fn filter_organ(
    volume: &LabelVolume,
    volume_threshold: u64,
    keep_max_two: bool,
    exec: Exec,
) -> (LabelVolume, OrganReport) {
    let components = exec.label(volume.data(), is_organ);
    debug!("organ components: {}", components.len());

    let mut report = OrganReport::default();
    let (mut kept, undersized): (Vec<_>, Vec<_>) = components
        .records()
        .partition(|r| r.volume as u64 >= volume_threshold);
    report.undersized = undersized;

    if keep_max_two && kept.len() > MAX_ORGAN_COMPONENTS {
        // 小顶堆, 按 (体积, 编号) 出堆.
        let mut heap = BinaryHeap::new_by_key(|r: &ComponentRecord| Reverse((r.volume, r.id)));
        heap.extend(kept);
        while heap.len() > MAX_ORGAN_COMPONENTS {
            let Some(r) = heap.pop() else {
                break;
            };
            trace!("organ component #{} ({} voxels) exceeds the limit", r.id, r.volume);
            report.excess.push(r);
        }
        kept = heap.into_vec();
        kept.sort_unstable_by_key(|r| r.id);
        report.excess.sort_unstable_by_key(|r| r.id);
    }

    let mut keep = vec![false; components.len() + 1];
    for r in kept.iter() {
        keep[r.id as usize] = true;
    }
    report.kept = kept;
    debug!(
        "organ components kept: {}, undersized: {}, excess: {}",
        report.kept.len(),
        report.undersized.len(),
        report.excess.len()
    );

    let data = exec.relabel(volume.data(), components.labels(), |v, id| {
        if is_lesion(v) {
            LESION
        } else if keep[id as usize] {
            ORGAN
        } else {
            BACKGROUND
        }
    });
    (LabelVolume::new_unchecked(data), report)
}
