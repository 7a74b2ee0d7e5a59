//! 游离病灶去除.

use log::{debug, trace};
use ndarray::Zip;

use super::Exec;
use crate::components::ComponentRecord;
use crate::consts::gray::*;
use crate::LabelVolume;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 去除与器官不连通的病灶.
///
/// 将器官和病灶统称为前景, 按照 26-相邻规则标记前景连通域.
/// 不含任何器官体素的连通域中的病灶体素全部改为背景; 器官体素原样保留.
///
/// 输出保证: 每个病灶体素都能经由一条全部由前景体素组成的 26-相邻路径到达某个器官体素.
pub fn remove_outlier_lesion(volume: &LabelVolume) -> (LabelVolume, LesionReport) {
    filter_lesion(volume, Exec::Serial)
}

/// 同 [`remove_outlier_lesion`], 但不返回对去除结果的描述.
#[inline]
pub fn remove_outlier_lesion0(volume: &LabelVolume) -> LabelVolume {
    remove_outlier_lesion(volume).0
}

/// 借助 `rayon` 运行 [`remove_outlier_lesion`]. 结果与串行版本一致.
#[cfg(feature = "rayon")]
pub fn par_remove_outlier_lesion(volume: &LabelVolume) -> (LabelVolume, LesionReport) {
    filter_lesion(volume, Exec::Parallel)
}

/// 病灶过滤结果描述.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LesionReport {
    /// 含有器官体素的前景连通域个数.
    pub attached: usize,

    /// 不含器官体素而被去除的前景连通域, 按编号升序排列.
    /// `volume` 即被去除的病灶体素个数.
    pub detached: Vec<ComponentRecord>,
}

impl LesionReport {
    /// 被去除的病灶体素总数.
    pub fn removed_voxels(&self) -> usize {
        self.detached.iter().map(|r| r.volume).sum()
    }
}

pub(super) fn filter_lesion(volume: &LabelVolume, exec: Exec) -> (LabelVolume, LesionReport) {
    let components = exec.label(volume.data(), is_foreground);
    debug!("foreground components: {}", components.len());

    // 以连通域编号为下标, 0 号为背景.
    let mut has_organ = vec![false; components.len() + 1];
    let mut lesions = vec![0usize; components.len() + 1];
    Zip::from(volume.data())
        .and(components.labels())
        .for_each(|&v, &id| match v {
            ORGAN => has_organ[id as usize] = true,
            LESION => lesions[id as usize] += 1,
            _ => {}
        });

    let mut report = LesionReport::default();
    for id in 1..=components.len() {
        if has_organ[id] {
            report.attached += 1;
        } else {
            debug_assert_eq!(components.volume(id as u32), Some(lesions[id]));
            trace!("lesion component #{id} ({} voxels) is detached", lesions[id]);
            report.detached.push(ComponentRecord {
                id: id as u32,
                volume: lesions[id],
            });
        }
    }
    debug!(
        "foreground components attached: {}, detached: {}",
        report.attached,
        report.detached.len()
    );

    let data = exec.relabel(volume.data(), components.labels(), |v, id| match v {
        ORGAN => ORGAN,
        LESION if has_organ[id as usize] => LESION,
        _ => BACKGROUND,
    });
    (LabelVolume::new_unchecked(data), report)
}
