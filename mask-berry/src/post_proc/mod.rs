//! 后处理流程集合.

mod lesion;
mod organ;
mod pipeline;

use ndarray::{Array3, ArrayView3, Zip};

use crate::components::{label_where, Components};
use crate::Predicate;

pub use lesion::{remove_outlier_lesion, remove_outlier_lesion0, LesionReport};
pub use organ::{remove_outlier_organ, remove_outlier_organ0, OrganReport};
pub use pipeline::{process, process_array, process_with_report, PipelineReport, PostProcessConfig};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use crate::components::par_label_where;

        pub use lesion::par_remove_outlier_lesion;
        pub use organ::par_remove_outlier_organ;
        pub use pipeline::{par_process, par_process_with_report};
    }
}

/// 过滤算法的执行方式. 两种方式的结果完全一致.
#[derive(Copy, Clone, Debug)]
enum Exec {
    /// 单线程.
    Serial,

    /// 借助 `rayon` 多线程.
    #[cfg(feature = "rayon")]
    Parallel,
}

impl Exec {
    /// 标记 `mask` 中满足 `pred` 的体素构成的 26-连通域.
    fn label(self, mask: ArrayView3<'_, u8>, pred: Predicate) -> Components {
        match self {
            Exec::Serial => label_where(mask, pred),
            #[cfg(feature = "rayon")]
            Exec::Parallel => par_label_where(mask, pred),
        }
    }

    /// 逐体素地由 (原标签, 连通域编号) 生成新标签.
    fn relabel<F>(self, volume: ArrayView3<'_, u8>, ids: ArrayView3<'_, u32>, f: F) -> Array3<u8>
    where
        F: Fn(u8, u32) -> u8 + Sync + Send,
    {
        let zip = Zip::from(volume).and(ids);
        match self {
            Exec::Serial => zip.map_collect(|&v, &id| f(v, id)),
            #[cfg(feature = "rayon")]
            Exec::Parallel => zip.par_map_collect(|&v, &id| f(v, id)),
        }
    }
}
