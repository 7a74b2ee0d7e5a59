//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::components::{label_binary, label_where, ComponentRecord, Components};
pub use crate::consts::gray::{BACKGROUND, LESION, ORGAN};
pub use crate::consts::{DEFAULT_VOLUME_THRESHOLD, MAX_ORGAN_COMPONENTS};
pub use crate::post_proc::{
    process, process_array, process_with_report, remove_outlier_lesion, remove_outlier_lesion0,
    remove_outlier_organ, remove_outlier_organ0, LesionReport, OrganReport, PipelineReport,
    PostProcessConfig,
};
pub use crate::{LabelVolume, ValidateResult, ValidationError};

#[cfg(feature = "rayon")]
pub use crate::components::{par_label_binary, par_label_where};

#[cfg(feature = "rayon")]
pub use crate::post_proc::{
    par_process, par_process_with_report, par_remove_outlier_lesion, par_remove_outlier_organ,
};
