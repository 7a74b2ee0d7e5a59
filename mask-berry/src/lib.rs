#![warn(missing_docs)]

//! 核心库. 对三分类 3D 分割预测结果 (背景 / 器官 / 病灶) 进行连通域后处理,
//! 去除解剖学上不合理的伪影.
//!
//! 该 crate 仅提供 `safe` 接口, 且只处理内存中的 3D 标签体数据.
//! 文件读写 (nifti 等) 以及空间元信息 (spacing, origin, direction)
//! 由调用方负责.
//!
//! # 注意
//!
//! 1. 体素值只允许为 0 (背景), 1 (器官) 和 2 (病灶). 所有公开入口都会在计算前
//!   进行检查, 违反时返回 [`ValidationError`].
//! 2. 所有过滤操作都不修改输入, 而是生成新的 [`LabelVolume`].
//!
//! # 功能
//!
//! ### 26-邻域三维连通域标记 ✅
//!
//! 两遍扫描 + 并查集. 连通域编号按行优先序首次出现的顺序分配,
//! 保证同一输入多次运行结果一致. 打开 `rayon` feature 后提供按 z
//! 方向分块的并行版本, 其结果与串行版本完全一致.
//!
//! 实现位于 `mask-berry/src/components`.
//!
//! ### 器官离群连通域去除 ✅
//!
//! 去除体素个数低于门限的器官连通域, 并可选地只保留最大的两个器官连通域
//! (例如双肾).
//!
//! 实现位于 `mask-berry/src/post_proc/organ.rs`.
//!
//! ### 游离病灶去除 ✅
//!
//! 将器官与病灶共同视为前景, 去除不与任何器官体素连通的病灶.
//!
//! 实现位于 `mask-berry/src/post_proc/lesion.rs`.
//!
//! ### 后处理流水线 ✅
//!
//! 依次运行上述两步, 配置由 [`PostProcessConfig`] 给出.
//!
//! 实现位于 `mask-berry/src/post_proc/pipeline.rs`.

/// 三维索引 `(z, h, w)`, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 体素类别谓词.
type Predicate = fn(u8) -> bool;

pub mod components;
pub mod consts;
mod data;
mod error;
pub mod post_proc;
pub mod prelude;

pub use data::LabelVolume;
pub use error::{ValidateResult, ValidationError};
pub use post_proc::{process, process_array, process_with_report, PostProcessConfig};

#[cfg(feature = "rayon")]
pub use post_proc::{par_process, par_process_with_report};
