//! 后处理流水线: 先去除器官离群连通域, 再去除游离病灶.

use log::info;
use ndarray::{Array3, ArrayD};

use super::lesion::{filter_lesion, LesionReport};
use super::organ::{filter_organ, OrganReport};
use super::Exec;
use crate::consts::DEFAULT_VOLUME_THRESHOLD;
use crate::error::{ValidateResult, ValidationError};
use crate::LabelVolume;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 后处理配置. 创建后不可变, 以值的形式传入流水线.
///
/// 默认值: 体积门限 50000 体素, 不限制器官连通域个数.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PostProcessConfig {
    /// 器官体积门限 (体素个数). 体素个数严格小于该值的器官连通域会被去除.
    pub volume_threshold: u64,

    /// 是否只保留体积最大的两个器官连通域.
    pub keep_max_two: bool,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME_THRESHOLD, false)
    }
}

impl PostProcessConfig {
    /// 直接创建.
    #[inline]
    pub const fn new(volume_threshold: u64, keep_max_two: bool) -> Self {
        Self {
            volume_threshold,
            keep_max_two,
        }
    }

    /// 从有符号门限创建. 门限为负时返回 [`ValidationError::NegativeThreshold`].
    pub fn try_new(volume_threshold: i64, keep_max_two: bool) -> ValidateResult<Self> {
        let th = u64::try_from(volume_threshold)
            .map_err(|_| ValidationError::NegativeThreshold(volume_threshold))?;
        Ok(Self::new(th, keep_max_two))
    }

    /// 替换体积门限.
    #[inline]
    pub const fn with_volume_threshold(self, volume_threshold: u64) -> Self {
        Self {
            volume_threshold,
            ..self
        }
    }

    /// 替换 `keep_max_two` 设置.
    #[inline]
    pub const fn with_keep_max_two(self, keep_max_two: bool) -> Self {
        Self {
            keep_max_two,
            ..self
        }
    }
}

/// 流水线两个阶段各自的结果描述.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineReport {
    /// 器官过滤阶段.
    pub organ: OrganReport,

    /// 病灶过滤阶段.
    pub lesion: LesionReport,
}

/// 对分割预测 `mask` 依次运行器官离群连通域去除和游离病灶去除.
///
/// 结果只取决于输入和配置, 调用之间不保留任何状态.
#[inline]
pub fn process(mask: &LabelVolume, config: &PostProcessConfig) -> LabelVolume {
    process_with_report(mask, config).0
}

/// 同 [`process`], 同时返回两个阶段的结果描述.
pub fn process_with_report(
    mask: &LabelVolume,
    config: &PostProcessConfig,
) -> (LabelVolume, PipelineReport) {
    run(mask, config, Exec::Serial)
}

/// 原始数组入口. 在计算开始前依次检查门限符号, 数组维数和体素取值,
/// 任一检查失败都直接返回错误.
pub fn process_array(
    mask: ArrayD<u8>,
    volume_threshold: i64,
    keep_max_two: bool,
) -> ValidateResult<Array3<u8>> {
    let config = PostProcessConfig::try_new(volume_threshold, keep_max_two)?;
    let mask = LabelVolume::try_from(mask)?;
    Ok(process(&mask, &config).into_inner())
}

/// 借助 `rayon` 运行 [`process`]. 结果与串行版本一致.
#[cfg(feature = "rayon")]
#[inline]
pub fn par_process(mask: &LabelVolume, config: &PostProcessConfig) -> LabelVolume {
    par_process_with_report(mask, config).0
}

/// 借助 `rayon` 运行 [`process_with_report`]. 结果与串行版本一致.
#[cfg(feature = "rayon")]
pub fn par_process_with_report(
    mask: &LabelVolume,
    config: &PostProcessConfig,
) -> (LabelVolume, PipelineReport) {
    run(mask, config, Exec::Parallel)
}

fn run(mask: &LabelVolume, config: &PostProcessConfig, exec: Exec) -> (LabelVolume, PipelineReport) {
    let [_, organ_in, lesion_in] = mask.numeric_statistics();
    let (stage1, organ) = filter_organ(mask, config.volume_threshold, config.keep_max_two, exec);
    let (stage2, lesion) = filter_lesion(&stage1, exec);
    let [_, organ_out, lesion_out] = stage2.numeric_statistics();
    info!(
        "post-process {:?}: organ voxels {organ_in} -> {organ_out}, lesion voxels {lesion_in} -> {lesion_out}",
        mask.shape()
    );
    (stage2, PipelineReport { organ, lesion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::label_where;
    use crate::consts::gray::*;
    use ndarray::{Array3, IxDyn};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn init_logger() {
        // 多个测试共用全局 logger, 重复初始化的错误可以忽略.
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Debug)
            .init();
    }

    fn line(values: &[u8]) -> LabelVolume {
        LabelVolume::new(Array3::from_shape_vec((1, 1, values.len()), values.to_vec()).unwrap())
            .unwrap()
    }

    fn values(v: &LabelVolume) -> Vec<u8> {
        v.data().iter().copied().collect()
    }

    /// 随机生成的三分类体数据, 器官和病灶各自聚成小团块.
    fn random_volume(rng: &mut StdRng, shape: (usize, usize, usize)) -> LabelVolume {
        let mut data = Array3::<u8>::zeros(shape);
        let (zn, hn, wn) = shape;
        for _ in 0..rng.random_range(2..12) {
            let label = if rng.random_bool(0.6) { ORGAN } else { LESION };
            let (z, h, w) = (
                rng.random_range(0..zn),
                rng.random_range(0..hn),
                rng.random_range(0..wn),
            );
            let r = rng.random_range(0..3usize);
            for dz in 0..=r {
                for dh in 0..=r {
                    for dw in 0..=r {
                        if let Some(p) = data.get_mut((z + dz, h + dh, w + dw)) {
                            *p = label;
                        }
                    }
                }
            }
        }
        LabelVolume::new(data).unwrap()
    }

    #[test]
    fn test_line_scenarios() {
        init_logger();
        let input = line(&[1, 1, 1, 0, 0, 1, 1, 1, 1, 2]);

        let out = process(&input, &PostProcessConfig::new(4, false));
        assert_eq!(values(&out), vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 2]);

        let (out, report) = process_with_report(&input, &PostProcessConfig::new(5, false));
        assert!(out.is_background());
        assert_eq!(report.organ.undersized.len(), 2);
        assert_eq!(report.lesion.removed_voxels(), 1);
    }

    #[test]
    fn test_keep_max_two_scenario() {
        let mut data = vec![ORGAN; 10];
        data.push(BACKGROUND);
        data.extend([ORGAN; 8]);
        data.push(BACKGROUND);
        data.extend([ORGAN; 3]);
        data.push(LESION);
        let input = line(&data);

        let (out, report) = process_with_report(&input, &PostProcessConfig::new(0, true));
        assert_eq!(report.organ.excess.len(), 1);
        assert_eq!(report.organ.excess[0].volume, 3);
        assert_eq!(label_where(out.data(), is_organ).len(), 2);
        // 附着在被去除器官上的病灶随之被去除.
        assert_eq!(out.count(LESION), 0);
        assert_eq!(report.lesion.detached.len(), 1);
    }

    #[test]
    fn test_process_array_validation() {
        let ok = ArrayD::<u8>::from_shape_vec(IxDyn(&[1, 1, 3]), vec![1, 1, 2]).unwrap();
        assert_eq!(
            process_array(ok.clone(), -1, false).unwrap_err(),
            ValidationError::NegativeThreshold(-1)
        );
        let out = process_array(ok, 2, false).unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![1, 1, 2]);

        let flat = ArrayD::<u8>::zeros(IxDyn(&[3, 3]));
        assert_eq!(
            process_array(flat, 0, false).unwrap_err(),
            ValidationError::WrongRank(2)
        );

        let bad = ArrayD::<u8>::from_shape_vec(IxDyn(&[1, 2, 2]), vec![0, 1, 3, 2]).unwrap();
        assert_eq!(
            process_array(bad, 0, false).unwrap_err(),
            ValidationError::InvalidLabel {
                pos: (0, 1, 0),
                value: 3
            }
        );
    }

    #[test]
    fn test_config() {
        let c = PostProcessConfig::default();
        assert_eq!(c.volume_threshold, 50000);
        assert!(!c.keep_max_two);
        let c = c.with_volume_threshold(7).with_keep_max_two(true);
        assert_eq!(c, PostProcessConfig::new(7, true));
        assert_eq!(PostProcessConfig::try_new(7, true), Ok(c));
        assert_eq!(
            PostProcessConfig::try_new(i64::MIN, false),
            Err(ValidationError::NegativeThreshold(i64::MIN))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let c: PostProcessConfig =
            serde_json::from_str(r#"{"volume_threshold": 300, "keep_max_two": true}"#).unwrap();
        assert_eq!(c, PostProcessConfig::new(300, true));

        let c: PostProcessConfig = serde_json::from_str(r#"{"keep_max_two": true}"#).unwrap();
        assert_eq!(c.volume_threshold, 50000);

        assert!(serde_json::from_str::<PostProcessConfig>(r#"{"volume_threshold": -5}"#).is_err());
    }

    #[test]
    fn test_random_properties() {
        init_logger();
        let mut rng = StdRng::seed_from_u64(7);
        for round in 0..24 {
            let input = random_volume(&mut rng, (6, 8, 9));
            let config = PostProcessConfig::new(rng.random_range(0..20), rng.random_bool(0.5));
            let out = process(&input, &config);

            // 取值范围 & 背景保持不变.
            for (pos, &v) in input.data().indexed_iter() {
                assert!(is_valid(out[pos]));
                if is_background(v) {
                    assert_eq!(out[pos], BACKGROUND);
                }
            }

            // 体积门限 & 个数上限.
            let organs = label_where(out.data(), is_organ);
            assert!(organs
                .records()
                .all(|r| r.volume as u64 >= config.volume_threshold));
            if config.keep_max_two {
                assert!(organs.len() <= 2, "round {round}");
            }

            // 附着: 每个病灶所在的前景连通域都含有器官.
            let fg = label_where(out.data(), is_foreground);
            let mut has_organ = vec![false; fg.len() + 1];
            for (pos, &v) in out.data().indexed_iter() {
                if is_organ(v) {
                    has_organ[fg.id_at(pos) as usize] = true;
                }
            }
            for pos in out.lesion_pos() {
                assert!(has_organ[fg.id_at(pos) as usize], "round {round}, {pos:?}");
            }

            // 幂等.
            assert_eq!(process(&out, &config), out, "round {round}");
        }
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_agrees() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..6 {
            let input = random_volume(&mut rng, (12, 7, 7));
            let config = PostProcessConfig::new(rng.random_range(0..10), rng.random_bool(0.5));
            assert_eq!(
                par_process_with_report(&input, &config),
                process_with_report(&input, &config)
            );
        }
    }
}
