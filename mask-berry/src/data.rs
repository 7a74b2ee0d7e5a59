//! 三分类 3D 标签体数据.

use std::ops::Index;

use ndarray::{Array3, ArrayD, ArrayView, Ix3};

use crate::consts::gray::*;
use crate::error::{ValidateResult, ValidationError};
use crate::{Idx3d, Predicate};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 经过检查的 3D 分割标签, 以 `(z, h, w)` 索引. 标签值以 `u8` 保存,
/// 且保证只包含 `BACKGROUND`, `ORGAN` 和 `LESION` 三种值.
///
/// 序列化时该结构等同于其底层数组; 反序列化时会重新检查取值.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Array3<u8>", into = "Array3<u8>")
)]
pub struct LabelVolume {
    data: Array3<u8>,
}

impl Index<Idx3d> for LabelVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl TryFrom<Array3<u8>> for LabelVolume {
    type Error = ValidationError;

    #[inline]
    fn try_from(data: Array3<u8>) -> ValidateResult<Self> {
        Self::new(data)
    }
}

impl TryFrom<ArrayD<u8>> for LabelVolume {
    type Error = ValidationError;

    /// 从任意维数组创建. 维数不为 3 时返回 [`ValidationError::WrongRank`].
    fn try_from(data: ArrayD<u8>) -> ValidateResult<Self> {
        let ndim = data.ndim();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| ValidationError::WrongRank(ndim))?;
        Self::new(data)
    }
}

impl From<LabelVolume> for Array3<u8> {
    #[inline]
    fn from(v: LabelVolume) -> Self {
        v.data
    }
}

impl LabelVolume {
    /// 从裸标签数据创建. 如果存在 {0, 1, 2} 以外的体素值,
    /// 返回行优先序下第一个非法体素.
    pub fn new(data: Array3<u8>) -> ValidateResult<Self> {
        if let Some((pos, &value)) = data.indexed_iter().find(|(_, p)| !is_valid(**p)) {
            return Err(ValidationError::InvalidLabel { pos, value });
        }
        Ok(Self { data })
    }

    /// 不检查取值, 直接包装. 仅供内部过滤算法使用, 调用方保证取值合法.
    #[inline]
    pub(crate) fn new_unchecked(data: Array3<u8>) -> Self {
        debug_assert!(data.iter().copied().all(is_valid));
        Self { data }
    }

    /// 创建全背景标签.
    #[inline]
    pub fn zeros(shape: Idx3d) -> Self {
        Self {
            data: Array3::zeros(shape),
        }
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 取出底层数组.
    #[inline]
    pub fn into_inner(self) -> Array3<u8> {
        self.data
    }

    /// 获取值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取标签的基本统计信息.
    ///
    /// 统计信息格式为: \[背景体素数, 器官体素数, 病灶体素数\].
    pub fn numeric_statistics(&self) -> [usize; 3] {
        let mut ans = [0; 3];
        for pixel in self.data.iter() {
            ans[*pixel as usize] += 1;
        }
        ans
    }

    /// 是否为全背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 收集满足谓词 `pred` 的所有体素对应的下标, 结果按行优先存储.
    pub fn filter_pos(&self, pred: Predicate) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, pixel)| pred(*pixel).then_some(pos))
            .collect()
    }

    /// 收集所有器官体素对应的下标. 结果按行优先存储.
    #[inline]
    pub fn organ_pos(&self) -> Vec<Idx3d> {
        self.filter_pos(is_organ)
    }

    /// 收集所有病灶体素对应的下标. 结果按行优先存储.
    #[inline]
    pub fn lesion_pos(&self) -> Vec<Idx3d> {
        self.filter_pos(is_lesion)
    }
}

#[cfg(test)]
mod tests {
    use super::LabelVolume;
    use crate::ValidationError;
    use ndarray::{Array3, ArrayD, IxDyn};

    #[test]
    fn test_reject_out_of_domain() {
        let mut data = Array3::<u8>::zeros((2, 3, 4));
        data[(1, 0, 2)] = 3;
        data[(1, 2, 3)] = 255;
        assert_eq!(
            LabelVolume::new(data).unwrap_err(),
            ValidationError::InvalidLabel {
                pos: (1, 0, 2),
                value: 3
            }
        );
    }

    #[test]
    fn test_reject_wrong_rank() {
        let flat = ArrayD::<u8>::zeros(IxDyn(&[4, 4]));
        assert_eq!(
            LabelVolume::try_from(flat).unwrap_err(),
            ValidationError::WrongRank(2)
        );
        let deep = ArrayD::<u8>::zeros(IxDyn(&[1, 2, 3, 4]));
        assert_eq!(
            LabelVolume::try_from(deep).unwrap_err(),
            ValidationError::WrongRank(4)
        );
        let ok = ArrayD::<u8>::zeros(IxDyn(&[1, 2, 3]));
        assert_eq!(LabelVolume::try_from(ok).unwrap().shape(), (1, 2, 3));
    }

    #[test]
    fn test_statistics_and_positions() {
        let data = Array3::from_shape_vec((1, 2, 3), vec![0, 1, 2, 1, 0, 2]).unwrap();
        let v = LabelVolume::new(data).unwrap();
        assert_eq!(v.numeric_statistics(), [2, 2, 2]);
        assert_eq!(v.count(1), 2);
        assert_eq!(v.organ_pos(), vec![(0, 0, 1), (0, 1, 0)]);
        assert_eq!(v.lesion_pos(), vec![(0, 0, 2), (0, 1, 2)]);
        assert!(!v.is_background());
        assert!(LabelVolume::zeros((2, 2, 2)).is_background());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let good = LabelVolume::new(Array3::from_elem((1, 1, 2), 1)).unwrap();
        let json = serde_json::to_string(&good).unwrap();
        let back: LabelVolume = serde_json::from_str(&json).unwrap();
        assert_eq!(back, good);

        let bad = serde_json::to_string(&Array3::<u8>::from_elem((1, 1, 2), 9)).unwrap();
        assert!(serde_json::from_str::<LabelVolume>(&bad).is_err());
    }
}
