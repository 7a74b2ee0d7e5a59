//! 输入检查错误.

use crate::Idx3d;
use std::fmt;

/// 后处理前置条件检查失败.
///
/// 所有检查都在计算开始之前完成. 一旦出错, 整个调用失败, 不存在部分结果.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// 数组维数不是 3. 参数为实际维数.
    WrongRank(usize),

    /// 标签值不属于 {0, 1, 2}. 给出行优先序下第一个非法体素的位置和值.
    InvalidLabel {
        /// 非法体素索引.
        pos: Idx3d,
        /// 非法体素值.
        value: u8,
    },

    /// 连通域标记的输入不是二值 (0/1) 数据.
    NonBinary {
        /// 非法体素索引.
        pos: Idx3d,
        /// 非法体素值.
        value: u8,
    },

    /// 体积门限为负数.
    NegativeThreshold(i64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongRank(ndim) => write!(f, "expected a 3-D volume, got {ndim} dimension(s)"),
            Self::InvalidLabel { pos, value } => {
                write!(f, "label {value} at {pos:?} is not one of 0, 1, 2")
            }
            Self::NonBinary { pos, value } => {
                write!(f, "binary mask holds {value} at {pos:?}")
            }
            Self::NegativeThreshold(th) => write!(f, "volume threshold {th} is negative"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 输入检查结果.
pub type ValidateResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn test_display_names_the_constraint() {
        let e = ValidationError::InvalidLabel {
            pos: (0, 1, 2),
            value: 7,
        };
        assert_eq!(e.to_string(), "label 7 at (0, 1, 2) is not one of 0, 1, 2");
        assert!(ValidationError::WrongRank(2).to_string().contains("2 dimension"));
        assert!(ValidationError::NegativeThreshold(-3)
            .to_string()
            .contains("-3"));
    }
}
