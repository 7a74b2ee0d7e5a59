//! 通用常量.

/// 单通道标签值.
pub mod gray {
    /// 背景的体素值.
    pub const BACKGROUND: u8 = 0;

    /// 器官 (如肾脏) 的体素值.
    pub const ORGAN: u8 = 1;

    /// 病灶 (如肿瘤) 的体素值.
    pub const LESION: u8 = 2;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }

    /// 体素是否是器官?
    #[inline]
    pub const fn is_organ(p: u8) -> bool {
        matches!(p, ORGAN)
    }

    /// 体素是否是病灶?
    #[inline]
    pub const fn is_lesion(p: u8) -> bool {
        matches!(p, LESION)
    }

    /// 体素是否是前景 (器官或病灶)?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        matches!(p, ORGAN | LESION)
    }

    /// 体素值是否合法 (即属于 {0, 1, 2})?
    #[inline]
    pub const fn is_valid(p: u8) -> bool {
        matches!(p, BACKGROUND | ORGAN | LESION)
    }
}

/// 默认器官体积门限 (体素个数). 低于该值的器官连通域会被去除.
pub const DEFAULT_VOLUME_THRESHOLD: u64 = 50000;

/// 开启 `keep_max_two` 时最多保留的器官连通域个数.
pub const MAX_ORGAN_COMPONENTS: usize = 2;
