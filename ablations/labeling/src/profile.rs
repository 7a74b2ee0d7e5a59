//! 算法运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 单个标记实现在全部合成体数据上的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 处理过的体数据个数.
    volumes: u64,

    /// 处理过的体素总数.
    voxels: u64,

    /// 标记得到的连通域总数.
    components: u64,

    /// 标记计时.
    timer: AccTimer,

    /// 最耗时的一次标记.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            volumes: 0,
            voxels: 0,
            components: 0,
            timer: AccTimer::new(),
            most: None,
        }
    }

    /// 对 `f` 的一次运行计时. `voxels` 为本次输入的体素数.
    pub fn measure<T, F: FnOnce() -> T>(&mut self, voxels: usize, f: F) -> T {
        self.timer.start();
        let ans = f();
        let d = self.timer.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
        self.volumes += 1;
        self.voxels += voxels as u64;
        ans
    }

    /// 记录本次标记得到的连通域个数.
    #[inline]
    pub fn count_components(&mut self, n: usize) {
        self.components += n as u64;
    }

    /// 体数据个数.
    #[inline]
    pub fn volumes(&self) -> u64 {
        self.volumes
    }

    /// 连通域总数.
    #[inline]
    pub fn components(&self) -> u64 {
        self.components
    }

    /// 以微秒为单位的总耗时.
    #[inline]
    pub fn total_us(&self) -> u64 {
        self.timer.total_us()
    }

    /// 每百万体素平均耗时 (微秒).
    pub fn us_per_mvoxel(&self) -> Option<f64> {
        match self.voxels {
            0 => None,
            v => Some(self.total_us() as f64 * 1e6 / v as f64),
        }
    }

    /// 最耗时的一次标记.
    #[inline]
    pub fn most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
