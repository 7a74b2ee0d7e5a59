//! 临时标签的并查集.

use std::cmp::Ordering;

/// 临时标签并查集. 标签从 1 开始编号, 0 号槽位保留给背景.
///
/// 合并时总让较小的根作为新根, 因此每个集合的根恒为集合内最小的临时标签.
/// 由于临时标签按扫描顺序递增分配, 集合的根也就是该连通域最先被扫描到的标签.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self {
            parent: Vec::from([0]),
        }
    }

    /// 已分配的临时标签个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len() - 1
    }

    /// 分配一个新的临时标签.
    ///
    /// 临时标签数超出 `u32` 范围时 panic.
    #[inline]
    pub fn make_set(&mut self) -> u32 {
        let label = u32::try_from(self.parent.len()).expect("临时标签数超出 u32 范围");
        self.parent.push(label);
        label
    }

    /// 查找 `x` 所在集合的根 (路径减半).
    #[inline]
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    /// 合并 `a` 和 `b` 所在的集合, 较小的根成为新根.
    #[inline]
    pub fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        match ra.cmp(&rb) {
            Ordering::Less => self.parent[rb as usize] = ra,
            Ordering::Greater => self.parent[ra as usize] = rb,
            Ordering::Equal => {}
        }
    }

    /// 将 `other` 的全部标签平移后追加到 `self` 的标签空间尾部.
    ///
    /// 返回平移量: `other` 中的标签 `l` 在合并后对应 `l + offset`.
    pub fn append(&mut self, other: &UnionFind) -> u32 {
        let offset = u32::try_from(self.len()).expect("临时标签数超出 u32 范围");
        self.parent
            .extend(other.parent.iter().skip(1).map(|p| p + offset));
        offset
    }

    /// 将临时标签映射为最终编号. 返回 (映射表, 连通域个数).
    ///
    /// 映射表以临时标签为下标, `table[0] == 0`. 各集合按根从小到大依次得到
    /// 1, 2, 3... 的编号.
    pub fn resolve(&mut self) -> (Vec<u32>, u32) {
        let mut table = vec![0u32; self.parent.len()];
        let mut next = 0u32;
        for label in 1..self.parent.len() as u32 {
            let root = self.find(label);
            if root == label {
                next += 1;
                table[label as usize] = next;
            } else {
                debug_assert!(root < label);
                table[label as usize] = table[root as usize];
            }
        }
        (table, next)
    }
}

#[cfg(test)]
mod tests {
    use super::UnionFind;

    #[test]
    fn test_root_is_minimum() {
        let mut uf = UnionFind::new();
        let labels: Vec<u32> = (0..6).map(|_| uf.make_set()).collect();
        assert_eq!(labels, vec![1, 2, 3, 4, 5, 6]);

        uf.union(5, 3);
        uf.union(6, 5);
        uf.union(4, 2);
        assert_eq!(uf.find(6), 3);
        assert_eq!(uf.find(4), 2);
        uf.union(6, 4);
        assert_eq!(uf.find(3), 2);
        assert_eq!(uf.find(1), 1);
    }

    #[test]
    fn test_resolve_in_root_order() {
        let mut uf = UnionFind::new();
        (0..5).for_each(|_| {
            uf.make_set();
        });
        uf.union(2, 5);
        uf.union(4, 3);
        let (table, n) = uf.resolve();
        assert_eq!(n, 3);
        assert_eq!(table, vec![0, 1, 2, 3, 3, 2]);
    }

    #[test]
    fn test_append_shifts_labels() {
        let mut a = UnionFind::new();
        a.make_set();
        a.make_set();
        let mut b = UnionFind::new();
        b.make_set();
        b.make_set();
        b.union(1, 2);

        let offset = a.append(&b);
        assert_eq!(offset, 2);
        assert_eq!(a.len(), 4);
        assert_eq!(a.find(4), 3);
        a.union(4, 1);
        assert_eq!(a.find(3), 1);
    }
}
