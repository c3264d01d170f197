//! 均匀随机选择
//!
//! - 有界模式：候选集已物化为序列，按下标均匀抽取
//! - 蓄水池模式（k=1）：单次遍历未知长度的匹配流，O(1) 额外内存

use rand::Rng;

/// 从已物化的候选序列中均匀抽取一个；空序列返回 None
pub fn pick_bounded<'a, T, R>(candidates: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return None;
    }
    let r = rng.gen_range(0..candidates.len());
    candidates.get(r)
}

/// 容量为 1 的蓄水池
///
/// 第 i 个被提交的元素以 1/i 的概率替换当前持有项，遍历结束后每个元素
/// 被持有的概率均为 1/n，且无需预先知道 n。
#[derive(Debug)]
pub struct Reservoir<T> {
    seen: u64,
    held: Option<T>,
}

impl<T> Reservoir<T> {
    pub fn new() -> Self {
        Self {
            seen: 0,
            held: None,
        }
    }

    /// 提交一个已匹配的元素
    pub fn offer<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;
        if rng.gen_range(0..self.seen) == 0 {
            self.held = Some(item);
        }
    }

    /// 已提交的匹配数
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn finish(self) -> Option<T> {
        self.held
    }
}

impl<T> Default for Reservoir<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 对一个匹配流做单次遍历抽样
pub fn pick_streaming<I, R>(items: I, rng: &mut R) -> Option<I::Item>
where
    I: IntoIterator,
    R: Rng + ?Sized,
{
    let mut reservoir = Reservoir::new();
    for item in items {
        reservoir.offer(item, rng);
    }
    reservoir.finish()
}
