//! 通用集合
//!
//! 字面量去重与 NameId 集合运算共用同一实现

use std::collections::HashSet;
use std::collections::hash_set;
use std::hash::Hash;

/// 去重集合，支持交集/并集
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSet<T: Eq + Hash> {
    items: HashSet<T>,
}

impl<T: Eq + Hash> IdSet<T> {
    pub fn new() -> Self {
        Self {
            items: HashSet::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: HashSet::with_capacity(capacity),
        }
    }

    /// 插入元素，已存在时返回 false
    pub fn insert(&mut self, value: T) -> bool {
        self.items.insert(value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    pub fn remove(&mut self, value: &T) -> bool {
        self.items.remove(value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, T> {
        self.items.iter()
    }

    /// 原地并入另一个集合
    pub fn union_with(&mut self, other: IdSet<T>) {
        if self.items.len() < other.items.len() {
            let smaller = std::mem::replace(&mut self.items, other.items);
            self.items.extend(smaller);
        } else {
            self.items.extend(other.items);
        }
    }
}

impl<T: Eq + Hash + Clone> IdSet<T> {
    /// 交集，遍历较小的一侧
    pub fn intersection(&self, other: &IdSet<T>) -> IdSet<T> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .items
            .iter()
            .filter(|value| large.items.contains(*value))
            .cloned()
            .collect()
    }

    pub fn union(&self, other: &IdSet<T>) -> IdSet<T> {
        self.items.union(&other.items).cloned().collect()
    }
}

impl<T: Eq + Hash + Ord + Clone> IdSet<T> {
    /// 导出为有序序列（便于下标随机访问且对固定种子可复现）
    pub fn to_vec(&self) -> Vec<T> {
        let mut values: Vec<T> = self.items.iter().cloned().collect();
        values.sort();
        values
    }
}

impl<T: Eq + Hash> Default for IdSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash> FromIterator<T> for IdSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: Eq + Hash> Extend<T> for IdSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T: Eq + Hash> IntoIterator for IdSet<T> {
    type Item = T;
    type IntoIter = hash_set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T: Eq + Hash> IntoIterator for &'a IdSet<T> {
    type Item = &'a T;
    type IntoIter = hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
