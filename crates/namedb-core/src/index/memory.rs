//! 内存倒排索引
//!
//! 标签 -> 名称集合的倒排表，写入时生成新快照并原子切换，
//! 读取方始终在一致的只读快照上求值。

use arc_swap::ArcSwap;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::filter::set::IdSet;
use crate::index::{EntrySource, TagIndex};
use crate::type_defs::{Name, NameEntry, NameId, TagId};

/// 倒排索引快照 - 线程安全的只读快照
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    /// 标签值 -> 标签 ID
    tag_ids: HashMap<String, TagId>,
    /// 标签 ID -> 名称集合
    tag_index: HashMap<TagId, IdSet<NameId>>,
    /// 名称值 -> 名称 ID
    name_ids: HashMap<String, NameId>,
    /// 名称数据，按 ID 有序（扫描与偏移访问的固定顺序）
    name_data: BTreeMap<NameId, NameEntry>,
    /// 索引版本号
    epoch: u64,
}

impl IndexSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_count(&self) -> usize {
        self.name_data.len()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn name(&self, id: NameId) -> Option<&NameEntry> {
        self.name_data.get(&id)
    }

    pub fn find_name(&self, name: &str) -> Option<&NameEntry> {
        self.name_ids
            .get(name.trim())
            .and_then(|id| self.name_data.get(id))
    }

    /// 获取索引统计信息
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_names: self.name_data.len(),
            total_tags: self.tag_ids.len(),
            associations: self.tag_index.values().map(IdSet::len).sum(),
            epoch: self.epoch,
        }
    }

    /// 从倒排表中摘除一个名称的一个标签，空倒排项一并移除
    fn detach(&mut self, name_id: NameId, tag: &str) {
        let Some(tag_id) = self.tag_ids.get(tag).copied() else {
            return;
        };
        if let Some(names) = self.tag_index.get_mut(&tag_id) {
            names.remove(&name_id);
            if names.is_empty() {
                self.tag_index.remove(&tag_id);
            }
        }
    }
}

/// 索引统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub total_names: usize,
    pub total_tags: usize,
    pub associations: usize,
    pub epoch: u64,
}

/// 倒排索引 - 读无锁，写串行
pub struct InvertedIndex {
    /// 当前快照的原子引用
    snapshot: ArcSwap<IndexSnapshot>,
    /// 写入互斥，避免并发写覆盖彼此的快照
    write_lock: Mutex<()>,
    next_name_id: AtomicI64,
    next_tag_id: AtomicI64,
    next_epoch: AtomicU64,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::new(Arc::new(IndexSnapshot::new())),
            write_lock: Mutex::new(()),
            next_name_id: AtomicI64::new(1),
            next_tag_id: AtomicI64::new(1),
            next_epoch: AtomicU64::new(1),
        }
    }

    /// 获取当前快照的只读引用
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot.load_full()
    }

    /// 添加名称（不存在时创建）并附加标签，已有标签保持不变
    pub fn put_name_tags(&self, name: &str, tags: &[String]) -> Result<NameId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid_input("name must not be blank"));
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = self.snapshot.load_full();
        let mut new_snapshot = (*snapshot).clone();
        new_snapshot.epoch = self.next_epoch.fetch_add(1, Ordering::SeqCst);

        let name_id = match snapshot.name_ids.get(name) {
            Some(id) => *id,
            None => {
                let id = NameId::new(self.next_name_id.fetch_add(1, Ordering::SeqCst));
                new_snapshot.name_ids.insert(name.to_string(), id);
                new_snapshot.name_data.insert(id, NameEntry::new(id, name));
                id
            }
        };

        for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let tag_id = match new_snapshot.tag_ids.get(tag) {
                Some(id) => *id,
                None => {
                    let id = TagId::new(self.next_tag_id.fetch_add(1, Ordering::SeqCst));
                    new_snapshot.tag_ids.insert(tag.to_string(), id);
                    id
                }
            };

            new_snapshot
                .tag_index
                .entry(tag_id)
                .or_default()
                .insert(name_id);

            if let Some(entry) = new_snapshot.name_data.get_mut(&name_id) {
                if !entry.has_tag(tag) {
                    entry.tags.push(tag.to_string());
                    entry.tags.sort();
                }
            }
        }

        let epoch = new_snapshot.epoch;
        self.snapshot.store(Arc::new(new_snapshot));

        debug!(name = %name, name_id = %name_id, epoch = epoch, "Name upserted");
        Ok(name_id)
    }

    /// 移除名称的若干标签；名称不存在时返回 false
    pub fn untag(&self, name: &str, tags: &[String]) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = self.snapshot.load_full();
        let Some(name_id) = snapshot.name_ids.get(name.trim()).copied() else {
            return Ok(false);
        };

        let mut new_snapshot = (*snapshot).clone();
        new_snapshot.epoch = self.next_epoch.fetch_add(1, Ordering::SeqCst);

        let removed: Vec<&str> = tags.iter().map(|t| t.trim()).collect();
        for tag in &removed {
            new_snapshot.detach(name_id, tag);
        }
        if let Some(entry) = new_snapshot.name_data.get_mut(&name_id) {
            // 过滤生成新序列，不在遍历中按下标删除
            entry.tags = entry
                .tags
                .iter()
                .filter(|t| !removed.contains(&t.as_str()))
                .cloned()
                .collect();
        }

        let epoch = new_snapshot.epoch;
        self.snapshot.store(Arc::new(new_snapshot));

        debug!(name = %name.trim(), name_id = %name_id, epoch = epoch, "Name untagged");
        Ok(true)
    }

    /// 移除名称及其全部关联
    pub fn remove_name(&self, name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = self.snapshot.load_full();
        let Some(name_id) = snapshot.name_ids.get(name.trim()).copied() else {
            return Ok(false); // 名称不存在，无需处理
        };

        let mut new_snapshot = (*snapshot).clone();
        new_snapshot.epoch = self.next_epoch.fetch_add(1, Ordering::SeqCst);

        if let Some(entry) = snapshot.name_data.get(&name_id) {
            for tag in &entry.tags {
                new_snapshot.detach(name_id, tag);
            }
        }
        new_snapshot.name_data.remove(&name_id);
        new_snapshot.name_ids.remove(name.trim());

        let epoch = new_snapshot.epoch;
        self.snapshot.store(Arc::new(new_snapshot));

        debug!(name = %name.trim(), name_id = %name_id, epoch = epoch, "Name removed");
        Ok(true)
    }

    /// 获取索引统计信息
    pub fn stats(&self) -> IndexStats {
        self.snapshot.load_full().stats()
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TagIndex for IndexSnapshot {
    fn resolve_tag(&self, literal: &str) -> Result<Option<TagId>> {
        Ok(self.tag_ids.get(literal).copied())
    }

    fn names_for_tag(&self, tag: TagId) -> Result<IdSet<NameId>> {
        Ok(self.tag_index.get(&tag).cloned().unwrap_or_default())
    }

    fn all_name_ids(&self) -> Result<IdSet<NameId>> {
        Ok(self.name_data.keys().copied().collect())
    }

    fn tags_for_name(&self, name: NameId) -> Result<Vec<String>> {
        Ok(self
            .name_data
            .get(&name)
            .map(|entry| entry.tags.clone())
            .unwrap_or_default())
    }

    fn resolve_name(&self, name: NameId) -> Result<Option<Name>> {
        Ok(self.name_data.get(&name).map(NameEntry::to_name))
    }

    fn count_names(&self) -> Result<u64> {
        Ok(self.name_data.len() as u64)
    }

    fn name_at_offset(&self, offset: u64) -> Result<Option<Name>> {
        let Ok(offset) = usize::try_from(offset) else {
            return Ok(None);
        };
        Ok(self.name_data.values().nth(offset).map(NameEntry::to_name))
    }
}

impl EntrySource for IndexSnapshot {
    fn scan(&self, visit: &mut dyn FnMut(NameEntry)) -> Result<()> {
        for entry in self.name_data.values() {
            visit(entry.clone());
        }
        Ok(())
    }
}
