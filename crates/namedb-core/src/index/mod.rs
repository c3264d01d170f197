//! 名称/标签关联索引接口
//!
//! 求值引擎只通过这两个 trait 读取数据，不持有任何全局句柄。

pub mod memory;

pub use memory::{IndexSnapshot, IndexStats, InvertedIndex};

use crate::error::Result;
use crate::filter::set::IdSet;
use crate::type_defs::{Name, NameEntry, NameId, TagId};

/// 索引路径使用的查询接口
pub trait TagIndex {
    /// 标签字面量 -> 标签 ID（精确匹配，区分大小写）
    fn resolve_tag(&self, literal: &str) -> Result<Option<TagId>>;

    /// 带有该标签的全部名称；未知标签返回空集
    fn names_for_tag(&self, tag: TagId) -> Result<IdSet<NameId>>;

    /// 全部名称 ID（空过滤器时使用）
    fn all_name_ids(&self) -> Result<IdSet<NameId>>;

    /// 名称的标签，按字母序
    fn tags_for_name(&self, name: NameId) -> Result<Vec<String>>;

    fn resolve_name(&self, name: NameId) -> Result<Option<Name>>;

    fn count_names(&self) -> Result<u64>;

    /// 按固定顺序的第 offset 个名称（无过滤时的快速路径）
    fn name_at_offset(&self, offset: u64) -> Result<Option<Name>>;
}

/// 扫描路径使用的顺序数据源
pub trait EntrySource {
    /// 以固定顺序单次遍历全部名称及其标签
    fn scan(&self, visit: &mut dyn FnMut(NameEntry)) -> Result<()>;
}
