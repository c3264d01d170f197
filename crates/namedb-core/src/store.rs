use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{CoreError, Result};
use crate::filter::set::IdSet;
use crate::index::{EntrySource, TagIndex};
use crate::type_defs::{Name, NameEntry, NameId, TagId};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS names (
        id   INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS tags (
        id  INTEGER PRIMARY KEY,
        tag TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS name_tags (
        name_id INTEGER NOT NULL REFERENCES names(id) ON DELETE CASCADE,
        tag_id  INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (name_id, tag_id)
    );
    CREATE INDEX IF NOT EXISTS name_tags_tag_id ON name_tags(tag_id);
";

// 名称与其标签的左连接；标签按字母序，调用方追加 ORDER BY 的首列
const ENTRY_ROWS: &str = "
    SELECT n.id, n.name, t.tag
    FROM names n
    LEFT JOIN name_tags nt ON nt.name_id = n.id
    LEFT JOIN tags t ON t.id = nt.tag_id
";

/// SQLite 持久化的名称/标签库
///
/// 同时实现 [`TagIndex`]（索引路径）和 [`EntrySource`]（扫描路径），
/// 每次调用都直接查询数据库，不在内存中缓存任何结果。
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// 打开（或创建）数据库文件
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        debug!("Opened SqliteStore");
        Ok(store)
    }

    /// 内存数据库（测试用）
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        debug!("Opened in-memory SqliteStore");
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// 添加名称并附加标签；空白标签被忽略，已附加的标签不重复
    #[instrument(skip_all, fields(name = %name.trim()))]
    pub fn put_name_tags(&self, name: &str, tags: &[String]) -> Result<NameEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid_input("name must not be blank"));
        }

        let tx = self.conn.unchecked_transaction()?;
        let name_id = self.ensure_name(name)?;
        for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let tag_id = self.ensure_tag(tag)?;
            self.conn.execute(
                "INSERT OR IGNORE INTO name_tags (name_id, tag_id) VALUES (?1, ?2)",
                params![name_id.get(), tag_id.get()],
            )?;
        }
        tx.commit()?;

        debug!(name_id = %name_id, tags = tags.len(), "Name tags stored");
        self.entry(name_id)?
            .ok_or_else(|| CoreError::internal(format!("name '{}' missing after insert", name)))
    }

    /// 移除名称的若干标签；名称不存在时会先创建
    #[instrument(skip_all, fields(name = %name.trim()))]
    pub fn untag(&self, name: &str, tags: &[String]) -> Result<NameEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid_input("name must not be blank"));
        }

        let tx = self.conn.unchecked_transaction()?;
        let name_id = self.ensure_name(name)?;
        for tag in tags.iter().map(|t| t.trim()) {
            self.conn.execute(
                "DELETE FROM name_tags
                 WHERE name_id = ?1 AND tag_id IN (SELECT id FROM tags WHERE tag = ?2)",
                params![name_id.get(), tag],
            )?;
        }
        tx.commit()?;

        self.entry(name_id)?
            .ok_or_else(|| CoreError::internal(format!("name '{}' missing after untag", name)))
    }

    /// 删除名称及其全部关联；返回是否确实删除
    #[instrument(skip_all, fields(name = %name.trim()))]
    pub fn remove_name(&self, name: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM names WHERE name = ?1", params![name.trim()])?;
        debug!(removed = removed, "Name removed");
        Ok(removed > 0)
    }

    /// 精确查找名称，找不到时再做大小写不敏感查找
    pub fn find_name(&self, name: &str) -> Result<Option<NameEntry>> {
        let name = name.trim();
        let exact: Option<i64> = self
            .conn
            .query_row("SELECT id FROM names WHERE name = ?1", params![name], |row| row.get(0))
            .optional()?;

        let id = match exact {
            Some(id) => Some(id),
            None => self
                .conn
                .query_row(
                    "SELECT id FROM names WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?,
        };

        match id {
            Some(id) => self.entry(NameId::new(id)),
            None => Ok(None),
        }
    }

    /// 全部名称（按名称排序）及其标签
    pub fn list_names(&self) -> Result<Vec<NameEntry>> {
        let mut entries = Vec::new();
        self.for_each_entry("ORDER BY n.name ASC, n.id ASC, t.tag ASC", &mut |entry: NameEntry| {
            entries.push(entry)
        })?;
        Ok(entries)
    }

    fn ensure_name(&self, name: &str) -> Result<NameId> {
        self.conn
            .execute("INSERT OR IGNORE INTO names (name) VALUES (?1)", params![name])?;
        let id: i64 = self
            .conn
            .query_row("SELECT id FROM names WHERE name = ?1", params![name], |row| row.get(0))?;
        Ok(NameId::new(id))
    }

    fn ensure_tag(&self, tag: &str) -> Result<TagId> {
        self.conn
            .execute("INSERT OR IGNORE INTO tags (tag) VALUES (?1)", params![tag])?;
        let id: i64 = self
            .conn
            .query_row("SELECT id FROM tags WHERE tag = ?1", params![tag], |row| row.get(0))?;
        Ok(TagId::new(id))
    }

    fn entry(&self, id: NameId) -> Result<Option<NameEntry>> {
        let Some(name) = self.resolve_name(id)? else {
            return Ok(None);
        };
        let mut entry = NameEntry::new(name.id, name.name);
        entry.tags = self.tags_for_name(id)?;
        Ok(Some(entry))
    }

    /// 流式读取连接结果，按名称把相邻行聚合成条目
    fn for_each_entry(&self, order_by: &str, visit: &mut dyn FnMut(NameEntry)) -> Result<()> {
        let sql = format!("{} {}", ENTRY_ROWS, order_by);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut current: Option<NameEntry> = None;
        while let Some(row) = rows.next()? {
            let id = NameId::new(row.get(0)?);
            let tag: Option<String> = row.get(2)?;

            if current.as_ref().map(|entry| entry.id) != Some(id) {
                if let Some(done) = current.take() {
                    visit(done);
                }
                current = Some(NameEntry::new(id, row.get::<_, String>(1)?));
            }
            if let (Some(entry), Some(tag)) = (current.as_mut(), tag) {
                entry.tags.push(tag);
            }
        }
        if let Some(done) = current {
            visit(done);
        }
        Ok(())
    }
}

impl TagIndex for SqliteStore {
    fn resolve_tag(&self, literal: &str) -> Result<Option<TagId>> {
        let id: Option<i64> = self
            .conn
            .query_row("SELECT id FROM tags WHERE tag = ?1", params![literal], |row| row.get(0))
            .optional()?;
        Ok(id.map(TagId::new))
    }

    fn names_for_tag(&self, tag: TagId) -> Result<IdSet<NameId>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name_id FROM name_tags WHERE tag_id = ?1")?;
        let ids = stmt
            .query_map(params![tag.get()], |row| row.get::<_, i64>(0))?
            .map(|id| id.map(NameId::new))
            .collect::<rusqlite::Result<IdSet<NameId>>>()?;
        Ok(ids)
    }

    fn all_name_ids(&self) -> Result<IdSet<NameId>> {
        let mut stmt = self.conn.prepare_cached("SELECT id FROM names")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .map(|id| id.map(NameId::new))
            .collect::<rusqlite::Result<IdSet<NameId>>>()?;
        Ok(ids)
    }

    fn tags_for_name(&self, name: NameId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT t.tag FROM tags t
             JOIN name_tags nt ON nt.tag_id = t.id
             WHERE nt.name_id = ?1
             ORDER BY t.tag ASC",
        )?;
        let tags = stmt
            .query_map(params![name.get()], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tags)
    }

    fn resolve_name(&self, name: NameId) -> Result<Option<Name>> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT name FROM names WHERE id = ?1", params![name.get()], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.map(|value| Name { id: name, name: value }))
    }

    fn count_names(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM names", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn name_at_offset(&self, offset: u64) -> Result<Option<Name>> {
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(None);
        };
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, name FROM names ORDER BY id LIMIT 1 OFFSET ?1",
                params![offset],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.map(|(id, name)| Name {
            id: NameId::new(id),
            name,
        }))
    }
}

impl EntrySource for SqliteStore {
    fn scan(&self, visit: &mut dyn FnMut(NameEntry)) -> Result<()> {
        self.for_each_entry("ORDER BY n.id ASC, t.tag ASC", visit)
    }
}
