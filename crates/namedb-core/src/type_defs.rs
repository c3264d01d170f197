use serde::{Deserialize, Serialize};
use std::fmt;

/// 名称 ID 的类型安全包装器（存储层分配的行号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NameId(i64);

impl NameId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NameId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// 标签 ID 的类型安全包装器
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId(i64);

impl TagId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TagId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// 已存储的名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub id: NameId,
    pub name: String,
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 已存储的标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub tag: String,
}

/// 名称及其全部标签（按字母序），扫描路径与展示共用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub id: NameId,
    pub name: String,
    pub tags: Vec<String>,
}

impl NameEntry {
    pub fn new(id: NameId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|t| t == tag)
    }

    pub fn to_name(&self) -> Name {
        Name {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn into_name(self) -> Name {
        Name {
            id: self.id,
            name: self.name,
        }
    }
}

/// 展示格式：`name: tag1, tag2`；无标签时为 `name:`
impl fmt::Display for NameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            write!(f, "{}:", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.tags.join(", "))
        }
    }
}
