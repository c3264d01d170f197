//! namedb 核心库
//!
//! 名称与标签的多对多关联、标签过滤表达式、候选集求值与均匀随机选择。

pub mod constants;
pub mod error;
pub mod type_defs;

pub mod config;
pub mod telemetry;

pub mod filter;
pub mod index;
pub mod store;

pub use constants::*;
pub use error::{CoreError, Result};
pub use filter::{Disjunction, FilterParser, NamePicker, Pick, Strategy};
pub use index::{EntrySource, InvertedIndex, TagIndex};
pub use store::SqliteStore;
pub use type_defs::{Name, NameEntry, NameId, Tag, TagId};
