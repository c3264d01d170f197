//! 过滤器求值
//!
//! 索引求值（集合代数）与扫描求值（逐条判定）必须给出相同结果。
//! 注意两种“空”的区别：空析取式匹配全部，空合取项什么都不匹配。

use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::filter::parser::{Conjunction, Disjunction};
use crate::filter::set::IdSet;
use crate::index::TagIndex;
use crate::type_defs::{NameEntry, NameId};

impl Conjunction {
    /// 每个字面量都在 `tags` 中出现；空合取项永不匹配
    pub fn matches(&self, tags: &[String]) -> bool {
        !self.is_empty()
            && self
                .literals()
                .iter()
                .all(|literal| tags.iter().any(|tag| tag == literal))
    }
}

impl Disjunction {
    /// 任一合取项匹配（短路）；空析取式匹配全部
    pub fn matches(&self, tags: &[String]) -> bool {
        self.is_match_all() || self.conjunctions().iter().any(|conj| conj.matches(tags))
    }
}

/// 基于索引的集合代数求值器
pub struct SetAlgebraEvaluator;

impl SetAlgebraEvaluator {
    /// 计算满足过滤器的候选名称集合
    pub fn evaluate<I: TagIndex + ?Sized>(filter: &Disjunction, index: &I) -> Result<IdSet<NameId>> {
        if filter.is_match_all() {
            return index.all_name_ids();
        }

        // 每个字面量只查询一次索引；未知标签对应空集
        let literals = filter.literals();
        let mut postings: HashMap<&str, IdSet<NameId>> = HashMap::with_capacity(literals.len());
        for literal in literals.iter() {
            let names = match index.resolve_tag(literal)? {
                Some(tag_id) => index.names_for_tag(tag_id)?,
                None => IdSet::new(),
            };
            postings.insert(literal.as_str(), names);
        }

        let mut candidates = IdSet::new();
        for conj in filter.conjunctions() {
            candidates.union_with(Self::intersect(conj, &postings));
        }

        debug!(
            filter = %filter,
            literals = literals.len(),
            candidates = candidates.len(),
            "Filter evaluated against index"
        );
        Ok(candidates)
    }

    /// 合取项内求交集
    fn intersect(conj: &Conjunction, postings: &HashMap<&str, IdSet<NameId>>) -> IdSet<NameId> {
        let mut sets = conj
            .literals()
            .iter()
            .map(|literal| postings.get(literal.as_str()));

        let mut result = match sets.next() {
            Some(Some(first)) => first.clone(),
            // 空合取项或首个字面量缺失
            _ => return IdSet::new(),
        };

        for set in sets {
            if result.is_empty() {
                break;
            }
            result = match set {
                Some(names) => result.intersection(names),
                None => return IdSet::new(),
            };
        }
        result
    }
}

/// 不经索引、直接对单条数据判定的求值器
pub struct StreamEvaluator;

impl StreamEvaluator {
    /// `name` 仅为接口对齐，标签过滤不读取它
    pub fn matches(_name: &str, tags: &[String], filter: &Disjunction) -> bool {
        filter.matches(tags)
    }

    pub fn matches_entry(entry: &NameEntry, filter: &Disjunction) -> bool {
        Self::matches(&entry.name, &entry.tags, filter)
    }
}
