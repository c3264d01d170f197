//! 随机选取引擎
//!
//! 解析后的过滤器 -> 候选集（索引或扫描） -> 均匀随机选取一个名称。
//! 每次调用都重新查询数据源，不缓存候选集。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::constants::NO_MATCH_SENTINEL;
use crate::error::{CoreError, Result};
use crate::filter::evaluator::{SetAlgebraEvaluator, StreamEvaluator};
use crate::filter::parser::Disjunction;
use crate::filter::selector::{Reservoir, pick_bounded};
use crate::index::{EntrySource, TagIndex};
use crate::type_defs::{Name, NameEntry};

/// 求值策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// 按标签查询索引并做集合运算，物化候选集后有界抽取
    #[default]
    Index,
    /// 顺序扫描全部名称并逐条判定，蓄水池抽样
    Scan,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Index => f.write_str("index"),
            Strategy::Scan => f.write_str("scan"),
        }
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" => Ok(Strategy::Index),
            "scan" => Ok(Strategy::Scan),
            other => Err(CoreError::invalid_input(format!(
                "unknown strategy '{}', expected index|scan",
                other
            ))),
        }
    }
}

/// 单次选取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    Found(Name),
    NoMatch,
}

impl Pick {
    pub fn name(&self) -> Option<&Name> {
        match self {
            Pick::Found(name) => Some(name),
            Pick::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Pick::Found(_))
    }
}

/// 无匹配时渲染为哨兵值
impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Found(name) => f.write_str(&name.name),
            Pick::NoMatch => f.write_str(NO_MATCH_SENTINEL),
        }
    }
}

/// 随机选取器，持有进程内唯一的随机源
pub struct NamePicker {
    rng: StdRng,
    strategy: Strategy,
}

impl NamePicker {
    /// 以当前时间为种子创建
    pub fn new(strategy: Strategy) -> Self {
        Self::with_seed(strategy, time_seed())
    }

    /// 固定种子，结果可复现
    pub fn with_seed(strategy: Strategy, seed: u64) -> Self {
        debug!(strategy = %strategy, seed = seed, "Name picker created");
        Self {
            rng: StdRng::seed_from_u64(seed),
            strategy,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// 按当前策略为一个过滤器选取一个名称
    pub fn select_random<S>(&mut self, filter: &Disjunction, source: &S) -> Result<Pick>
    where
        S: TagIndex + EntrySource + ?Sized,
    {
        match self.strategy {
            Strategy::Index => self.select_indexed(filter, source),
            Strategy::Scan => self.select_scanned(filter, source),
        }
    }

    /// 索引路径：集合代数求候选集，有界模式抽取
    pub fn select_indexed<I: TagIndex + ?Sized>(&mut self, filter: &Disjunction, index: &I) -> Result<Pick> {
        let candidates = SetAlgebraEvaluator::evaluate(filter, index)?.to_vec();

        let Some(name_id) = pick_bounded(&candidates, &mut self.rng) else {
            return Ok(Pick::NoMatch);
        };

        match index.resolve_name(*name_id)? {
            Some(name) => Ok(Pick::Found(name)),
            None => {
                warn!(name_id = %name_id, "Candidate vanished from index during selection");
                Ok(Pick::NoMatch)
            }
        }
    }

    /// 扫描路径：逐条判定，蓄水池抽样
    pub fn select_scanned<S: EntrySource + ?Sized>(&mut self, filter: &Disjunction, source: &S) -> Result<Pick> {
        let mut reservoir: Reservoir<NameEntry> = Reservoir::new();
        let rng = &mut self.rng;

        source.scan(&mut |entry: NameEntry| {
            if StreamEvaluator::matches_entry(&entry, filter) {
                reservoir.offer(entry, &mut *rng);
            }
        })?;

        debug!(filter = %filter, matches = reservoir.seen(), "Filter evaluated by scan");
        Ok(reservoir
            .finish()
            .map(|entry| Pick::Found(entry.into_name()))
            .unwrap_or(Pick::NoMatch))
    }

    /// 无过滤器的快速路径：随机偏移直接取名称
    pub fn select_any<I: TagIndex + ?Sized>(&mut self, index: &I) -> Result<Pick> {
        let count = index.count_names()?;
        if count == 0 {
            return Ok(Pick::NoMatch);
        }

        let offset = self.rng.gen_range(0..count);
        Ok(index
            .name_at_offset(offset)?
            .map(Pick::Found)
            .unwrap_or(Pick::NoMatch))
    }

    /// 一行输出：每个过滤器各选一个；没有过滤器时走快速路径
    pub fn select_line<S>(&mut self, filters: &[Disjunction], source: &S) -> Result<Vec<Pick>>
    where
        S: TagIndex + EntrySource + ?Sized,
    {
        if filters.is_empty() {
            let pick = match self.strategy {
                Strategy::Index => self.select_any(source)?,
                Strategy::Scan => self.select_scanned(&Disjunction::match_all(), source)?,
            };
            return Ok(vec![pick]);
        }

        filters
            .iter()
            .map(|filter| self.select_random(filter, source))
            .collect()
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parser::FilterParser;
    use crate::index::InvertedIndex;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sample_index() -> InvertedIndex {
        let index = InvertedIndex::new();
        index.put_name_tags("alice", &tags(&["red", "tall"])).unwrap();
        index.put_name_tags("bob", &tags(&["blue", "tall"])).unwrap();
        index.put_name_tags("carol", &tags(&["red"])).unwrap();
        index
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("index".parse::<Strategy>().unwrap(), Strategy::Index);
        assert_eq!(" SCAN ".parse::<Strategy>().unwrap(), Strategy::Scan);
        assert!("random".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_pick_display_sentinel() {
        assert_eq!(Pick::NoMatch.to_string(), "<NONE>");
    }

    #[test]
    fn test_single_candidate_both_strategies() {
        let index = sample_index();
        let snapshot = index.snapshot();
        let filter = FilterParser::parse("red,tall");

        for strategy in [Strategy::Index, Strategy::Scan] {
            let mut picker = NamePicker::with_seed(strategy, 1);
            for _ in 0..20 {
                let pick = picker.select_random(&filter, &*snapshot).unwrap();
                assert_eq!(pick.to_string(), "alice", "strategy {}", strategy);
            }
        }
    }

    #[test]
    fn test_no_match_both_strategies() {
        let index = sample_index();
        let snapshot = index.snapshot();

        for strategy in [Strategy::Index, Strategy::Scan] {
            let mut picker = NamePicker::with_seed(strategy, 1);
            for raw in ["green", "red,green"] {
                let pick = picker.select_random(&FilterParser::parse(raw), &*snapshot).unwrap();
                assert_eq!(pick, Pick::NoMatch);
            }
        }
    }

    #[test]
    fn test_select_any_on_empty_index() {
        let index = InvertedIndex::new();
        let mut picker = NamePicker::with_seed(Strategy::Index, 3);
        assert_eq!(picker.select_any(&*index.snapshot()).unwrap(), Pick::NoMatch);
    }

    #[test]
    fn test_select_line_one_pick_per_filter() {
        let index = sample_index();
        let snapshot = index.snapshot();
        let filters = FilterParser::parse_all(&["blue", "green", "red,tall"]);

        let mut picker = NamePicker::with_seed(Strategy::Index, 5);
        let line = picker.select_line(&filters, &*snapshot).unwrap();
        let rendered: Vec<String> = line.iter().map(Pick::to_string).collect();
        assert_eq!(rendered, vec!["bob", "<NONE>", "alice"]);
    }

    #[test]
    fn test_select_line_without_filters() {
        let index = sample_index();
        let snapshot = index.snapshot();

        for strategy in [Strategy::Index, Strategy::Scan] {
            let mut picker = NamePicker::with_seed(strategy, 9);
            let line = picker.select_line(&[], &*snapshot).unwrap();
            assert_eq!(line.len(), 1);
            assert!(line[0].is_match());
        }
    }

    #[test]
    fn test_seeded_pickers_reproduce() {
        let index = sample_index();
        let snapshot = index.snapshot();
        let filter = FilterParser::parse("red|blue");

        let mut a = NamePicker::with_seed(Strategy::Index, 42);
        let mut b = NamePicker::with_seed(Strategy::Index, 42);
        for _ in 0..10 {
            assert_eq!(
                a.select_random(&filter, &*snapshot).unwrap(),
                b.select_random(&filter, &*snapshot).unwrap()
            );
        }
    }

    #[test]
    fn test_picks_see_index_updates() {
        let index = sample_index();
        let filter = FilterParser::parse("green");
        let mut picker = NamePicker::with_seed(Strategy::Index, 2);

        assert_eq!(picker.select_random(&filter, &*index.snapshot()).unwrap(), Pick::NoMatch);

        index.put_name_tags("dave", &tags(&["green"])).unwrap();
        let pick = picker.select_random(&filter, &*index.snapshot()).unwrap();
        assert_eq!(pick.to_string(), "dave");
    }
}
