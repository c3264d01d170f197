//! 过滤器语义的性质测试
//!
//! - 合取/析取的判定与集合模型一致
//! - 解析对任意输入都成功，且输出满足结构不变量
//! - 索引求值与扫描求值在任意数据集上结果相同

use std::collections::{BTreeSet, HashSet};

use namedb_core::filter::{Conjunction, IdSet, SetAlgebraEvaluator, StreamEvaluator};
use namedb_core::{Disjunction, EntrySource, FilterParser, InvertedIndex, NameEntry, NameId, SqliteStore};
use proptest::prelude::*;

const ALPHABET: &[&str] = &["red", "blue", "tall", "old", "new"];

fn tag_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(ALPHABET).prop_map(str::to_string)
}

/// 标签集合（可能为空）
fn tag_set_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(tag_strategy(), 0..=ALPHABET.len())
}

/// 名称 -> 标签集合
fn universe_strategy() -> impl Strategy<Value = Vec<BTreeSet<String>>> {
    prop::collection::vec(tag_set_strategy(), 0..24)
}

/// 由字母表（含一个未知标签）拼出的过滤字符串，带随机空白
fn filter_text_strategy() -> impl Strategy<Value = String> {
    let literal = prop_oneof![
        4 => tag_strategy(),
        1 => Just("missing".to_string()),
        1 => Just(String::new()),
    ];
    let padded = (literal, " {0,2}", " {0,2}").prop_map(|(lit, l, r)| format!("{}{}{}", l, lit, r));
    let conjunction = prop::collection::vec(padded, 0..4).prop_map(|lits| lits.join(","));
    prop::collection::vec(conjunction, 0..4).prop_map(|conjs| conjs.join("|"))
}

fn build_index(universe: &[BTreeSet<String>]) -> InvertedIndex {
    let index = InvertedIndex::new();
    for (i, tags) in universe.iter().enumerate() {
        let tags: Vec<String> = tags.iter().cloned().collect();
        index.put_name_tags(&format!("name{}", i), &tags).unwrap();
    }
    index
}

fn scan_matches<S: EntrySource + ?Sized>(source: &S, filter: &Disjunction) -> IdSet<NameId> {
    let mut matched = IdSet::new();
    source
        .scan(&mut |entry: NameEntry| {
            if StreamEvaluator::matches_entry(&entry, filter) {
                matched.insert(entry.id);
            }
        })
        .unwrap();
    matched
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn conjunction_requires_every_literal(
        literals in prop::collection::btree_set(tag_strategy(), 1..4),
        tags in tag_set_strategy(),
    ) {
        let conj = Conjunction::new(literals.iter().cloned());
        let tag_vec: Vec<String> = tags.iter().cloned().collect();
        prop_assert_eq!(conj.matches(&tag_vec), literals.is_subset(&tags));
    }

    #[test]
    fn disjunction_requires_some_conjunction(
        groups in prop::collection::vec(prop::collection::btree_set(tag_strategy(), 1..3), 1..4),
        tags in tag_set_strategy(),
    ) {
        let filter = Disjunction::new(
            groups.iter().map(|g| Conjunction::new(g.iter().cloned())).collect(),
        );
        let tag_vec: Vec<String> = tags.iter().cloned().collect();
        let expected = groups.iter().any(|g| g.is_subset(&tags));
        prop_assert_eq!(filter.matches(&tag_vec), expected);
    }

    #[test]
    fn parse_never_fails_and_is_well_formed(input in ".{0,40}") {
        let filter = FilterParser::parse(&input);
        for conj in filter.conjunctions() {
            prop_assert!(!conj.is_empty());
            for literal in conj.literals() {
                prop_assert!(!literal.is_empty());
                prop_assert_eq!(literal.trim(), literal.as_str());
                prop_assert!(!literal.contains(',') && !literal.contains('|'));
            }
        }
        if input.split(['|', ',']).all(|s| s.trim().is_empty()) {
            prop_assert!(filter.is_match_all());
        }
    }

    #[test]
    fn parse_of_display_is_identity(input in filter_text_strategy()) {
        let filter = FilterParser::parse(&input);
        prop_assert_eq!(FilterParser::parse(&filter.to_string()), filter);
    }

    #[test]
    fn conjunction_order_does_not_matter(input in filter_text_strategy(), universe in universe_strategy()) {
        let filter = FilterParser::parse(&input);
        let reversed = Disjunction::new(filter.conjunctions().iter().rev().cloned().collect());

        let index = build_index(&universe);
        let snapshot = index.snapshot();
        let a = SetAlgebraEvaluator::evaluate(&filter, &*snapshot).unwrap();
        let b = SetAlgebraEvaluator::evaluate(&reversed, &*snapshot).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn index_and_scan_agree_in_memory(input in filter_text_strategy(), universe in universe_strategy()) {
        let filter = FilterParser::parse(&input);
        let index = build_index(&universe);
        let snapshot = index.snapshot();

        let by_index = SetAlgebraEvaluator::evaluate(&filter, &*snapshot).unwrap();
        let by_scan = scan_matches(&*snapshot, &filter);
        prop_assert_eq!(&by_index, &by_scan);

        // 与直接按模型计算的结果比较
        let expected: HashSet<String> = universe
            .iter()
            .enumerate()
            .filter(|(_, tags)| {
                filter.is_match_all()
                    || filter.conjunctions().iter().any(|c| {
                        c.literals().iter().all(|l| tags.contains(l))
                    })
            })
            .map(|(i, _)| format!("name{}", i))
            .collect();
        let actual: HashSet<String> = by_index
            .iter()
            .filter_map(|id| snapshot.name(*id).map(|e| e.name.clone()))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn index_and_scan_agree_in_sqlite(input in filter_text_strategy(), universe in universe_strategy()) {
        let store = SqliteStore::open_memory().unwrap();
        for (i, tags) in universe.iter().enumerate() {
            let tags: Vec<String> = tags.iter().cloned().collect();
            store.put_name_tags(&format!("name{}", i), &tags).unwrap();
        }

        let filter = FilterParser::parse(&input);
        let by_index = SetAlgebraEvaluator::evaluate(&filter, &store).unwrap();
        let by_scan = scan_matches(&store, &filter);
        prop_assert_eq!(by_index, by_scan);
    }
}
