//! 均匀性统计检验
//!
//! 固定种子，10 万次抽取，卡方统计量与自由度 k-1 的 0.999 分位点
//! 留有余量的阈值比较。

use std::collections::HashMap;

use namedb_core::filter::{pick_bounded, pick_streaming};
use namedb_core::{FilterParser, InvertedIndex, NamePicker, Pick, Strategy};
use rand::SeedableRng;
use rand::rngs::StdRng;

const TRIALS: usize = 100_000;

/// 卡方统计量：sum((observed - expected)^2 / expected)
fn chi_square(counts: &[usize], trials: usize) -> f64 {
    let expected = trials as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

fn sample_index() -> InvertedIndex {
    let index = InvertedIndex::new();
    let rows: [(&str, &[&str]); 8] = [
        ("alice", &["red", "tall"]),
        ("bob", &["blue", "tall"]),
        ("carol", &["red"]),
        ("dave", &["red", "old"]),
        ("erin", &["green"]),
        ("frank", &["blue"]),
        ("grace", &["red", "blue"]),
        ("heidi", &[]),
    ];
    for (name, tags) in rows {
        let tags: Vec<String> = tags.iter().map(|s| s.to_string()).collect();
        index.put_name_tags(name, &tags).unwrap();
    }
    index
}

#[test]
fn bounded_mode_is_uniform() {
    let candidates: Vec<usize> = (0..10).collect();
    let mut counts = vec![0usize; candidates.len()];
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..TRIALS {
        let picked = pick_bounded(&candidates, &mut rng).unwrap();
        counts[*picked] += 1;
    }

    // df = 9, 0.999 分位点约 27.9
    let chi2 = chi_square(&counts, TRIALS);
    assert!(chi2 < 35.0, "chi2 = {}, counts = {:?}", chi2, counts);
}

#[test]
fn reservoir_mode_is_uniform() {
    let mut counts = vec![0usize; 10];
    let mut rng = StdRng::seed_from_u64(0xfeed);

    for _ in 0..TRIALS {
        let picked = pick_streaming(0..10usize, &mut rng).unwrap();
        counts[picked] += 1;
    }

    let chi2 = chi_square(&counts, TRIALS);
    assert!(chi2 < 35.0, "chi2 = {}, counts = {:?}", chi2, counts);
}

#[test]
fn reservoir_single_item_always_kept() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..1_000 {
        assert_eq!(pick_streaming(std::iter::once(7), &mut rng), Some(7));
    }
}

fn picker_distribution(strategy: Strategy, seed: u64) -> HashMap<String, usize> {
    let index = sample_index();
    let snapshot = index.snapshot();
    let filter = FilterParser::parse("red|blue");
    let mut picker = NamePicker::with_seed(strategy, seed);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..TRIALS {
        match picker.select_random(&filter, &*snapshot).unwrap() {
            Pick::Found(name) => *counts.entry(name.name).or_default() += 1,
            Pick::NoMatch => panic!("filter has candidates"),
        }
    }
    counts
}

fn assert_uniform_over_matches(counts: &HashMap<String, usize>) {
    let mut keys: Vec<&String> = counts.keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["alice", "bob", "carol", "dave", "frank", "grace"]);

    let observed: Vec<usize> = counts.values().copied().collect();
    // df = 5, 0.999 分位点约 20.5
    let chi2 = chi_square(&observed, TRIALS);
    assert!(chi2 < 28.0, "chi2 = {}, counts = {:?}", chi2, counts);
}

#[test]
fn indexed_picks_are_uniform_over_candidates() {
    assert_uniform_over_matches(&picker_distribution(Strategy::Index, 17));
}

#[test]
fn scanned_picks_are_uniform_over_candidates() {
    assert_uniform_over_matches(&picker_distribution(Strategy::Scan, 23));
}

#[test]
fn unfiltered_picks_cover_every_name() {
    let index = sample_index();
    let snapshot = index.snapshot();
    let mut picker = NamePicker::with_seed(Strategy::Index, 29);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..TRIALS {
        let line = picker.select_line(&[], &*snapshot).unwrap();
        *counts.entry(line[0].to_string()).or_default() += 1;
    }

    assert_eq!(counts.len(), 8);
    let observed: Vec<usize> = counts.values().copied().collect();
    // df = 7, 0.999 分位点约 24.3
    let chi2 = chi_square(&observed, TRIALS);
    assert!(chi2 < 32.0, "chi2 = {}, counts = {:?}", chi2, counts);
}
