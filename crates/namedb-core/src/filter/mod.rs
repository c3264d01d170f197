//! 标签过滤系统 - 析取范式过滤表达式
//!
//! `a,b|c` 表示 (a AND b) OR c。两种求值策略：
//! - 索引路径：按标签取名称集合，交集/并集运算
//! - 扫描路径：逐条 (name, tags) 直接判定，配合蓄水池抽样

pub mod engine;
pub mod evaluator;
pub mod parser;
pub mod selector;
pub mod set;

pub use engine::{NamePicker, Pick, Strategy};
pub use evaluator::{SetAlgebraEvaluator, StreamEvaluator};
pub use parser::{Conjunction, Disjunction, FilterParser};
pub use selector::{Reservoir, pick_bounded, pick_streaming};
pub use set::IdSet;
