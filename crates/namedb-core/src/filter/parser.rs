//! 标签过滤表达式解析器
//!
//! 语法：
//! - `filter := conjunction ('|' conjunction)*`
//! - `conjunction := literal (',' literal)*`
//!
//! 字面量去除首尾空白；空字面量与空合取项被丢弃。解析永不失败，
//! 全部被丢弃时得到空析取式，即“匹配全部”。

use std::fmt;

use crate::constants::{CONJUNCTION_SEPARATOR, DISJUNCTION_SEPARATOR};
use crate::filter::set::IdSet;

/// 合取项：所有标签字面量都必须出现
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conjunction(Vec<String>);

impl Conjunction {
    /// 按原样构造，不做裁剪（解析器之外构造退化形式时使用）
    pub fn new<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(literals.into_iter().map(Into::into).collect())
    }

    pub fn literals(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 析取式：任一合取项匹配即可；空析取式匹配全部
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Disjunction(Vec<Conjunction>);

impl Disjunction {
    pub fn new(conjunctions: Vec<Conjunction>) -> Self {
        Self(conjunctions)
    }

    /// 恒真过滤器
    pub fn match_all() -> Self {
        Self(Vec::new())
    }

    pub fn conjunctions(&self) -> &[Conjunction] {
        &self.0
    }

    pub fn is_match_all(&self) -> bool {
        self.0.is_empty()
    }

    /// 过滤器中出现的全部不同字面量
    pub fn literals(&self) -> IdSet<String> {
        self.0
            .iter()
            .flat_map(|conj| conj.literals().iter().cloned())
            .collect()
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, literal) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", CONJUNCTION_SEPARATOR)?;
            }
            f.write_str(literal)?;
        }
        Ok(())
    }
}

impl fmt::Display for Disjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, conj) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DISJUNCTION_SEPARATOR)?;
            }
            write!(f, "{}", conj)?;
        }
        Ok(())
    }
}

/// 过滤表达式解析器
pub struct FilterParser;

impl FilterParser {
    /// 解析过滤字符串
    pub fn parse(input: &str) -> Disjunction {
        let input = input.trim();

        if input.is_empty() {
            return Disjunction::match_all();
        }

        let conjunctions = input
            .split(DISJUNCTION_SEPARATOR)
            .filter_map(Self::parse_conjunction)
            .collect();
        Disjunction::new(conjunctions)
    }

    /// 多个过滤字符串各自独立解析，结果不做逻辑合并
    pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Vec<Disjunction> {
        inputs.iter().map(|s| Self::parse(s.as_ref())).collect()
    }

    /// 解析合取项，全部字面量为空时返回 None
    fn parse_conjunction(clause: &str) -> Option<Conjunction> {
        let literals: Vec<String> = clause
            .split(CONJUNCTION_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if literals.is_empty() {
            None
        } else {
            Some(Conjunction(literals))
        }
    }
}
