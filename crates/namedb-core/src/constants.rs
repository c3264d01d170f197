// 过滤表达式分隔符
pub const DISJUNCTION_SEPARATOR: char = '|';
pub const CONJUNCTION_SEPARATOR: char = ',';

/// 无候选时输出的哨兵值
pub const NO_MATCH_SENTINEL: &str = "<NONE>";

pub const DEFAULT_DB_FILE: &str = "names.db";
pub const CONFIG_FILE_NAME: &str = "namedb.toml";
// 环境变量覆盖：NAMEDB__DB_FILE / NAMEDB__SELECTION__STRATEGY
pub const CONFIG_ENV_PREFIX: &str = "NAMEDB__";
