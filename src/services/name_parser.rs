//! 名单解析 - 业务能力层
//!
//! 把自由文本拆成候选人列表，换行与逗号等价

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Candidate;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n,]+").expect("separator pattern is valid"));

/// 按换行/逗号拆分并去掉空白，丢弃空项
///
/// 也是 AI 格式化失败时的兜底拆分方式
pub fn split_names(text: &str) -> Vec<String> {
    SEPARATORS
        .split(text)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// 解析文本为候选人列表，每个名字分配新的 id
pub fn parse_names(text: &str) -> Vec<Candidate> {
    split_names(text).into_iter().map(Candidate::new).collect()
}

/// 用名字列表直接构造候选人（AI 返回结果走这里）
pub fn candidates_from_names<I, S>(names: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .map(Candidate::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn names(list: &[Candidate]) -> Vec<&str> {
        list.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_newline_and_comma_are_equivalent() {
        let parsed = parse_names("A\nB\nA,C");
        assert_eq!(names(&parsed), vec!["A", "B", "A", "C"]);
    }

    #[test]
    fn test_blank_tokens_are_dropped() {
        let parsed = parse_names("  张三 ,, \r\n\n李四,\t,王五  \n");
        assert_eq!(names(&parsed), vec!["张三", "李四", "王五"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_names("").is_empty());
        assert!(parse_names(" \n , \n").is_empty());
    }

    #[test]
    fn test_every_occurrence_gets_own_id() {
        let parsed = parse_names("A,A,A,B");
        let ids: HashSet<&str> = parsed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_reparse_regenerates_ids() {
        let first = parse_names("A\nB");
        let second = parse_names("A\nB");
        assert_ne!(first[0].id, second[0].id);
    }

    #[test]
    fn test_candidates_from_names_trims() {
        let parsed = candidates_from_names(vec![" 关羽 ", "", "张飞"]);
        assert_eq!(names(&parsed), vec!["关羽", "张飞"]);
    }
}
