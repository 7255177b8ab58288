//! 去重 - 业务能力层

use std::collections::HashSet;

use crate::models::Candidate;

/// 只保留每个名字第一次出现的候选人，顺序不变
pub fn dedup(people: &[Candidate]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    people
        .iter()
        .filter(|person| seen.insert(person.name.as_str()))
        .cloned()
        .collect()
}

/// 名单的规范文本形式：每行一个名字
pub fn to_text(people: &[Candidate]) -> String {
    people
        .iter()
        .map(|person| person.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::duplicate_analyzer::analyze;
    use crate::services::name_parser::parse_names;

    #[test]
    fn test_keeps_first_occurrence() {
        let people = parse_names("A\nB\nA,C");
        let unique = dedup(&people);

        assert_eq!(to_text(&unique), "A\nB\nC");
        // 保留的是第一次出现的那个候选人
        assert_eq!(unique[0].id, people[0].id);
    }

    #[test]
    fn test_removes_exactly_reported_duplicates() {
        let people = parse_names("赵一,钱二,孙三,李四,孙三,李四,李四");
        let report = analyze(&people);
        let unique = dedup(&people);

        assert_eq!(unique.len(), report.unique_count);
        assert_eq!(people.len() - unique.len(), report.duplicate_count);
    }

    #[test]
    fn test_idempotent() {
        let once = dedup(&parse_names("x,y,x,z,y"));
        let twice = dedup(&once);
        assert_eq!(once, twice);
    }
}
