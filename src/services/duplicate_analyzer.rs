//! 重复分析 - 业务能力层

use std::collections::{BTreeSet, HashMap};

use crate::models::Candidate;

/// 名单重复情况
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// 名字总数（含重复）
    pub total: usize,
    /// 不同名字的数量
    pub unique_count: usize,
    /// 多出来的重复次数，恒等于 `total - unique_count`
    pub duplicate_count: usize,
    /// 出现不止一次的名字
    pub duplicates: BTreeSet<String>,
}

impl DuplicateReport {
    pub fn is_duplicate(&self, name: &str) -> bool {
        self.duplicates.contains(name)
    }

    pub fn has_duplicates(&self) -> bool {
        self.duplicate_count > 0
    }
}

/// 统计名单中的重复名字
///
/// 按名字原样比较，区分大小写，不做任何规范化
pub fn analyze(people: &[Candidate]) -> DuplicateReport {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for person in people {
        *counts.entry(person.name.as_str()).or_insert(0) += 1;
    }

    let mut report = DuplicateReport {
        total: people.len(),
        unique_count: counts.len(),
        ..Default::default()
    };

    for (name, count) in counts {
        if count > 1 {
            report.duplicate_count += count - 1;
            report.duplicates.insert(name.to_string());
        }
    }

    report
}
