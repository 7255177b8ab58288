//! 自动分组 - 业务能力层
//!
//! 先对名单做无偏洗牌（Fisher-Yates），再按每组人数顺序切块。
//! 最后一组可能不满员，不会与前一组合并。

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::models::{Candidate, Group};

static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+?(\d+)").expect("leading digits pattern is valid"));

/// 解析用户输入的每组人数
///
/// 只取开头的数字（`"4.5"` 为 4，`"3人"` 为 3）；没有数字或结果为 0 时按 1 处理
pub fn parse_group_size(input: &str) -> usize {
    LEADING_DIGITS
        .captures(input)
        .and_then(|caps| caps[1].parse::<usize>().ok())
        .unwrap_or(0)
        .max(1)
}

/// 随机分组
///
/// # 参数
/// - `people`: 名单
/// - `group_size`: 每组人数，小于 1 时按 1 处理
/// - `rng`: 随机数源
///
/// # 返回
/// 按创建顺序排列的分组，默认组名为 `Group N`
pub fn partition<R: Rng + ?Sized>(people: &[Candidate], group_size: usize, rng: &mut R) -> Vec<Group> {
    let group_size = group_size.max(1);

    let mut shuffled = people.to_vec();
    shuffled.shuffle(rng);

    shuffled
        .chunks(group_size)
        .enumerate()
        .map(|(index, chunk)| Group {
            id: format!("g-{}", index * group_size),
            name: Group::default_name(index),
            members: chunk.to_vec(),
        })
        .collect()
}

/// 应用 AI 生成的队名
///
/// 按下标对齐；缺失或空白的名字保留原组名。名字内的换行等空白折叠为单个空格
///
/// # 返回
/// 实际被替换组名的分组数
pub fn apply_group_names(groups: &mut [Group], names: &[String]) -> usize {
    let mut renamed = 0;
    for (group, name) in groups.iter_mut().zip(names) {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if !name.is_empty() {
            group.name = name;
            renamed += 1;
        }
    }
    renamed
}

/// 各组人数分布 (组名, 人数)
pub fn summarize(groups: &[Group]) -> Vec<(String, usize)> {
    groups.iter().map(|g| (g.name.clone(), g.len())).collect()
}
