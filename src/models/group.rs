use serde::{Deserialize, Serialize};

use super::Candidate;

/// 分组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    /// 展示用组名，可被 AI 生成的队名替换
    pub name: String,
    pub members: Vec<Candidate>,
}

impl Group {
    /// 默认组名，`index` 从 0 开始
    pub fn default_name(index: usize) -> String {
        format!("Group {}", index + 1)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 成员名字列表（按组内顺序）
    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().map(|m| m.name.clone()).collect()
    }
}
