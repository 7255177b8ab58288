use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 候选人
///
/// `id` 在每次解析时重新生成，编辑文本后重新解析不会保留旧 id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
}

impl Candidate {
    /// 使用新生成的 UUID v4 创建候选人
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }

    /// id 的前 4 位，用于洗牌时的展示
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(4)
            .map(|(idx, _)| idx)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
