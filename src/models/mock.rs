/// 演示用名单，末尾故意包含重复项
pub const MOCK_ROSTER: &str = "赵一
钱二
孙三
李四
周五
吴六
郑七
王八
冯九
陈十
诸葛亮
曹操
刘备
孙权
关羽
张飞
赵云
马超
黄忠
魏延
孙三
李四";
