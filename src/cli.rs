use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "roster_draw")]
#[command(about = "HR 抽奖与分组工具：名单去重、幸运抽奖、自动分组")]
pub struct Cli {
    #[arg(long, global = true, help = "TOML 配置文件路径")]
    pub config: Option<PathBuf>,
    #[arg(long, short, global = true, help = "显示详细日志", default_value_t = false)]
    pub verbose: bool,
    #[arg(long, global = true, help = "固定随机种子（便于复现结果）")]
    pub seed: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

/// 名单来源
#[derive(Args, Debug, Clone, Default)]
pub struct RosterArgs {
    #[arg(help = "名单文件（.txt / .csv），换行或逗号分隔", conflicts_with = "mock")]
    pub file: Option<PathBuf>,
    #[arg(long, help = "使用内置演示名单", default_value_t = false)]
    pub mock: bool,
    #[arg(long, help = "载入后先用 AI 整理名单", default_value_t = false)]
    pub ai_clean: bool,
    #[arg(long, help = "载入后先去重", default_value_t = false)]
    pub dedup: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 统计名单中的重复项
    Analyze {
        #[command(flatten)]
        roster: RosterArgs,
    },
    /// 去重并输出规范名单（每行一个）
    Dedup {
        #[command(flatten)]
        roster: RosterArgs,
        #[arg(long, short, help = "写入文件，缺省时输出到标准输出")]
        output: Option<PathBuf>,
    },
    /// 幸运抽奖
    Draw {
        #[command(flatten)]
        roster: RosterArgs,
        #[arg(long, short = 'n', help = "抽取人数", default_value_t = 1)]
        count: usize,
        #[arg(long, help = "允许重复中奖", default_value_t = false)]
        allow_repeats: bool,
        #[arg(long, help = "显示洗牌动画", default_value_t = false)]
        animate: bool,
    },
    /// 自动分组并导出 CSV
    Group {
        #[command(flatten)]
        roster: RosterArgs,
        #[arg(long, short, help = "每组人数")]
        size: Option<String>,
        #[arg(long, help = "用 AI 生成队名", default_value_t = false)]
        ai_names: bool,
        #[arg(long, short, help = "导出路径，缺省取配置中的 export_path")]
        output: Option<PathBuf>,
    },
    /// 识别录音中的名字
    Transcribe {
        #[arg(help = "录音文件（.wav / .mp3）")]
        audio: PathBuf,
        #[arg(long, help = "覆盖按扩展名推断的 MIME 类型")]
        mime: Option<String>,
    },
    /// 交互模式
    Shell,
}
