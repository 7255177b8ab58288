//! 交互模式 - 编排层
//!
//! 逐行读取命令，一次只执行一条；任何失败都只打印提示，不退出、不破坏会话状态

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use crate::config::Config;
use crate::infrastructure::GateOutcome;
use crate::models::load_audio_bytes;
use crate::services::group_partitioner::summarize;
use crate::services::{CsvExporter, CycleSchedule, LlmService};
use crate::workflow::{CleanOutcome, NamingOutcome, RosterSession};

const HELP: &str = "\
可用命令:
  text <名单>        用输入替换名单（逗号分隔）
  add <名单>         追加名字（逗号分隔）
  load <文件>        导入 .txt / .csv
  mock               加载演示名单
  list               查看名单（重复项带 *）
  dedup              一键去重
  clean              AI 智能格式化
  listen <录音> [mime]  语音录入
  clear              清空名单（需再次确认）
  repeats on|off     是否允许重复中奖
  draw [fast]        抽奖（fast 跳过洗牌动画）
  history            中奖记录
  reset              清除中奖记录（需再次确认）
  size <n>           每组人数
  group              生成分组
  name               AI 生成队名
  export [文件]      导出分组 CSV
  help               显示帮助
  quit               退出";

enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    config: Config,
    assistant: LlmService,
    session: RosterSession,
    rng: StdRng,
}

impl Shell {
    pub fn new(config: Config, assistant: LlmService, session: RosterSession, rng: StdRng) -> Self {
        Self {
            config,
            assistant,
            session,
            rng,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("roster> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (command, rest) = line
                .split_once(char::is_whitespace)
                .map(|(c, r)| (c, r.trim()))
                .unwrap_or((line, ""));

            match self.execute(command, rest).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => error!("❌ {:#}", e),
            }
        }

        println!("再见 👋");
        Ok(())
    }

    async fn execute(&mut self, command: &str, rest: &str) -> Result<Flow> {
        match command {
            "help" | "?" => println!("{}", HELP),
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "text" => {
                self.session.set_raw_input(rest);
                self.print_stats();
            }
            "add" => {
                let text = if self.session.raw_input().is_empty() {
                    rest.to_string()
                } else {
                    format!("{}\n{}", self.session.raw_input(), rest)
                };
                self.session.set_raw_input(text);
                self.print_stats();
            }
            "load" => {
                self.session.load_file(Path::new(rest)).await?;
                self.print_stats();
            }
            "mock" => {
                self.session.load_mock();
                self.print_stats();
            }
            "list" => self.print_roster(),
            "dedup" => {
                let removed = self.session.remove_duplicates();
                println!("已移除 {} 个重复项", removed);
                self.print_stats();
            }
            "clean" => {
                match self.session.ai_clean(&self.assistant).await? {
                    CleanOutcome::Skipped => println!("名单为空"),
                    CleanOutcome::Cleaned { count } => println!("AI 格式化完成，共 {} 个名字", count),
                    CleanOutcome::FellBack { count, reason } => println!(
                        "AI 格式化失败，请检查 API Key（{}）。已按换行/逗号拆分，共 {} 个名字",
                        reason, count
                    ),
                }
                self.print_stats();
            }
            "listen" => {
                let mut parts = rest.split_whitespace();
                let Some(path) = parts.next() else {
                    println!("用法: listen <录音文件> [mime]");
                    return Ok(Flow::Continue);
                };
                let (bytes, guessed) = load_audio_bytes(Path::new(path)).await?;
                let mime_type = parts.next().map(str::to_string).unwrap_or(guessed);
                let added = self.session.transcribe(&self.assistant, &bytes, &mime_type).await?;
                println!("识别出 {} 个名字", added);
                self.print_stats();
            }
            "clear" => match self.session.clear_all() {
                GateOutcome::Armed => println!(
                    "确定清空? {} 秒内再次输入 clear 确认",
                    self.config.confirm_timeout().as_secs()
                ),
                GateOutcome::Confirmed => println!("名单已清空"),
            },
            "repeats" => {
                let allow = matches!(rest, "on" | "yes" | "true" | "1");
                self.session.set_allow_repeats(allow);
                println!(
                    "允许重复中奖: {} | 待抽人数: {}",
                    if allow { "是" } else { "否" },
                    self.session.draw_engine().remaining()
                );
            }
            "draw" => self.draw(rest == "fast").await?,
            "history" => self.print_history(),
            "reset" => match self.session.reset_history() {
                GateOutcome::Armed => println!(
                    "确定清除? {} 秒内再次输入 reset 确认",
                    self.config.confirm_timeout().as_secs()
                ),
                GateOutcome::Confirmed => println!("中奖记录已清除"),
            },
            "size" => {
                let size = self.session.set_group_size_input(rest);
                println!("每组人数: {}", size);
            }
            "group" => {
                self.session.generate_groups(&mut self.rng);
                self.print_groups();
            }
            "name" => {
                match self.session.ai_name_groups(&self.assistant).await? {
                    NamingOutcome::Skipped => println!("请先生成分组"),
                    NamingOutcome::Renamed { count } => println!("AI 已为 {} 个分组命名", count),
                    NamingOutcome::FellBack { reason } => {
                        println!("AI 生成队名失败，使用默认组名（{}）", reason)
                    }
                }
                self.print_groups();
            }
            "export" => {
                let path = if rest.is_empty() {
                    PathBuf::from(&self.config.export_path)
                } else {
                    PathBuf::from(rest)
                };
                let rows = self.session.export_groups(&CsvExporter::with_path(&path)).await?;
                println!("已导出 {} 行至 {}", rows, path.display());
            }
            other => println!("未知命令: {}（输入 help 查看帮助）", other),
        }
        Ok(Flow::Continue)
    }

    async fn draw(&mut self, fast: bool) -> Result<()> {
        let winner = if fast {
            self.session.draw(&mut self.rng)?
        } else {
            let schedule = CycleSchedule::from_config(&self.config);
            let winner = self
                .session
                .draw_with_cycle(&mut self.rng, &schedule, |shown| {
                    print!("\r🎲 洗牌中... {:<12} [{}]", shown.name, shown.short_id());
                    let _ = std::io::stdout().flush();
                })
                .await;
            println!();
            winner?
        };

        println!(
            "🏆 获奖者是: {} | 待抽人数: {}",
            winner.name,
            self.session.draw_engine().remaining()
        );
        Ok(())
    }

    fn print_stats(&self) {
        let report = self.session.report();
        if report.duplicate_count > 0 {
            println!(
                "{} 位有效候选人，发现 {} 个重复项，建议先去重",
                report.unique_count, report.duplicate_count
            );
        } else {
            println!("{} 位有效候选人就绪", report.unique_count);
        }
    }

    fn print_roster(&self) {
        let report = self.session.report();
        for (idx, person) in self.session.people().iter().enumerate() {
            let mark = if report.is_duplicate(&person.name) { "*" } else { " " };
            println!("{:>4}{} {}", idx + 1, mark, person.name);
        }
        self.print_stats();
    }

    fn print_history(&self) {
        let history = self.session.draw_engine().history();
        if history.is_empty() {
            println!("暂无中奖记录");
            return;
        }
        for (idx, winner) in history.iter().enumerate() {
            println!("#{} {}", history.len() - idx, winner.name);
        }
    }

    fn print_groups(&self) {
        let groups = self.session.groups();
        if groups.is_empty() {
            println!("暂无分组");
            return;
        }
        for group in groups {
            let names: Vec<&str> = group.members.iter().map(|m| m.name.as_str()).collect();
            println!("{} ({} 名成员): {}", group.name, group.len(), names.join("、"));
        }
        for (name, count) in summarize(groups) {
            println!("  {:<12} {}", name, "█".repeat(count));
        }
    }
}
