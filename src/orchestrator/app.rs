//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建 LLM 服务、会话和随机数源
//! 2. **名单载入**：文件 / 演示名单，可选 AI 整理与去重
//! 3. **命令分发**：把一条命令拆成会话上的一组操作
//! 4. **结果输出**：日志与标准输出
//!
//! 不做任何名单、抽奖、分组的具体判断，全部委托给 `RosterSession`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::cli::{Command, RosterArgs};
use crate::config::Config;
use crate::error::DrawError;
use crate::models::load_audio_bytes;
use crate::orchestrator::shell::Shell;
use crate::services::group_partitioner::summarize;
use crate::services::{CsvExporter, CycleSchedule, LlmService};
use crate::utils::logging::{log_draw_result, log_groups, log_roster_loaded, log_startup};
use crate::workflow::{CleanOutcome, NamingOutcome, RosterSession};

/// 应用主结构
pub struct App {
    config: Config,
    assistant: LlmService,
    session: RosterSession,
    rng: StdRng,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config, seed: Option<u64>) -> Self {
        log_startup(&config.llm_model_name);

        let rng = match seed {
            Some(seed) => {
                info!("🎯 使用固定随机种子: {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        Self {
            assistant: LlmService::new(&config),
            session: RosterSession::new(&config),
            rng,
            config,
        }
    }

    /// 运行一条命令
    pub async fn run(mut self, command: Command) -> Result<()> {
        match command {
            Command::Analyze { roster } => self.analyze(&roster).await,
            Command::Dedup { roster, output } => self.dedup(&roster, output).await,
            Command::Draw {
                roster,
                count,
                allow_repeats,
                animate,
            } => self.draw(&roster, count, allow_repeats, animate).await,
            Command::Group {
                roster,
                size,
                ai_names,
                output,
            } => self.group(&roster, size.as_deref(), ai_names, output).await,
            Command::Transcribe { audio, mime } => self.transcribe(audio, mime).await,
            Command::Shell => {
                Shell::new(self.config, self.assistant, self.session, self.rng)
                    .run()
                    .await
            }
        }
    }

    /// 载入名单
    async fn load_roster(&mut self, args: &RosterArgs) -> Result<()> {
        let source = if args.mock {
            self.session.load_mock();
            "演示名单".to_string()
        } else if let Some(path) = &args.file {
            self.session.load_file(path).await?;
            path.display().to_string()
        } else {
            bail!("请指定名单文件，或使用 --mock 加载演示名单");
        };

        if args.ai_clean {
            match self.session.ai_clean(&self.assistant).await? {
                CleanOutcome::Cleaned { count } => info!("🤖 AI 整理后共 {} 个名字", count),
                CleanOutcome::FellBack { count, reason } => {
                    warn!("⚠️ AI 格式化失败，已按换行/逗号拆分 ({} 个名字): {}", count, reason)
                }
                CleanOutcome::Skipped => warn!("⚠️ 名单为空，跳过 AI 整理"),
            }
        }

        if args.dedup {
            self.session.remove_duplicates();
        }

        log_roster_loaded(&source, self.session.report());
        Ok(())
    }

    async fn analyze(&mut self, roster: &RosterArgs) -> Result<()> {
        self.load_roster(roster).await?;
        let report = self.session.report();

        println!("总人数: {}", report.total);
        println!("有效候选人: {}", report.unique_count);
        println!("重复项: {}", report.duplicate_count);
        for name in &report.duplicates {
            println!("  重复: {}", name);
        }
        Ok(())
    }

    async fn dedup(&mut self, roster: &RosterArgs, output: Option<PathBuf>) -> Result<()> {
        self.load_roster(roster).await?;
        self.session.remove_duplicates();

        match output {
            Some(path) => {
                tokio::fs::write(&path, self.session.raw_input())
                    .await
                    .with_context(|| format!("无法写入文件: {}", path.display()))?;
                info!("💾 去重后的名单已保存至: {}", path.display());
            }
            None => println!("{}", self.session.raw_input()),
        }
        Ok(())
    }

    async fn draw(
        &mut self,
        roster: &RosterArgs,
        count: usize,
        allow_repeats: bool,
        animate: bool,
    ) -> Result<()> {
        self.load_roster(roster).await?;
        self.session.set_allow_repeats(allow_repeats);
        let schedule = CycleSchedule::from_config(&self.config);

        for round in 1..=count {
            let result = if animate {
                self.session
                    .draw_with_cycle(&mut self.rng, &schedule, |shown| {
                        info!("🎲 洗牌中... {} ({})", shown.name, shown.short_id())
                    })
                    .await
            } else {
                self.session.draw(&mut self.rng)
            };

            match result {
                Ok(winner) => {
                    log_draw_result(round, &winner, self.session.draw_engine().remaining());
                    println!("{}", winner.name);
                }
                Err(DrawError::EmptyPool) => {
                    warn!("⚠️ 没有可抽选的候选人了！(已抽出 {} 位)", round - 1);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn group(
        &mut self,
        roster: &RosterArgs,
        size: Option<&str>,
        ai_names: bool,
        output: Option<PathBuf>,
    ) -> Result<()> {
        self.load_roster(roster).await?;
        if let Some(size) = size {
            self.session.set_group_size_input(size);
        }

        self.session.generate_groups(&mut self.rng);
        if self.session.groups().is_empty() {
            warn!("⚠️ 名单为空，无法分组");
            return Ok(());
        }

        if ai_names {
            match self.session.ai_name_groups(&self.assistant).await? {
                NamingOutcome::Renamed { count } => info!("🤖 AI 已为 {} 个分组命名", count),
                NamingOutcome::FellBack { reason } => {
                    warn!("⚠️ AI 生成队名失败，使用默认组名: {}", reason)
                }
                NamingOutcome::Skipped => {}
            }
        }

        log_groups(self.session.groups());
        for (name, count) in summarize(self.session.groups()) {
            info!("📊 {}: {}", name, "█".repeat(count));
        }

        let exporter = CsvExporter::with_path(
            output.unwrap_or_else(|| PathBuf::from(&self.config.export_path)),
        );
        self.session.export_groups(&exporter).await?;
        Ok(())
    }

    async fn transcribe(&mut self, audio: PathBuf, mime: Option<String>) -> Result<()> {
        let (bytes, guessed_mime) = load_audio_bytes(&audio).await?;
        let mime_type = mime.unwrap_or(guessed_mime);

        info!("🎙️ 正在识别录音: {} ({})", audio.display(), mime_type);
        self.session
            .transcribe(&self.assistant, &bytes, &mime_type)
            .await
            .context("音频转录失败。请检查您的 API Key 并重试。")?;

        println!("{}", self.session.raw_input());
        Ok(())
    }
}
