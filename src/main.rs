// ==========================================
// 葡萄采收决策系统 - 命令行入口
// ==========================================
// 职责: 解析参数 → 装配 AppState → 调用 API → 输出
// 红线: 不含计算逻辑,公式只在引擎层
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use harvest_decision::api::EvaluateDecisionRequest;
use harvest_decision::app::{get_default_db_path, AppState};
use harvest_decision::config::DecisionModel;
use harvest_decision::i18n::{self, t, t_with_args};
use harvest_decision::weather::{
    build_dataset, chronological_split, evaluate_classifier, merge_daily, MovingAverageBaseline,
    WeatherLoader, RAIN_THRESHOLD,
};
use harvest_decision::{logging, DecisionLogEntry};

#[derive(Parser)]
#[command(name = "harvest-decision")]
#[command(version)]
#[command(about = "葡萄采收时机决策支持 - 期望值决策模型")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite 数据库路径（默认位于用户数据目录）
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// 输出语言: en / zh-CN
    #[arg(long, global = true, default_value = "en")]
    lang: String,

    /// 详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON 格式日志
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 评估一次采收决策
    Evaluate {
        /// 风暴概率
        #[arg(long)]
        storm: Option<f64>,

        /// 风暴后贵腐概率
        #[arg(long)]
        botrytis: Option<f64>,

        /// 无风暴: 糖分不足概率
        #[arg(long)]
        no_sugar: Option<f64>,

        /// 无风暴: 典型糖分概率
        #[arg(long)]
        typical_sugar: Option<f64>,

        /// 无风暴: 高糖分概率
        #[arg(long)]
        high_sugar: Option<f64>,

        /// 风暴预测灵敏度
        #[arg(long)]
        sensitivity: Option<f64>,

        /// 风暴预测特异度
        #[arg(long)]
        specificity: Option<f64>,

        /// 写入决策日志
        #[arg(long)]
        record: bool,

        /// 操作人
        #[arg(long)]
        actor: Option<String>,

        /// 以 JSON 输出完整分解
        #[arg(long)]
        json: bool,
    },

    /// 查看默认输入与基线
    Defaults {
        #[arg(long)]
        json: bool,
    },

    /// 查看决策历史
    History {
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// 按建议动作筛选: "Wait" / "Harvest Now"
        #[arg(long)]
        action: Option<String>,
    },

    /// 配置管理
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// 由气象数据推导校准参数
    Weather {
        /// 气象文件（CSV / XLSX）,可多个
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 测试集比例（时间上最靠后的部分）
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,

        /// 基准分类器阈值（PRCP_MA3）
        #[arg(long, default_value_t = RAIN_THRESHOLD)]
        threshold: f64,

        /// 将推导的校准参数写入配置
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// 输出全部配置（JSON 快照）
    Show,

    /// 写入单个配置项
    Set { key: String, value: String },

    /// 从 JSON 快照恢复配置
    Restore { file: PathBuf },

    /// 导入决策模型（收入表 + 情景产量 + 基线）
    ImportModel { file: PathBuf },
}

fn open_state(db: Option<PathBuf>) -> Result<AppState> {
    let db_path = db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);
    AppState::new(db_path).map_err(|e| anyhow!(e))
}

fn print_entry(entry: &DecisionLogEntry) {
    println!(
        "{}  {}  {:<12} ${:>16}  {:<11}  {}",
        entry.decided_at.format("%Y-%m-%d %H:%M:%S"),
        entry.decision_id,
        entry.actor,
        i18n::format_currency(entry.expected_value),
        entry.action.label(),
        i18n::format_currency(entry.baseline),
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init(cli.verbose);
    }
    i18n::set_locale(&cli.lang);

    tracing::debug!(version = harvest_decision::VERSION, "{}", harvest_decision::APP_NAME);

    match cli.command {
        Commands::Evaluate {
            storm,
            botrytis,
            no_sugar,
            typical_sugar,
            high_sugar,
            sensitivity,
            specificity,
            record,
            actor,
            json,
        } => {
            let state = open_state(cli.db)?;
            let request = EvaluateDecisionRequest {
                prob_storm: storm,
                prob_botrytis: botrytis,
                prob_no_sugar: no_sugar,
                prob_typical_sugar: typical_sugar,
                prob_high_sugar: high_sugar,
                sensitivity,
                specificity,
                record,
                actor,
            };

            let response = state.decision_api.evaluate(request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.e_value_text);
                println!("{}", response.action_text);
                if cli.verbose {
                    let b = &response.breakdown;
                    println!(
                        "{}",
                        t_with_args(
                            "decision.corrected_storm",
                            &[("value", format!("{:.4}", b.corrected_storm).as_str())]
                        )
                    );
                    println!(
                        "{}",
                        t_with_args(
                            "decision.baseline",
                            &[("value", i18n::format_currency(b.baseline).as_str())]
                        )
                    );
                }
                if let Some(id) = &response.decision_id {
                    println!("{}", t_with_args("decision.recorded", &[("id", id.as_str())]));
                }
            }
        }

        Commands::Defaults { json } => {
            let state = open_state(cli.db)?;
            let defaults = state.decision_api.get_defaults().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&defaults)?);
            } else {
                for (field, value) in defaults.beliefs.named_fields() {
                    println!("{:<20} {}", field, value);
                }
                println!("{:<20} {}", "sensitivity", defaults.calibration.sensitivity);
                println!("{:<20} {}", "specificity", defaults.calibration.specificity);
                println!("{:<20} {}", "sugar_sum_policy", defaults.sugar_sum_policy);
                println!(
                    "{}",
                    t_with_args(
                        "decision.baseline",
                        &[("value", i18n::format_currency(defaults.baseline).as_str())]
                    )
                );
            }
        }

        Commands::History { limit, action } => {
            let state = open_state(cli.db)?;
            let mut entries = match action {
                Some(action) => state.decision_api.list_decisions_by_action(&action)?,
                None => state.decision_api.list_recent_decisions(limit)?,
            };
            entries.truncate(limit);

            if entries.is_empty() {
                println!("{}", t("decision.history_empty"));
            }
            for entry in &entries {
                print_entry(entry);
            }
        }

        Commands::Config { command } => {
            let state = open_state(cli.db)?;
            let manager = &state.config_manager;
            match command {
                ConfigCommands::Show => {
                    println!("{}", manager.get_config_snapshot().map_err(|e| anyhow!(e))?);
                }
                ConfigCommands::Set { key, value } => {
                    manager.set_config_value(&key, &value).map_err(|e| anyhow!(e))?;
                    println!("{}", t("common.success"));
                }
                ConfigCommands::Restore { file } => {
                    let snapshot = std::fs::read_to_string(&file)
                        .with_context(|| format!("无法读取快照文件 {:?}", file))?;
                    let count = manager
                        .restore_config_from_snapshot(&snapshot)
                        .map_err(|e| anyhow!(e))?;
                    println!("{} ({})", t("common.success"), count);
                }
                ConfigCommands::ImportModel { file } => {
                    let model = DecisionModel::from_json_file(&file)?;
                    manager.set_decision_model(&model).map_err(|e| anyhow!(e))?;
                    println!("{}", t("common.success"));
                }
            }
        }

        Commands::Weather {
            files,
            test_fraction,
            threshold,
            save,
        } => {
            let loader = WeatherLoader::new();
            let mut batches = Vec::new();
            for (path, result) in files.iter().zip(loader.load_many(files.clone()).await) {
                match result {
                    Ok(daily) => batches.push(daily),
                    Err(e) => {
                        tracing::error!(error = %e, "跳过文件");
                        let key = if path.exists() {
                            "weather.load_failed"
                        } else {
                            "weather.file_not_found"
                        };
                        eprintln!(
                            "{}",
                            t_with_args(key, &[("path", path.display().to_string().as_str())])
                        );
                    }
                }
            }

            if batches.is_empty() {
                return Err(anyhow!(t("common.failed")));
            }

            let daily = merge_daily(batches);
            let rows = build_dataset(&daily);
            let (train, test) = chronological_split(&rows, test_fraction)?;

            println!(
                "{}",
                t_with_args(
                    "weather.rows",
                    &[
                        ("total", rows.len().to_string().as_str()),
                        ("train", train.len().to_string().as_str()),
                        ("test", test.len().to_string().as_str()),
                    ]
                )
            );

            let report = evaluate_classifier(&MovingAverageBaseline { threshold }, &test);
            println!("{}", report.confusion);
            println!("{}", report);

            let calibration = report.confusion.to_calibration()?;
            println!(
                "{}",
                t_with_args(
                    "weather.calibration",
                    &[
                        ("sensitivity", format!("{:.4}", calibration.sensitivity).as_str()),
                        ("specificity", format!("{:.4}", calibration.specificity).as_str()),
                    ]
                )
            );

            if save {
                let state = open_state(cli.db)?;
                let manager = &state.config_manager;
                manager
                    .set_config_value(
                        harvest_decision::config::config_keys::SENSITIVITY,
                        &calibration.sensitivity.to_string(),
                    )
                    .map_err(|e| anyhow!(e))?;
                manager
                    .set_config_value(
                        harvest_decision::config::config_keys::SPECIFICITY,
                        &calibration.specificity.to_string(),
                    )
                    .map_err(|e| anyhow!(e))?;
                println!("{}", t("common.success"));
            }
        }
    }

    Ok(())
}
