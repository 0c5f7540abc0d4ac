//! qraction 命令行工具：本地/远程解析扫码文本、查看与校验规则

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qraction::{
    ActionResolver, ConfigManager, GlobalConfig, QrActionResolver, RemoteResolver, RuleClient,
    RuleCompiler, RuleLoader,
};

#[derive(Parser)]
#[command(name = "qraction", version)]
#[command(about = "扫码动作解析工具：规则匹配与结果预览", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 后端API根地址
    #[arg(long, global = true, env = "QRACTION_API_BASE")]
    api_base: Option<String>,

    /// 认证令牌（Bearer）
    #[arg(long, global = true, env = "QRACTION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// HTTP超时（秒）
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,

    /// 规则缓存文件
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// 规则缓存有效期（秒），0 表示每次都从后端拉取
    #[arg(long, global = true, default_value = "300")]
    cache_ttl: u64,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 解析扫码文本并输出结果（JSON）
    Resolve {
        /// 扫码文本
        qr_data: String,

        #[command(flatten)]
        source: RuleSource,
    },

    /// 规则管理
    #[command(subcommand)]
    Rules(RulesCommand),
}

#[derive(Args)]
#[group(multiple = false)]
struct RuleSource {
    /// 从本地JSON文件加载规则
    #[arg(long)]
    rules: Option<PathBuf>,

    /// 调用后端执行接口解析
    #[arg(long)]
    remote: bool,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// 列出后端规则
    List {
        /// 仅列出启用的规则
        #[arg(long)]
        active_only: bool,
    },

    /// 编译规则文件，报告被跳过的规则与求值顺序
    Check {
        /// 规则JSON文件
        #[arg(long)]
        rules: PathBuf,
    },

    /// 从后端重新拉取规则并写入缓存
    Refresh,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(cli: &Cli) -> GlobalConfig {
    let mut builder = ConfigManager::custom()
        .auth_token(cli.token.clone())
        .http_timeout(cli.timeout)
        .rule_cache_ttl(cli.cache_ttl)
        .verbose(cli.verbose);
    if let Some(api_base) = &cli.api_base {
        builder = builder.api_base_url(api_base.clone());
    }
    if let Some(cache) = &cli.cache {
        builder = builder.rule_cache_path(cache.clone());
    }
    builder.build()
}

async fn resolve(config: GlobalConfig, qr_data: &str, source: RuleSource) -> Result<()> {
    let outcome = if source.remote {
        RemoteResolver::new(config)?.resolve(qr_data).await?
    } else {
        let resolver = match source.rules {
            Some(path) => {
                let rule_lib = RuleLoader::load_from_file(&path)
                    .await
                    .with_context(|| format!("无法读取规则文件 {}", path.display()))?;
                ActionResolver::new(&rule_lib)
            }
            None => ActionResolver::from_config(&config).await?,
        };
        resolver.resolve(qr_data).await?
    };

    let report = json!({
        "qr_data": qr_data,
        "outcome": outcome,
        "effect": outcome.effect(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn rules(config: GlobalConfig, command: RulesCommand) -> Result<()> {
    match command {
        RulesCommand::List { active_only } => {
            let client = RuleClient::new(config)?;
            let rule_lib = client.list(active_only.then_some(true)).await?;
            for rule in &rule_lib.rules {
                println!(
                    "{}\t{}\t{}\t{}",
                    if rule.is_active { "on" } else { "off" },
                    rule.action_type.as_str(),
                    rule.name,
                    if rule.pattern.is_empty() { "-" } else { rule.pattern.as_str() },
                );
            }
            println!("共 {} 条规则（启用 {} 条）", rule_lib.rules.len(), rule_lib.active_count());
        }
        RulesCommand::Check { rules } => {
            let rule_lib = RuleLoader::load_from_file(&rules)
                .await
                .with_context(|| format!("无法读取规则文件 {}", rules.display()))?;
            let compiled = RuleCompiler::compile(&rule_lib);
            for (idx, name) in compiled.evaluation_order().into_iter().enumerate() {
                println!("{:>3}. {}", idx + 1, name);
            }
            for skipped in &compiled.skipped {
                println!("跳过：{}", skipped);
            }
            println!("有效规则 {} 条，跳过 {} 条", compiled.len(), compiled.skipped.len());
        }
        RulesCommand::Refresh => {
            let rule_lib = RuleLoader::refresh(&config).await?;
            println!(
                "已缓存 {} 条规则到 {}",
                rule_lib.rules.len(),
                config.rule_cache_path.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = build_config(&cli);

    match cli.command {
        Commands::Resolve { qr_data, source } => resolve(config, &qr_data, source).await,
        Commands::Rules(command) => rules(config, command).await,
    }
}
