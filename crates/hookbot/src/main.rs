use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;

use hookbot_core::{config::WebhookConfig, ClientOptions, Context, Notifier, Provider};
use hookbot_feishu::FeishuBot;
use hookbot_wecom::WecomBot;

/// Send one message to a Feishu or WeCom bot webhook.
///
/// Credentials come from `FEISHU_TOKEN` / `WECOM_TOKEN` (or a `.env` file);
/// `*_BASE_URL` and `*_TIMEOUT_MS` override the defaults.
#[derive(Debug, Parser)]
#[command(name = "hookbot", version)]
struct Cli {
    /// Target platform: feishu (lark) or wecom (wx).
    #[arg(short, long, env = "HOOKBOT_PROVIDER", default_value = "feishu")]
    provider: Provider,

    /// Send as markdown instead of plain text.
    #[arg(short, long)]
    markdown: bool,

    /// Abort the request after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Message content.
    message: String,
}

/// Read the provider's settings. Loading `.env` may set process variables,
/// so this runs before the async runtime spawns any worker threads.
fn load_config(provider: Provider) -> anyhow::Result<WebhookConfig> {
    let prefix = match provider {
        Provider::Feishu => hookbot_feishu::ENV_PREFIX,
        Provider::Wecom => hookbot_wecom::ENV_PREFIX,
    };
    Ok(WebhookConfig::from_env(prefix)?)
}

fn notifier(provider: Provider, cfg: WebhookConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    let options = ClientOptions::from_config(cfg);
    Ok(match provider {
        Provider::Feishu => Arc::new(FeishuBot::with_options(options)?),
        Provider::Wecom => Arc::new(WecomBot::with_options(options)?),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.provider)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(run(cli, cfg))
}

async fn run(cli: Cli, cfg: WebhookConfig) -> anyhow::Result<()> {
    hookbot_core::logging::init("hookbot")?;

    let bot = notifier(cli.provider, cfg)?;

    let mut ctx = Context::background();
    if let Some(ms) = cli.timeout_ms {
        ctx = ctx.with_timeout(Duration::from_millis(ms));
    }

    let sent = if cli.markdown {
        bot.send_markdown(&ctx, &cli.message).await
    } else {
        bot.send_text(&ctx, &cli.message).await
    };
    sent.with_context(|| format!("{} notification failed", cli.provider))?;

    tracing::debug!(provider = %cli.provider, "done");
    Ok(())
}
