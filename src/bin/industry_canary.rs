use clap::Parser;
use industry_lock::build_local_resolver;
use industry_lock::core::canary::{run_canary, CanaryCase};
use industry_lock::utils::{logger, validation::Validate};
use industry_lock::CanaryCliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CanaryCliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    if let Err(e) = args.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = args.resolver_config()?;
    let cases = match &args.cases {
        Some(path) => {
            tracing::info!("📁 Loading canary cases from: {}", path);
            CanaryCase::from_csv(path)?
        }
        None => CanaryCase::defaults(),
    };

    tracing::info!("🐤 Running {} canary cases", cases.len());
    let resolver = build_local_resolver(&config).await?;
    let report = run_canary(&resolver, &cases).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.pass_rate < args.min_pass_rate || !report.no_generic_fallback {
        tracing::error!(
            "❌ Canary failed: pass rate {:.2} (min {:.2}), no generic fallback: {}",
            report.pass_rate,
            args.min_pass_rate,
            report.no_generic_fallback
        );
        std::process::exit(1);
    }

    tracing::info!("✅ Canary passed");
    Ok(())
}
