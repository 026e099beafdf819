use clap::Parser;
use industry_lock::core::intent_filter::{filter_intents, load_intents};
use industry_lock::utils::error::{ErrorSeverity, IndustryError};
use industry_lock::utils::{logger, validation::Validate};
use industry_lock::{build_local_resolver, AuditIndustryFields, CliConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting industry-lock CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Industry resolution failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), IndustryError> {
    let resolver_config = config.resolver_config()?;
    let resolver = build_local_resolver(&resolver_config).await?;

    let ctx = config.resolve_context();
    let lock = resolver.resolve(&ctx).await;
    tracing::info!(
        "✅ {} locked as {} (source: {})",
        ctx.signals.domain,
        lock.value,
        lock.source
    );

    let mut output = json!({
        "domain": ctx.signals.domain,
        "lock": lock,
        "audit": AuditIndustryFields::from(&lock),
    });

    if let Some(path) = &config.intents {
        let intents = load_intents(path)?;
        let kept = filter_intents(resolver.rules(), &intents, &lock.value);
        output["intents"] = json!({
            "total": intents.len(),
            "kept": kept,
        });
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
