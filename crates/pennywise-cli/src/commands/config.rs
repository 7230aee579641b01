//! Show resolved configuration

use anyhow::Result;
use pennywise_core::model_router::{self, ModelRouter};
use pennywise_core::TaskType;

use super::AppContext;

/// Print the effective settings; the API key is only reported as set or unset
pub fn cmd_config(ctx: &AppContext) -> Result<()> {
    let config = &ctx.config;

    println!("⚙️  Pennywise configuration");
    println!();
    println!(
        "   Config file:    {}",
        ctx.config_source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(defaults)".to_string())
    );
    println!("   Ledger:         {}", ctx.store.path().display());
    println!("   Currency:       {}", config.currency);
    println!(
        "   Monthly budget: {}",
        config
            .monthly_budget
            .map(|b| format!("{}{:.2}", config.currency, b))
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("   Recent window:  {} days", config.recent_days);
    println!();
    println!("   LLM backend:    {}", config.llm.backend.as_str());
    println!(
        "   LLM host:       {}",
        config.llm.host.as_deref().unwrap_or("(provider default)")
    );
    let key_status = if config.llm.api_key().is_some() {
        "set"
    } else {
        "not set"
    };
    println!("   API key:        ${} ({})", config.llm.api_key_env, key_status);

    let router = ModelRouter::default();
    println!();
    println!(
        "   Model routing:  {}",
        router
            .config_path()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .or_else(|| model_router::default_config_path()
                .map(|p| format!("embedded (override at {})", p.display())))
            .unwrap_or_else(|| "embedded".to_string())
    );
    for task in TaskType::all() {
        let task_config = router.config_for_task(*task);
        println!(
            "     {:16} {} ({}s timeout)",
            task.as_str(),
            task_config.model,
            task_config.timeout.as_secs()
        );
    }

    Ok(())
}
