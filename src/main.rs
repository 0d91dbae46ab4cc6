//! Consilium CLI
//!
//! 用法：consilium [--conversation <id>] [--config <path>]
//! 每行 stdin 为一次查询，结果以 JSON 输出一行；`:clear` 清空会话，`:history` 输出历史，
//! `:graphql <query>` 单独咨询 GraphQL 专家。

use anyhow::Context;
use clap::Parser;
use consilium::agents::AgentKind;
use consilium::cli::{CliArgs, Command};
use consilium::config::load_config;
use consilium::{observability, OrchestrationContext};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    observability::init();
    let conversation_id = args.resolve_conversation_id();

    let cfg = load_config(args.config).context("Failed to load config")?;
    let context = OrchestrationContext::from_config(&cfg)
        .await
        .context("Failed to initialize agents")?;
    tracing::info!(conversation_id = %conversation_id, "Conversation started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        match command {
            Command::Clear => {
                context.clear(&conversation_id).await;
                println!(
                    "{}",
                    serde_json::json!({ "message": format!("Conversation {} cleared.", conversation_id) })
                );
            }
            Command::History => {
                let history = context.history(&conversation_id).await;
                println!("{}", serde_json::to_string(&history)?);
            }
            Command::Graphql(query) => {
                match context
                    .consult(AgentKind::GraphqlGenerator, &conversation_id, &query)
                    .await
                {
                    Ok(response) => println!("{}", serde_json::json!({ "response": response })),
                    Err(e) => println!("{}", serde_json::json!({ "detail": e.to_string() })),
                }
            }
            Command::Query(query) => match context.chat(&conversation_id, &query).await {
                Ok(response) => {
                    let usage = context.usage(&conversation_id).await;
                    println!(
                        "{}",
                        serde_json::json!({ "response": response, "usage": usage })
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task failed");
                    println!(
                        "{}",
                        serde_json::json!({ "detail": format!("Internal Server Error: {e}") })
                    );
                }
            },
        }
    }

    context.shutdown().await;
    Ok(())
}
