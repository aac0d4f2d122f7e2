use anyhow::Result;

use super::{Options, bootstrap};

/// Asks one question in the active chat, prints the graph and saves.
pub async fn run(options: &Options, prompt: &str) -> Result<()> {
    let mut workspace = bootstrap(options).await?;

    println!("{:>8} | {}", "you", prompt.trim());
    workspace.controller.ask(prompt).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&workspace.controller.store().snapshot())?
    );

    workspace.persist().await
}
