//! `agentline status` - fetch discovery cards concurrently

use anyhow::Result;
use futures::future::join_all;

use agentline_core::config::AgentlineConfig;
use agentline_core::AgentClient;

pub async fn run(config: &AgentlineConfig) -> Result<()> {
    let mut targets = vec![("orchestrator".to_string(), config.orchestrator_url())];
    for stage in &config.stages {
        targets.push((stage.name.clone(), stage.url.clone()));
    }

    let clients: Vec<AgentClient> = targets
        .iter()
        .map(|(_, url)| AgentClient::new(url))
        .collect();
    let cards = join_all(clients.iter().map(AgentClient::fetch_card)).await;

    let width = targets
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);
    let mut reachable = 0;
    for ((name, url), card) in targets.iter().zip(cards) {
        let label = format!("{:width$}", name);
        match card {
            Some(card) => {
                reachable += 1;
                println!("  ✓ {}  {}  {} v{}", label, url, card.name, card.version);
            }
            None => println!("  ✗ {}  {}  unreachable", label, url),
        }
    }
    println!("\n{}/{} agents reachable", reachable, targets.len());

    Ok(())
}
