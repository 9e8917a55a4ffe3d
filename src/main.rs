use anyhow::{Context, Result, bail};
use cluster_manager::backend::{ClusterBackend, LocalCluster};
use cluster_manager::config::{ClusterConfig, parse_timeout_ms};
use cluster_manager::dispatcher::Assignments;
use cluster_manager::instruction::{InstructionRegistry, from_fn};
use cluster_manager::manager::ClusterManager;
use cluster_manager::membership::Member;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

enum BackendChoice {
    Standalone,
    Local { nodes: usize },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut backend = "standalone".to_string();
    let mut nodes = 3usize;
    let mut timeout_ms: Option<u64> = None;
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--backend", Some(v)) => backend = v.clone(),
            ("--nodes", Some(v)) => nodes = v.parse().context("--nodes expects a number")?,
            ("--timeout", Some(v)) => timeout_ms = Some(parse_timeout_ms(v)?),
            ("--config", Some(v)) => config_path = Some(v.clone()),
            ("--help", _) | ("-h", _) => {
                print_usage(&args[0]);
                return Ok(());
            }
            (flag, None) if flag.starts_with("--") => bail!("{} expects a value", flag),
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    let mut config = match &config_path {
        Some(path) => ClusterConfig::load(path)?,
        None => ClusterConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(ms) = timeout_ms {
        config.instruction_timeout_ms = ms;
    }

    let choice = match backend.as_str() {
        "standalone" => BackendChoice::Standalone,
        "local" => BackendChoice::Local { nodes: nodes.max(1) },
        other => bail!("Unknown backend '{}' (expected 'standalone' or 'local')", other),
    };

    tracing::info!("Instruction timeout: {:?}", config.instruction_timeout());

    match choice {
        BackendChoice::Standalone => {
            tracing::info!("Starting standalone cluster manager");
            run(ClusterManager::standalone(&config), config.instruction_timeout()).await
        }
        BackendChoice::Local { nodes } => {
            tracing::info!("Starting in-process cluster with {} nodes", nodes);
            let members = (0..nodes).map(|n| Member::named(format!("node-{}", n)));
            let cluster = LocalCluster::with_members(members)?;
            run(ClusterManager::clustered(cluster, &config), config.instruction_timeout()).await
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} [--backend standalone|local] [--nodes N] [--timeout MS] [--config FILE]",
        program
    );
    eprintln!("Example: {} --backend local --nodes 4 --timeout 500", program);
}

async fn run<B: ClusterBackend>(manager: ClusterManager<B>, timeout: Duration) -> Result<()> {
    let registry = build_registry(&manager);
    tracing::info!("Instructions available: {:?}", registry.list_instructions());

    let members = manager.members();
    tracing::info!("Cluster members: {}", members.len());
    for member in &members {
        tracing::info!("  - {}", member);
    }

    // 1. Shared state:
    if let Some(first) = members.first() {
        manager.properties().set("coordinator", first.id())?;
    }

    // 2. Broadcast:
    let results = manager.submit(registry.build("whoami", Value::Null)?).await?;
    for (member, answer) in &results {
        tracing::info!("{} answered {}", member, answer);
    }

    // 3. Per-member assignments; the last member is given more work than the timeout allows:
    let mut assignments = Assignments::new();
    for (n, member) in members.iter().enumerate() {
        let sleep_ms = if n + 1 == members.len() {
            timeout.as_millis() as u64 * 2
        } else {
            10 * (n as u64 + 1)
        };
        let instruction = registry.build("sleep", json!({ "ms": sleep_ms }))?;
        assignments.insert(member.clone(), Some(instruction));
    }

    let results = manager.submit_many(assignments).await?;
    tracing::info!(
        "{} of {} members completed within {:?}",
        results.len(),
        members.len(),
        timeout
    );

    Ok(())
}

/// Registers the demo instructions. Factories capture what their instructions need here.
fn build_registry<B: ClusterBackend>(manager: &ClusterManager<B>) -> Arc<InstructionRegistry> {
    let registry = InstructionRegistry::new();

    let properties = manager.properties().clone();
    registry.register("whoami", move |_payload| {
        let properties = properties.clone();
        Ok(from_fn(move |member: Member| {
            let properties = properties.clone();
            async move {
                Ok(json!({
                    "member": member.id(),
                    "coordinator": properties.get("coordinator"),
                }))
            }
        }))
    });

    registry.register("sleep", |payload| {
        let ms = payload["ms"]
            .as_u64()
            .context("sleep expects an 'ms' field")?;
        Ok(from_fn(move |member: Member| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            tracing::debug!("{} slept {}ms", member, ms);
            Ok(json!(ms))
        }))
    });

    registry
}
