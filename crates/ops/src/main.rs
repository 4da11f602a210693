use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rackview_observability::init();

    let path = rackview_ops::fixture_path(std::env::args_os().nth(1).map(PathBuf::from))?;
    let config = rackview_infra::ReconcileConfig::from_env();
    tracing::info!(fixture = %path.display(), ?config, "starting recompute");

    let report = rackview_ops::run(&path, &config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
