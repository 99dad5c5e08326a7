use anyhow::Result;
use cinematch_engine::bootstrap::ArtifactFetcher;
use cinematch_engine::Config;

pub async fn run_bootstrap(config: Config) -> Result<()> {
    let fetcher = ArtifactFetcher::new(config.retry_max_attempts)?;
    let downloaded = fetcher.ensure_all(&config).await?;

    if downloaded.is_empty() {
        println!("All artifacts present in {}", config.data_dir.display());
    } else {
        for model in &downloaded {
            println!("✓ Downloaded {}", config.artifact_path(*model).display());
        }
    }

    Ok(())
}
