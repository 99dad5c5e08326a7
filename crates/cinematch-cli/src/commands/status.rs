use anyhow::Result;
use cinematch_core::{Catalog, DuplicatePolicy, Model};
use cinematch_engine::bootstrap::missing_artifacts;
use cinematch_engine::Config;

pub fn show_status(config: &Config) -> Result<()> {
    println!("\n🎬 Cinematch Status\n");
    println!("  Data directory: {}", config.data_dir.display());
    println!(
        "  Posters: {}",
        if config.tmdb_api_key.is_some() { "TMDb" } else { "disabled (no API key)" }
    );

    let catalog_path = config.catalog_path();
    if catalog_path.exists() {
        match Catalog::load_csv(&catalog_path, DuplicatePolicy::KeepFirst) {
            Ok(catalog) => {
                println!("  Catalog: {} titles", catalog.len());
                if !catalog.shadowed().is_empty() {
                    println!("  Shadowed duplicates: {}", catalog.shadowed().len());
                }
            }
            Err(e) => println!("  Catalog: unreadable ({})", e),
        }
    } else {
        println!("  Catalog: missing ({})", catalog_path.display());
    }

    let missing = missing_artifacts(config);
    println!("\n  Artifacts:");
    for model in Model::ALL {
        let state = if missing.contains(&model) {
            if config.artifact_url(model).is_some() {
                "missing (downloadable)"
            } else {
                "missing"
            }
        } else {
            "present"
        };
        println!("    {:<10} {}", model.name(), state);
    }

    if !missing.is_empty() {
        println!("\n  Run `cinematch bootstrap` to download missing artifacts");
    }

    Ok(())
}
