use anyhow::{Context, Result};
use cinematch_engine::{config, Config};

/// Show the current effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    let path = config::config_file_path();
    println!("Config file: {}", path.display());
    println!(
        "File exists: {}\n",
        if path.exists() { "yes" } else { "no (using defaults)" }
    );

    let mut shown = config.clone();
    if shown.tmdb_api_key.is_some() {
        shown.tmdb_api_key = Some(String::from("<set>"));
    }
    let rendered = toml::to_string_pretty(&shown).context("Failed to render configuration")?;
    println!("Settings:");
    for line in rendered.lines() {
        println!("  {}", line);
    }

    println!("\nPriority: CLI args > ENV vars (CINEMATCH_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure cinematch.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
