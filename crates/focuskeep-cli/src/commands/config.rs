use clap::Subcommand;
use focuskeep_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as TOML
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown config key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or_default());
        }
    }
    Ok(())
}
