pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seeder")]
#[command(about = "Seed or clear the bootcamp database from JSON files")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Database URL override")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Import users, bootcamps, courses and reviews", short_flag = 'i')]
    Import {
        #[arg(long, help = "Directory holding the seed JSON files", default_value = "_data")]
        data_dir: PathBuf,
    },

    #[command(about = "Delete every user, bootcamp, course and review", short_flag = 'd')]
    Destroy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let mut config = crate::config::AppConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Commands::Import { data_dir } => commands::seed::handle_import(&config, &data_dir, output_format).await,
        Commands::Destroy => commands::seed::handle_destroy(&config, output_format).await,
    }
}
