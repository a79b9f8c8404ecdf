//! Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::StudioConfig;
use crate::server;
use crate::studio::CaptionStudio;
use crate::types::{CopyType, Language, ResultRecord};

#[derive(Parser)]
#[command(name = "caption-studio")]
#[command(version, about = "Image captions and marketing copy from Ollama vision models", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./caption-studio.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this owner; omit for single-user mode
    #[arg(long, global = true)]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Caption an image file and store the result
    Capture {
        image: PathBuf,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored records, newest first
    History,

    /// Show one record
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Delete a record and its image
    Delete { id: String },

    /// Write the PDF report of a record
    Report {
        id: String,

        /// Output file (default: report_<id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the ZIP bundle of a record
    Bundle {
        id: String,

        /// Output file (default: bundle_<id>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask a question about a record's image
    Ask { id: String, question: String },
}

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = StudioConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let owner = cli.owner.as_deref();

    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    let studio = CaptionStudio::new(config)?;

    match cli.command {
        Commands::Serve { .. } => server::serve(studio).await?,

        Commands::Capture { image, json } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let filename = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.jpg".to_string());

            let record = studio.capture(&bytes, &filename, owner).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
        }

        Commands::History => {
            let records = studio.history(owner)?;
            if records.is_empty() {
                println!("No records.");
            }
            for record in records {
                println!(
                    "{}  {}  {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    first_line(&record.caption_primary)
                );
            }
        }

        Commands::Show { id, json } => {
            let record = studio.record(&id, owner)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
        }

        Commands::Delete { id } => {
            studio.delete(&id, owner)?;
            println!("Deleted {}", id);
        }

        Commands::Report { id, output } => {
            let pdf = studio.report(&id, owner)?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("report_{}.pdf", id)));
            std::fs::write(&path, pdf).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }

        Commands::Bundle { id, output } => {
            let zip = studio.bundle(&id, owner)?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("bundle_{}.zip", id)));
            std::fs::write(&path, zip).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }

        Commands::Ask { id, question } => {
            let answer = studio.ask(&id, owner, &question).await?;
            println!("{}", answer);
        }
    }

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn print_record(record: &ResultRecord) {
    println!("ID:        {}", record.id);
    println!("Created:   {}", record.created_at.to_rfc3339());
    println!("Image:     {}", record.image_reference);
    println!("Caption 1: {}", record.caption_primary);
    println!("Caption 2: {}", record.caption_secondary);
    println!("Tags:      {}", record.tags.join(", "));

    for language in Language::ALL {
        let copy = record.marketing_for(language);
        println!();
        println!("{} Marketing:", language);
        for copy_type in CopyType::ALL {
            let text = copy.get(&copy_type).map(String::as_str).unwrap_or_default();
            println!("  [{}] {}", copy_type, text);
        }
    }
}
