use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "proctoriq")]
#[command(about = "Index exam documents and retrieve them by meaning", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the exam documents, overrides `documents.directory`
    #[arg(long, global = true)]
    pub docs: Option<PathBuf>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Ingest the documents directory and run the sample queries (default)
    Run,
    /// Create the index and ingest the documents directory
    Ingest,
    /// Search every document type for context relevant to a question
    Search {
        /// Free-text question
        question: String,

        /// Restrict results to one paper number
        #[arg(short, long)]
        paper: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Delete the index and everything stored in it
    Reset,
}
