mod cli;

use std::process::ExitCode;

use clap::Parser;
use proctoriq_core::bootstrap::App;
use proctoriq_core::config::QDRANT_API_KEY;
use proctoriq_core::AppBuilder;
use proctoriq_embeddings::AnyEmbedder;
use proctoriq_embeddings::hash::HashEmbedder;
use proctoriq_memory::document::IngestReport;
use proctoriq_memory::or_empty;
use proctoriq_memory::retrieval::format_context;

use crate::cli::{Cli, Command};

const DEMO_PAPER: &str = "1";
const DEMO_VARIATION: &str = "Variation1";
const DEMO_QUESTION: &str = "What textual evidence tells us that Pip was trembling?";

#[tokio::main]
async fn main() -> ExitCode {
    init_subscriber();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("ProctorIQ failed: {e:#}");
            eprintln!("Make sure:");
            eprintln!("  - {QDRANT_API_KEY} is set");
            eprintln!("  - the Qdrant endpoint in index.url is reachable");
            eprintln!("  - exam documents exist in the documents directory");
            ExitCode::FAILURE
        }
    }
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut builder = AppBuilder::from_env(cli.config.as_deref()).await?;
    if let Some(docs) = cli.docs {
        builder.config_mut().documents.directory = docs;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let app = builder.build().await?;
            run_demo(&app, builder.config().retrieval.snippet_chars).await
        }
        Command::Ingest => {
            let app = builder.build().await?;
            let report = ingest(&app).await?;
            println!(
                "Ingested {} documents as {} chunks",
                report.documents, report.chunks
            );
            Ok(())
        }
        Command::Search {
            question,
            paper,
            limit,
        } => {
            if let Some(limit) = limit {
                builder.config_mut().retrieval.context_limit = limit.max(1);
            }
            let app = builder.build().await?;
            let hits = app
                .retriever
                .search_relevant_context(&question, paper.as_deref())
                .await?;
            println!("Found {} relevant context documents", hits.len());
            for hit in &hits {
                println!(
                    "\n({:.3}) {}",
                    hit.score,
                    format_context(hit, builder.config().retrieval.snippet_chars)
                );
            }
            Ok(())
        }
        Command::Reset => {
            // Deleting needs no embeddings, so skip the model load.
            let store = builder.build_store()?;
            let embedder =
                AnyEmbedder::Hash(HashEmbedder::new(builder.config().embedding.dimension));
            let app = builder.assemble(store, &embedder);
            app.index.delete_index().await?;
            println!("Deleted index {}", app.index.name());
            Ok(())
        }
    }
}

async fn ingest(app: &App) -> anyhow::Result<IngestReport> {
    Ok(app
        .pipeline
        .load_and_ingest(&app.loader, &app.docs_dir)
        .await?)
}

async fn run_demo(app: &App, snippet_chars: usize) -> anyhow::Result<()> {
    tracing::info!("setting up ProctorIQ vector store");
    let report = ingest(app).await?;
    println!(
        "Vector store setup completed: {} documents, {} chunks",
        report.documents, report.chunks
    );

    println!("\nTesting vector store queries...");

    let papers = or_empty(
        app.retriever.get_question_paper(DEMO_PAPER).await,
        "question paper lookup",
    );
    println!(
        "Found {} question paper documents for Paper {DEMO_PAPER}",
        papers.len()
    );

    let schemes = or_empty(
        app.retriever.get_marking_scheme(DEMO_PAPER).await,
        "marking scheme lookup",
    );
    println!(
        "Found {} marking scheme documents for Paper {DEMO_PAPER}",
        schemes.len()
    );

    let answers = or_empty(
        app.retriever
            .get_student_answers(DEMO_PAPER, Some(DEMO_VARIATION))
            .await,
        "student answer lookup",
    );
    println!(
        "Found {} student answer documents for Paper {DEMO_PAPER} {DEMO_VARIATION}",
        answers.len()
    );

    let context = or_empty(
        app.retriever
            .search_relevant_context(DEMO_QUESTION, Some(DEMO_PAPER))
            .await,
        "context search",
    );
    println!("Found {} relevant context documents", context.len());
    for hit in &context {
        println!("\n{}", format_context(hit, snippet_chars));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use proctoriq_memory::InMemoryVectorStore;
    use serial_test::serial;

    use super::*;

    async fn hash_app(dir: &Path) -> (AppBuilder, App) {
        let docs = dir.join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(
            docs.join("SQP1.txt"),
            "What textual evidence tells us that Pip was trembling?",
        )
        .unwrap();
        std::fs::write(docs.join("MS1.txt"), "Quote his chattering teeth.")
            .unwrap();
        std::fs::write(
            docs.join("Student_Answer_Paper1_Variation1.txt"),
            "He shook with cold.",
        )
        .unwrap();

        let config = dir.join("proctoriq.toml");
        std::fs::write(
            &config,
            format!(
                "[embedding]\nprovider = \"hash\"\ndimension = 32\n\n[documents]\ndirectory = {:?}\n",
                docs.display().to_string()
            ),
        )
        .unwrap();

        unsafe { std::env::set_var(QDRANT_API_KEY, "test-key") };
        let builder = AppBuilder::from_env(Some(&config)).await.unwrap();
        unsafe { std::env::remove_var(QDRANT_API_KEY) };

        let embedder = builder.build_embedder().await.unwrap();
        let app = builder.assemble(Arc::new(InMemoryVectorStore::new()), &embedder);
        (builder, app)
    }

    #[tokio::test]
    #[serial]
    async fn demo_runs_against_in_memory_store() {
        let dir = tempfile::tempdir().unwrap();
        let (_builder, app) = hash_app(dir.path()).await;
        run_demo(&app, 300).await.unwrap();
        assert_eq!(app.index.count().await.unwrap(), 3);
    }

    #[tokio::test]
    #[serial]
    async fn ingest_reports_documents_and_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let (_builder, app) = hash_app(dir.path()).await;
        let report = ingest(&app).await.unwrap();
        assert_eq!(report.documents, 3);
        assert_eq!(report.chunks, 3);
    }

    #[tokio::test]
    #[serial]
    async fn ingest_without_documents_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (_builder, mut app) = hash_app(dir.path()).await;
        app.docs_dir = dir.path().join("missing");
        assert!(ingest(&app).await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn missing_api_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        unsafe { std::env::remove_var(QDRANT_API_KEY) };
        let config = dir.path().join("none.toml");
        assert!(AppBuilder::from_env(Some(&config)).await.is_err());
    }
}
