use std::sync::Arc;

use proctoriq_embeddings::hash::HashEmbedder;
use proctoriq_embeddings::{EmbedFuture, EmbeddingProvider};
use proctoriq_memory::document::{Chunk, DocumentMetadata, DocumentType};
use proctoriq_memory::{
    EmbedFn, ExamRetriever, IdStrategy, IndexSettings, Metric, QdrantOps, RetrievalConfig,
    VectorIndex,
};
use testcontainers::ContainerAsync;
use testcontainers::GenericImage;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;

const QDRANT_GRPC_PORT: ContainerPort = ContainerPort::Tcp(6334);

fn qdrant_image() -> GenericImage {
    GenericImage::new("qdrant/qdrant", "v1.16.0")
        .with_wait_for(WaitFor::message_on_stdout("gRPC listening"))
        .with_exposed_port(QDRANT_GRPC_PORT)
}

async fn setup_with_qdrant() -> (VectorIndex, ContainerAsync<GenericImage>) {
    let container = qdrant_image().start().await.unwrap();
    let grpc_port = container.get_host_port_ipv4(6334).await.unwrap();
    let url = format!("http://127.0.0.1:{grpc_port}");

    let store = QdrantOps::new(&url, None).unwrap();
    let embedder = HashEmbedder::new(32);
    let embed_fn: EmbedFn = Arc::new(move |text: &str| -> EmbedFuture {
        let e = embedder.clone();
        let owned = text.to_owned();
        Box::pin(async move { e.embed(&owned).await })
    });
    let index = VectorIndex::new(
        Arc::new(store),
        IndexSettings {
            name: "proctoriq_test".into(),
            dimension: 32,
            metric: Metric::Cosine,
            id_strategy: IdStrategy::ContentDerived,
        },
        embed_fn,
    );
    (index, container)
}

fn chunk(doc_type: DocumentType, paper: &str, content: &str) -> Chunk {
    let prefix = match doc_type {
        DocumentType::QuestionPaper => "SQP",
        DocumentType::MarkingScheme => "MS",
        DocumentType::StudentAnswer => "Student_Answer_Paper",
    };
    let filename = format!("{prefix}{paper}.txt");
    Chunk {
        content: content.to_owned(),
        metadata: DocumentMetadata {
            doc_type,
            priority: doc_type.priority(),
            file_path: format!("docs/{filename}"),
            filename,
            paper_number: Some(paper.to_owned()),
            variation: None,
        },
        chunk_index: 0,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn ensure_index_is_idempotent() {
    let (index, _container) = setup_with_qdrant().await;

    index.ensure_index().await.unwrap();
    index.ensure_index().await.unwrap();
    assert!(index.exists().await.unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn store_and_filtered_search() {
    let (index, _container) = setup_with_qdrant().await;
    index.ensure_index().await.unwrap();
    index
        .upsert(&[
            chunk(DocumentType::QuestionPaper, "1", "What made Pip tremble?"),
            chunk(DocumentType::QuestionPaper, "2", "Describe the marshes."),
            chunk(DocumentType::MarkingScheme, "1", "Two marks per quotation."),
        ])
        .await
        .unwrap();
    assert_eq!(index.count().await.unwrap(), 3);

    let retriever = ExamRetriever::new(index, RetrievalConfig::default());
    let hits = retriever.get_question_paper("1").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk.content, "What made Pip tremble?");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn delete_index_removes_collection() {
    let (index, _container) = setup_with_qdrant().await;
    index.ensure_index().await.unwrap();
    index.delete_index().await.unwrap();
    assert!(!index.exists().await.unwrap());
}
