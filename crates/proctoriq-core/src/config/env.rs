use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PROCTORIQ_EMBEDDING_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.embedding.provider = kind;
            } else {
                tracing::warn!("ignoring invalid PROCTORIQ_EMBEDDING_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("PROCTORIQ_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("PROCTORIQ_INDEX_NAME") {
            self.index.name = v;
        }
        if let Ok(v) = std::env::var("PROCTORIQ_INDEX_URL") {
            self.index.url = v;
        }
        if let Ok(v) = std::env::var("PROCTORIQ_INDEX_DEDUPLICATE") {
            if let Ok(enabled) = v.parse::<bool>() {
                self.index.deduplicate = enabled;
            } else {
                tracing::warn!("ignoring invalid PROCTORIQ_INDEX_DEDUPLICATE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("PROCTORIQ_DOCS_DIR") {
            self.documents.directory = v.into();
        }
        if let Ok(v) = std::env::var("PROCTORIQ_CHUNK_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.splitter.chunk_size = size;
            } else {
                tracing::warn!("ignoring invalid PROCTORIQ_CHUNK_SIZE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("PROCTORIQ_CHUNK_OVERLAP") {
            if let Ok(overlap) = v.parse::<usize>() {
                self.splitter.chunk_overlap = overlap;
            } else {
                tracing::warn!("ignoring invalid PROCTORIQ_CHUNK_OVERLAP value: {v}");
            }
        }
    }
}
