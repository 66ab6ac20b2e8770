//! End-to-end ingestion: records → section tree → chunks → reconciled chunks.

use std::sync::Arc;

use docchat_core::{Config, DocumentId, SectionRecord};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::document::{
    build_section_tree, chunk_tree, reconcile_chunks, validate_tree, Chunk, ChunkerConfig,
    ReconcileConfig, SectionNode, StructuralInconsistency,
};
use crate::error::{StructureError, ValidationError};
use crate::tokenizer::Tokenizer;

/// Output of one document ingestion, ready for the embedding/storage step.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document_id: DocumentId,
    pub tree: SectionNode,
    /// Reconciled chunks in document order.
    pub chunks: Vec<Chunk>,
    pub anomalies: Vec<StructuralInconsistency>,
}

impl IngestedDocument {
    pub fn total_tokens(&self) -> usize {
        self.chunks.iter().map(|c| c.metadata.tokens).sum()
    }
}

/// Chunking and reconciliation policy plus the tokenizer they share.
#[derive(Clone)]
pub struct IngestPipeline {
    chunker: ChunkerConfig,
    reconcile: ReconcileConfig,
    tokenizer: Arc<dyn Tokenizer>,
}

impl IngestPipeline {
    pub fn new(
        chunker: ChunkerConfig,
        reconcile: ReconcileConfig,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Self, ValidationError> {
        chunker.validate()?;
        reconcile.validate()?;
        Ok(Self {
            chunker,
            reconcile,
            tokenizer,
        })
    }

    pub fn from_config(
        config: &Config,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            ChunkerConfig::from(&config.chunking),
            ReconcileConfig::from(&config.reconcile),
            tokenizer,
        )
    }

    /// Ingest a flat record sequence from the PDF parser.
    pub fn ingest_records(
        &self,
        document_id: &str,
        records: &[SectionRecord],
    ) -> Result<IngestedDocument, StructureError> {
        let tree = build_section_tree(records)?;
        for anomaly in &tree.anomalies {
            warn!(
                document_id,
                record = anomaly.record_index,
                heading = %anomaly.heading,
                level = anomaly.level,
                requested_level = anomaly.requested_level,
                open_level = anomaly.open_level,
                synthesized = anomaly.synthesized,
                "heading level out of place, section re-nested"
            );
        }
        self.finish(document_id, tree.root, tree.anomalies)
    }

    /// Ingest a tree from a parser that produces structure directly.
    pub fn ingest_tree(
        &self,
        document_id: &str,
        root: SectionNode,
    ) -> Result<IngestedDocument, StructureError> {
        validate_tree(&root)?;
        self.finish(document_id, root, Vec::new())
    }

    /// Ingest independent documents in parallel. Each result depends only on
    /// its own input, so output is identical to sequential ingestion.
    pub fn ingest_batch(
        &self,
        documents: &[(DocumentId, Vec<SectionRecord>)],
    ) -> Vec<Result<IngestedDocument, StructureError>> {
        documents
            .par_iter()
            .map(|(id, records)| self.ingest_records(id, records))
            .collect()
    }

    fn finish(
        &self,
        document_id: &str,
        tree: SectionNode,
        anomalies: Vec<StructuralInconsistency>,
    ) -> Result<IngestedDocument, StructureError> {
        let tokenizer = self.tokenizer.as_ref();
        let chunks = chunk_tree(&tree, document_id, &self.chunker, tokenizer)?;
        let chunked = chunks.len();
        let chunks = reconcile_chunks(&chunks, &self.reconcile, tokenizer)?;

        let document = IngestedDocument {
            document_id: document_id.to_string(),
            tree,
            chunks,
            anomalies,
        };
        info!(
            document_id,
            sections = document.tree.section_count() - 1,
            chunked,
            reconciled = document.chunks.len(),
            tokens = document.total_tokens(),
            "document ingested"
        );
        Ok(document)
    }
}
