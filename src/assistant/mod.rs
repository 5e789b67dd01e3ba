// Question answering over a loaded table
// Keyword shortcuts are tried first; everything else goes through retrieval and the chat model

pub mod prompts;
pub mod router;


use tracing::{debug, info, warn};

use crate::completion::{ChatCompleter, CompletionRequest};
use crate::config::{Config, FallbackMode};
use crate::embeddings::{ChunkingConfig, Embedder, chunk_table};
use crate::stats::describe;
use crate::table::Table;
use crate::vector_index::VectorIndex;
use crate::{InsightsError, Result};

pub use router::HELP_MESSAGE;

/// Sampling temperature for every completion request
const ANSWER_TEMPERATURE: f32 = 0.0;

pub const NO_INDEX_MESSAGE: &str =
    "No data has been indexed yet. Load a table and build the index before asking questions.";

/// Answers questions about one table at a time.
///
/// Every public operation returns a string. Failures are reported in the
/// returned text with a prefix naming the operation, so callers can show
/// the result as-is.
pub struct InsightEngine {
    embedder: Box<dyn Embedder>,
    completer: Box<dyn ChatCompleter>,
    chunking: ChunkingConfig,
    top_k: usize,
    fallback: FallbackMode,
    max_tokens: u32,
    table: Option<Table>,
    index: Option<VectorIndex>,
}

impl InsightEngine {
    #[inline]
    pub fn new(
        embedder: Box<dyn Embedder>,
        completer: Box<dyn ChatCompleter>,
        config: &Config,
    ) -> Self {
        Self {
            embedder,
            completer,
            chunking: config.chunking.clone(),
            top_k: config.retrieval.top_k,
            fallback: config.retrieval.fallback,
            max_tokens: config.completion.max_tokens,
            table: None,
            index: None,
        }
    }

    #[inline]
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    #[inline]
    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Replace the current table and index it for retrieval.
    ///
    /// The new index only becomes visible once it is complete. If indexing
    /// fails the table is still kept for the keyword shortcuts, and questions
    /// that need retrieval report that nothing is indexed.
    #[inline]
    pub fn build_index(&mut self, table: Table) -> String {
        let chunks = chunk_table(&table, &self.chunking);
        let chunk_count = chunks.len();
        let shape = format!("{} rows x {} columns", table.row_count(), table.column_count());

        match VectorIndex::build(chunks, self.embedder.as_ref()) {
            Ok(index) => {
                info!("Indexed {} chunks from {}", chunk_count, shape);
                self.index = Some(index);
                self.table = Some(table);
                format!("Indexed {} chunks from {}", chunk_count, shape)
            }
            Err(e) => {
                warn!("Failed to build index: {}", e);
                self.index = None;
                self.table = Some(table);
                format!("Error building index: {}", e)
            }
        }
    }

    /// Answer a free-form question about the table
    #[inline]
    pub fn ask(&self, question: &str) -> String {
        let question = question.trim();
        if question.is_empty() {
            return HELP_MESSAGE.to_string();
        }

        let Some(table) = &self.table else {
            return NO_INDEX_MESSAGE.to_string();
        };

        if let Some(answer) = router::route(question, table) {
            return answer;
        }

        match self.fallback {
            FallbackMode::Help => HELP_MESSAGE.to_string(),
            FallbackMode::Rag => self
                .retrieve_and_answer(question)
                .unwrap_or_else(|e| format!("Error answering question: {}", e)),
        }
    }

    /// Ask the model for general insights about the whole dataset
    #[inline]
    pub fn summarize(&self) -> String {
        self.retrieve_and_answer(prompts::INSIGHTS_PROMPT)
            .unwrap_or_else(|e| format!("Error generating insights: {}", e))
    }

    /// Ask the model to interpret the summary statistics of one column
    #[inline]
    pub fn analyze_column(&self, name: &str) -> String {
        let Some(table) = &self.table else {
            return NO_INDEX_MESSAGE.to_string();
        };
        let Some(column) = table.column(name) else {
            return format!("Column '{}' not found in the dataset.", name);
        };

        let prompt = prompts::column_prompt(name, &describe(column));
        self.retrieve_and_answer(&prompt)
            .unwrap_or_else(|e| format!("Error analyzing column: {}", e))
    }

    fn retrieve_and_answer(&self, query: &str) -> Result<String> {
        let Some(index) = self.index.as_ref().filter(|index| !index.is_empty()) else {
            return Ok(NO_INDEX_MESSAGE.to_string());
        };

        let query_vector = self
            .embedder
            .embed(query)
            .map_err(|e| InsightsError::Embedding(format!("{:#}", e)))?;
        let results = index.search(&query_vector, self.top_k)?;
        debug!("Retrieved {} chunks for prompt", results.len());

        let context: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        let request = CompletionRequest {
            prompt: prompts::answer_prompt(&context, query),
            temperature: ANSWER_TEMPERATURE,
            max_tokens: self.max_tokens,
        };

        self.completer
            .complete(&request)
            .map_err(|e| InsightsError::Completion(format!("{:#}", e)))
    }
}
