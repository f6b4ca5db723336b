//! Book Assistant skills: index local books, search them, look up metadata.

use async_trait::async_trait;
use serde_json::{Value, json};
use skiff_config::BooksConfig;
use skiff_core::document::DocumentParser;
use skiff_core::error::SkillError;
use skiff_core::fetch::HttpFetcher;
use skiff_core::skill::{FieldSpec, InputSchema, Skill, SkillInputs};
use skiff_core::vector::VectorStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub const BEHAVIOR: &str = "You are a helpful assistant that can answer questions about the books.";

/// Vector namespace holding indexed books.
pub const NAMESPACE: &str = "books";

/// Parse a book file and add it to the vector store under its file name.
pub struct IndexBook {
    parser: Arc<dyn DocumentParser>,
    store: Arc<dyn VectorStore>,
}

impl IndexBook {
    pub fn new(parser: Arc<dyn DocumentParser>, store: Arc<dyn VectorStore>) -> Self {
        Self { parser, store }
    }
}

#[async_trait]
impl Skill for IndexBook {
    fn name(&self) -> &str {
        "index_book"
    }

    fn description(&self) -> &str {
        "Use this skill to index a book in a vector database, the user will provide the path to the book"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field("book_path", FieldSpec::text("Path to the book file"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let book_path = inputs.require_text("book_path")?;
        let path = Path::new(book_path);

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(SkillError::InvalidArgument(format!("File {book_path} does not exist")));
        }

        let doc = self.parser.parse(path).await?;
        let name = doc.title.clone();
        if self.store.insert_doc(&name, &doc.to_index_text()).await? {
            info!(book = %name, namespace = self.store.namespace(), "Book indexed");
            Ok(Value::String(format!("Book {name} indexed successfully")))
        } else {
            Err(SkillError::ExternalCallFailure(format!("Book {name} indexing failed")))
        }
    }
}

/// Similarity search over indexed books.
pub struct LookupBook {
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl LookupBook {
    pub fn new(store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self { store, top_k }
    }
}

#[async_trait]
impl Skill for LookupBook {
    fn name(&self) -> &str {
        "lookup_book"
    }

    fn description(&self) -> &str {
        "Use this skill to lookup a book in the vector database"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field("user_query", FieldSpec::text("What to search for in the indexed books"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let query = inputs.require_text("user_query")?;
        let hits = self.store.search(query, self.top_k).await?;
        debug!(query, hits = hits.len(), "Book lookup");
        serde_json::to_value(hits).map_err(|e| SkillError::ExecutionFailed {
            skill: "Book lookup".into(),
            reason: e.to_string(),
        })
    }
}

/// First Open Library search result for a title.
pub struct GetBookInfo {
    fetcher: Arc<dyn HttpFetcher>,
    search_url: String,
}

impl GetBookInfo {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, search_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            search_url: search_url.into(),
        }
    }

    fn url_for(&self, book_name: &str) -> Result<String, SkillError> {
        reqwest::Url::parse_with_params(&self.search_url, &[("q", book_name)])
            .map(String::from)
            .map_err(|e| SkillError::InvalidArgument(format!("bad search URL {}: {e}", self.search_url)))
    }
}

#[async_trait]
impl Skill for GetBookInfo {
    fn name(&self) -> &str {
        "get_book_info"
    }

    fn description(&self) -> &str {
        "Use this skill to get information about a book"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field("book_name", FieldSpec::text("Title of the book"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let book_name = inputs.require_text("book_name")?;
        let data = self.fetcher.get_json(&self.url_for(book_name)?).await?;

        let doc = data
            .get("docs")
            .and_then(Value::as_array)
            .and_then(|docs| docs.first())
            .cloned()
            .ok_or_else(|| SkillError::ExternalCallFailure(format!("No book found for \"{book_name}\"")))?;
        debug!(book = %describe(&doc), "Book info found");
        Ok(doc)
    }
}

/// All Book Assistant skills in registration order.
pub fn skills(
    parser: Arc<dyn DocumentParser>,
    store: Arc<dyn VectorStore>,
    fetcher: Arc<dyn HttpFetcher>,
    config: &BooksConfig,
) -> Vec<Arc<dyn Skill>> {
    vec![
        Arc::new(IndexBook::new(parser, store.clone())),
        Arc::new(LookupBook::new(store, config.top_k)),
        Arc::new(GetBookInfo::new(fetcher, config.search_url.clone())),
    ]
}

/// One-line summary of an Open Library record.
pub fn describe(doc: &Value) -> String {
    let title = doc.get("title").and_then(Value::as_str).unwrap_or("Unknown title");
    let author = doc
        .get("author_name")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(Value::as_str)
        .unwrap_or("unknown author");
    match doc.get("first_publish_year").and_then(Value::as_u64) {
        Some(year) => format!("{title} by {author} ({year})"),
        None => format!("{title} by {author}"),
    }
}
