//! tantivy-backed [`SearchIndex`].

use super::SearchIndex;
use crate::constants::SEARCH_WRITER_MEMORY_BYTES;
use crate::error::AppError;
use crate::models::Note;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tantivy::collector::{Count, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, FAST, INDEXED,
    STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, RawTokenizer, TextAnalyzer};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

const KEYWORD_TOKENIZER: &str = "keyword_lower";
const TEXT_TOKENIZER: &str = "en_stem";

#[derive(Clone, Copy)]
struct Fields {
    note_id: Field,
    tenant_id: Field,
    title: Field,
    content: Field,
    tags: Field,
}

fn build_schema() -> (Schema, Fields) {
    let mut builder = Schema::builder();

    let text = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(TEXT_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    let keyword = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(KEYWORD_TOKENIZER)
            .set_index_option(IndexRecordOption::Basic),
    );

    let fields = Fields {
        note_id: builder.add_u64_field("note_id", INDEXED | STORED | FAST),
        tenant_id: builder.add_text_field("tenant_id", STRING),
        title: builder.add_text_field("title", text.clone()),
        content: builder.add_text_field("content", text),
        tags: builder.add_text_field("tags", keyword),
    };
    (builder.build(), fields)
}

/// Search index stored in a tantivy directory (or in RAM for tests).
pub struct TantivySearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: Fields,
    limit: usize,
}

impl TantivySearchIndex {
    /// Open the index in directory `path`, creating it if missing.
    ///
    /// # Errors
    /// Returns an error when the directory or index cannot be opened.
    pub fn open(path: &str, limit: usize) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::SearchMessage(format!(
                "Failed to create search index directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let (schema, fields) = build_schema();
        let index = Index::open_or_create(MmapDirectory::open(dir)?, schema)?;
        tracing::info!("Opened search index at {}", dir.display());
        Self::from_index(index, fields, limit)
    }

    /// Build a throwaway index held entirely in memory.
    ///
    /// # Errors
    /// Returns an error when the reader or writer cannot be created.
    pub fn in_memory(limit: usize) -> Result<Self, AppError> {
        let (schema, fields) = build_schema();
        Self::from_index(Index::create_in_ram(schema), fields, limit)
    }

    fn from_index(index: Index, fields: Fields, limit: usize) -> Result<Self, AppError> {
        index.tokenizers().register(
            KEYWORD_TOKENIZER,
            TextAnalyzer::builder(RawTokenizer::default())
                .filter(LowerCaser)
                .build(),
        );

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = index.writer(SEARCH_WRITER_MEMORY_BYTES)?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
            limit: limit.max(1),
        })
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, IndexWriter>, AppError> {
        self.writer
            .lock()
            .map_err(|_| AppError::SearchMessage("Search writer lock poisoned".to_string()))
    }

    fn tenant_query(&self, tenant_id: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new(
            Term::from_field_text(self.fields.tenant_id, tenant_id),
            IndexRecordOption::Basic,
        ))
    }

    fn note_query(&self, tenant_id: &str, id: u64) -> BooleanQuery {
        BooleanQuery::new(vec![
            (Occur::Must, self.tenant_query(tenant_id)),
            (
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_u64(self.fields.note_id, id),
                    IndexRecordOption::Basic,
                )),
            ),
        ])
    }

    /// Commit and reload the reader before the writer lock is released, so the
    /// next lock holder always sees this commit.
    fn commit(&self, mut writer: MutexGuard<'_, IndexWriter>) -> Result<(), AppError> {
        writer.commit()?;
        self.reader.reload()?;
        drop(writer);
        Ok(())
    }
}

impl SearchIndex for TantivySearchIndex {
    fn index_note(&self, tenant_id: &str, note: &Note) -> Result<(), AppError> {
        let mut doc = TantivyDocument::new();
        doc.add_u64(self.fields.note_id, note.id);
        doc.add_text(self.fields.tenant_id, tenant_id);
        doc.add_text(self.fields.title, &note.title);
        doc.add_text(self.fields.content, &note.content);
        for tag in &note.tags {
            doc.add_text(self.fields.tags, &tag.name);
        }

        let writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_u64(self.fields.note_id, note.id));
        writer.add_document(doc)?;
        self.commit(writer)?;
        tracing::debug!("Indexed note {} for tenant {}", note.id, tenant_id);
        Ok(())
    }

    fn remove_note(&self, tenant_id: &str, id: u64) -> Result<(), AppError> {
        let query = self.note_query(tenant_id, id);
        let writer = self.lock_writer()?;
        let matches = self.reader.searcher().search(&query, &Count)?;
        if matches != 1 {
            tracing::debug!(
                "Refusing to remove note {} for tenant {}: {} matching documents",
                id,
                tenant_id,
                matches
            );
            return Err(AppError::SearchDocumentMissing(id));
        }

        writer.delete_query(Box::new(query))?;
        self.commit(writer)?;
        tracing::debug!("Removed note {} for tenant {} from search index", id, tenant_id);
        Ok(())
    }

    fn search(&self, tenant_id: &str, query: &str) -> Result<Vec<u64>, AppError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.title, self.fields.content, self.fields.tags],
        );
        let (text_query, errors) = parser.parse_query_lenient(query);
        if !errors.is_empty() {
            tracing::debug!("Lenient parse of {:?} dropped {} clause(s)", query, errors.len());
        }
        let scoped = BooleanQuery::new(vec![
            (Occur::Must, text_query),
            (Occur::Must, self.tenant_query(tenant_id)),
        ]);

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&scoped, &TopDocs::with_limit(self.limit))?;

        let mut ids = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(id) = doc.get_first(self.fields.note_id).and_then(|v| v.as_u64()) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
