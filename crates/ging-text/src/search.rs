//! Phrase search over the documentation index and result reconstruction.
use std::ops::Range;
use std::time::Instant;

use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, Occur, PhraseQuery, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::snippet::{collapse_overlapped_ranges, Snippet, SnippetGenerator};
use tantivy::{Index, TantivyDocument, Term};
use tracing::{debug, warn};

use ging_core::types::{DocKind, Highlights, SearchPage, SearchResult};
use ging_core::{Error, Result};

use crate::index::DocIndex;

/// Stored fields and highlights of one engine hit, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawHit {
	pub name: Option<String>,
	pub kind: Option<String>,
	pub import_path: Option<String>,
	pub highlights: Highlights,
	pub score: f32,
}

/// Runs `query_text` as a phrase against every searchable field and returns
/// at most `limit` hits in relevance order. Hits without a name or with an
/// unknown kind are logged and skipped.
pub fn search(index: &DocIndex, query_text: &str, limit: usize, link_base: &str) -> Result<SearchPage> {
	if limit == 0 {
		return Err(Error::Search("result limit must be at least 1".to_string()));
	}
	let started = Instant::now();
	let Some(query) = build_query(index.index(), &index.fields().searchable(), query_text.trim())? else {
		debug!(query = query_text, "query has no searchable tokens");
		return Ok(SearchPage::empty());
	};
	let f = index.fields();
	let searcher = index.searcher();
	let (top_docs, total_hits) = searcher
		.search(&*query, &(TopDocs::with_limit(limit), Count))
		.map_err(|e| Error::Search(e.to_string()))?;
	let name_snippets = SnippetGenerator::create(&searcher, &*query, f.name).map_err(|e| Error::Search(e.to_string()))?;
	let doc_snippets = SnippetGenerator::create(&searcher, &*query, f.doc).map_err(|e| Error::Search(e.to_string()))?;

	let mut results = Vec::with_capacity(top_docs.len());
	for (score, doc_address) in top_docs {
		let doc: TantivyDocument = searcher.doc(doc_address).map_err(|e| Error::Search(e.to_string()))?;
		let hit = RawHit {
			name: stored_text(&doc, f.name),
			kind: stored_text(&doc, f.kind),
			import_path: stored_text(&doc, f.import),
			highlights: Highlights {
				name: name_snippets.snippet_from_doc(&doc).to_html(),
				doc: doc_snippets.snippet_from_doc(&doc).to_html(),
			},
			score,
		};
		match reconstruct(&hit, link_base) {
			Some(result) => results.push(result),
			None => warn!(?doc_address, name = ?hit.name, kind = ?hit.kind, "dropping malformed hit"),
		}
	}
	Ok(SearchPage { results, total_hits, elapsed: started.elapsed() })
}

fn highlight(snippet: &Snippet) -> String {
	render_fragment(snippet.fragment(), snippet.highlighted())
}

/// Marks `highlighted` in `fragment` with `<b>` and drops the stored markup
/// around it. Stored text is escaped when the document is built, so the rest
/// passes through as is. A tag cut off at either end of the fragment is
/// dropped too.
fn render_fragment(fragment: &str, highlighted: &[Range<usize>]) -> String {
	let mut in_tag = match (fragment.find('>'), fragment.find('<')) {
		(Some(gt), Some(lt)) => gt < lt,
		(Some(_), None) => true,
		_ => false,
	};
	let mut out = String::with_capacity(fragment.len());
	let mut push_text = |out: &mut String, text: &str| {
		for c in text.chars() {
			match c {
				'<' => in_tag = true,
				'>' if in_tag => {
					in_tag = false;
					out.push(' ');
				}
				_ if in_tag => {}
				_ => out.push(c),
			}
		}
	};
	let mut pos = 0;
	for range in collapse_overlapped_ranges(highlighted) {
		if range.start < pos || range.end > fragment.len() {
			continue;
		}
		push_text(&mut out, &fragment[pos..range.start]);
		out.push_str("<b>");
		push_text(&mut out, &fragment[range.clone()]);
		out.push_str("</b>");
		pos = range.end;
	}
	push_text(&mut out, &fragment[pos..]);
	out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn stored_text(doc: &TantivyDocument, field: Field) -> Option<String> {
	doc.get_first(field).and_then(|v| v.as_str()).map(str::to_string)
}

/// One query per field from that field's own analyzer: a term for a single
/// token, a positional phrase for several, nothing for none. `None` when no
/// field produced a token.
fn build_query(index: &Index, fields: &[Field], text: &str) -> Result<Option<Box<dyn Query>>> {
	if text.is_empty() {
		return Ok(None);
	}
	let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
	for &field in fields {
		let mut analyzer = index.tokenizer_for_field(field).map_err(|e| Error::Search(e.to_string()))?;
		let mut terms = Vec::new();
		{
			let mut stream = analyzer.token_stream(text);
			while stream.advance() {
				let token = stream.token();
				terms.push((token.position, Term::from_field_text(field, &token.text)));
			}
		}
		let query: Box<dyn Query> = match terms.len() {
			0 => continue,
			1 => Box::new(TermQuery::new(terms.remove(0).1, IndexRecordOption::WithFreqs)),
			_ => {
				let first = terms[0].0;
				Box::new(PhraseQuery::new_with_offset(terms.into_iter().map(|(pos, term)| (pos - first, term)).collect()))
			}
		};
		clauses.push((Occur::Should, query));
	}
	if clauses.is_empty() {
		return Ok(None);
	}
	Ok(Some(Box::new(BooleanQuery::new(clauses))))
}

/// Validates a raw hit and derives its display link.
pub fn reconstruct(hit: &RawHit, link_base: &str) -> Option<SearchResult> {
	let name = hit.name.as_deref().filter(|n| !n.is_empty())?;
	let kind = DocKind::from_code(hit.kind.as_deref()?)?;
	Some(SearchResult {
		name: name.to_string(),
		kind,
		link: link_for(kind, name, hit.import_path.as_deref().unwrap_or(""), link_base),
		highlights: hit.highlights.clone(),
		score: hit.score,
	})
}

/// Package docs root, or an anchor inside it for declarations.
pub fn link_for(kind: DocKind, name: &str, import_path: &str, link_base: &str) -> String {
	if import_path.is_empty() {
		return String::new();
	}
	let root = format!("{}/{}", link_base.trim_end_matches('/'), import_path);
	match kind {
		DocKind::Package => root,
		DocKind::Function => format!("{root}#{name}"),
		DocKind::Constant => format!("{root}#pkg-constants"),
		DocKind::Variable => format!("{root}#pkg-variables"),
	}
}
