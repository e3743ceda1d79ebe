use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, RawTokenizer, StopWordFilter, TextAnalyzer, Token, TokenStream, Tokenizer};
use tantivy::Index;

pub const DOC_ANALYZER: &str = "doc";
pub const KEYWORD_ANALYZER: &str = "keyword";

const STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

/// How a field is analysed and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMapping {
	/// Primary key: one raw token, not stored.
	Key,
	/// Whole value as a single exact token, stored.
	Keyword,
	/// Markup-stripped prose with positions, stored.
	Doc,
	/// Stored for display, never searched.
	StoredOnly,
}

/// Shape shared by functions, constants and variables.
pub const ENTRY_MAPPING: &[(&str, FieldMapping)] = &[
	("name", FieldMapping::Keyword),
	("doc", FieldMapping::Doc),
	("kind", FieldMapping::StoredOnly),
];

/// Package rows add the key and import path to the entry shape; children
/// are written as entry rows under the package key.
pub const PACKAGE_MAPPING: &[(&str, FieldMapping)] = &[
	("key", FieldMapping::Key),
	("import", FieldMapping::StoredOnly),
];

fn field_options(mapping: FieldMapping) -> TextOptions {
	match mapping {
		FieldMapping::Key => STRING.into(),
		FieldMapping::StoredOnly => STORED.into(),
		FieldMapping::Keyword => {
			let indexing = TextFieldIndexing::default().set_tokenizer(KEYWORD_ANALYZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
			TextOptions::default().set_indexing_options(indexing).set_stored()
		}
		FieldMapping::Doc => {
			let indexing = TextFieldIndexing::default().set_tokenizer(DOC_ANALYZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
			TextOptions::default().set_indexing_options(indexing).set_stored()
		}
	}
}

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	for (name, mapping) in PACKAGE_MAPPING.iter().chain(ENTRY_MAPPING) {
		schema_builder.add_text_field(name, field_options(*mapping));
	}
	schema_builder.build()
}

pub fn register_tokenizers(index: &Index) {
	let doc = TextAnalyzer::builder(HtmlWhitespaceTokenizer)
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(DOC_ANALYZER, doc);
	index.tokenizers().register(KEYWORD_ANALYZER, TextAnalyzer::from(RawTokenizer::default()));
}

/// Splits on whitespace after blanking out markup tags. Offsets point into
/// the original text so snippets can highlight it.
#[derive(Debug, Clone, Default)]
pub struct HtmlWhitespaceTokenizer;

pub struct HtmlWhitespaceTokenStream {
	tokens: std::vec::IntoIter<Token>,
	current: Token,
}

impl Tokenizer for HtmlWhitespaceTokenizer {
	type TokenStream<'a> = HtmlWhitespaceTokenStream;

	fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
		HtmlWhitespaceTokenStream { tokens: split_html_words(text).into_iter(), current: Token::default() }
	}
}

impl TokenStream for HtmlWhitespaceTokenStream {
	fn advance(&mut self) -> bool {
		match self.tokens.next() {
			Some(token) => { self.current = token; true }
			None => false,
		}
	}

	fn token(&self) -> &Token { &self.current }

	fn token_mut(&mut self) -> &mut Token { &mut self.current }
}

fn split_html_words(text: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut start: Option<usize> = None;
	let mut in_tag = false;
	for (i, c) in text.char_indices() {
		let word_char = if in_tag {
			in_tag = c != '>';
			false
		} else if c == '<' {
			in_tag = true;
			false
		} else {
			!c.is_whitespace()
		};
		match (word_char, start) {
			(true, None) => start = Some(i),
			(false, Some(s)) => {
				push_token(text, s, i, &mut tokens);
				start = None;
			}
			_ => {}
		}
	}
	if let Some(s) = start { push_token(text, s, text.len(), &mut tokens); }
	tokens
}

/// Surrounding punctuation is not part of a word: `router.` indexes as
/// `router`.
fn push_token(text: &str, from: usize, to: usize, tokens: &mut Vec<Token>) {
	let word = &text[from..to];
	let trimmed_start = word.trim_start_matches(|c: char| c.is_ascii_punctuation());
	let trimmed = trimmed_start.trim_end_matches(|c: char| c.is_ascii_punctuation());
	if trimmed.is_empty() {
		return;
	}
	let offset_from = from + (word.len() - trimmed_start.len());
	let position = tokens.len();
	tokens.push(Token { offset_from, offset_to: offset_from + trimmed.len(), position, text: trimmed.to_string(), position_length: 1 });
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(text: &str) -> Vec<String> {
		split_html_words(text).into_iter().map(|t| t.text).collect()
	}

	#[test]
	fn tags_separate_words() {
		assert_eq!(words("<p>\nPackage mux implements a router.\n</p>"), vec!["Package", "mux", "implements", "a", "router"]);
		assert_eq!(words("one<br/>two"), vec!["one", "two"]);
		assert_eq!(words("<h3 id=\"hdr-Usage\">Usage</h3>"), vec!["Usage"]);
		assert_eq!(words("(see RFC 6455, section 11.8) -- done"), vec!["see", "RFC", "6455", "section", "11.8", "done"]);
	}

	#[test]
	fn offsets_point_into_the_source() {
		let text = "<p>Hello world</p>";
		let tokens = split_html_words(text);
		assert_eq!(&text[tokens[1].offset_from..tokens[1].offset_to], "world");
		assert_eq!(tokens[1].position, 1);
	}

	#[test]
	fn doc_analyzer_lowercases_and_drops_stop_words() {
		let index = Index::create_in_ram(build_schema());
		register_tokenizers(&index);
		let mut analyzer = index.tokenizers().get(DOC_ANALYZER).expect("registered");
		let mut stream = analyzer.token_stream("<p>The Router implements it</p>");
		let mut seen = Vec::new();
		while stream.advance() {
			seen.push((stream.token().text.clone(), stream.token().position));
		}
		assert_eq!(seen, vec![("router".to_string(), 1), ("implements".to_string(), 2)]);
	}
}
