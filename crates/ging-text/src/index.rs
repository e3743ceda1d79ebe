use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tantivy::directory::MmapDirectory;
use tantivy::schema::Schema;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use ging_core::types::{Document, PackageDocument};
use ging_core::{Error, Result};

use crate::schema::{DocFields, SCHEMA_VERSION};
use crate::tantivy_utils::{build_schema, register_tokenizers};

/// The on-disk documentation index. Owned by the outermost caller and
/// passed to whatever indexes or searches; writes are serialised internally.
/// A handle from [`DocIndex::open_read_only`] holds no writer and so never
/// takes the directory lock.
pub struct DocIndex {
	path: PathBuf,
	index: Index,
	reader: IndexReader,
	writer: Option<Mutex<IndexWriter>>,
	fields: DocFields,
}

impl DocIndex {
	/// Opens the index at `index_dir`, creating it when the directory holds
	/// none. An existing index must carry this schema and version.
	pub fn open_or_create(index_dir: &Path, writer_memory: usize) -> Result<Self> {
		let schema = build_schema();
		let index = if Index::exists(&Self::directory(index_dir)?).unwrap_or(false) {
			let index = Index::open_in_dir(index_dir).map_err(|e| incompatible(index_dir, e))?;
			check_compatible(index_dir, &index, &schema)?;
			info!(path = %index_dir.display(), "opened index");
			index
		} else {
			let index = Index::create_in_dir(index_dir, schema).map_err(|e| write_error(index_dir, e))?;
			info!(path = %index_dir.display(), version = SCHEMA_VERSION, "created index");
			index
		};
		Self::from_index(index_dir.to_path_buf(), index, writer_memory)
	}

	/// Deletes whatever lives at `index_dir` and starts an empty index there.
	pub fn recreate(index_dir: &Path, writer_memory: usize) -> Result<Self> {
		if index_dir.exists() {
			std::fs::remove_dir_all(index_dir).map_err(|e| write_error(index_dir, e))?;
		}
		Self::open_or_create(index_dir, writer_memory)
	}

	/// Throwaway index for tests and dry runs.
	pub fn create_in_ram(writer_memory: usize) -> Result<Self> {
		let index = Index::create_in_ram(build_schema());
		Self::from_index(PathBuf::new(), index, writer_memory)
	}

	/// Opens an existing index for searching only. Works while another
	/// process holds the writer; new commits become visible shortly after
	/// they land.
	pub fn open_read_only(index_dir: &Path) -> Result<Self> {
		if !index_dir.is_dir() {
			return Err(Error::Search(format!("no index at {}; run `ging index` first", index_dir.display())));
		}
		let directory = MmapDirectory::open(index_dir).map_err(|e| incompatible(index_dir, e))?;
		if !Index::exists(&directory).unwrap_or(false) {
			return Err(Error::Search(format!("no index at {}; run `ging index` first", index_dir.display())));
		}
		let index = Index::open(directory).map_err(|e| incompatible(index_dir, e))?;
		check_compatible(index_dir, &index, &build_schema())?;
		register_tokenizers(&index);
		let fields = DocFields::from_schema(&index.schema())?;
		let reader: IndexReader = index
			.reader_builder()
			.reload_policy(ReloadPolicy::OnCommitWithDelay)
			.try_into()
			.map_err(|e| Error::Search(e.to_string()))?;
		debug!(path = %index_dir.display(), "opened index read-only");
		Ok(Self { path: index_dir.to_path_buf(), index, reader, writer: None, fields })
	}

	fn directory(index_dir: &Path) -> Result<MmapDirectory> {
		std::fs::create_dir_all(index_dir).map_err(|e| write_error(index_dir, e))?;
		MmapDirectory::open(index_dir).map_err(|e| write_error(index_dir, e))
	}

	fn from_index(path: PathBuf, index: Index, writer_memory: usize) -> Result<Self> {
		register_tokenizers(&index);
		let fields = DocFields::from_schema(&index.schema())?;
		let writer: IndexWriter = index.writer(writer_memory).map_err(|e| write_error(&path, e))?;
		let reader: IndexReader = index
			.reader_builder()
			.reload_policy(ReloadPolicy::Manual)
			.try_into()
			.map_err(|e| Error::Search(e.to_string()))?;
		let this = Self { path, index, reader, writer: Some(Mutex::new(writer)), fields };
		if this.index.load_metas().map_err(|e| incompatible(&this.path, e))?.payload.is_none() {
			// Stamp a fresh index so a later open can check the version.
			this.commit("<schema>", |_| Ok(()))?;
		}
		Ok(this)
	}

	pub fn path(&self) -> &Path { &self.path }
	pub fn index(&self) -> &Index { &self.index }
	pub fn fields(&self) -> DocFields { self.fields }

	pub fn searcher(&self) -> tantivy::Searcher { self.reader.searcher() }
	pub fn is_read_only(&self) -> bool { self.writer.is_none() }

	/// Replaces everything stored under `key` with `package` and its
	/// children, in one commit.
	pub fn index_document(&self, key: &str, package: &PackageDocument) -> Result<()> {
		validate(key, package)?;
		let f = self.fields;
		self.commit(key, |writer| {
			writer.delete_term(Term::from_field_text(f.key, key));
			for entry in package.documents() {
				writer.add_document(self.row(key, entry)).map_err(|e| Error::index_write(key, e))?;
			}
			Ok(())
		})?;
		debug!(key, rows = 1 + package.children().count(), "indexed package");
		Ok(())
	}

	fn row(&self, key: &str, entry: &Document) -> TantivyDocument {
		let f = self.fields;
		doc!(
			f.key => key.to_string(),
			f.name => entry.name().to_string(),
			f.doc => entry.doc().to_string(),
			f.kind => entry.kind().code().to_string(),
			f.import => entry.import_path().to_string(),
		)
	}

	fn commit<F>(&self, key: &str, stage: F) -> Result<()>
	where
		F: FnOnce(&mut IndexWriter) -> Result<()>,
	{
		let writer = self.writer.as_ref().ok_or_else(|| Error::index_write(key, "index opened read-only"))?;
		let mut writer = writer.lock().map_err(|_| Error::index_write(key, "index writer lock poisoned"))?;
		if let Err(e) = stage(&mut writer) {
			writer.rollback().map_err(|e| Error::index_write(key, e))?;
			return Err(e);
		}
		let mut prepared = writer.prepare_commit().map_err(|e| Error::index_write(key, e))?;
		prepared.set_payload(&SCHEMA_VERSION.to_string());
		prepared.commit().map_err(|e| Error::index_write(key, e))?;
		drop(writer);
		self.reader.reload().map_err(|e| Error::index_write(key, e))
	}

	#[cfg(test)]
	pub(crate) fn write_raw_rows(&self, key: &str, rows: Vec<TantivyDocument>) -> Result<()> {
		self.commit(key, |writer| {
			for row in rows {
				writer.add_document(row).map_err(|e| Error::index_write(key, e))?;
			}
			Ok(())
		})
	}
}

fn validate(key: &str, package: &PackageDocument) -> Result<()> {
	if key.is_empty() {
		return Err(Error::index_write(key, "empty key"));
	}
	if package.import_path().is_empty() {
		return Err(Error::index_write(key, "missing required field import"));
	}
	if let Some(entry) = package.documents().find(|d| d.name().is_empty()) {
		return Err(Error::index_write(key, format!("missing required field name on a {} document", entry.kind())));
	}
	Ok(())
}

fn check_compatible(path: &Path, index: &Index, expected: &Schema) -> Result<()> {
	let metas = index.load_metas().map_err(|e| incompatible(path, e))?;
	let version = metas.payload.as_deref().and_then(|p| p.trim().parse::<u32>().ok());
	if version != Some(SCHEMA_VERSION) {
		let found = metas.payload.unwrap_or_else(|| "none".to_string());
		return Err(incompatible(path, format!("found schema version {found}")));
	}
	let actual = serde_json::to_value(index.schema()).map_err(|e| incompatible(path, e))?;
	let wanted = serde_json::to_value(expected).map_err(|e| incompatible(path, e))?;
	if actual != wanted {
		return Err(incompatible(path, "field layout differs"));
	}
	Ok(())
}

fn incompatible(path: &Path, message: impl std::fmt::Display) -> Error {
	Error::IncompatibleIndex { path: path.to_path_buf(), expected: SCHEMA_VERSION, message: message.to_string() }
}

fn write_error(path: &Path, message: impl std::fmt::Display) -> Error {
	Error::index_write(path.display().to_string(), message)
}
