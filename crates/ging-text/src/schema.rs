//! Field handles of the documentation schema.

use tantivy::schema::{Field, Schema};

use ging_core::{Error, Result};

/// Bumped whenever the field layout changes. Written as the commit payload;
/// an index carrying another version must be deleted and rebuilt.
pub const SCHEMA_VERSION: u32 = 3;

/// Resolved field handles for one schema instance.
#[derive(Debug, Clone, Copy)]
pub struct DocFields {
	/// Owning package import path, shared by a package and its children.
	pub key: Field,
	pub name: Field,
	pub doc: Field,
	pub kind: Field,
	pub import: Field,
}

impl DocFields {
	pub fn from_schema(schema: &Schema) -> Result<Self> {
		let get = |name: &str| schema.get_field(name).map_err(|e| Error::Search(format!("schema lacks field {name}: {e}")));
		Ok(Self { key: get("key")?, name: get("name")?, doc: get("doc")?, kind: get("kind")?, import: get("import")? })
	}

	/// Fields the search query runs against.
	pub fn searchable(&self) -> [Field; 2] {
		[self.name, self.doc]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tantivy_utils::build_schema;

	#[test]
	fn only_name_and_doc_are_searched() {
		let schema = build_schema();
		let fields = DocFields::from_schema(&schema).expect("fields");
		for field in fields.searchable() {
			assert!(schema.get_field_entry(field).is_indexed());
		}
		assert!(!schema.get_field_entry(fields.kind).is_indexed());
		assert!(!schema.get_field_entry(fields.import).is_indexed());
		assert!(!schema.get_field_entry(fields.key).is_stored());
		assert!(schema.get_field_entry(fields.import).is_stored());
	}
}
