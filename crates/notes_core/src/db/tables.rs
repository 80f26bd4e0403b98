//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "notes.redb";

/// Tenant-scoped entity and association rows keyed by [`super::keys::KeyEncoder`] output.
pub const ENTITIES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entities");

/// Persisted sequence upper bounds, outside any tenant key space.
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Sequence name for note ids.
pub const NOTE_ID_SEQUENCE: &str = "note_ids";
/// Sequence name for tag ids.
pub const TAG_ID_SEQUENCE: &str = "tag_ids";
