use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Store(#[from] StoreError),
	#[error(transparent)]
	Metadata(#[from] tracker_metadata::Error),
	#[error("failed to prepare data directory: {0}")]
	Io(#[from] std::io::Error),
}

/// Failures of the preferred tag database.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("failed to open tag database: {0}")]
	Database(#[from] redb::DatabaseError),
	#[error("failed to begin tag database transaction: {0}")]
	Transaction(#[from] redb::TransactionError),
	#[error("failed to open tag table: {0}")]
	Table(#[from] redb::TableError),
	#[error("tag database storage error: {0}")]
	Storage(#[from] redb::StorageError),
	#[error("failed to commit tag database transaction: {0}")]
	Commit(#[from] redb::CommitError),
}
