#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ReadError,
    WriteError,
    BufferPoolNotInit,
    NoUnpinnedPages,
    PageNotPinned,
    PoolHasPinnedPages,
    TableNotFound(String),
    CreateTableFailed(String),
    RecordNotFound,
    NoMoreTuples,
    NoSuchAttribute(usize),
    ImKeyNotFound,
    ImNoMoreEntries,
    AttrCountMismatch { expected: usize, got: usize },
    SchemaMismatch(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ReadError => write!(f, "read error"),
            Error::WriteError => write!(f, "write error"),
            Error::BufferPoolNotInit => write!(f, "buffer pool not initialized"),
            Error::NoUnpinnedPages => write!(f, "no unpinned pages available for replacement"),
            Error::PageNotPinned => write!(f, "page is not pinned"),
            Error::PoolHasPinnedPages => write!(f, "buffer pool still has pinned pages"),
            Error::TableNotFound(name) => write!(f, "table not found: {name}"),
            Error::CreateTableFailed(name) => write!(f, "failed to create table: {name}"),
            Error::RecordNotFound => write!(f, "record not found"),
            Error::NoMoreTuples => write!(f, "no more tuples"),
            Error::NoSuchAttribute(i) => write!(f, "no such attribute: {i}"),
            Error::ImKeyNotFound => write!(f, "key not found in index"),
            Error::ImNoMoreEntries => write!(f, "no more index entries"),
            Error::AttrCountMismatch { expected, got } => {
                write!(f, "expected {expected} attributes, got {got}")
            }
            Error::SchemaMismatch(msg) => write!(f, "schema mismatch: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
