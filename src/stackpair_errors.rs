use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Error, Debug)]
pub enum StackpairError {
    #[error("stack fetch for {id} gave up after {attempts} attempt(s): {source}")]
    FetchExhausted {
        id: String,
        attempts: u32,
        #[source]
        source: CatalogError,
    },

    #[error("group {group} has {count} acquisition(s); at least 2 are required to form pairs")]
    DegenerateInput { group: String, count: usize },

    #[error("invalid timestamp for acquisition {id}: {reason}")]
    TimestampParse { id: String, reason: String },
}
