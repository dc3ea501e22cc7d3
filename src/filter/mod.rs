pub mod company;
pub mod error;
pub mod job;
pub mod types;

pub use company::CompanyFilter;
pub use error::FilterError;
pub use job::JobFilter;
pub use types::{Predicate, QueryPairs, SearchFilter};
