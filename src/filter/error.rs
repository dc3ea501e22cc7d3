use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid search criteria")]
    NoCriteria,

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("Search key '{0}' supplied more than once")]
    DuplicateKey(String),

    #[error("{min_key} cannot be greater than {max_key}")]
    InvertedRange {
        min_key: &'static str,
        max_key: &'static str,
    },
}
