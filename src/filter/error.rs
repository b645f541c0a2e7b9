use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Filter '{0}' is not supported here")]
    UnsupportedField(&'static str),

    #[error("Invalid query parameters")]
    InvalidCombination,
}
