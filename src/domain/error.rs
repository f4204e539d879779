#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("invalid {field}: '{value}' is not an integer")]
    InvalidInteger { field: &'static str, value: String },
}
