use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("Product '{product}' not found in API response")]
    ProductNotFound { product: String },
    #[error("Product '{product}' has no 'hasStock' field in API response")]
    StockFlagMissing { product: String },
    #[error("check aborted unexpectedly: {0}")]
    Aborted(String),
}

impl CheckError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::ProductNotFound { .. } => "product_not_found",
            Self::StockFlagMissing { .. } => "malformed_listing",
            Self::Aborted(_) => "internal",
        }
    }
}
