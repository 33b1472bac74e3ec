use thiserror::Error;

use themecheck_catalog::CatalogError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
