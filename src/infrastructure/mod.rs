pub mod catalog;
#[cfg(test)]
pub(crate) mod memory;
pub mod models;
pub mod order_repo;
pub mod promotion_repo;

pub use catalog::DieselCatalog;
pub use order_repo::DieselOrderRepository;
pub use promotion_repo::DieselPromotionRepository;

use diesel::result::DatabaseErrorKind;

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                DomainError::StorageUnavailable(info.message().to_string())
            }
            other => DomainError::Storage(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::StorageUnavailable(e.to_string())
    }
}
