//! Shared types for list and response handling.

mod pagination;
mod response;

pub use pagination::{
    Paginated, PaginatedAuditoria, PaginatedCajas, PaginatedLogins, PaginatedMovimientos,
    PaginatedVentas, PaginationMeta, PaginationParams,
};
pub use response::{Created, MessageResponse, NoContent};
