/*
 * Responsibility
 * - Public interface of the middlewares (apply functions)
 */
pub mod admin_auth;
pub mod security_headers;

pub use security_headers::CspNonce;
