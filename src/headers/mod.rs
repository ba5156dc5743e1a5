/*
 * Responsibility
 * - Settings -> security header values (one compiler per header family)
 * - Memoize compiled values until settings change
 * - Attach them to responses, substituting the per-request CSP nonce
 */
pub mod assembler;
pub mod cache;
pub mod csp;
pub mod family;
pub mod features;
pub mod report;
pub mod simple;
pub mod value;

pub use assembler::HeaderAssembler;
pub use cache::HeaderCache;
pub use family::HeaderFamily;
pub use report::ReportEndpoints;
pub use value::SecurityHeader;
