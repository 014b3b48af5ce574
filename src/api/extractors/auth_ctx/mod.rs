/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Give handlers the request's authentication context (AuthCtx)
 * - axum glue lives in core, the type itself in types
 *
 * Public API:
 * - AuthCtx
 * - Authenticated
 */

mod core;
mod types;

pub use self::core::Authenticated;
pub use self::types::AuthCtx;
