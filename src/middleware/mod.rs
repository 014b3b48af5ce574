/*
 * Responsibility
 * - Router-level layers: authorization filter, route policy, CORS, HTTP plumbing
 */
pub mod auth;
pub mod cors;
pub mod http;
