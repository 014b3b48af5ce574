pub mod access;
pub mod policy;
