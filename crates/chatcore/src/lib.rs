pub mod assemble;
pub mod errors;
pub mod hydrate;
pub mod models;
pub mod normalize;
pub mod protocol;
pub mod reconcile;
pub mod sanitize;
