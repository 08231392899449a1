// Pure, synchronous stages over fully materialized collections

pub mod classify;
pub mod filter;
pub mod heat;
pub mod normalize;
