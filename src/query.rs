//! Query processing against a built index.

pub mod builder;

pub use builder::{
    MultithreadedQueryResultBuilder, QueryResultBuilder, QueryResults, SingleQueryResultBuilder,
    query_key,
};
