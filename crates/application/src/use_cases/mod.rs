pub mod resolve;

pub use resolve::{Resolution, Resolver, ResolverSettings};
