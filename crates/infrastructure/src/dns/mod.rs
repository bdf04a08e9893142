pub mod cache;
pub mod codec;
pub mod dispatcher;
pub mod resolver;
pub mod transport;

pub use cache::MemoryCache;
pub use dispatcher::TransportDispatcher;
pub use resolver::ResolverBuilder;
