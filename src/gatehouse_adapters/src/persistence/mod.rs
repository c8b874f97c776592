mod in_memory_blob_store;
mod in_memory_session_cache;
mod in_memory_user_store;
mod postgres_user_store;
mod redis_session_cache;

pub use in_memory_blob_store::InMemoryBlobStore;
pub use in_memory_session_cache::InMemorySessionCache;
pub use in_memory_user_store::InMemoryUserStore;
pub use postgres_user_store::PostgresUserStore;
pub use redis_session_cache::RedisSessionCache;
