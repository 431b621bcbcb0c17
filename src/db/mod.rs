pub mod postgres;
pub mod redis;
pub mod user_store;

pub use postgres::create_pool;
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
pub use user_store::{PgUserStore, UserStore};
