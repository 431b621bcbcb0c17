/// Read-through caching for provider calls.
///
/// Returns the value stored under `$key` when present. Otherwise awaits
/// `$block`, queues the result for storage with a TTL of `$ttl` seconds and
/// returns it. Errors from the block are propagated and never cached.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Trending, LIST_CACHE_TTL, async move {
///     self.fetch_trending().await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get_from_cache(&key).await? {
            Ok(cached)
        } else {
            tracing::debug!(key = %key, "Cache miss");
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
