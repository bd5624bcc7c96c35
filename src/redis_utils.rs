//! Miscellaneous Redis utilities and helper functions.

use redis::{aio::ConnectionLike, from_redis_value, FromRedisValue, Pipeline, RedisResult, Value};

/// Helper function for getting homogeneous results from Redis pipelines.
///
/// Used for e.g. querying the lengths of several lists in one round trip:
/// pipe.llen(key1)
///     .llen(key2)
///     .llen(key3)
///
/// let lengths: Vec<u64> = vec_from_redis_pipe(conn, pipe).await?;
pub async fn vec_from_redis_pipe<C: ConnectionLike, T: FromRedisValue>(
    conn: &mut C,
    pipe: &Pipeline,
) -> RedisResult<Vec<T>> {
    let values: Vec<Value> = pipe.query_async(conn).await?;
    let mut results = Vec::with_capacity(values.len());
    for v in values {
        results.push(from_redis_value::<T>(&v)?);
    }

    Ok(results)
}
