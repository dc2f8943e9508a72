//! Backend-independent entry point.
//!
//! [`Bridge`] owns one grammar per backend plus the parse cache and routes
//! each call to the right grammar with a `match` on [`Backend`].

use crate::backend::{Backend, DispatchUnit};
use crate::cache::{CacheStats, ParseCache};
use crate::config::Config;
use crate::elastic::ElasticGrammar;
use crate::milvus::MilvusGrammar;
use crate::mongo::MongoGrammar;
use crate::redis::RedisGrammar;
use cmdbridge_core::{BridgeResult, ExtraArguments, Grammar, Inventory, ParseResult};
use serde_json::Value;
use std::sync::Arc;

pub struct Bridge {
    elastic: ElasticGrammar,
    mongo: MongoGrammar,
    redis: RedisGrammar,
    milvus: MilvusGrammar,
    cache: Option<ParseCache>,
    strict: bool,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    /// All backends with default settings and no parse cache.
    pub fn new() -> Self {
        Self {
            elastic: ElasticGrammar::new(),
            mongo: MongoGrammar::new(),
            redis: RedisGrammar::new(),
            milvus: MilvusGrammar::new(),
            cache: None,
            strict: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut mongo = MongoGrammar::new();
        if let Some(database) = &config.mongo.database {
            mongo = mongo.with_database(database.clone());
        }

        Self {
            elastic: ElasticGrammar::new().with_index_refresh(config.elastic.index_refresh),
            mongo,
            cache: (config.cache_size > 0).then(|| ParseCache::new(config.cache_size)),
            strict: config.strict_args,
            ..Self::new()
        }
    }

    pub fn with_cache(mut self, cache: ParseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Reject surplus arguments instead of ignoring them.
    pub fn with_strict_arguments(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn parse(&self, backend: Backend, text: &str) -> Arc<ParseResult> {
        match &self.cache {
            Some(cache) => cache.get_or_parse(backend, text, |text| self.parse_uncached(backend, text)),
            None => Arc::new(self.parse_uncached(backend, text)),
        }
    }

    fn parse_uncached(&self, backend: Backend, text: &str) -> ParseResult {
        match backend {
            Backend::Elastic => self.elastic.parse(text),
            Backend::Mongo => self.mongo.parse(text),
            Backend::Redis => self.redis.parse(text),
            Backend::Milvus => self.milvus.parse(text),
        }
    }

    pub fn inventory(&self, backend: Backend, result: &ParseResult) -> Inventory {
        match backend {
            Backend::Elastic => self.elastic.inventory(result),
            Backend::Mongo => self.mongo.inventory(result),
            Backend::Redis => self.redis.inventory(result),
            Backend::Milvus => self.milvus.inventory(result),
        }
    }

    pub fn materialize_and_emit(
        &self,
        backend: Backend,
        result: &ParseResult,
        args: &[Value],
    ) -> BridgeResult<Vec<DispatchUnit>> {
        match backend {
            Backend::Elastic => self.emit_with(&self.elastic, result, args, DispatchUnit::Elastic),
            Backend::Mongo => self.emit_with(&self.mongo, result, args, DispatchUnit::Mongo),
            Backend::Redis => self.emit_with(&self.redis, result, args, DispatchUnit::Redis),
            Backend::Milvus => self.emit_with(&self.milvus, result, args, DispatchUnit::Milvus),
        }
    }

    /// Parse (through the cache) and emit in one call.
    pub fn execute(&self, backend: Backend, text: &str, args: &[Value]) -> BridgeResult<Vec<DispatchUnit>> {
        let result = self.parse(backend, text);
        self.materialize_and_emit(backend, &result, args)
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ParseCache::stats)
    }

    fn emit_with<G: Grammar>(
        &self,
        grammar: &G,
        result: &ParseResult,
        args: &[Value],
        into_unit: fn(G::Unit) -> DispatchUnit,
    ) -> BridgeResult<Vec<DispatchUnit>> {
        let extra = if self.strict {
            ExtraArguments::Reject
        } else {
            grammar.extra_arguments()
        };
        let units = grammar.materialize_and_emit_with(result, args, extra)?;
        Ok(units.into_iter().map(into_unit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdbridge_core::{BindError, BridgeError};
    use serde_json::json;

    #[test]
    fn test_execute_routes_by_backend() {
        let bridge = Bridge::new();
        let units = bridge.execute(Backend::Redis, "SET k ?", &[json!(1)]).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].backend(), Backend::Redis);
    }

    #[test]
    fn test_strict_mode_rejects_surplus() {
        let bridge = Bridge::new().with_strict_arguments(true);
        let err = bridge
            .execute(Backend::Redis, "GET ?", &[json!("a"), json!("b")])
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Bind(BindError::ExtraArgument { expected: 1, supplied: 2 })
        ));

        let lenient = Bridge::new();
        assert!(lenient.execute(Backend::Redis, "GET ?", &[json!("a"), json!("b")]).is_ok());
    }

    #[test]
    fn test_cache_is_used() {
        let bridge = Bridge::new().with_cache(ParseCache::new(4));
        bridge.execute(Backend::Redis, "GET ?", &[json!("a")]).unwrap();
        bridge.execute(Backend::Redis, "GET ?", &[json!("b")]).unwrap();

        let stats = bridge.cache_stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            cache_size: 0,
            strict_args: true,
            ..Config::default()
        };
        let bridge = Bridge::from_config(&config);
        assert!(bridge.cache_stats().is_none());
        assert!(bridge.execute(Backend::Milvus, "SHOW COLLECTIONS", &[json!(1)]).is_err());
    }
}
