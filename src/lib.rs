pub mod backend;
pub mod bridge;
pub mod cache;
pub mod config;
pub mod elastic;
pub mod milvus;
pub mod mongo;
pub mod redis;

pub use backend::{Backend, DispatchUnit};
pub use bridge::Bridge;
pub use cache::{CacheStats, ParseCache};
pub use config::Config;
pub use elastic::{ElasticGrammar, ElasticRequest};
pub use milvus::{MilvusGrammar, MilvusQuery};
pub use mongo::{MongoCommand, MongoGrammar};
pub use redis::{RedisCommand, RedisGrammar};

pub use cmdbridge_core::{BridgeError, BridgeResult, Grammar, Inventory, ParseResult};
