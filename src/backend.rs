//! Backend selection and the per-backend dispatch unit.

use crate::elastic::ElasticRequest;
use crate::milvus::MilvusQuery;
use crate::mongo::MongoCommand;
use crate::redis::RedisCommand;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Elastic,
    Mongo,
    Redis,
    Milvus,
}

impl Backend {
    pub const ALL: [Backend; 4] = [Backend::Elastic, Backend::Mongo, Backend::Redis, Backend::Milvus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Elastic => "elastic",
            Backend::Mongo => "mongo",
            Backend::Redis => "redis",
            Backend::Milvus => "milvus",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend '{0}'")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elastic" | "elasticsearch" | "es" => Ok(Backend::Elastic),
            "mongo" | "mongodb" => Ok(Backend::Mongo),
            "redis" => Ok(Backend::Redis),
            "milvus" => Ok(Backend::Milvus),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

/// What a backend hands to its transport for one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DispatchUnit {
    Elastic(ElasticRequest),
    Mongo(MongoCommand),
    Redis(RedisCommand),
    Milvus(MilvusQuery),
}

impl DispatchUnit {
    pub fn backend(&self) -> Backend {
        match self {
            DispatchUnit::Elastic(_) => Backend::Elastic,
            DispatchUnit::Mongo(_) => Backend::Mongo,
            DispatchUnit::Redis(_) => Backend::Redis,
            DispatchUnit::Milvus(_) => Backend::Milvus,
        }
    }
}
