use crate::config::mongo_conf::MongoConfig;
use futures::stream::StreamExt;
use mongodb::{
    options::{ClientOptions, Credential, IndexOptions, ResolverConfig},
    Client, Collection, Cursor, Database, IndexModel,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument};

use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Opens one client for the whole process; every repository borrows collections from the returned database.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("LumeBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }
    let client = Client::with_options(client_options)?;
    info!("MongoDB client created");
    Ok(client.database(&config.database))
}

pub async fn ensure_unique_index<T>(collection: &Collection<T>, field: &str) -> RepositoryResult<()> {
    let mut keys = bson::Document::new();
    keys.insert(field, 1);
    let model = IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build();
    match collection.create_index(model, None).await {
        Ok(_) => {
            info!("Unique index on {}.{} ensured", collection.name(), field);
            Ok(())
        }
        Err(e) => {
            error!("Failed to create unique index on {}.{}: {}", collection.name(), field, e);
            Err(RepositoryError::database(format!("Failed to create index on {}: {}", field, e)))
        }
    }
}

/// Drains a cursor, failing on the first document that does not deserialize.
pub async fn collect<T>(mut cursor: Cursor<T>, what: &str) -> RepositoryResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut out = Vec::new();
    while let Some(doc) = cursor.next().await {
        match doc {
            Ok(d) => out.push(d),
            Err(e) => {
                error!("Failed to deserialize {}: {}", what, e);
                return Err(RepositoryError::serialization(format!("Failed to deserialize {}: {}", what, e)));
            }
        }
    }
    Ok(out)
}
