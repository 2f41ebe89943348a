use crate::{domain::TrophyRepository, errors::RepoError, models::{NewTrophy, Trophy}};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    types::{AttributeValue, ReturnValue},
    Client as DynamoDbClient,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{self, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DynamoDbTrophyRepository {
    client: DynamoDbClient,
    table_name: String, // Store the table name
}

impl DynamoDbTrophyRepository {
    /// Creates a new repository instance configured for a specific table.
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        info!(%table_name, "Initializing DynamoDbTrophyRepository");
        Self { client, table_name }
    }
}

#[async_trait]
impl TrophyRepository for DynamoDbTrophyRepository {
    /// Assigns id and creation timestamp, then stores the record with PutItem.
    async fn create(&self, new: NewTrophy) -> Result<Trophy, RepoError> {
        let trophy = Trophy {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            image_url: new.image_url,
            created_at: Utc::now(),
        };

        self.client
            .put_item()
            .table_name(&self.table_name) // Use stored table name
            .item("trophy_id", AttributeValue::S(trophy.id.to_string()))
            .item("name", AttributeValue::S(trophy.name.clone()))
            .item("description", AttributeValue::S(trophy.description.clone()))
            .item("image_url", AttributeValue::S(trophy.image_url.clone()))
            .item("created_at", AttributeValue::S(trophy.created_at.to_rfc3339()))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to put trophy (id: {})",
                self.table_name, trophy.id
            ))
            .map_err(RepoError::BackendError)?; // Map anyhow::Error -> RepoError

        Ok(trophy)
    }

    /// Lists all trophies using DynamoDB Scan, newest first. Handles pagination.
    async fn list_all(&self) -> Result<Vec<Trophy>, RepoError> {
        tracing::debug!("DynamoDB: Scanning table '{}' for all trophies", self.table_name);
        let mut trophies: Vec<Trophy> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request_builder = self.client.scan().table_name(&self.table_name); // Use stored table name

            // Apply ExclusiveStartKey if paginating from previous response
            if let Some(lek) = last_evaluated_key {
                request_builder = request_builder.set_exclusive_start_key(Some(lek));
            }

            let resp = request_builder
                .send()
                .await
                .context(format!("DynamoDB: Failed to scan table '{}'", self.table_name))
                .map_err(RepoError::BackendError)?;

            if let Some(items) = resp.items {
                for item in items {
                    match item_to_trophy(&item) {
                        Some(trophy) => trophies.push(trophy),
                        None => {
                            let item_id = item.get("trophy_id").and_then(|v| v.as_s().ok());
                            tracing::error!(item.id = ?item_id, table_name = %self.table_name, "DynamoDB: Failed to parse item from scan into Trophy");
                            // Fail fast if data in the table is corrupt
                            return Err(RepoError::DataCorruption(format!(
                                "DynamoDB: Failed to parse item {:?} during scan of table '{}'",
                                item_id, self.table_name
                            )));
                        }
                    }
                }
            }

            // Check for next page
            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break; // Exit loop if no more pages
            }
        }

        // Newest first
        trophies.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::info!("DynamoDB (table: {}): Successfully listed {} trophies", self.table_name, trophies.len());
        Ok(trophies)
    }

    /// Removes and returns an item using DeleteItem with ReturnValues=ALL_OLD.
    async fn delete_by_id(&self, id: Uuid) -> Result<Trophy, RepoError> {
        let id_str = id.to_string();
        tracing::debug!(trophy_id = %id_str, table_name = %self.table_name, "DynamoDB: Deleting item");

        let resp = self.client
            .delete_item()
            .table_name(&self.table_name) // Use stored table name
            .key("trophy_id", AttributeValue::S(id_str.clone()))
            // ALL_OLD hands back the removed item, which doubles as the existence check
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to delete trophy (id: {})",
                self.table_name, id_str
            ))
            .map_err(RepoError::BackendError)?;

        match resp.attributes {
            Some(item) => match item_to_trophy(&item) {
                Some(trophy) => {
                    tracing::debug!(trophy_id = %id_str, table_name = %self.table_name, "DynamoDB: Item deleted");
                    Ok(trophy)
                }
                None => {
                    tracing::error!(trophy_id = %id_str, table_name = %self.table_name, "DynamoDB: Deleted item but failed to parse it into a Trophy");
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse trophy data removed from DynamoDB table '{}' for id {}",
                        self.table_name, id_str
                    )))
                }
            },
            None => Err(RepoError::NotFound(id)),
        }
    }
}

// Helper function to convert DynamoDB item map to Trophy struct
// Remains internal to this module.
fn item_to_trophy(item: &HashMap<String, AttributeValue>) -> Option<Trophy> {
    // Use flat_map style for conciseness and early exit on None/Err
    let id = item
        .get("trophy_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let name = item.get("name")?.as_s().ok()?.to_string();
    let description = item.get("description")?.as_s().ok()?.to_string();
    let image_url = item.get("image_url")?.as_s().ok()?.to_string();
    let created_at = item
        .get("created_at")?
        .as_s()
        .ok()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
        .with_timezone(&Utc);

    Some(Trophy {
        id,
        name,
        description,
        image_url,
        created_at,
    })
}
