// src/infrastructure/graphql.rs
use crate::application::{CreateNoteInput, NoteApi};
use crate::domain::{AuthSession, DomainError, NoteId, NoteRecord};
use crate::infrastructure::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

const LIST_NOTES: &str = "query ListNotes {
  listNotes {
    items {
      id
      name
      description
      image
    }
  }
}";

const CREATE_NOTE: &str = "mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) {
    id
    name
    description
    image
  }
}";

const DELETE_NOTE: &str = "mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) {
    id
  }
}";

/// Error type the managed GraphQL service reports for rejected credentials.
const UNAUTHORIZED_ERROR_TYPE: &str = "Unauthorized";

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListNotesData {
    list_notes: NoteConnection,
}

#[derive(Debug, Deserialize)]
struct NoteConnection {
    items: Vec<Option<NoteRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteData {
    create_note: NoteRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteNoteData {
    delete_note: Option<DeletedNote>,
}

#[derive(Debug, Deserialize)]
struct DeletedNote {
    id: NoteId,
}

#[derive(Debug, Serialize)]
struct CreateNoteVariables<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

/// [`NoteApi`] over the managed GraphQL endpoint.
pub struct GraphQlNoteApi {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    access_token: String,
}

impl GraphQlNoteApi {
    pub fn new(config: &ApiConfig, identity: &AuthSession) -> Result<Self, DomainError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            DomainError::RecordStore(format!("Invalid API endpoint '{}': {}", config.endpoint, e))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::RecordStore(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
            access_token: identity.access_token.clone(),
        })
    }

    #[instrument(level = "debug", skip(self, query, variables))]
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, DomainError> {
        let body = json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        });

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", &self.access_token)
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            DomainError::RecordStore(format!("Failed to send GraphQL request: {}", e))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            DomainError::RecordStore(format!("Failed to read GraphQL response: {}", e))
        })?;
        trace!(%status, body = %text, "GraphQL response");

        check_status(status, &text)?;
        parse_response(&text)
    }
}

fn check_status(status: StatusCode, body: &str) -> Result<(), DomainError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DomainError::Auth(format!(
            "GraphQL request rejected with status {}",
            status
        ))),
        s if !s.is_success() => Err(DomainError::RecordStore(format!(
            "GraphQL request failed with status {}: {}",
            s, body
        ))),
        _ => Ok(()),
    }
}

fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T, DomainError> {
    let response: GraphQlResponse<T> = serde_json::from_str(text).map_err(|e| {
        DomainError::RecordStore(format!("Failed to parse GraphQL response: {}", e))
    })?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let unauthorized = errors
            .iter()
            .any(|e| e.error_type.as_deref() == Some(UNAUTHORIZED_ERROR_TYPE));
        let messages = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(if unauthorized {
            DomainError::Auth(messages)
        } else {
            DomainError::RecordStore(messages)
        });
    }

    response
        .data
        .ok_or_else(|| DomainError::RecordStore("GraphQL response has no data".to_string()))
}

#[async_trait]
impl NoteApi for GraphQlNoteApi {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, DomainError> {
        let data: ListNotesData = self.execute("ListNotes", LIST_NOTES, json!({})).await?;
        // Items the resolver could not load come back as null.
        let records: Vec<NoteRecord> = data.list_notes.items.into_iter().flatten().collect();
        debug!(count = records.len(), "Listed notes");
        Ok(records)
    }

    async fn create_note(&self, input: CreateNoteInput) -> Result<NoteRecord, DomainError> {
        let variables = json!({
            "input": CreateNoteVariables {
                name: &input.name,
                description: &input.description,
                image: input.image.as_deref(),
            }
        });
        let data: CreateNoteData = self.execute("CreateNote", CREATE_NOTE, variables).await?;
        Ok(data.create_note)
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), DomainError> {
        let variables = json!({ "input": { "id": id } });
        let data: DeleteNoteData = self.execute("DeleteNote", DELETE_NOTE, variables).await?;
        match data.delete_note {
            Some(deleted) => {
                debug!(note_id = %deleted.id, "Record deleted");
                Ok(())
            }
            None => Err(DomainError::NoteNotFound(id.clone())),
        }
    }
}
