//! Data API client
//!
//! Wraps the HTTP transport with the protocol's session lifecycle and
//! endpoints. A session is scoped to one database and must not outlive
//! the operation that requested it; the server expires idle sessions
//! after roughly 15 minutes, which this client does not renew.

use super::types::{
    ApiEnvelope, DatabasesResponse, LayoutInfo, LayoutMetadataResponse, LayoutsResponse, Page,
    RecordsResponse, SessionResponse,
};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::query::FindRequest;
use crate::types::JsonObject;
use tracing::debug;

/// Path prefix of the Data API, versioned, below the server base URL
const API_PREFIX: &str = "fmi/data/v2";

/// Session-authenticated Data API client
pub struct DataApiClient {
    http: HttpClient,
    /// Bearer token of the currently open session, if any
    token: Option<String>,
    /// Database the open session is scoped to
    session_database: Option<String>,
}

impl DataApiClient {
    /// Create a client over a configured transport
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            token: None,
            session_database: None,
        }
    }

    /// Whether a session is currently open
    pub fn has_session(&self) -> bool {
        self.token.is_some()
    }

    /// Open a session scoped to `database`.
    ///
    /// Rejected credentials or database names surface as a user-facing
    /// [`Error::Auth`] carrying the server diagnostic text; this error must
    /// not be retried.
    pub async fn login(&mut self, database: &str, username: &str, password: &str) -> Result<()> {
        let path = format!("{API_PREFIX}/databases/{database}/sessions");
        let config = RequestConfig::new()
            .json(serde_json::json!({}))
            .basic_auth(username, password);

        let response = match self.http.post(&path, config).await {
            Ok(response) => response,
            Err(Error::Request { body, .. }) => return Err(Error::auth(body)),
            Err(other) => return Err(other),
        };

        let envelope: ApiEnvelope<SessionResponse> =
            response.json().await.map_err(Error::Http)?;
        debug!("Opened session for database {database}");
        self.token = Some(envelope.response.token);
        self.session_database = Some(database.to_string());
        Ok(())
    }

    /// Close the current session.
    ///
    /// Safe to call without an open session (no-op), so a guaranteed-release
    /// block can invoke it unconditionally.
    pub async fn logout(&mut self) -> Result<()> {
        let Some(token) = self.token.take() else {
            return Ok(());
        };
        let database = self.session_database.take().unwrap_or_default();

        let path = format!("{API_PREFIX}/databases/{database}/sessions/{token}");
        self.http.delete(&path, RequestConfig::new()).await?;
        debug!("Closed session for database {database}");
        Ok(())
    }

    /// One page of the unfiltered record listing
    pub async fn list_records(
        &self,
        database: &str,
        layout: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page> {
        let path = format!("{API_PREFIX}/databases/{database}/layouts/{layout}/records");
        let config = self
            .session_config()?
            .query("_offset", offset.to_string())
            .query("_limit", limit.to_string());

        let response = self.http.get(&path, config).await?;
        let envelope: ApiEnvelope<RecordsResponse> =
            response.json().await.map_err(Error::Http)?;
        Ok(envelope.response.into())
    }

    /// One page of a filtered find
    pub async fn find_records(
        &self,
        database: &str,
        layout: &str,
        request: &FindRequest,
    ) -> Result<Page> {
        let path = format!("{API_PREFIX}/databases/{database}/layouts/{layout}/_find");
        let config = self
            .session_config()?
            .json(serde_json::to_value(request)?);

        let response = self.http.post(&path, config).await?;
        let envelope: ApiEnvelope<RecordsResponse> =
            response.json().await.map_err(Error::Http)?;
        Ok(envelope.response.into())
    }

    /// List database names visible to the account (Basic auth, no session)
    pub async fn list_databases(&self, username: &str, password: &str) -> Result<Vec<String>> {
        let path = format!("{API_PREFIX}/databases");
        let config = RequestConfig::new().basic_auth(username, password);

        let response = self.http.get(&path, config).await?;
        let envelope: ApiEnvelope<DatabasesResponse> =
            response.json().await.map_err(Error::Http)?;
        Ok(envelope
            .response
            .databases
            .into_iter()
            .map(|d| d.name)
            .collect())
    }

    /// List layouts of a database, folders included
    pub async fn list_layouts(&self, database: &str) -> Result<Vec<LayoutInfo>> {
        let path = format!("{API_PREFIX}/databases/{database}/layouts");
        let response = self.http.get(&path, self.session_config()?).await?;
        let envelope: ApiEnvelope<LayoutsResponse> =
            response.json().await.map_err(Error::Http)?;
        Ok(envelope.response.layouts)
    }

    /// Field metadata of one layout
    pub async fn layout_metadata(&self, database: &str, layout: &str) -> Result<Vec<JsonObject>> {
        let path = format!("{API_PREFIX}/databases/{database}/layouts/{layout}");
        let response = self.http.get(&path, self.session_config()?).await?;
        let envelope: ApiEnvelope<LayoutMetadataResponse> =
            response.json().await.map_err(Error::Http)?;
        Ok(envelope.response.field_meta_data)
    }

    /// Request config carrying the open session's bearer token
    fn session_config(&self) -> Result<RequestConfig> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| Error::state("no open session"))?;
        Ok(RequestConfig::new().bearer(token))
    }
}

impl std::fmt::Debug for DataApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataApiClient")
            .field("has_session", &self.token.is_some())
            .field("session_database", &self.session_database)
            .finish_non_exhaustive()
    }
}
