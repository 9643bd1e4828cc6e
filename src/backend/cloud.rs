//! Document-cloud backend.
//!
//! Documents are addressed by collection name and record id:
//! `GET {base}/{collection}` lists (ordered server-side), `PUT
//! {base}/{collection}/{id}` replaces the full document, `DELETE` removes
//! it. Provider errors map onto the shared remote error kinds; a missing
//! document on delete still counts as success so deletes stay idempotent.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::ser::Serialize;

use crate::backend::{
    Backend, ClientStore, Collection, ContactStore, ProfileStore, sort_clients_newest_first,
    sort_contacts_by_name,
};
use crate::error::{RemoteError, RemoteReadError, RemoteWriteError};
use crate::model::{ClientRecord, ContactRecord, StudioProfile};

/// Document id of the studio profile singleton.
const PROFILE_DOC_ID: &str = "studio_profile";

pub struct CloudBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

fn collection_url(base: &str, collection: Collection) -> String {
    format!("{}/{}", base.trim_end_matches('/'), collection.as_str())
}

fn document_url(base: &str, collection: Collection, id: &str) -> String {
    format!("{}/{}", collection_url(base, collection), id)
}

fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(RemoteError::Status {
            status: response.status().as_u16(),
        })
    }
}

impl CloudBackend {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn list_documents<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .authorized(self.http.get(collection_url(&self.base_url, collection)))
            .send()
            .await
            .map_err(|err| RemoteError::Unreachable(err.to_string()))?;
        ensure_success(response)?
            .json()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))
    }

    async fn put_document<T: Serialize + Sync>(
        &self,
        collection: Collection,
        id: &str,
        document: &T,
    ) -> Result<(), RemoteError> {
        let response = self
            .authorized(self.http.put(document_url(&self.base_url, collection, id)))
            .json(document)
            .send()
            .await
            .map_err(|err| RemoteError::Unreachable(err.to_string()))?;
        ensure_success(response).map(|_| ())
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        let response = self
            .authorized(
                self.http
                    .delete(document_url(&self.base_url, collection, id)),
            )
            .send()
            .await
            .map_err(|err| RemoteError::Unreachable(err.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(response).map(|_| ())
    }
}

#[async_trait::async_trait]
impl ClientStore for CloudBackend {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteReadError> {
        let mut records = self.list_documents(Collection::Clients).await?;
        sort_clients_newest_first(&mut records);
        Ok(records)
    }

    async fn upsert_client(&self, record: &ClientRecord) -> Result<(), RemoteWriteError> {
        Ok(self
            .put_document(Collection::Clients, &record.id, record)
            .await?)
    }

    async fn remove_client(&self, id: &str) -> Result<(), RemoteWriteError> {
        Ok(self.delete_document(Collection::Clients, id).await?)
    }
}

#[async_trait::async_trait]
impl ContactStore for CloudBackend {
    async fn list_contacts(&self) -> Result<Vec<ContactRecord>, RemoteReadError> {
        let mut records = self.list_documents(Collection::Contacts).await?;
        sort_contacts_by_name(&mut records);
        Ok(records)
    }

    async fn upsert_contact(&self, record: &ContactRecord) -> Result<(), RemoteWriteError> {
        Ok(self
            .put_document(Collection::Contacts, &record.id, record)
            .await?)
    }

    async fn remove_contact(&self, id: &str) -> Result<(), RemoteWriteError> {
        Ok(self.delete_document(Collection::Contacts, id).await?)
    }
}

#[async_trait::async_trait]
impl ProfileStore for CloudBackend {
    async fn fetch_profile(&self) -> Result<Option<StudioProfile>, RemoteReadError> {
        let response = self
            .authorized(self.http.get(document_url(
                &self.base_url,
                Collection::Settings,
                PROFILE_DOC_ID,
            )))
            .send()
            .await
            .map_err(|err| RemoteReadError::from(RemoteError::Unreachable(err.to_string())))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let profile = ensure_success(response)
            .map_err(RemoteReadError::from)?
            .json()
            .await
            .map_err(|err| RemoteReadError::from(RemoteError::Malformed(err.to_string())))?;
        Ok(Some(profile))
    }

    async fn save_profile(&self, profile: &StudioProfile) -> Result<(), RemoteWriteError> {
        Ok(self
            .put_document(Collection::Settings, PROFILE_DOC_ID, profile)
            .await?)
    }
}

impl Backend for CloudBackend {
    fn label(&self) -> &'static str {
        "document_cloud"
    }
}
