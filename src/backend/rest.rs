//! Relational backend: JSON over HTTP.
//!
//! The remote side is a single endpoint in front of a SQL database. The
//! `type` query parameter selects the collection; GET lists, POST
//! insert-or-replaces by the body's `id` field, DELETE removes by the `id`
//! query parameter. Write responses are `{"status": ..., "message": ...}`.

use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::ser::Serialize;

use crate::backend::{
    Backend, ClientStore, Collection, ContactStore, ProfileStore, sort_clients_newest_first,
    sort_contacts_by_name,
};
use crate::error::{RemoteError, RemoteReadError, RemoteWriteError};
use crate::model::{ClientRecord, ContactRecord, StudioProfile};

pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct WriteAck {
    status: String,
    #[serde(default)]
    message: String,
}

/// Interpret a write response body. The backend acks every applied write
/// with `status: "success"`; anything else is a provider-side refusal.
fn parse_ack(body: &str) -> Result<(), RemoteError> {
    let ack: WriteAck =
        serde_json::from_str(body).map_err(|err| RemoteError::Malformed(err.to_string()))?;
    if ack.status == "success" {
        Ok(())
    } else {
        Err(RemoteError::Provider(ack.message))
    }
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

impl RestBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("type", collection.as_str())])
            .send()
            .await
            .map_err(|err| RemoteError::Unreachable(err.to_string()))?;
        let body = ensure_success(response)?
            .text()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;
        serde_json::from_str(&body).map_err(|err| RemoteError::Malformed(err.to_string()))
    }

    async fn post_record<T: Serialize + Sync>(
        &self,
        collection: Collection,
        record: &T,
    ) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(&self.base_url)
            .query(&[("type", collection.as_str())])
            .json(record)
            .send()
            .await
            .map_err(|err| RemoteError::Unreachable(err.to_string()))?;
        let body = ensure_success(response)?
            .text()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;
        parse_ack(&body)
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .delete(&self.base_url)
            .query(&[("type", collection.as_str()), ("id", id)])
            .send()
            .await
            .map_err(|err| RemoteError::Unreachable(err.to_string()))?;
        let body = ensure_success(response)?
            .text()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;
        parse_ack(&body)
    }
}

#[async_trait::async_trait]
impl ClientStore for RestBackend {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteReadError> {
        let mut records = self.get_list(Collection::Clients).await?;
        sort_clients_newest_first(&mut records);
        Ok(records)
    }

    async fn upsert_client(&self, record: &ClientRecord) -> Result<(), RemoteWriteError> {
        Ok(self.post_record(Collection::Clients, record).await?)
    }

    async fn remove_client(&self, id: &str) -> Result<(), RemoteWriteError> {
        Ok(self.delete_by_id(Collection::Clients, id).await?)
    }
}

#[async_trait::async_trait]
impl ContactStore for RestBackend {
    async fn list_contacts(&self) -> Result<Vec<ContactRecord>, RemoteReadError> {
        let mut records = self.get_list(Collection::Contacts).await?;
        sort_contacts_by_name(&mut records);
        Ok(records)
    }

    async fn upsert_contact(&self, record: &ContactRecord) -> Result<(), RemoteWriteError> {
        Ok(self.post_record(Collection::Contacts, record).await?)
    }

    async fn remove_contact(&self, id: &str) -> Result<(), RemoteWriteError> {
        Ok(self.delete_by_id(Collection::Contacts, id).await?)
    }
}

#[async_trait::async_trait]
impl ProfileStore for RestBackend {
    async fn fetch_profile(&self) -> Result<Option<StudioProfile>, RemoteReadError> {
        // The settings collection is a one-row table; take the first entry.
        let rows: Vec<StudioProfile> = self.get_list(Collection::Settings).await?;
        Ok(rows.into_iter().next())
    }

    async fn save_profile(&self, profile: &StudioProfile) -> Result<(), RemoteWriteError> {
        Ok(self.post_record(Collection::Settings, profile).await?)
    }
}

impl Backend for RestBackend {
    fn label(&self) -> &'static str {
        "relational"
    }
}

#[cfg(test)]
mod tests {
    use super::parse_ack;
    use crate::error::RemoteError;

    #[test]
    fn ack_with_success_status_is_ok() {
        parse_ack(r#"{"status":"success","message":"Client saved successfully"}"#)
            .expect("success ack");
        parse_ack(r#"{"status":"success"}"#).expect("message is optional");
    }

    #[test]
    fn ack_with_error_status_surfaces_the_message() {
        let err = parse_ack(r#"{"status":"error","message":"No data provided"}"#)
            .expect_err("error ack");
        let RemoteError::Provider(message) = err else {
            panic!("expected Provider");
        };
        assert_eq!(message, "No data provided");
    }

    #[test]
    fn unparseable_ack_is_malformed() {
        let err = parse_ack("<html>502 Bad Gateway</html>").expect_err("not json");
        assert!(matches!(err, RemoteError::Malformed(_)));
    }
}
