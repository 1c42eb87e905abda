use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    DeleteAccountInput, DeleteShiftInput, LocationOptions, LocationsLastUpdated, NewAccount, Offer,
    OfferedShiftRefs, PickupShiftInput, PickupShiftResponse, RespondToOfferInput,
    RespondToOfferResult, SaveShiftResponse, Shift, UserRef,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text suitable for an alert body.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } => message.clone(),
            ClientError::Http(_) => "Check your connection and try again.".to_string(),
            ClientError::Decode(_) => "The server sent a response we could not read.".to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Status { status, .. } if *status == StatusCode::CONFLICT.as_u16())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Backend calls the client core depends on.
#[async_trait]
pub trait ShiftApi: Send + Sync {
    async fn create_account(&self, account: &NewAccount) -> ClientResult<UserRef>;
    async fn delete_account(&self, user_id: &str) -> ClientResult<()>;

    async fn save_shift(&self, shift: &Shift) -> ClientResult<Uuid>;
    async fn edit_shift(&self, shift: &Shift) -> ClientResult<()>;
    async fn delete_shift(&self, shift_id: Uuid) -> ClientResult<()>;
    async fn pickup_shift(&self, input: &PickupShiftInput) -> ClientResult<Uuid>;
    async fn respond_to_offer(&self, input: &RespondToOfferInput) -> ClientResult<RespondToOfferResult>;

    async fn shift(&self, id: Uuid) -> ClientResult<Shift>;
    async fn my_shifts(&self) -> ClientResult<Vec<Shift>>;
    async fn pickable_shifts(&self) -> ClientResult<Vec<Shift>>;
    async fn offered_refs(&self, uid: &str) -> ClientResult<Vec<Uuid>>;
    async fn offer(&self, id: Uuid) -> ClientResult<Offer>;
    async fn offers_for_shift(&self, shift_id: Uuid) -> ClientResult<Vec<Offer>>;
    async fn user(&self, uid: &str) -> ClientResult<UserRef>;

    async fn locations(&self) -> ClientResult<LocationOptions>;
    async fn locations_last_updated(&self) -> ClientResult<DateTime<Utc>>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// `ShiftApi` over HTTP against the shift-radar service.
#[derive(Clone)]
pub struct HttpShiftApi {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpShiftApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn rpc<B, R>(&self, name: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/rpc/{}", self.base_url, name))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<R: DeserializeOwned>(response: Response) -> ClientResult<R> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .map(|body| body.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl ShiftApi for HttpShiftApi {
    async fn create_account(&self, account: &NewAccount) -> ClientResult<UserRef> {
        self.rpc("createAccount", account).await
    }

    async fn delete_account(&self, user_id: &str) -> ClientResult<()> {
        let input = DeleteAccountInput {
            user_id: user_id.to_string(),
        };
        let _: serde_json::Value = self.rpc("deleteAccount", &input).await?;
        Ok(())
    }

    async fn save_shift(&self, shift: &Shift) -> ClientResult<Uuid> {
        let response: SaveShiftResponse = self.rpc("saveShift", shift).await?;
        Ok(response.shift_id)
    }

    async fn edit_shift(&self, shift: &Shift) -> ClientResult<()> {
        let _: serde_json::Value = self.rpc("editShift", shift).await?;
        Ok(())
    }

    async fn delete_shift(&self, shift_id: Uuid) -> ClientResult<()> {
        let _: serde_json::Value = self.rpc("deleteShift", &DeleteShiftInput { shift_id }).await?;
        Ok(())
    }

    async fn pickup_shift(&self, input: &PickupShiftInput) -> ClientResult<Uuid> {
        let response: PickupShiftResponse = self.rpc("pickupShift", input).await?;
        Ok(response.offer_id)
    }

    async fn respond_to_offer(&self, input: &RespondToOfferInput) -> ClientResult<RespondToOfferResult> {
        self.rpc("respondToOffer", input).await
    }

    async fn shift(&self, id: Uuid) -> ClientResult<Shift> {
        self.get(&format!("/api/shifts/{}", id)).await
    }

    async fn my_shifts(&self) -> ClientResult<Vec<Shift>> {
        self.get("/api/shifts/mine").await
    }

    async fn pickable_shifts(&self) -> ClientResult<Vec<Shift>> {
        self.get("/api/shifts/pickable").await
    }

    async fn offered_refs(&self, uid: &str) -> ClientResult<Vec<Uuid>> {
        let refs: OfferedShiftRefs = self.get(&format!("/api/users/{}/shifts/offered", uid)).await?;
        Ok(refs.refs)
    }

    async fn offer(&self, id: Uuid) -> ClientResult<Offer> {
        self.get(&format!("/api/offers/{}", id)).await
    }

    async fn offers_for_shift(&self, shift_id: Uuid) -> ClientResult<Vec<Offer>> {
        self.get(&format!("/api/shifts/{}/offers", shift_id)).await
    }

    async fn user(&self, uid: &str) -> ClientResult<UserRef> {
        self.get(&format!("/api/users/{}", uid)).await
    }

    async fn locations(&self) -> ClientResult<LocationOptions> {
        self.get("/api/locations").await
    }

    async fn locations_last_updated(&self) -> ClientResult<DateTime<Utc>> {
        let response: LocationsLastUpdated = self.get("/api/locations/last-updated").await?;
        Ok(response.last_updated)
    }
}
