//! Agenda (appointment) endpoints

use super::dto::{CreatedEvent, EventPayload};
use super::{ApiClient, ApiError};
use crate::models::Appointment;

impl ApiClient {
    /// Fetch every appointment visible to the authenticated identity,
    /// annotated with its derived calendar date
    pub async fn list_events(&self) -> Result<Vec<Appointment>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/agenda/getAllEvents"))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let events: Vec<Appointment> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(events
            .into_iter()
            .map(Appointment::with_derived_date)
            .collect())
    }

    /// Create an appointment; returns the server-assigned id
    pub async fn create_event(&self, payload: &EventPayload) -> Result<i64, ApiError> {
        let response = self
            .client
            .post(self.url("/api/agenda/createEvent"))
            .bearer_auth(self.bearer()?)
            .json(payload)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let created: CreatedEvent = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(created.id)
    }

    /// Update an appointment by id
    pub async fn update_event(&self, id: i64, payload: &EventPayload) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/api/agenda/updateEvent/{}", id)))
            .bearer_auth(self.bearer()?)
            .json(payload)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check(response).await?;
        Ok(())
    }

    /// Delete an appointment by id
    pub async fn delete_event(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/agenda/deleteEvent/{}", id)))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check(response).await?;
        Ok(())
    }
}
