//! Expediente (case file) and patient-lookup endpoints

use super::dto::{ExpedientePayload, PatientEnvelope};
use super::{ApiClient, ApiError};
use crate::models::{Expediente, Patient};

impl ApiClient {
    /// Fetch a patient record and its case files in one request
    ///
    /// The control number comes from user input, so it is percent-encoded
    /// before landing in the path.
    pub async fn patient_with_expedientes(&self, no_control: &str) -> Result<Patient, ApiError> {
        let path = format!(
            "/api/expediente/expedientes/{}",
            urlencoding::encode(no_control)
        );

        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let envelope: PatientEnvelope = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let mut patient = envelope.usuario;
        patient.expedientes = envelope.expedientes;
        Ok(patient)
    }

    /// Create a case file for the patient named in the payload
    pub async fn create_expediente(&self, payload: &ExpedientePayload) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/expediente/expedientes"))
            .bearer_auth(self.bearer()?)
            .json(payload)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check(response).await?;
        Ok(())
    }

    /// Update a case file by id; returns the server's record
    pub async fn update_expediente(
        &self,
        id: i64,
        expediente: &Expediente,
    ) -> Result<Expediente, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/api/expediente/expedienteUpdate/{}", id)))
            .bearer_auth(self.bearer()?)
            .json(expediente)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Delete a case file by id
    pub async fn delete_expediente(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/expediente/expedienteDelete/{}", id)))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&BackendConfig {
            base_url: server.uri(),
            ..BackendConfig::default()
        })
        .with_token("tok")
    }

    #[tokio::test]
    async fn test_patient_lookup_round_trips_control_number() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/expediente/expedientes/20210001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "usuario": {
                    "no_control": 20210001,
                    "nombre": "Ana",
                    "apellido": "López",
                    "ingenieria": "Sistemas"
                },
                "expedientes": [
                    {
                        "id": 3,
                        "motivo_consulta": "Ansiedad",
                        "numero_sesiones": 4,
                        "plan_orientacion": "Terapia breve",
                        "seguimiento": "Quincenal",
                        "desencadenantes_motivo": "Exámenes"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let patient = client_for(&server)
            .patient_with_expedientes("20210001")
            .await
            .unwrap();

        assert_eq!(patient.no_control.to_string(), "20210001");
        assert_eq!(patient.expedientes.len(), 1);
        assert_eq!(patient.expedientes[0].motivo_consulta, "Ansiedad");
    }

    #[tokio::test]
    async fn test_patient_lookup_unknown_control_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/expediente/expedientes/99999999"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Usuario no encontrado"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .patient_with_expedientes("99999999")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Rejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_update_expediente_returns_server_record() {
        let server = MockServer::start().await;

        let updated = json!({
            "id": 3,
            "motivo_consulta": "Ansiedad académica",
            "numero_sesiones": 5,
            "plan_orientacion": "Terapia breve",
            "seguimiento": "Mensual",
            "desencadenantes_motivo": "Exámenes"
        });

        Mock::given(method("PUT"))
            .and(path("/api/expediente/expedienteUpdate/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .mount(&server)
            .await;

        let expediente = Expediente {
            id: 3,
            motivo_consulta: "Ansiedad académica".to_string(),
            numero_sesiones: 5,
            plan_orientacion: "Terapia breve".to_string(),
            seguimiento: "Mensual".to_string(),
            desencadenantes_motivo: "Exámenes".to_string(),
        };

        let result = client_for(&server)
            .update_expediente(3, &expediente)
            .await
            .unwrap();

        assert_eq!(result, expediente);
    }
}
