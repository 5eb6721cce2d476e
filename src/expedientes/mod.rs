//! Expediente (case file) view-model
//!
//! Patient lookup plus case-file CRUD against the backend. Reconciliation of
//! the in-memory list is split into pure `apply_*` transitions; the async
//! adapters call them only after the server confirms, so a failed mutation
//! leaves the loaded record untouched.

use thiserror::Error;

use crate::api::dto::ExpedientePayload;
use crate::api::{ApiClient, ApiError};
use crate::models::{Expediente, Patient};

/// Minimum control-number length before a lookup is issued
pub const MIN_CONTROL_LEN: usize = 8;

/// Errors surfaced by expediente operations
#[derive(Debug, Error)]
pub enum ExpedienteError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Por favor ingrese un número de control")]
    MissingControlNumber,

    #[error("Ingrese un número de control de al menos {MIN_CONTROL_LEN} dígitos")]
    ControlNumberTooShort,

    #[error("El número de sesiones debe ser un entero positivo")]
    InvalidSessionCount,
}

/// Form input for a new case file
#[derive(Debug, Clone, Default)]
pub struct ExpedienteDraft {
    pub no_control: String,
    pub motivo_consulta: String,
    pub desencadenantes_motivo: String,
    pub plan_orientacion: String,
    pub seguimiento: String,
    pub numero_sesiones: u32,
}

impl ExpedienteDraft {
    fn validate(&self) -> Result<ExpedientePayload, ExpedienteError> {
        check_control_number(&self.no_control)?;
        if self.numero_sesiones == 0 {
            return Err(ExpedienteError::InvalidSessionCount);
        }

        Ok(ExpedientePayload {
            no_control: self.no_control.trim().to_string(),
            motivo_consulta: self.motivo_consulta.clone(),
            desencadenantes_motivo: self.desencadenantes_motivo.clone(),
            plan_orientacion: self.plan_orientacion.clone(),
            seguimiento: self.seguimiento.clone(),
            numero_sesiones: self.numero_sesiones,
        })
    }
}

fn check_control_number(no_control: &str) -> Result<(), ExpedienteError> {
    let trimmed = no_control.trim();
    if trimmed.is_empty() {
        return Err(ExpedienteError::MissingControlNumber);
    }
    if trimmed.len() < MIN_CONTROL_LEN {
        return Err(ExpedienteError::ControlNumberTooShort);
    }
    Ok(())
}

/// Pure expediente-screen state: the currently loaded patient, if any
#[derive(Debug, Clone, Default)]
pub struct ExpedientesState {
    pub patient: Option<Patient>,
}

impl ExpedientesState {
    /// Drop the loaded record (the form clears stale pre-fills when the
    /// control number changes)
    pub fn clear(&mut self) {
        self.patient = None;
    }

    /// Replace the matching case file after a server-confirmed update
    pub fn apply_updated(&mut self, updated: Expediente) {
        if let Some(patient) = &mut self.patient {
            if let Some(existing) = patient.expedientes.iter_mut().find(|e| e.id == updated.id) {
                *existing = updated;
            }
        }
    }

    /// Remove the case file after a server-confirmed delete
    pub fn apply_deleted(&mut self, id: i64) {
        if let Some(patient) = &mut self.patient {
            patient.expedientes.retain(|e| e.id != id);
        }
    }
}

/// Async adapter between the expediente state and the backend
pub struct ExpedientesManager {
    api: ApiClient,
    pub state: ExpedientesState,
}

impl ExpedientesManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: ExpedientesState::default(),
        }
    }

    /// Fetch a patient and its case files wholesale, replacing the current
    /// result; no caching across lookups
    pub async fn lookup(&mut self, no_control: &str) -> Result<&Patient, ExpedienteError> {
        check_control_number(no_control)?;

        self.state.clear();
        let patient = self
            .api
            .patient_with_expedientes(no_control.trim())
            .await
            .inspect_err(|e| {
                tracing::error!("Error al cargar los datos del usuario: {}", e);
            })?;

        tracing::debug!(
            no_control = patient.no_control,
            expedientes = patient.expedientes.len(),
            "Expedientes cargados"
        );
        Ok(self.state.patient.insert(patient))
    }

    /// Create a case file; it appears on the next lookup
    pub async fn create(&mut self, draft: &ExpedienteDraft) -> Result<(), ExpedienteError> {
        let payload = draft.validate()?;
        self.api.create_expediente(&payload).await?;
        tracing::info!(no_control = %payload.no_control, "Expediente creado");
        Ok(())
    }

    /// Update a case file; on success the matching list item is replaced
    /// with the server's record
    pub async fn update(
        &mut self,
        id: i64,
        edited: &Expediente,
    ) -> Result<Expediente, ExpedienteError> {
        let updated = self.api.update_expediente(id, edited).await?;
        self.state.apply_updated(updated.clone());
        tracing::info!(id, "Expediente actualizado");
        Ok(updated)
    }

    /// Delete a case file; confirmation happens in the presentation layer
    pub async fn delete(&mut self, id: i64) -> Result<(), ExpedienteError> {
        self.api.delete_expediente(id).await?;
        self.state.apply_deleted(id);
        tracing::info!(id, "Expediente eliminado");
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

    fn expediente(id: i64, motivo: &str) -> Expediente {
        Expediente {
            id,
            motivo_consulta: motivo.to_string(),
            numero_sesiones: 4,
            plan_orientacion: "Terapia breve".to_string(),
            seguimiento: "Quincenal".to_string(),
            desencadenantes_motivo: "Exámenes".to_string(),
        }
    }

    fn loaded_state() -> ExpedientesState {
        ExpedientesState {
            patient: Some(Patient {
                no_control: 20210001,
                nombre: "Ana".to_string(),
                apellido: None,
                edad: None,
                sexo: None,
                estado_civil: None,
                direccion: None,
                telefono: None,
                ingenieria: None,
                modalidad: None,
                semestre: None,
                fecha_registro: None,
                expedientes: vec![expediente(1, "Ansiedad"), expediente(2, "Estrés")],
            }),
        }
    }

    async fn manager_for(server: &MockServer) -> ExpedientesManager {
        ExpedientesManager::new(
            ApiClient::new(&BackendConfig {
                base_url: server.uri(),
                ..BackendConfig::default()
            })
            .with_token("tok"),
        )
    }

    #[test]
    fn test_apply_updated_replaces_matching_item() {
        let mut state = loaded_state();
        state.apply_updated(expediente(2, "Estrés académico"));

        let patient = state.patient.unwrap();
        assert_eq!(patient.expedientes.len(), 2);
        assert_eq!(patient.expedientes[1].motivo_consulta, "Estrés académico");
    }

    #[test]
    fn test_apply_deleted_removes_by_id() {
        let mut state = loaded_state();
        state.apply_deleted(1);

        let patient = state.patient.unwrap();
        assert_eq!(patient.expedientes.len(), 1);
        assert_eq!(patient.expedientes[0].id, 2);
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = ExpedienteDraft {
            no_control: "20210001".to_string(),
            numero_sesiones: 1,
            ..ExpedienteDraft::default()
        };
        assert!(draft.validate().is_ok());

        draft.numero_sesiones = 0;
        assert!(matches!(
            draft.validate(),
            Err(ExpedienteError::InvalidSessionCount)
        ));

        draft.numero_sesiones = 1;
        draft.no_control = "2021".to_string();
        assert!(matches!(
            draft.validate(),
            Err(ExpedienteError::ControlNumberTooShort)
        ));

        draft.no_control = "  ".to_string();
        assert!(matches!(
            draft.validate(),
            Err(ExpedienteError::MissingControlNumber)
        ));
    }

    #[tokio::test]
    async fn test_lookup_round_trips_control_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/expediente/expedientes/20210001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "usuario": { "no_control": 20210001, "nombre": "Ana" },
                "expedientes": []
            })))
            .mount(&server)
            .await;

        let mut manager = manager_for(&server).await;
        let patient = manager.lookup("20210001").await.unwrap();
        assert_eq!(patient.no_control.to_string(), "20210001");
    }

    #[tokio::test]
    async fn test_short_control_number_never_issues_a_request() {
        let server = MockServer::start().await;
        let mut manager = manager_for(&server).await;

        let err = manager.lookup("2021").await.unwrap_err();
        assert!(matches!(err, ExpedienteError::ControlNumberTooShort));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_clears_previous_result_before_fetching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/expediente/expedientes/20219999"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Usuario no encontrado"))
            .mount(&server)
            .await;

        let mut manager = manager_for(&server).await;
        manager.state = loaded_state();

        assert!(manager.lookup("20219999").await.is_err());
        // Stale pre-fills from the previous patient are gone
        assert!(manager.state.patient.is_none());
    }

    #[tokio::test]
    async fn test_delete_reconciles_after_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/expediente/expedienteDelete/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let mut manager = manager_for(&server).await;
        manager.state = loaded_state();

        manager.delete(1).await.unwrap();
        assert_eq!(manager.state.patient.as_ref().unwrap().expedientes.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/expediente/expedienteDelete/1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut manager = manager_for(&server).await;
        manager.state = loaded_state();

        assert!(manager.delete(1).await.is_err());
        assert_eq!(manager.state.patient.as_ref().unwrap().expedientes.len(), 2);
    }
}
