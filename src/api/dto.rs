//! Request/response shapes for the clinic backend
//!
//! The wire contract is externally defined; these types mirror it field for
//! field, Spanish names included.

use crate::models::{Appointment, Expediente, Patient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Identity payload from `getUserData` / `getAdminData`
///
/// The backend sometimes omits `no_control`; the original client warned and
/// carried on, so the field stays optional here.
#[derive(Debug, Deserialize)]
pub struct IdentityResponse {
    #[serde(default)]
    pub no_control: Option<i64>,
}

/// Outbound appointment payload for `createEvent` / `updateEvent`
///
/// The status travels under both of the backend's field names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventPayload {
    pub title: String,
    pub session_number: u32,
    pub start_time: String,
    pub end_time: String,
    pub no_control_user: Option<i64>,
    pub no_control_admin: Option<i64>,
    pub estatus: String,
    pub status: String,
}

impl EventPayload {
    /// Reconstruct the local list entry after the server confirms, under the
    /// given id (server-assigned on create, existing on update)
    pub fn into_appointment(self, id: i64) -> Appointment {
        Appointment {
            id,
            no_control_user: self.no_control_user,
            no_control_admin: self.no_control_admin,
            title: self.title,
            session_number: self.session_number,
            start_time: self.start_time,
            end_time: self.end_time,
            status: Some(self.status),
            estatus: Some(self.estatus),
            date: None,
        }
        .with_derived_date()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatedEvent {
    pub id: i64,
}

/// Outbound case-file payload for `expedientes` (create)
#[derive(Debug, Clone, Serialize)]
pub struct ExpedientePayload {
    pub no_control: String,
    pub motivo_consulta: String,
    pub desencadenantes_motivo: String,
    pub plan_orientacion: String,
    pub seguimiento: String,
    pub numero_sesiones: u32,
}

/// Envelope returned by the patient lookup endpoint
#[derive(Debug, Deserialize)]
pub struct PatientEnvelope {
    pub usuario: Patient,
    #[serde(default)]
    pub expedientes: Vec<Expediente>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_payload_into_appointment_derives_date() {
        let payload = EventPayload {
            title: "Sesión 2 - Virtual".to_string(),
            session_number: 2,
            start_time: "2026-09-03T10:00:00.000Z".to_string(),
            end_time: "2026-09-03T11:00:00.000Z".to_string(),
            no_control_user: Some(20210001),
            no_control_admin: None,
            estatus: "Pendiente".to_string(),
            status: "Pendiente".to_string(),
        };

        let appt = payload.into_appointment(42);
        assert_eq!(appt.id, 42);
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2026, 9, 3));
        assert_eq!(appt.status(), Some("Pendiente"));
    }

    #[test]
    fn test_login_response_without_token() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"success": false, "message": "Credenciales incorrectas"}"#)
                .unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Credenciales incorrectas"));
        assert!(response.token.is_none());
    }
}
