//! Appointment draft validation and payload construction
//!
//! Validation is a pure function from a draft and a role to either a
//! [`ValidatedDraft`] or a stable, user-facing error; no network is touched
//! until it passes. Payload construction is equally pure, so both sides are
//! unit-testable without I/O.

use chrono::{Duration, NaiveDate, NaiveTime};
use thiserror::Error;

use crate::api::dto::EventPayload;
use crate::models::{AppointmentStatus, Modality, Role};

/// First bookable start hour of the clinic's daily window
pub const FIRST_BOOKING_HOUR: u32 = 8;

/// Last bookable start hour, inclusive: a 16:00 start ends at 17:00
pub const LAST_BOOKING_HOUR: u32 = 16;

/// The fixed hourly slot list offered by the scheduling form
pub fn available_hours() -> Vec<String> {
    (FIRST_BOOKING_HOUR..=LAST_BOOKING_HOUR)
        .map(|h| format!("{:02}:00", h))
        .collect()
}

/// Form input for creating or editing an appointment
#[derive(Debug, Clone, Default)]
pub struct AppointmentDraft {
    pub modality: Option<Modality>,
    pub session_number: Option<u32>,
    /// Wall-clock start, `HH:MM`
    pub time: String,
    pub status: Option<AppointmentStatus>,
}

/// Validation failures; messages match the alerts the form shows
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Selecciona una modalidad")]
    MissingModality,

    #[error("El número de sesión debe ser un entero positivo")]
    InvalidSessionNumber,

    #[error("Formato de hora inválido. Usa HH:mm")]
    InvalidTimeFormat,

    #[error("La hora debe estar entre 08:00 y 16:00")]
    HourOutOfRange,

    #[error("Selecciona un estatus")]
    MissingStatus,
}

/// A draft that passed validation for a given role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub modality: Modality,
    pub session_number: u32,
    pub hour: u32,
    pub minute: u32,
    pub status: AppointmentStatus,
}

impl AppointmentDraft {
    /// Validate the draft for the given role
    ///
    /// Admins must pick a status; user bookings always go out as
    /// `Pendiente`, whatever the draft says.
    pub fn validate(&self, role: Role) -> Result<ValidatedDraft, DraftError> {
        let modality = self.modality.ok_or(DraftError::MissingModality)?;

        let session_number = match self.session_number {
            Some(n) if n > 0 => n,
            _ => return Err(DraftError::InvalidSessionNumber),
        };

        let (hour, minute) = parse_clock(&self.time)?;
        if !(FIRST_BOOKING_HOUR..=LAST_BOOKING_HOUR).contains(&hour) {
            return Err(DraftError::HourOutOfRange);
        }

        let status = match role {
            Role::Admin => self.status.ok_or(DraftError::MissingStatus)?,
            Role::User => AppointmentStatus::Pendiente,
        };

        Ok(ValidatedDraft {
            modality,
            session_number,
            hour,
            minute,
            status,
        })
    }
}

fn parse_clock(time: &str) -> Result<(u32, u32), DraftError> {
    let (h, m) = time.split_once(':').ok_or(DraftError::InvalidTimeFormat)?;
    let hour: u32 = h.parse().map_err(|_| DraftError::InvalidTimeFormat)?;
    let minute: u32 = m.parse().map_err(|_| DraftError::InvalidTimeFormat)?;
    if minute > 59 {
        return Err(DraftError::InvalidTimeFormat);
    }
    Ok((hour, minute))
}

/// Build the outbound event payload for a validated draft
///
/// The session title is composed from the session number and modality, the
/// end time is one hour after the start, and the owner field is chosen by
/// role. `utc_offset_hours` is the configured wall-clock offset from UTC;
/// 0 sends the time as-is, in the backend's own time zone.
pub fn build_event_payload(
    draft: &ValidatedDraft,
    date: NaiveDate,
    no_control: i64,
    role: Role,
    utc_offset_hours: i64,
) -> EventPayload {
    let start = date.and_time(NaiveTime::MIN)
        + Duration::hours(i64::from(draft.hour))
        + Duration::minutes(i64::from(draft.minute))
        - Duration::hours(utc_offset_hours);
    let end = start + Duration::hours(1);

    let status = draft.status.to_string();

    EventPayload {
        title: format!("Sesión {} - {}", draft.session_number, draft.modality),
        session_number: draft.session_number,
        start_time: start.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        end_time: end.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        no_control_user: (role == Role::User).then_some(no_control),
        no_control_admin: (role == Role::Admin).then_some(no_control),
        estatus: status.clone(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(time: &str) -> AppointmentDraft {
        AppointmentDraft {
            modality: Some(Modality::Presencial),
            session_number: Some(1),
            time: time.to_string(),
            status: None,
        }
    }

    #[test]
    fn test_hour_boundaries() {
        assert_eq!(
            draft("07:00").validate(Role::User),
            Err(DraftError::HourOutOfRange)
        );
        assert!(draft("08:00").validate(Role::User).is_ok());
        assert!(draft("16:00").validate(Role::User).is_ok());
        assert_eq!(
            draft("17:00").validate(Role::User),
            Err(DraftError::HourOutOfRange)
        );
    }

    #[test]
    fn test_out_of_range_message_is_stable() {
        let err = draft("17:00").validate(Role::Admin).unwrap_err();
        assert_eq!(err.to_string(), "La hora debe estar entre 08:00 y 16:00");
    }

    #[test]
    fn test_missing_modality() {
        let mut d = draft("09:00");
        d.modality = None;
        assert_eq!(d.validate(Role::User), Err(DraftError::MissingModality));
    }

    #[test]
    fn test_session_number_must_be_positive() {
        let mut d = draft("09:00");
        d.session_number = Some(0);
        assert_eq!(d.validate(Role::User), Err(DraftError::InvalidSessionNumber));
        d.session_number = None;
        assert_eq!(d.validate(Role::User), Err(DraftError::InvalidSessionNumber));
    }

    #[test]
    fn test_time_format() {
        assert_eq!(
            draft("0900").validate(Role::User),
            Err(DraftError::InvalidTimeFormat)
        );
        assert_eq!(
            draft("nueve").validate(Role::User),
            Err(DraftError::InvalidTimeFormat)
        );
        assert_eq!(
            draft("09:75").validate(Role::User),
            Err(DraftError::InvalidTimeFormat)
        );
    }

    #[test]
    fn test_admin_requires_status() {
        assert_eq!(
            draft("09:00").validate(Role::Admin),
            Err(DraftError::MissingStatus)
        );

        let mut d = draft("09:00");
        d.status = Some(AppointmentStatus::Completada);
        let valid = d.validate(Role::Admin).unwrap();
        assert_eq!(valid.status, AppointmentStatus::Completada);
    }

    #[test]
    fn test_user_status_defaults_to_pendiente() {
        let valid = draft("09:00").validate(Role::User).unwrap();
        assert_eq!(valid.status, AppointmentStatus::Pendiente);

        // Even an explicit user-set status is overridden
        let mut d = draft("09:00");
        d.status = Some(AppointmentStatus::Cancelada);
        assert_eq!(
            d.validate(Role::User).unwrap().status,
            AppointmentStatus::Pendiente
        );
    }

    #[test]
    fn test_available_hours_span_the_window() {
        let hours = available_hours();
        assert_eq!(hours.first().map(String::as_str), Some("08:00"));
        assert_eq!(hours.last().map(String::as_str), Some("16:00"));
        assert_eq!(hours.len(), 9);
    }

    #[test]
    fn test_payload_composition() {
        let valid = draft("09:00").validate(Role::User).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();
        let payload = build_event_payload(&valid, date, 20210001, Role::User, 0);

        assert_eq!(payload.title, "Sesión 1 - Presencial");
        assert_eq!(payload.start_time, "2026-09-03T09:00:00.000Z");
        assert_eq!(payload.end_time, "2026-09-03T10:00:00.000Z");
        assert_eq!(payload.no_control_user, Some(20210001));
        assert_eq!(payload.no_control_admin, None);
        assert_eq!(payload.status, "Pendiente");
        assert_eq!(payload.estatus, "Pendiente");
    }

    #[test]
    fn test_payload_owner_field_for_admin() {
        let mut d = draft("10:00");
        d.status = Some(AppointmentStatus::Pendiente);
        let valid = d.validate(Role::Admin).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();
        let payload = build_event_payload(&valid, date, 100, Role::Admin, 0);

        assert_eq!(payload.no_control_user, None);
        assert_eq!(payload.no_control_admin, Some(100));
    }

    #[test]
    fn test_payload_applies_configured_offset() {
        let valid = draft("08:00").validate(Role::User).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();

        // A UTC-6 wall clock: 08:00 local is 14:00 at the backend
        let payload = build_event_payload(&valid, date, 1, Role::User, -6);
        assert_eq!(payload.start_time, "2026-09-03T14:00:00.000Z");
        assert_eq!(payload.end_time, "2026-09-03T15:00:00.000Z");
    }

    #[test]
    fn test_last_slot_ends_at_seventeen() {
        let valid = draft("16:00").validate(Role::User).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();
        let payload = build_event_payload(&valid, date, 1, Role::User, 0);
        assert_eq!(payload.end_time, "2026-09-03T17:00:00.000Z");
    }
}
