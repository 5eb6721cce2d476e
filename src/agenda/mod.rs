//! Appointment ("cita") view-model
//!
//! [`AgendaState`] is the pure side: the loaded list, the selected date and
//! the operator's identity, with transitions that never touch the network.
//! [`AgendaManager`] is the side-effecting adapter: it drives the API client
//! and mutates the state only after the server confirms, so a failed call
//! leaves the list exactly as it was.

mod draft;

pub use draft::{
    available_hours, build_event_payload, AppointmentDraft, DraftError, ValidatedDraft,
    FIRST_BOOKING_HOUR, LAST_BOOKING_HOUR,
};

use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::models::{Appointment, Role};

/// Errors surfaced by agenda operations
#[derive(Debug, Error)]
pub enum AgendaError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    /// Mutations on a date strictly before today are locked out client-side
    #[error("No puedes agendar citas en días anteriores")]
    PastDate,

    #[error("No se encontró el número de control")]
    MissingIdentity,
}

/// Pure appointment-screen state
#[derive(Debug, Clone)]
pub struct AgendaState {
    pub appointments: Vec<Appointment>,
    pub selected_date: NaiveDate,
    pub role: Role,
    pub no_control: Option<i64>,
}

impl AgendaState {
    pub fn new(role: Role, selected_date: NaiveDate) -> Self {
        Self {
            appointments: Vec::new(),
            selected_date,
            role,
            no_control: None,
        }
    }

    /// Set the active date; never refetches
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    /// Appointments whose derived date matches the selected date exactly
    pub fn appointments_for_selected(&self) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.date == Some(self.selected_date))
            .collect()
    }

    /// Every date that has at least one appointment (for the calendar grid)
    pub fn marked_dates(&self) -> BTreeSet<NaiveDate> {
        self.appointments.iter().filter_map(|a| a.date).collect()
    }

    /// True iff the selected date is strictly before today; the presentation
    /// layer uses this to disable every scheduling action
    pub fn is_read_only(&self, today: NaiveDate) -> bool {
        self.selected_date < today
    }

    pub fn find(&self, id: i64) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// Replace the whole list (after a successful load)
    pub fn replace_all(&mut self, appointments: Vec<Appointment>) {
        self.appointments = appointments;
    }

    /// Append a server-confirmed creation
    pub fn apply_created(&mut self, appointment: Appointment) {
        self.appointments.push(appointment);
    }

    /// Replace the matching entry after a server-confirmed update
    pub fn apply_updated(&mut self, appointment: Appointment) {
        if let Some(existing) = self.appointments.iter_mut().find(|a| a.id == appointment.id) {
            *existing = appointment;
        }
    }

    /// Remove the entry after a server-confirmed delete
    pub fn apply_deleted(&mut self, id: i64) {
        self.appointments.retain(|a| a.id != id);
    }
}

/// Async adapter between the agenda state and the backend
pub struct AgendaManager {
    api: ApiClient,
    pub state: AgendaState,
    utc_offset_hours: i64,
}

impl AgendaManager {
    pub fn new(api: ApiClient, role: Role, selected_date: NaiveDate, utc_offset_hours: i64) -> Self {
        Self {
            api,
            state: AgendaState::new(role, selected_date),
            utc_offset_hours,
        }
    }

    /// Fetch the identity (once) and the full appointment list, replacing
    /// local state; on failure the list is left untouched
    pub async fn load(&mut self) -> Result<(), AgendaError> {
        if self.state.no_control.is_none() {
            let identity = self.api.identity(self.state.role).await.inspect_err(|e| {
                tracing::error!("Error al obtener datos del usuario: {}", e);
            })?;

            match identity.no_control {
                Some(no_control) => self.state.no_control = Some(no_control),
                None => tracing::warn!("no_control no está definido en la respuesta"),
            }
        }

        let appointments = self.api.list_events().await.inspect_err(|e| {
            tracing::error!("Error al cargar citas: {}", e);
        })?;

        tracing::debug!(count = appointments.len(), "Citas cargadas");
        self.state.replace_all(appointments);
        Ok(())
    }

    /// Validate and submit a draft: update when `existing` is set, create
    /// otherwise. Local state changes only after the server confirms.
    pub async fn submit(
        &mut self,
        draft: &AppointmentDraft,
        existing: Option<i64>,
        today: NaiveDate,
    ) -> Result<Appointment, AgendaError> {
        if self.state.is_read_only(today) {
            return Err(AgendaError::PastDate);
        }

        let valid = draft.validate(self.state.role)?;
        let no_control = self.state.no_control.ok_or(AgendaError::MissingIdentity)?;
        let payload = build_event_payload(
            &valid,
            self.state.selected_date,
            no_control,
            self.state.role,
            self.utc_offset_hours,
        );

        let appointment = match existing {
            Some(id) => {
                self.api.update_event(id, &payload).await?;
                let appointment = payload.into_appointment(id);
                self.state.apply_updated(appointment.clone());
                tracing::info!(id, "Cita actualizada");
                appointment
            }
            None => {
                let id = self.api.create_event(&payload).await?;
                let appointment = payload.into_appointment(id);
                self.state.apply_created(appointment.clone());
                tracing::info!(id, "Cita creada");
                appointment
            }
        };

        Ok(appointment)
    }

    /// Delete an appointment server-side, then drop it from the list
    pub async fn delete(&mut self, id: i64, today: NaiveDate) -> Result<(), AgendaError> {
        if self.state.is_read_only(today) {
            return Err(AgendaError::PastDate);
        }

        self.api.delete_event(id).await?;
        self.state.apply_deleted(id);
        tracing::info!(id, "Cita eliminada");
        Ok(())
    }
}
