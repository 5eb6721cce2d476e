//! Core domain types for the consultorio client
//!
//! This module defines the types shared across the client:
//! - `Role`: who operates the client (patient-facing user or clinician admin)
//! - `Appointment`: a scheduled session ("cita") as the backend serialises it
//! - `Expediente`: one case-file entry
//! - `Patient`: the student record that owns the case files
//! - `Modality` and `AppointmentStatus`: closed vocabularies used by the forms

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operator role, mirroring the backend JWT's `rol` claim
///
/// The backend emits the Spanish literal `"usuario"` for the patient-facing
/// role; both spellings are accepted on input and canonicalised to `User`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "usuario")]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "usuario" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("rol desconocido: {}", other)),
        }
    }
}

/// Session modality offered by the clinic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Modality {
    Presencial,
    Virtual,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Presencial => write!(f, "Presencial"),
            Modality::Virtual => write!(f, "Virtual"),
        }
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "presencial" => Ok(Modality::Presencial),
            "virtual" => Ok(Modality::Virtual),
            other => Err(format!("modalidad desconocida: {}", other)),
        }
    }
}

/// Appointment status vocabulary used by the scheduling form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    Pendiente,
    Completada,
    Cancelada,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pendiente => write!(f, "Pendiente"),
            AppointmentStatus::Completada => write!(f, "Completada"),
            AppointmentStatus::Cancelada => write!(f, "Cancelada"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pendiente" => Ok(AppointmentStatus::Pendiente),
            "completada" => Ok(AppointmentStatus::Completada),
            "cancelada" => Ok(AppointmentStatus::Cancelada),
            other => Err(format!("estatus desconocido: {}", other)),
        }
    }
}

/// A scheduled session ("cita")
///
/// Owned either by a user (`no_control_user`) or an admin (`no_control_admin`);
/// the other owner field is null. The backend stores the status under two
/// field names (`status` and `estatus`); both are kept on the wire type and
/// unified behind [`Appointment::status`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub no_control_user: Option<i64>,
    pub no_control_admin: Option<i64>,
    pub title: String,
    pub session_number: u32,
    /// Start instant as the backend serialises it, either
    /// `"YYYY-MM-DD HH:MM:SS"` or RFC 3339.
    pub start_time: String,
    pub end_time: String,
    pub status: Option<String>,
    pub estatus: Option<String>,
    /// Calendar date derived client-side from `start_time`; never sent back.
    #[serde(default, skip_serializing)]
    pub date: Option<NaiveDate>,
}

impl Appointment {
    /// Date portion of `start_time`, accepting both backend serialisations
    pub fn derived_date(&self) -> Option<NaiveDate> {
        let date_part = self.start_time.split(['T', ' ']).next()?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// Annotate this record with its derived calendar date
    pub fn with_derived_date(mut self) -> Self {
        self.date = self.derived_date();
        self
    }

    /// Effective status, preferring `estatus` over `status`
    ///
    /// The original client displays `estatus`; `status` is the fallback.
    pub fn status(&self) -> Option<&str> {
        self.estatus.as_deref().or(self.status.as_deref())
    }

    /// Wall-clock start, formatted `HH:MM`, when `start_time` is parseable
    pub fn start_clock(&self) -> Option<String> {
        parse_backend_datetime(&self.start_time).map(|dt| dt.format("%H:%M").to_string())
    }

    /// Wall-clock end, formatted `HH:MM`, when `end_time` is parseable
    pub fn end_clock(&self) -> Option<String> {
        parse_backend_datetime(&self.end_time).map(|dt| dt.format("%H:%M").to_string())
    }
}

/// Parse a backend timestamp in either of its two serialisations
pub fn parse_backend_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}

/// One case-file entry in a patient's record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expediente {
    pub id: i64,
    pub motivo_consulta: String,
    pub numero_sesiones: u32,
    pub plan_orientacion: String,
    pub seguimiento: String,
    pub desencadenantes_motivo: String,
}

/// A patient (student) record, keyed by control number
///
/// Fetched wholesale together with its case files; only `no_control` and
/// `nombre` are guaranteed by the backend, the rest pre-fill the registration
/// form when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub no_control: i64,
    pub nombre: String,
    #[serde(default)]
    pub apellido: Option<String>,
    #[serde(default)]
    pub edad: Option<u32>,
    #[serde(default)]
    pub sexo: Option<String>,
    #[serde(default)]
    pub estado_civil: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    /// Degree program ("ingeniería" in the clinic's intake form)
    #[serde(default)]
    pub ingenieria: Option<String>,
    #[serde(default)]
    pub modalidad: Option<String>,
    #[serde(default)]
    pub semestre: Option<u32>,
    #[serde(default)]
    pub fecha_registro: Option<String>,
    #[serde(default)]
    pub expedientes: Vec<Expediente>,
}
