//! # Consultorio
//!
//! Client for a psychology-clinic record-keeping backend: authentication,
//! patient case files ("expedientes") and calendar appointments ("citas")
//! against a remote REST service.
//!
//! ## Modules
//!
//! - [`session`]: persisted login state (flag, role, bearer token)
//! - [`api`]: typed REST client for the clinic backend
//! - [`agenda`]: appointment view-model (booking window, past-date lockout)
//! - [`expedientes`]: case-file view-model (patient lookup, CRUD)
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use consultorio::agenda::{AgendaManager, AppointmentDraft};
//! use consultorio::api::ApiClient;
//! use consultorio::config::Config;
//! use consultorio::models::{Modality, Role};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let api = ApiClient::new(&config.backend);
//!
//!     let outcome = api.login(Role::User, "email@ejemplo.com", "secret").await?;
//!     let api = ApiClient::new(&config.backend).with_token(outcome.token);
//!
//!     let today = chrono::Local::now().date_naive();
//!     let mut agenda = AgendaManager::new(api, outcome.role, today, config.backend.utc_offset_hours);
//!     agenda.load().await?;
//!
//!     let draft = AppointmentDraft {
//!         modality: Some(Modality::Presencial),
//!         session_number: Some(1),
//!         time: "09:00".to_string(),
//!         status: None,
//!     };
//!     let cita = agenda.submit(&draft, None, today).await?;
//!     println!("Cita {} agendada para {}", cita.id, cita.start_time);
//!
//!     Ok(())
//! }
//! ```

pub mod agenda;
pub mod api;
pub mod config;
pub mod expedientes;
pub mod models;
pub mod session;

pub use agenda::{AgendaManager, AgendaState, AppointmentDraft};
pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use expedientes::{ExpedienteDraft, ExpedientesManager};
pub use models::{Appointment, AppointmentStatus, Expediente, Modality, Patient, Role};
pub use session::{FileSessionStore, SessionManager, SessionStore};
