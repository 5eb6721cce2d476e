//! Consultorio CLI
//!
//! Terminal presentation layer for the clinic client: it renders the
//! calendar, appointment lists and case files, and maps subcommands onto
//! view-model operations. No business logic lives here beyond delegating
//! to the managers and gating actions by role.

use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use consultorio::agenda::{AgendaManager, AppointmentDraft};
use consultorio::api::ApiClient;
use consultorio::config::{Config, LoggingConfig};
use consultorio::expedientes::{ExpedienteDraft, ExpedientesManager};
use consultorio::models::{Appointment, AppointmentStatus, Expediente, Modality, Patient, Role};
use consultorio::session::{FileSessionStore, SessionManager};

#[derive(Parser)]
#[command(name = "consultorio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cliente de consola del consultorio de psicología")]
#[command(long_about = "Cliente de consola del consultorio de psicología.\nGestiona citas y expedientes contra el backend de la clínica.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ruta del archivo de configuración
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Iniciar sesión contra el backend
    Login {
        /// Tipo de usuario (user o admin)
        #[arg(long, default_value = "user")]
        role: Role,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Cerrar la sesión local
    Logout,

    /// Mostrar la sesión activa
    Whoami,

    /// Calendario y gestión de citas
    Agenda {
        #[command(subcommand)]
        command: AgendaCommands,
    },

    /// Búsqueda y gestión de expedientes
    Expediente {
        #[command(subcommand)]
        command: ExpedienteCommands,
    },

    /// Generar archivo de configuración por defecto
    Config {
        /// Ruta de salida (por defecto: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AgendaCommands {
    /// Calendario del mes con los días que tienen citas
    Month {
        /// Fecha seleccionada (YYYY-MM-DD, por defecto hoy)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Citas de la fecha seleccionada
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Agendar una cita nueva
    Book {
        /// Fecha de la cita (por defecto hoy)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Hora de inicio, HH:MM (08:00 a 16:00)
        #[arg(long)]
        time: String,
        /// Presencial o Virtual
        #[arg(long)]
        modality: Modality,
        /// Número de sesión
        #[arg(long)]
        session: u32,
        /// Estatus (solo admin): Pendiente, Completada o Cancelada
        #[arg(long)]
        status: Option<AppointmentStatus>,
    },

    /// Editar una cita existente (solo admin)
    Edit {
        id: i64,
        /// Nueva fecha (por defecto, la fecha actual de la cita)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        modality: Option<Modality>,
        #[arg(long)]
        session: Option<u32>,
        #[arg(long)]
        status: Option<AppointmentStatus>,
    },

    /// Eliminar una cita (solo admin)
    Cancel { id: i64 },
}

#[derive(Subcommand)]
enum ExpedienteCommands {
    /// Buscar un paciente y sus expedientes por número de control
    Show { no_control: String },

    /// Generar un expediente nuevo
    New {
        #[arg(long)]
        no_control: String,
        #[arg(long)]
        motivo: String,
        #[arg(long)]
        desencadenantes: String,
        #[arg(long)]
        plan: String,
        #[arg(long)]
        seguimiento: String,
        #[arg(long)]
        sesiones: u32,
    },

    /// Editar un expediente existente
    Edit {
        id: i64,
        /// Número de control del paciente dueño del expediente
        #[arg(long)]
        no_control: String,
        #[arg(long)]
        motivo: Option<String>,
        #[arg(long)]
        desencadenantes: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        seguimiento: Option<String>,
        #[arg(long)]
        sesiones: Option<u32>,
    },

    /// Eliminar un expediente
    Delete {
        id: i64,
        /// Número de control del paciente dueño del expediente
        #[arg(long)]
        no_control: String,
        /// Omitir la confirmación
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_tracing(&config.logging);

    let store = FileSessionStore::new(config.session.file.clone());
    let mut session = SessionManager::new(Box::new(store));
    session.restore().await;

    match cli.command {
        Commands::Login {
            role,
            email,
            password,
        } => {
            let api = ApiClient::new(&config.backend);
            let outcome = api.login(role, &email, &password).await?;
            session.login(outcome.role, outcome.token).await?;
            println!("Inicio de sesión correcto ({})", outcome.role);
        }

        Commands::Logout => {
            session.logout().await?;
            println!("Sesión cerrada");
        }

        Commands::Whoami => {
            if !session.is_logged_in() {
                println!("No has iniciado sesión.");
                return Ok(());
            }

            let role = session.role().context("Sesión sin rol")?;
            println!("Rol: {}", role);

            let api = authed_client(&config, &session)?;
            match api.identity(role).await {
                Ok(identity) => {
                    if let Some(no_control) = identity.no_control {
                        println!("Número de control: {}", no_control);
                    }
                }
                Err(e) => tracing::warn!("No se pudieron obtener los datos del usuario: {}", e),
            }
        }

        Commands::Agenda { command } => {
            run_agenda(command, &config, &session).await?;
        }

        Commands::Expediente { command } => {
            run_expediente(command, &config, &session).await?;
        }

        Commands::Config { output } => {
            let content = consultorio::config::generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Configuración escrita en {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("consultorio={}", logging.level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn authed_client(config: &Config, session: &SessionManager) -> anyhow::Result<ApiClient> {
    let token = session
        .token()
        .context("No has iniciado sesión. Usa `consultorio login`.")?;
    Ok(ApiClient::new(&config.backend).with_token(token))
}

fn session_role(session: &SessionManager) -> anyhow::Result<Role> {
    session
        .role()
        .context("No has iniciado sesión. Usa `consultorio login`.")
}

async fn run_agenda(
    command: AgendaCommands,
    config: &Config,
    session: &SessionManager,
) -> anyhow::Result<()> {
    let role = session_role(session)?;
    let api = authed_client(config, session)?;
    let today = Local::now().date_naive();
    let mut manager = AgendaManager::new(api, role, today, config.backend.utc_offset_hours);

    match command {
        AgendaCommands::Month { date } => {
            manager.load().await?;
            if let Some(date) = date {
                manager.state.select_date(date);
            }

            print_month(manager.state.selected_date, &manager.state.marked_dates());
            println!("Citas para {}", manager.state.selected_date);
            print_appointments(&manager.state.appointments_for_selected());
            if manager.state.is_read_only(today) {
                println!();
                println!("Fecha anterior a hoy: no se pueden agendar citas.");
            }
        }

        AgendaCommands::List { date } => {
            manager.load().await?;
            if let Some(date) = date {
                manager.state.select_date(date);
            }

            println!("Citas para {}", manager.state.selected_date);
            print_appointments(&manager.state.appointments_for_selected());
        }

        AgendaCommands::Book {
            date,
            time,
            modality,
            session: session_number,
            status,
        } => {
            manager.load().await?;
            if let Some(date) = date {
                manager.state.select_date(date);
            }

            let draft = AppointmentDraft {
                modality: Some(modality),
                session_number: Some(session_number),
                time,
                status,
            };

            let cita = manager.submit(&draft, None, today).await?;
            println!(
                "Cita {} agendada: {} el {} a las {}",
                cita.id,
                cita.title,
                manager.state.selected_date,
                cita.start_clock().unwrap_or_default()
            );
        }

        AgendaCommands::Edit {
            id,
            date,
            time,
            modality,
            session: session_number,
            status,
        } => {
            // Los usuarios ven sus citas en modo lectura; solo el admin edita.
            if !role.is_admin() {
                bail!("Solo los administradores pueden editar citas existentes.");
            }

            manager.load().await?;
            let existing = manager
                .state
                .find(id)
                .cloned()
                .with_context(|| format!("No se encontró la cita {}", id))?;

            let date = date
                .or(existing.date)
                .context("La cita no tiene fecha válida; indica una con --date")?;
            manager.state.select_date(date);

            let draft = AppointmentDraft {
                modality: modality.or_else(|| {
                    existing
                        .title
                        .split(" - ")
                        .nth(1)
                        .and_then(|m| m.parse().ok())
                }),
                session_number: session_number.or(Some(existing.session_number)),
                time: match time {
                    Some(time) => time,
                    None => existing
                        .start_clock()
                        .context("La cita no tiene hora válida; indica una con --time")?,
                },
                status: status.or_else(|| existing.status().and_then(|s| s.parse().ok())),
            };

            let cita = manager.submit(&draft, Some(id), today).await?;
            println!("Cita {} actualizada: {}", cita.id, cita.title);
        }

        AgendaCommands::Cancel { id } => {
            if !role.is_admin() {
                bail!("Solo los administradores pueden eliminar citas.");
            }

            manager.load().await?;
            let existing = manager
                .state
                .find(id)
                .cloned()
                .with_context(|| format!("No se encontró la cita {}", id))?;
            if let Some(date) = existing.date {
                manager.state.select_date(date);
            }

            manager.delete(id, today).await?;
            println!("Cita {} eliminada", id);
        }
    }

    Ok(())
}

async fn run_expediente(
    command: ExpedienteCommands,
    config: &Config,
    session: &SessionManager,
) -> anyhow::Result<()> {
    let api = authed_client(config, session)?;
    let mut manager = ExpedientesManager::new(api);

    match command {
        ExpedienteCommands::Show { no_control } => {
            let patient = manager.lookup(&no_control).await?;
            print_patient(patient);
        }

        ExpedienteCommands::New {
            no_control,
            motivo,
            desencadenantes,
            plan,
            seguimiento,
            sesiones,
        } => {
            // Pre-cargar el paciente confirma el número de control y muestra
            // a quién se le genera el expediente.
            let nombre = manager.lookup(&no_control).await?.nombre.clone();

            let draft = ExpedienteDraft {
                no_control,
                motivo_consulta: motivo,
                desencadenantes_motivo: desencadenantes,
                plan_orientacion: plan,
                seguimiento,
                numero_sesiones: sesiones,
            };
            manager.create(&draft).await?;
            println!("Expediente guardado correctamente para {}.", nombre);
        }

        ExpedienteCommands::Edit {
            id,
            no_control,
            motivo,
            desencadenantes,
            plan,
            seguimiento,
            sesiones,
        } => {
            let patient = manager.lookup(&no_control).await?;
            let mut edited = patient
                .expedientes
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .with_context(|| format!("No se encontró el expediente {}", id))?;

            if let Some(motivo) = motivo {
                edited.motivo_consulta = motivo;
            }
            if let Some(desencadenantes) = desencadenantes {
                edited.desencadenantes_motivo = desencadenantes;
            }
            if let Some(plan) = plan {
                edited.plan_orientacion = plan;
            }
            if let Some(seguimiento) = seguimiento {
                edited.seguimiento = seguimiento;
            }
            if let Some(sesiones) = sesiones {
                edited.numero_sesiones = sesiones;
            }

            let updated = manager.update(id, &edited).await?;
            println!("Expediente {} actualizado", updated.id);
            print_expediente(&updated);
        }

        ExpedienteCommands::Delete {
            id,
            no_control,
            yes,
        } => {
            let patient = manager.lookup(&no_control).await?;
            if !patient.expedientes.iter().any(|e| e.id == id) {
                bail!("No se encontró el expediente {}", id);
            }

            if !yes && !confirm("¿Estás seguro de eliminar este expediente? [s/N] ")? {
                println!("Cancelado.");
                return Ok(());
            }

            manager.delete(id).await?;
            println!("Expediente {} eliminado", id);
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "si" | "sí"))
}

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Render the month grid: the selected day in brackets, days with
/// appointments marked with an asterisk
fn print_month(selected: NaiveDate, marked: &BTreeSet<NaiveDate>) {
    let month_name = MONTH_NAMES[selected.month0() as usize];
    println!("{:^28}", format!("{} {}", month_name, selected.year()));

    for name in ["Lu", "Ma", "Mi", "Ju", "Vi", "Sá", "Do"] {
        print!("{:>3} ", name);
    }
    println!();

    let Some(first) = NaiveDate::from_ymd_opt(selected.year(), selected.month(), 1) else {
        return;
    };

    let mut line = String::new();
    for _ in 0..first.weekday().num_days_from_monday() {
        line.push_str("    ");
    }

    let mut day = Some(first);
    while let Some(date) = day.filter(|d| d.month() == selected.month()) {
        let cell = if date == selected {
            format!("[{:>2}]", date.day())
        } else if marked.contains(&date) {
            format!("{:>2}* ", date.day())
        } else {
            format!("{:>2}  ", date.day())
        };
        line.push_str(&cell);

        if date.weekday() == Weekday::Sun {
            println!("{}", line.trim_end());
            line.clear();
        }
        day = date.succ_opt();
    }
    if !line.trim().is_empty() {
        println!("{}", line.trim_end());
    }

    println!();
    println!("  [n] día seleccionado   n* día con citas");
    println!();
}

fn print_appointments(appointments: &[&Appointment]) {
    if appointments.is_empty() {
        println!("No hay citas para esta fecha.");
        return;
    }

    println!(
        "{:<6} {:<14} {:<28} {:<12}",
        "Id", "Horario", "Título", "Estado"
    );
    println!("{}", "-".repeat(62));

    for a in appointments {
        let horario = match (a.start_clock(), a.end_clock()) {
            (Some(start), Some(end)) => format!("{} - {}", start, end),
            _ => "-".to_string(),
        };
        println!(
            "{:<6} {:<14} {:<28} {:<12}",
            a.id,
            horario,
            a.title,
            a.status().unwrap_or("-")
        );
    }
}

fn print_patient(patient: &Patient) {
    println!("Número de control: {}", patient.no_control);
    match &patient.apellido {
        Some(apellido) => println!("Nombre: {} {}", patient.nombre, apellido),
        None => println!("Nombre: {}", patient.nombre),
    }
    if let Some(edad) = patient.edad {
        println!("Edad: {}", edad);
    }
    if let Some(sexo) = &patient.sexo {
        println!("Sexo: {}", sexo);
    }
    if let Some(carrera) = &patient.ingenieria {
        println!("Carrera: {}", carrera);
    }
    if let Some(modalidad) = &patient.modalidad {
        println!("Modalidad: {}", modalidad);
    }
    if let Some(semestre) = patient.semestre {
        println!("Semestre: {}", semestre);
    }
    if let Some(telefono) = &patient.telefono {
        println!("Teléfono: {}", telefono);
    }

    println!();
    if patient.expedientes.is_empty() {
        println!("Sin expedientes registrados.");
    } else {
        println!("Expedientes:");
        for expediente in &patient.expedientes {
            println!();
            print_expediente(expediente);
        }
    }
}

fn print_expediente(expediente: &Expediente) {
    println!("  [{}] {}", expediente.id, expediente.motivo_consulta);
    println!("      Sesiones: {}", expediente.numero_sesiones);
    println!("      Desencadenantes: {}", expediente.desencadenantes_motivo);
    println!("      Plan: {}", expediente.plan_orientacion);
    println!("      Seguimiento: {}", expediente.seguimiento);
}
