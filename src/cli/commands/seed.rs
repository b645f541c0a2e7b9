use std::collections::HashSet;

use chrono::NaiveDate;
use clap::Subcommand;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;

use crate::cli::utils::{connect_database, output_progress, output_success};
use crate::cli::OutputFormat;
use crate::database::models::{CatalogRef, ConvocatoriaInput, NewUser};
use crate::database::repository::{
    BecaRepository, CarreraRepository, ConvocatoriaRepository, FacultadRepository, UniversidadRepository,
};
use crate::services::{AccountError, AccountService};
use crate::types::{MobilityType, Role};

/// Password given to every generated student
pub const SEED_PASSWORD: &str = "123456";

/// Largest batch that still fits in the six-digit clave space
const MAX_STUDENTS: usize = 900_000;

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Insert the sample announcements")]
    Convocatorias,

    #[command(about = "Insert random students")]
    Users {
        #[arg(long, default_value_t = 50, help = "Number of students to create")]
        count: usize,
    },
}

const FIRST_NAMES: &[&str] = &[
    "Juan", "María", "Carlos", "Ana", "Luis", "Sofía", "Miguel", "Valeria", "Jorge", "Fernanda", "Ricardo", "Paola",
    "Diego", "Daniela", "Alejandro", "Camila", "Eduardo", "Lucía", "Roberto", "Andrea",
];

const LAST_NAMES: &[&str] = &[
    "Pérez", "González", "Rodríguez", "López", "Martínez", "Hernández", "Sánchez", "Ramírez", "Cruz", "Flores",
    "Torres", "Díaz", "Vargas", "Morales", "Ortega", "Ramos", "Cortés", "Ibarra", "Mendoza", "Navarro",
];

/// (titulo, descripcion, fecha)
const SAMPLE_CONVOCATORIAS: &[(&str, &str, &str)] = &[
    (
        "Convocatoria Erasmus+ 2025",
        "Programa de intercambio académico con universidades europeas. Incluye becas completas para estudiantes de ingeniería. Requisitos: promedio mínimo de 8.0, nivel de inglés B2 y estar en 6to semestre o superior.",
        "2025-09-30",
    ),
    (
        "Convenio con Universidades de Quebec",
        "Intercambio académico con instituciones de educación superior en Quebec, Canadá. Duración: 1 semestre académico. Incluye alojamiento y seguro médico.",
        "2025-10-15",
    ),
    (
        "Movilidad de Investigación - Alemania",
        "Estancia de investigación en el Instituto Tecnológico de Karlsruhe (KIT) para estudiantes de posgrado y docentes. Duración: 3 a 6 meses.",
        "2025-11-20",
    ),
    (
        "Prácticas Profesionales en Silicon Valley",
        "Prácticas profesionales en empresas tecnológicas para estudiantes de Ingeniería en Sistemas y afines. Duración: 3 meses.",
        "2025-12-01",
    ),
    (
        "Intercambio Académico - Japón",
        "Convenio con la Universidad de Tokio en Robótica, Automatización y Sistemas Inteligentes. Requiere conocimiento básico de japonés. Becas disponibles.",
        "2026-01-15",
    ),
];

/// Existing catalog ids to attach generated students to
#[derive(Debug, Default)]
pub struct CatalogIds {
    pub universidades: Vec<i32>,
    pub facultades: Vec<i32>,
    pub carreras: Vec<i32>,
    pub becas: Vec<i32>,
}

fn ids(refs: Vec<CatalogRef>) -> Vec<i32> {
    refs.into_iter().map(|r| r.id).collect()
}

/// Build `count` students with distinct claves; emails follow the institutional pattern
pub fn generate_students<R: Rng>(count: usize, catalog: &CatalogIds, rng: &mut R) -> Vec<NewUser> {
    let count = count.min(MAX_STUDENTS);
    let mut claves = HashSet::with_capacity(count);
    let mut students = Vec::with_capacity(count);

    while students.len() < count {
        let clave = rng.gen_range(100_000..=999_999).to_string();
        if !claves.insert(clave.clone()) {
            continue;
        }

        let mut nombres = pick(FIRST_NAMES, rng).to_string();
        if rng.gen_bool(0.3) {
            nombres = format!("{} {}", nombres, pick(FIRST_NAMES, rng));
        }

        // One in five students has no mobility type.
        let tipo_movilidad = if rng.gen_bool(0.2) {
            None
        } else {
            MobilityType::ALL.choose(rng).map(|t| t.as_str().to_string())
        };

        students.push(NewUser {
            nombres,
            apellido_paterno: pick(LAST_NAMES, rng).to_string(),
            apellido_materno: Some(pick(LAST_NAMES, rng).to_string()),
            email: format!("a{}@alumnos.uaslp.mx", clave),
            clave: Some(clave),
            telefono: None,
            password: SEED_PASSWORD.to_string(),
            rol: Some(Role::Alumno.as_str().to_string()),
            tipo_movilidad,
            ciclo_escolar_inicio: None,
            ciclo_escolar_final: None,
            universidad_id: catalog.universidades.choose(rng).copied(),
            facultad_id: catalog.facultades.choose(rng).copied(),
            carrera_id: catalog.carreras.choose(rng).copied(),
            beca_id: if rng.gen_bool(0.2) { catalog.becas.choose(rng).copied() } else { None },
        });
    }

    students
}

fn pick<'a, R: Rng>(values: &[&'a str], rng: &mut R) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

pub async fn handle(cmd: SeedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SeedCommands::Convocatorias => {
            let db = connect_database().await?;
            let repo = ConvocatoriaRepository::new(&db);

            let mut created = 0;
            for (titulo, descripcion, fecha) in SAMPLE_CONVOCATORIAS {
                let input = ConvocatoriaInput {
                    titulo: titulo.to_string(),
                    descripcion: descripcion.to_string(),
                    fecha: NaiveDate::parse_from_str(fecha, "%Y-%m-%d")?,
                    imagen: None,
                };
                let convocatoria = repo.create(&input).await?;
                output_progress(&output_format, &format!("created convocatoria {}: {}", convocatoria.id, convocatoria.titulo));
                created += 1;
            }
            db.close().await;

            output_success(
                &output_format,
                &format!("{} convocatorias inserted", created),
                Some(json!({ "created": created })),
            )
        }

        SeedCommands::Users { count } => {
            let db = connect_database().await?;

            let catalog = CatalogIds {
                universidades: ids(UniversidadRepository::new(&db).options().await?),
                facultades: ids(FacultadRepository::new(&db).options().await?),
                carreras: ids(CarreraRepository::new(&db).options().await?),
                becas: ids(BecaRepository::new(&db).options().await?),
            };
            let students = generate_students(count, &catalog, &mut rand::thread_rng());

            let accounts = AccountService::new(&db);
            let mut created = 0;
            let mut skipped = 0;
            for student in &students {
                match accounts.create(student).await {
                    Ok(user) => {
                        output_progress(&output_format, &format!("created user {} ({})", user.id, user.email));
                        created += 1;
                    }
                    Err(AccountError::Database(e)) if e.is_unique_violation() => {
                        tracing::warn!("Skipping {}: email or code already exists", student.email);
                        skipped += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            db.close().await;

            output_success(
                &output_format,
                &format!("{} students inserted, {} skipped", created, skipped),
                Some(json!({ "created": created, "skipped": skipped, "password": SEED_PASSWORD })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_students_have_unique_institutional_claves() {
        let catalog = CatalogIds {
            universidades: vec![1, 2],
            facultades: vec![3],
            carreras: vec![],
            becas: vec![9],
        };
        let students = generate_students(200, &catalog, &mut StdRng::seed_from_u64(7));

        assert_eq!(students.len(), 200);
        let claves: HashSet<_> = students.iter().filter_map(|s| s.clave.clone()).collect();
        assert_eq!(claves.len(), 200);

        for student in &students {
            let clave = student.clave.as_deref().unwrap();
            assert_eq!(clave.len(), 6);
            assert_eq!(student.email, format!("a{}@alumnos.uaslp.mx", clave));
            assert!(matches!(student.universidad_id, Some(1) | Some(2)));
            assert_eq!(student.carrera_id, None);
            assert_eq!(student.rol.as_deref(), Some("alumno"));
        }
    }

    #[test]
    fn every_sample_date_parses() {
        for (_, _, fecha) in SAMPLE_CONVOCATORIAS {
            assert!(NaiveDate::parse_from_str(fecha, "%Y-%m-%d").is_ok());
        }
    }
}
