use tracing::info;

use crate::sql_params;

use super::manager::{Database, DatabaseError};

/// Idempotent DDL for the canonical schema, in dependency order.
pub const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS universidades (
        id SERIAL PRIMARY KEY,
        nombre VARCHAR(255) NOT NULL,
        direccion TEXT,
        pais VARCHAR(100) NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (nombre, pais)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS facultades (
        id SERIAL PRIMARY KEY,
        nombre VARCHAR(255) NOT NULL,
        universidad_id INTEGER NOT NULL REFERENCES universidades(id) ON DELETE CASCADE,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (nombre, universidad_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS carreras (
        id SERIAL PRIMARY KEY,
        nombre VARCHAR(255) NOT NULL,
        facultad_id INTEGER NOT NULL REFERENCES facultades(id) ON DELETE CASCADE,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (nombre, facultad_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS materias (
        id SERIAL PRIMARY KEY,
        nombre VARCHAR(255) NOT NULL,
        clave VARCHAR(50),
        maestro VARCHAR(255),
        carrera_id INTEGER NOT NULL REFERENCES carreras(id) ON DELETE CASCADE,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (nombre, carrera_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS becas (
        id SERIAL PRIMARY KEY,
        nombre VARCHAR(255) NOT NULL,
        pais VARCHAR(100) NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (nombre, pais)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        nombres VARCHAR(255) NOT NULL,
        apellido_paterno VARCHAR(255) NOT NULL,
        apellido_materno VARCHAR(255),
        clave VARCHAR(10) UNIQUE,
        telefono VARCHAR(30),
        email VARCHAR(255) NOT NULL UNIQUE,
        password TEXT NOT NULL,
        rol VARCHAR(20) NOT NULL DEFAULT 'alumno'
            CHECK (rol IN ('alumno', 'becarios', 'administrador')),
        tipo_movilidad VARCHAR(30)
            CHECK (tipo_movilidad IN ('movilidad_internacional', 'movilidad_virtual',
                                      'visitante_nacional', 'visitante_internacional')),
        ciclo_escolar_inicio VARCHAR(20),
        ciclo_escolar_final VARCHAR(20),
        universidad_id INTEGER REFERENCES universidades(id) ON DELETE SET NULL,
        facultad_id INTEGER REFERENCES facultades(id) ON DELETE SET NULL,
        carrera_id INTEGER REFERENCES carreras(id) ON DELETE SET NULL,
        beca_id INTEGER REFERENCES becas(id) ON DELETE SET NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    r#"CREATE TABLE IF NOT EXISTS applications (
        id SERIAL PRIMARY KEY,
        nombre VARCHAR(255) NOT NULL,
        apellido_paterno VARCHAR(255),
        apellido_materno VARCHAR(255),
        clave VARCHAR(10),
        ciclo_escolar_inicio VARCHAR(20),
        ciclo_escolar_final VARCHAR(20),
        universidad VARCHAR(255),
        pais_destino VARCHAR(100),
        carrera VARCHAR(255),
        materias_interes JSONB NOT NULL DEFAULT '[]',
        archivo JSONB,
        estado VARCHAR(20) NOT NULL DEFAULT 'pendiente'
            CHECK (estado IN ('pendiente', 'en_revision', 'aceptada', 'rechazada')),
        comentarios TEXT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    r#"CREATE TABLE IF NOT EXISTS convocatorias (
        id SERIAL PRIMARY KEY,
        titulo VARCHAR(255) NOT NULL,
        descripcion TEXT NOT NULL,
        fecha DATE NOT NULL,
        imagen VARCHAR(500),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    r#"CREATE TABLE IF NOT EXISTS visitantes_info (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
        pais_origen VARCHAR(100),
        fecha_nacimiento DATE,
        preparatoria VARCHAR(255),
        entidad_federativa VARCHAR(100),
        nombre_tutor VARCHAR(255),
        dni_curp VARCHAR(50),
        sexo VARCHAR(20),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    r#"CREATE TABLE IF NOT EXISTS visitor_logs (
        id SERIAL PRIMARY KEY,
        user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        ip_address VARCHAR(64),
        user_agent TEXT,
        page_visited VARCHAR(500),
        action VARCHAR(50) NOT NULL DEFAULT 'visit',
        session_id VARCHAR(255),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_key ON users (LOWER(email))",
    "CREATE INDEX IF NOT EXISTS idx_applications_user_id ON applications(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_applications_created_at ON applications(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_visitor_logs_created_at ON visitor_logs(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_visitor_logs_page ON visitor_logs(page_visited)",
];

/// Advisory lock key held while the DDL runs
const BOOTSTRAP_LOCK: i64 = 0x6d6f_7669_6c69_6461;

/// Create any missing tables and indexes.
///
/// Runs in one transaction under an advisory lock so concurrent starts
/// do not race on catalog entries.
pub async fn bootstrap(db: &Database) -> Result<(), DatabaseError> {
    let mut tx = db.begin().await?;
    db.execute_on(&mut *tx, "SELECT pg_advisory_xact_lock($1)", &sql_params![BOOTSTRAP_LOCK])
        .await?;
    for statement in SCHEMA {
        db.execute_on(&mut *tx, statement, &[]).await?;
    }
    tx.commit().await?;

    info!("Schema bootstrap complete ({} statements)", SCHEMA.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for statement in SCHEMA {
            assert!(statement.contains("IF NOT EXISTS"), "not idempotent: {}", statement);
        }
    }

    #[test]
    fn parents_are_created_before_children() {
        let position = |table: &str| {
            SCHEMA
                .iter()
                .position(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {} ", table)))
                .unwrap()
        };
        assert!(position("universidades") < position("facultades"));
        assert!(position("facultades") < position("carreras"));
        assert!(position("carreras") < position("materias"));
        assert!(position("becas") < position("users"));
        assert!(position("users") < position("applications"));
        assert!(position("users") < position("visitor_logs"));
    }

    #[test]
    fn catalog_uniqueness_keys_are_not_nullable() {
        for table in ["universidades", "becas"] {
            let ddl = SCHEMA
                .iter()
                .find(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {} ", table)))
                .unwrap();
            assert!(ddl.contains("pais VARCHAR(100) NOT NULL"), "{}", table);
        }
        assert!(SCHEMA.iter().any(|s| s.contains("ON users (LOWER(email))")));
    }
}
