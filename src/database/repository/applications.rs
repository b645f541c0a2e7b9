use serde_json::json;

use crate::database::models::{Application, ApplicationDetail, NewApplication};
use crate::database::{Database, DatabaseError};
use crate::filter::{ColumnScope, Filter};
use crate::sql_params;
use crate::types::ApplicationStatus;

const APPLICATION_COLUMNS: &str = "id, nombre, apellido_paterno, apellido_materno, clave, \
    ciclo_escolar_inicio, ciclo_escolar_final, universidad, pais_destino, carrera, \
    materias_interes, archivo, estado, comentarios, user_id, created_at, updated_at";

const SELECT_DETAIL: &str = "SELECT a.*, \
        u.nombres AS user_nombres, u.apellido_paterno AS user_apellido_paterno, \
        u.apellido_materno AS user_apellido_materno, u.email AS user_email, \
        u.tipo_movilidad AS user_tipo_movilidad, \
        un.nombre AS universidad_nombre, f.nombre AS facultad_nombre, \
        c.nombre AS carrera_nombre, b.nombre AS beca_nombre \
    FROM applications a \
    LEFT JOIN users u ON a.user_id = u.id \
    LEFT JOIN universidades un ON u.universidad_id = un.id \
    LEFT JOIN facultades f ON u.facultad_id = f.id \
    LEFT JOIN carreras c ON u.carrera_id = c.id \
    LEFT JOIN becas b ON u.beca_id = b.id";

pub struct ApplicationRepository<'a> {
    db: &'a Database,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: &NewApplication) -> Result<Application, DatabaseError> {
        let archivo = new.archivo.as_ref().map(|file| json!(file));
        let sql = format!(
            "INSERT INTO applications (nombre, apellido_paterno, apellido_materno, clave, \
                 ciclo_escolar_inicio, ciclo_escolar_final, universidad, pais_destino, carrera, \
                 materias_interes, archivo, comentarios, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        let params = sql_params![
            new.nombre.trim(),
            new.apellido_paterno.as_deref(),
            new.apellido_materno.as_deref(),
            new.clave.as_deref(),
            new.ciclo_escolar_inicio.as_deref(),
            new.ciclo_escolar_final.as_deref(),
            new.universidad.as_deref(),
            new.pais_destino.as_deref(),
            new.carrera.as_deref(),
            json!(new.materias_interes),
            archivo,
            new.comentarios.as_deref(),
            new.user_id,
        ];
        self.db.fetch_one(&sql, &params).await
    }

    /// Applications joined with applicant data, newest first
    pub async fn get_all(&self, filter: &Filter) -> Result<Vec<ApplicationDetail>, DatabaseError> {
        let conditions = filter.to_sql(&ColumnScope::APPLICATIONS, 1)?;
        let sql = format!(
            "{} {} ORDER BY a.created_at DESC, a.id DESC",
            SELECT_DETAIL,
            conditions.where_sql()
        );
        self.db.fetch_all(&sql, &conditions.params).await
    }

    pub async fn get_by_user(&self, user_id: i32) -> Result<Vec<Application>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM applications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            APPLICATION_COLUMNS
        );
        self.db.fetch_all(&sql, &sql_params![user_id]).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Application>, DatabaseError> {
        let sql = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        self.db.fetch_optional(&sql, &sql_params![id]).await
    }

    pub async fn find_detail(&self, id: i32) -> Result<Option<ApplicationDetail>, DatabaseError> {
        let sql = format!("{} WHERE a.id = $1", SELECT_DETAIL);
        self.db.fetch_optional(&sql, &sql_params![id]).await
    }

    /// Set status and comments, then read back the joined row in the same transaction
    pub async fn update_status(
        &self,
        id: i32,
        estado: ApplicationStatus,
        comentarios: Option<&str>,
    ) -> Result<Option<ApplicationDetail>, DatabaseError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .db
            .execute_on(
                &mut *tx,
                "UPDATE applications SET estado = $1, comentarios = COALESCE($2, comentarios), \
                 updated_at = CURRENT_TIMESTAMP WHERE id = $3",
                &sql_params![estado.as_str(), comentarios, id],
            )
            .await?;
        if updated == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!("{} WHERE a.id = $1", SELECT_DETAIL);
        let detail = self.db.fetch_optional_on(&mut *tx, &sql, &sql_params![id]).await?;
        tx.commit().await?;
        Ok(detail)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = self.db.fetch_one("SELECT COUNT(*) FROM applications", &[]).await?;
        Ok(count)
    }
}
