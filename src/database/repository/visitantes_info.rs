use crate::database::models::{VisitanteInfo, VisitanteInfoDetail, VisitanteInfoInput};
use crate::database::{Database, DatabaseError};
use crate::sql_params;
use crate::types::MobilityType;

const SELECT_DETAIL: &str = "SELECT vi.*, u.nombres, u.apellido_paterno, u.apellido_materno, \
        u.email, u.clave, u.tipo_movilidad \
    FROM visitantes_info vi JOIN users u ON vi.user_id = u.id";

pub struct VisitanteInfoRepository<'a> {
    db: &'a Database,
}

impl<'a> VisitanteInfoRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace the visitor info of one user in a single statement
    pub async fn upsert(&self, user_id: i32, input: &VisitanteInfoInput) -> Result<VisitanteInfo, DatabaseError> {
        self.db
            .fetch_one(
                "INSERT INTO visitantes_info (user_id, pais_origen, fecha_nacimiento, preparatoria, \
                     entidad_federativa, nombre_tutor, dni_curp, sexo) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (user_id) DO UPDATE SET \
                     pais_origen = EXCLUDED.pais_origen, \
                     fecha_nacimiento = EXCLUDED.fecha_nacimiento, \
                     preparatoria = EXCLUDED.preparatoria, \
                     entidad_federativa = EXCLUDED.entidad_federativa, \
                     nombre_tutor = EXCLUDED.nombre_tutor, \
                     dni_curp = EXCLUDED.dni_curp, \
                     sexo = EXCLUDED.sexo, \
                     updated_at = CURRENT_TIMESTAMP \
                 RETURNING *",
                &sql_params![
                    user_id,
                    input.pais_origen.as_deref(),
                    input.fecha_nacimiento,
                    input.preparatoria.as_deref(),
                    input.entidad_federativa.as_deref(),
                    input.nombre_tutor.as_deref(),
                    input.dni_curp.as_deref(),
                    input.sexo.as_deref()
                ],
            )
            .await
    }

    pub async fn find_by_user(&self, user_id: i32) -> Result<Option<VisitanteInfoDetail>, DatabaseError> {
        let sql = format!("{} WHERE vi.user_id = $1", SELECT_DETAIL);
        self.db.fetch_optional(&sql, &sql_params![user_id]).await
    }

    pub async fn get_all(&self) -> Result<Vec<VisitanteInfoDetail>, DatabaseError> {
        let sql = format!("{} ORDER BY vi.created_at DESC, vi.id DESC", SELECT_DETAIL);
        self.db.fetch_all(&sql, &[]).await
    }

    pub async fn get_by_tipo(&self, tipo: MobilityType) -> Result<Vec<VisitanteInfoDetail>, DatabaseError> {
        let sql = format!(
            "{} WHERE u.tipo_movilidad = $1 ORDER BY vi.created_at DESC, vi.id DESC",
            SELECT_DETAIL
        );
        self.db.fetch_all(&sql, &sql_params![tipo.as_str()]).await
    }

    pub async fn delete(&self, user_id: i32) -> Result<bool, DatabaseError> {
        let deleted = self
            .db
            .execute("DELETE FROM visitantes_info WHERE user_id = $1", &sql_params![user_id])
            .await?;
        Ok(deleted > 0)
    }
}
