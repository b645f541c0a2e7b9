use crate::database::models::{Carrera, CarreraInput, CatalogRef};
use crate::database::{Database, DatabaseError};
use crate::sql_params;

const SELECT_CARRERA: &str = "SELECT c.id, c.nombre, c.facultad_id, f.nombre AS facultad_nombre, \
        f.universidad_id, u.nombre AS universidad_nombre \
    FROM carreras c \
    LEFT JOIN facultades f ON c.facultad_id = f.id \
    LEFT JOIN universidades u ON f.universidad_id = u.id";

pub struct CarreraRepository<'a> {
    db: &'a Database,
}

impl<'a> CarreraRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All majors, or those of one faculty
    pub async fn get_all(&self, facultad_id: Option<i32>) -> Result<Vec<Carrera>, DatabaseError> {
        match facultad_id {
            Some(facultad_id) => {
                let sql = format!("{} WHERE c.facultad_id = $1 ORDER BY c.nombre, c.id", SELECT_CARRERA);
                self.db.fetch_all(&sql, &sql_params![facultad_id]).await
            }
            None => {
                let sql = format!("{} ORDER BY u.nombre, f.nombre, c.nombre, c.id", SELECT_CARRERA);
                self.db.fetch_all(&sql, &[]).await
            }
        }
    }

    pub async fn options(&self) -> Result<Vec<CatalogRef>, DatabaseError> {
        self.db
            .fetch_all("SELECT id, nombre FROM carreras ORDER BY nombre, id", &[])
            .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Carrera>, DatabaseError> {
        let sql = format!("{} WHERE c.id = $1", SELECT_CARRERA);
        self.db.fetch_optional(&sql, &sql_params![id]).await
    }

    pub async fn find_ref(&self, id: i32) -> Result<Option<CatalogRef>, DatabaseError> {
        self.db
            .fetch_optional("SELECT id, nombre FROM carreras WHERE id = $1", &sql_params![id])
            .await
    }

    pub async fn create(&self, input: &CarreraInput) -> Result<Carrera, DatabaseError> {
        let (id,): (i32,) = self
            .db
            .fetch_one(
                "INSERT INTO carreras (nombre, facultad_id) VALUES ($1, $2) RETURNING id",
                &sql_params![input.nombre.trim(), input.facultad_id],
            )
            .await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("carrera {}", id)))
    }

    pub async fn update(&self, id: i32, input: &CarreraInput) -> Result<Option<Carrera>, DatabaseError> {
        let updated: Option<(i32,)> = self
            .db
            .fetch_optional(
                "UPDATE carreras SET nombre = $1, facultad_id = COALESCE($2, facultad_id) \
                 WHERE id = $3 RETURNING id",
                &sql_params![input.nombre.trim(), input.facultad_id, id],
            )
            .await?;
        match updated {
            Some(_) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let deleted = self
            .db
            .execute("DELETE FROM carreras WHERE id = $1", &sql_params![id])
            .await?;
        Ok(deleted > 0)
    }
}
