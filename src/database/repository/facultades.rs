use crate::database::models::{CatalogRef, Facultad, FacultadInput};
use crate::database::{Database, DatabaseError};
use crate::sql_params;

const SELECT_FACULTAD: &str = "SELECT f.id, f.nombre, f.universidad_id, u.nombre AS universidad_nombre \
    FROM facultades f LEFT JOIN universidades u ON f.universidad_id = u.id";

pub struct FacultadRepository<'a> {
    db: &'a Database,
}

impl<'a> FacultadRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All faculties, or those of one university
    pub async fn get_all(&self, universidad_id: Option<i32>) -> Result<Vec<Facultad>, DatabaseError> {
        match universidad_id {
            Some(universidad_id) => {
                let sql = format!("{} WHERE f.universidad_id = $1 ORDER BY f.nombre, f.id", SELECT_FACULTAD);
                self.db.fetch_all(&sql, &sql_params![universidad_id]).await
            }
            None => {
                let sql = format!("{} ORDER BY u.nombre, f.nombre, f.id", SELECT_FACULTAD);
                self.db.fetch_all(&sql, &[]).await
            }
        }
    }

    pub async fn options(&self) -> Result<Vec<CatalogRef>, DatabaseError> {
        self.db
            .fetch_all("SELECT id, nombre FROM facultades ORDER BY nombre, id", &[])
            .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Facultad>, DatabaseError> {
        let sql = format!("{} WHERE f.id = $1", SELECT_FACULTAD);
        self.db.fetch_optional(&sql, &sql_params![id]).await
    }

    pub async fn find_ref(&self, id: i32) -> Result<Option<CatalogRef>, DatabaseError> {
        self.db
            .fetch_optional("SELECT id, nombre FROM facultades WHERE id = $1", &sql_params![id])
            .await
    }

    pub async fn create(&self, input: &FacultadInput) -> Result<Facultad, DatabaseError> {
        let (id,): (i32,) = self
            .db
            .fetch_one(
                "INSERT INTO facultades (nombre, universidad_id) VALUES ($1, $2) RETURNING id",
                &sql_params![input.nombre.trim(), input.universidad_id],
            )
            .await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("facultad {}", id)))
    }

    pub async fn update(&self, id: i32, input: &FacultadInput) -> Result<Option<Facultad>, DatabaseError> {
        let updated: Option<(i32,)> = self
            .db
            .fetch_optional(
                "UPDATE facultades SET nombre = $1, universidad_id = COALESCE($2, universidad_id) \
                 WHERE id = $3 RETURNING id",
                &sql_params![input.nombre.trim(), input.universidad_id, id],
            )
            .await?;
        match updated {
            Some(_) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Deleting cascades to carreras and materias
    pub async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let deleted = self
            .db
            .execute("DELETE FROM facultades WHERE id = $1", &sql_params![id])
            .await?;
        Ok(deleted > 0)
    }
}
