use crate::database::models::{Beca, BecaInput, CatalogRef};
use crate::database::{Database, DatabaseError};
use crate::sql_params;

pub struct BecaRepository<'a> {
    db: &'a Database,
}

impl<'a> BecaRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<Beca>, DatabaseError> {
        self.db
            .fetch_all("SELECT id, nombre, pais FROM becas ORDER BY nombre, id", &[])
            .await
    }

    pub async fn options(&self) -> Result<Vec<CatalogRef>, DatabaseError> {
        self.db
            .fetch_all("SELECT id, nombre FROM becas ORDER BY nombre, id", &[])
            .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Beca>, DatabaseError> {
        self.db
            .fetch_optional("SELECT id, nombre, pais FROM becas WHERE id = $1", &sql_params![id])
            .await
    }

    /// Duplicate (nombre, pais) surfaces as `UniqueViolation`
    pub async fn create(&self, input: &BecaInput) -> Result<Beca, DatabaseError> {
        self.db
            .fetch_one(
                "INSERT INTO becas (nombre, pais) VALUES ($1, $2) RETURNING id, nombre, pais",
                &sql_params![input.nombre.trim(), input.pais.as_deref().map(str::trim)],
            )
            .await
    }

    pub async fn update(&self, id: i32, input: &BecaInput) -> Result<Option<Beca>, DatabaseError> {
        self.db
            .fetch_optional(
                "UPDATE becas SET nombre = $1, pais = $2 WHERE id = $3 RETURNING id, nombre, pais",
                &sql_params![input.nombre.trim(), input.pais.as_deref().map(str::trim), id],
            )
            .await
    }

    pub async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let deleted = self
            .db
            .execute("DELETE FROM becas WHERE id = $1", &sql_params![id])
            .await?;
        Ok(deleted > 0)
    }
}
