use crate::database::models::{CatalogRef, Universidad, UniversidadInput};
use crate::database::{Database, DatabaseError};
use crate::sql_params;

pub struct UniversidadRepository<'a> {
    db: &'a Database,
}

impl<'a> UniversidadRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<Universidad>, DatabaseError> {
        self.db
            .fetch_all("SELECT id, nombre, direccion, pais FROM universidades ORDER BY nombre, id", &[])
            .await
    }

    pub async fn options(&self) -> Result<Vec<CatalogRef>, DatabaseError> {
        self.db
            .fetch_all("SELECT id, nombre FROM universidades ORDER BY nombre, id", &[])
            .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Universidad>, DatabaseError> {
        self.db
            .fetch_optional(
                "SELECT id, nombre, direccion, pais FROM universidades WHERE id = $1",
                &sql_params![id],
            )
            .await
    }

    pub async fn create(&self, input: &UniversidadInput) -> Result<Universidad, DatabaseError> {
        self.db
            .fetch_one(
                "INSERT INTO universidades (nombre, direccion, pais) VALUES ($1, $2, $3) \
                 RETURNING id, nombre, direccion, pais",
                &sql_params![input.nombre.trim(), input.direccion.as_deref(), input.pais.as_deref().map(str::trim)],
            )
            .await
    }

    pub async fn update(&self, id: i32, input: &UniversidadInput) -> Result<Option<Universidad>, DatabaseError> {
        self.db
            .fetch_optional(
                "UPDATE universidades SET nombre = $1, direccion = $2, pais = $3 WHERE id = $4 \
                 RETURNING id, nombre, direccion, pais",
                &sql_params![input.nombre.trim(), input.direccion.as_deref(), input.pais.as_deref().map(str::trim), id],
            )
            .await
    }

    /// Deleting cascades to facultades, carreras and materias
    pub async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let deleted = self
            .db
            .execute("DELETE FROM universidades WHERE id = $1", &sql_params![id])
            .await?;
        Ok(deleted > 0)
    }
}
