use crate::database::models::{Convocatoria, ConvocatoriaInput};
use crate::database::{Database, DatabaseError};
use crate::sql_params;

const CONVOCATORIA_COLUMNS: &str = "id, titulo, descripcion, fecha, imagen, created_at, updated_at";

pub struct ConvocatoriaRepository<'a> {
    db: &'a Database,
}

impl<'a> ConvocatoriaRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<Convocatoria>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM convocatorias ORDER BY fecha DESC, id DESC",
            CONVOCATORIA_COLUMNS
        );
        self.db.fetch_all(&sql, &[]).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Convocatoria>, DatabaseError> {
        let sql = format!("SELECT {} FROM convocatorias WHERE id = $1", CONVOCATORIA_COLUMNS);
        self.db.fetch_optional(&sql, &sql_params![id]).await
    }

    pub async fn create(&self, input: &ConvocatoriaInput) -> Result<Convocatoria, DatabaseError> {
        let sql = format!(
            "INSERT INTO convocatorias (titulo, descripcion, fecha, imagen) VALUES ($1, $2, $3, $4) RETURNING {}",
            CONVOCATORIA_COLUMNS
        );
        self.db
            .fetch_one(
                &sql,
                &sql_params![
                    input.titulo.trim(),
                    input.descripcion.trim(),
                    input.fecha,
                    input.imagen.as_deref()
                ],
            )
            .await
    }

    /// Update a convocatoria.
    ///
    /// Returns the updated row and, when a new image replaced an old one,
    /// the old image path so the caller can remove the file.
    pub async fn update(
        &self,
        id: i32,
        input: &ConvocatoriaInput,
    ) -> Result<Option<(Convocatoria, Option<String>)>, DatabaseError> {
        let mut tx = self.db.begin().await?;

        let current: Option<(Option<String>,)> = self
            .db
            .fetch_optional_on(
                &mut *tx,
                "SELECT imagen FROM convocatorias WHERE id = $1 FOR UPDATE",
                &sql_params![id],
            )
            .await?;
        let Some((previous_image,)) = current else {
            tx.rollback().await?;
            return Ok(None);
        };

        let sql = format!(
            "UPDATE convocatorias SET titulo = $1, descripcion = $2, fecha = $3, \
                 imagen = COALESCE($4, imagen), updated_at = CURRENT_TIMESTAMP \
             WHERE id = $5 RETURNING {}",
            CONVOCATORIA_COLUMNS
        );
        let updated: Convocatoria = self
            .db
            .fetch_one_on(
                &mut *tx,
                &sql,
                &sql_params![
                    input.titulo.trim(),
                    input.descripcion.trim(),
                    input.fecha,
                    input.imagen.as_deref(),
                    id
                ],
            )
            .await?;
        tx.commit().await?;

        let replaced = match (&input.imagen, previous_image) {
            (Some(new_image), Some(old)) if *new_image != old => Some(old),
            _ => None,
        };
        Ok(Some((updated, replaced)))
    }

    /// Delete the row in a single statement, returning its image path.
    ///
    /// `None` means no such row; `Some(None)` means it had no image.
    pub async fn delete(&self, id: i32) -> Result<Option<Option<String>>, DatabaseError> {
        let deleted: Option<(Option<String>,)> = self
            .db
            .fetch_optional(
                "DELETE FROM convocatorias WHERE id = $1 RETURNING imagen",
                &sql_params![id],
            )
            .await?;
        Ok(deleted.map(|(imagen,)| imagen))
    }
}
