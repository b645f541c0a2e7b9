use crate::database::models::{Materia, MateriaInput};
use crate::database::{Database, DatabaseError};
use crate::sql_params;

const SELECT_MATERIA: &str = "SELECT m.id, m.nombre, m.clave, m.maestro, m.carrera_id, c.nombre AS carrera_nombre \
    FROM materias m LEFT JOIN carreras c ON m.carrera_id = c.id";

pub struct MateriaRepository<'a> {
    db: &'a Database,
}

impl<'a> MateriaRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn get_all(&self, carrera_id: Option<i32>) -> Result<Vec<Materia>, DatabaseError> {
        match carrera_id {
            Some(carrera_id) => {
                let sql = format!("{} WHERE m.carrera_id = $1 ORDER BY m.nombre, m.id", SELECT_MATERIA);
                self.db.fetch_all(&sql, &sql_params![carrera_id]).await
            }
            None => {
                let sql = format!("{} ORDER BY m.nombre, m.id", SELECT_MATERIA);
                self.db.fetch_all(&sql, &[]).await
            }
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Materia>, DatabaseError> {
        let sql = format!("{} WHERE m.id = $1", SELECT_MATERIA);
        self.db.fetch_optional(&sql, &sql_params![id]).await
    }

    pub async fn create(&self, input: &MateriaInput) -> Result<Materia, DatabaseError> {
        let (id,): (i32,) = self
            .db
            .fetch_one(
                "INSERT INTO materias (nombre, clave, maestro, carrera_id) VALUES ($1, $2, $3, $4) RETURNING id",
                &sql_params![
                    input.nombre.trim(),
                    input.clave.as_deref(),
                    input.maestro.as_deref(),
                    input.carrera_id
                ],
            )
            .await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("materia {}", id)))
    }

    pub async fn update(&self, id: i32, input: &MateriaInput) -> Result<Option<Materia>, DatabaseError> {
        let updated: Option<(i32,)> = self
            .db
            .fetch_optional(
                "UPDATE materias SET nombre = $1, clave = $2, maestro = $3, carrera_id = COALESCE($4, carrera_id) \
                 WHERE id = $5 RETURNING id",
                &sql_params![
                    input.nombre.trim(),
                    input.clave.as_deref(),
                    input.maestro.as_deref(),
                    input.carrera_id,
                    id
                ],
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
            .execute("DELETE FROM materias WHERE id = $1", &sql_params![id])
            .await?;
        Ok(deleted > 0)
    }
}
