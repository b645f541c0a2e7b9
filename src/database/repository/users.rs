use crate::database::models::{NewUser, User, UserDetail, UserField};
use crate::database::repository::{BecaRepository, CarreraRepository, FacultadRepository, UniversidadRepository};
use crate::database::{Database, DatabaseError, SqlParam};
use crate::filter::{ColumnScope, Filter};
use crate::sql_params;
use crate::types::Role;

const USER_COLUMNS: &str = "id, nombres, apellido_paterno, apellido_materno, clave, telefono, email, password, \
    rol, tipo_movilidad, ciclo_escolar_inicio, ciclo_escolar_final, \
    universidad_id, facultad_id, carrera_id, beca_id, created_at, updated_at";

pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a user. Email is stored lowercased; a duplicate email (in any
    /// case) or clave surfaces as `UniqueViolation`.
    pub async fn create(&self, new: &NewUser, password_hash: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (nombres, apellido_paterno, apellido_materno, clave, telefono, email, password, \
                 rol, tipo_movilidad, ciclo_escolar_inicio, ciclo_escolar_final, \
                 universidad_id, facultad_id, carrera_id, beca_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'alumno'), $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {}",
            USER_COLUMNS
        );
        let params = sql_params![
            new.nombres.trim(),
            new.apellido_paterno.trim(),
            new.apellido_materno.as_deref(),
            new.clave.as_deref(),
            new.telefono.as_deref(),
            new.email.trim().to_lowercase(),
            password_hash,
            new.rol.as_deref(),
            new.tipo_movilidad.as_deref(),
            new.ciclo_escolar_inicio.as_deref(),
            new.ciclo_escolar_final.as_deref(),
            new.universidad_id,
            new.facultad_id,
            new.carrera_id,
            new.beca_id,
        ];
        self.db.fetch_one(&sql, &params).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        self.db.fetch_optional(&sql, &sql_params![id]).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
        self.db.fetch_optional(&sql, &sql_params![email.trim()]).await
    }

    pub async fn find_by_clave(&self, clave: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE clave = $1", USER_COLUMNS);
        self.db.fetch_optional(&sql, &sql_params![clave.trim()]).await
    }

    /// Current stored role, used by the per-request role check
    pub async fn find_role(&self, id: i32) -> Result<Option<String>, DatabaseError> {
        let row: Option<(String,)> = self
            .db
            .fetch_optional("SELECT rol FROM users WHERE id = $1", &sql_params![id])
            .await?;
        Ok(row.map(|(rol,)| rol))
    }

    pub async fn get_all(&self) -> Result<Vec<User>, DatabaseError> {
        self.search(&Filter::new()).await
    }

    /// Users matching allow-listed placement filters, ordered by id
    pub async fn search(&self, filter: &Filter) -> Result<Vec<User>, DatabaseError> {
        let conditions = filter.to_sql(&ColumnScope::USERS, 1)?;
        let sql = format!(
            "SELECT {} FROM users u {} ORDER BY u.id",
            USER_COLUMNS,
            conditions.where_sql()
        );
        self.db.fetch_all(&sql, &conditions.params).await
    }

    pub async fn update_role(&self, id: i32, role: Role) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET rol = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        );
        self.db.fetch_optional(&sql, &sql_params![role.as_str(), id]).await
    }

    /// Set one allow-listed column
    pub async fn update_field(&self, id: i32, field: UserField, value: SqlParam) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET {} = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING {}",
            field.column(),
            USER_COLUMNS
        );
        self.db.fetch_optional(&sql, &[value, SqlParam::from(id)]).await
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> Result<bool, DatabaseError> {
        let updated = self
            .db
            .execute(
                "UPDATE users SET password = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
                &sql_params![password_hash, id],
            )
            .await?;
        Ok(updated > 0)
    }

    /// User with universidad, facultad, carrera and beca resolved.
    ///
    /// Lookups run concurrently; a NULL reference yields `None` without a query.
    pub async fn find_detail(&self, id: i32) -> Result<Option<UserDetail>, DatabaseError> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let universidades = UniversidadRepository::new(self.db);
        let facultades = FacultadRepository::new(self.db);
        let carreras = CarreraRepository::new(self.db);
        let becas = BecaRepository::new(self.db);

        let (universidad, facultad, carrera, beca) = tokio::try_join!(
            async {
                match user.universidad_id {
                    Some(id) => universidades.find_by_id(id).await,
                    None => Ok(None),
                }
            },
            async {
                match user.facultad_id {
                    Some(id) => facultades.find_ref(id).await,
                    None => Ok(None),
                }
            },
            async {
                match user.carrera_id {
                    Some(id) => carreras.find_ref(id).await,
                    None => Ok(None),
                }
            },
            async {
                match user.beca_id {
                    Some(id) => becas.find_by_id(id).await,
                    None => Ok(None),
                }
            },
        )?;

        Ok(Some(UserDetail {
            user,
            universidad,
            facultad,
            carrera,
            beca,
        }))
    }
}
