use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::validation::{
    is_email_identifier, is_valid_clave, is_valid_email, is_valid_registration_email, split_apellidos,
};
use crate::auth::{hash_password, verify_password, AuthError};
use crate::database::models::{NewUser, User};
use crate::database::repository::UserRepository;
use crate::database::{Database, DatabaseError};
use crate::types::{MobilityType, Role};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{message}")]
    Invalid { field: &'static str, message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl AccountError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AccountError::Invalid {
            field,
            message: message.into(),
        }
    }

    fn required(field: &'static str) -> Self {
        Self::invalid(field, format!("{} is required", field))
    }
}

/// How strictly an incoming account is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMode {
    /// Self-service sign-up: every identity field required, role forced to alumno
    Registration,
    /// Bulk import by an administrator: role and placement taken as given
    Import,
}

/// Account fields as posted by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountInput {
    pub nombres: Option<String>,
    /// Both surnames in one string, split at the first whitespace
    pub apellidos: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub clave: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub rol: Option<String>,
    pub tipo_movilidad: Option<String>,
    pub ciclo_escolar_inicio: Option<String>,
    pub ciclo_escolar_final: Option<String>,
    pub universidad_id: Option<i32>,
    pub facultad_id: Option<i32>,
    pub carrera_id: Option<i32>,
    pub beca_id: Option<i32>,
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl AccountInput {
    /// Validate and normalize into a row ready for insertion
    pub fn into_new_user(self, mode: AccountMode) -> Result<NewUser, AccountError> {
        let nombres = present(&self.nombres).ok_or_else(|| AccountError::required("nombres"))?;
        let email = present(&self.email)
            .map(|e| e.to_lowercase())
            .ok_or_else(|| AccountError::required("email"))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AccountError::required("password"))?;

        let (apellido_paterno, apellido_materno) = match present(&self.apellido_paterno) {
            Some(paterno) => (Some(paterno), present(&self.apellido_materno)),
            None => match present(&self.apellidos) {
                Some(apellidos) => {
                    let (paterno, materno) = split_apellidos(&apellidos);
                    (Some(paterno), materno)
                }
                None => (None, None),
            },
        };

        let email_ok = match mode {
            AccountMode::Registration => is_valid_registration_email(&email),
            AccountMode::Import => is_valid_email(&email),
        };
        if !email_ok {
            return Err(AccountError::invalid("email", "invalid email format"));
        }

        let clave = present(&self.clave);
        if let Some(clave) = &clave {
            if !is_valid_clave(clave) {
                return Err(AccountError::invalid("clave", "clave must be exactly 6 digits"));
            }
        }

        let tipo_movilidad = match present(&self.tipo_movilidad) {
            Some(tipo) => Some(
                tipo.parse::<MobilityType>()
                    .map_err(|e| AccountError::invalid("tipo_movilidad", e.to_string()))?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };

        let rol = match mode {
            AccountMode::Registration => {
                if apellido_paterno.is_none() {
                    return Err(AccountError::required("apellidos"));
                }
                if clave.is_none() {
                    return Err(AccountError::required("clave"));
                }
                Role::Alumno
            }
            AccountMode::Import => match present(&self.rol) {
                Some(rol) => rol.parse::<Role>().map_err(|e| AccountError::invalid("rol", e.to_string()))?,
                None => Role::Alumno,
            },
        };

        Ok(NewUser {
            nombres,
            apellido_paterno: apellido_paterno.unwrap_or_default(),
            apellido_materno,
            clave,
            telefono: present(&self.telefono),
            email,
            password,
            rol: Some(rol.as_str().to_string()),
            tipo_movilidad,
            ciclo_escolar_inicio: present(&self.ciclo_escolar_inicio),
            ciclo_escolar_final: present(&self.ciclo_escolar_final),
            universidad_id: self.universidad_id,
            facultad_id: self.facultad_id,
            carrera_id: self.carrera_id,
            beca_id: self.beca_id,
        })
    }
}

/// Per-row outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

pub struct AccountService<'a> {
    db: &'a Database,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Hash the password and insert; duplicates surface as unique violations
    pub async fn create(&self, new: &NewUser) -> Result<User, AccountError> {
        let hash = hash_password(&new.password).await?;
        let user = UserRepository::new(self.db).create(new, &hash).await?;
        info!("Created user {} ({})", user.id, user.rol);
        Ok(user)
    }

    pub async fn register(&self, input: AccountInput) -> Result<User, AccountError> {
        let new = input.into_new_user(AccountMode::Registration)?;
        self.create(&new).await
    }

    /// Import rows independently; one bad row never aborts the rest
    pub async fn import(&self, rows: Vec<AccountInput>) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            let label = format!(
                "row {} ({} - {})",
                index + 1,
                present(&row.nombres).unwrap_or_else(|| "no name".into()),
                present(&row.email).unwrap_or_else(|| "no email".into()),
            );

            let result = match row.into_new_user(AccountMode::Import) {
                Ok(new) => self.create(&new).await.map(|_| ()),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => summary.successful += 1,
                Err(e) => {
                    let reason = match &e {
                        AccountError::Database(db) if db.is_unique_violation() => {
                            "email or code already exists".to_string()
                        }
                        AccountError::Database(_) | AccountError::Auth(_) => {
                            warn!("Import of {} failed: {}", label, e);
                            "could not be saved".to_string()
                        }
                        AccountError::Invalid { .. } => e.to_string(),
                    };
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", label, reason));
                }
            }
        }

        info!("User import finished: {} ok, {} failed", summary.successful, summary.failed);
        summary
    }

    /// Look up by email or clave and check the password.
    ///
    /// Unknown identifiers and wrong passwords fail identically.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> Result<User, AccountError> {
        let identifier = identifier.trim();
        let users = UserRepository::new(self.db);
        let user = if is_email_identifier(identifier) {
            users.find_by_email(identifier).await?
        } else {
            users.find_by_clave(identifier).await?
        };

        match user {
            Some(user) if verify_password(password, &user.password).await? => Ok(user),
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }

    /// Replace a password; `current` is checked unless an administrator acts for someone else
    pub async fn change_password(
        &self,
        user_id: i32,
        current: Option<&str>,
        new_password: &str,
        skip_check: bool,
    ) -> Result<bool, AccountError> {
        if new_password.is_empty() {
            return Err(AccountError::required("new_password"));
        }

        let users = UserRepository::new(self.db);
        let user = match users.find_by_id(user_id).await? {
            Some(user) => user,
            None => return Ok(false),
        };

        if !skip_check {
            let current = current.unwrap_or_default();
            if !verify_password(current, &user.password).await? {
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        let hash = hash_password(new_password).await?;
        Ok(users.update_password(user_id, &hash).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> AccountInput {
        AccountInput {
            nombres: Some("Ana".into()),
            apellidos: Some("Ruiz López".into()),
            clave: Some("123456".into()),
            email: Some(" A123456@Alumnos.UASLP.mx ".into()),
            password: Some("secret1".into()),
            ..AccountInput::default()
        }
    }

    #[test]
    fn registration_splits_surnames_and_forces_alumno() {
        let mut input = registration();
        input.rol = Some("administrador".into());
        let new = input.into_new_user(AccountMode::Registration).unwrap();
        assert_eq!(new.apellido_paterno, "Ruiz");
        assert_eq!(new.apellido_materno.as_deref(), Some("López"));
        assert_eq!(new.email, "a123456@alumnos.uaslp.mx");
        assert_eq!(new.rol.as_deref(), Some("alumno"));
    }

    #[test]
    fn explicit_surnames_take_precedence() {
        let mut input = registration();
        input.apellido_paterno = Some("Pérez".into());
        input.apellido_materno = Some("Gómez".into());
        let new = input.into_new_user(AccountMode::Registration).unwrap();
        assert_eq!(new.apellido_paterno, "Pérez");
        assert_eq!(new.apellido_materno.as_deref(), Some("Gómez"));
    }

    #[test]
    fn registration_requires_clave_and_surnames() {
        let mut input = registration();
        input.clave = None;
        assert!(matches!(
            input.into_new_user(AccountMode::Registration),
            Err(AccountError::Invalid { field: "clave", .. })
        ));

        let mut input = registration();
        input.apellidos = Some("  ".into());
        assert!(matches!(
            input.into_new_user(AccountMode::Registration),
            Err(AccountError::Invalid { field: "apellidos", .. })
        ));
    }

    #[test]
    fn rejects_short_clave_and_bad_email() {
        let mut input = registration();
        input.clave = Some("12345".into());
        assert!(matches!(
            input.into_new_user(AccountMode::Registration),
            Err(AccountError::Invalid { field: "clave", .. })
        ));

        let mut input = registration();
        input.email = Some("nobody".into());
        assert!(matches!(
            input.into_new_user(AccountMode::Registration),
            Err(AccountError::Invalid { field: "email", .. })
        ));
    }

    #[test]
    fn import_keeps_role_and_validates_mobility_type() {
        let input = AccountInput {
            nombres: Some("Luis".into()),
            email: Some("luis@uaslp.mx".into()),
            password: Some("123456".into()),
            rol: Some("becarios".into()),
            tipo_movilidad: Some("movilidad_virtual".into()),
            ..AccountInput::default()
        };
        let new = input.clone().into_new_user(AccountMode::Import).unwrap();
        assert_eq!(new.rol.as_deref(), Some("becarios"));
        assert_eq!(new.clave, None);
        assert_eq!(new.apellido_paterno, "");

        let mut bad = input;
        bad.tipo_movilidad = Some("turismo".into());
        assert!(matches!(
            bad.into_new_user(AccountMode::Import),
            Err(AccountError::Invalid { field: "tipo_movilidad", .. })
        ));
    }
}
