use once_cell::sync::Lazy;
use regex::Regex;

/// Institutional student/staff addresses, or any plausible address
static REGISTRATION_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(a\d{6}@alumnos\.uaslp\.mx|[^\s@]+@uaslp\.mx)|[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

pub fn is_valid_registration_email(email: &str) -> bool {
    REGISTRATION_EMAIL.is_match(email.trim())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

/// A clave is exactly six ASCII digits
pub fn is_valid_clave(clave: &str) -> bool {
    clave.len() == 6 && clave.bytes().all(|b| b.is_ascii_digit())
}

/// Login identifiers containing `@` are emails, anything else is a clave
pub fn is_email_identifier(identifier: &str) -> bool {
    identifier.contains('@')
}

/// Split `"Ruiz López"` into paternal and maternal surnames at the first whitespace
pub fn split_apellidos(apellidos: &str) -> (String, Option<String>) {
    let apellidos = apellidos.trim();
    match apellidos.split_once(char::is_whitespace) {
        Some((paterno, materno)) => {
            let materno = materno.trim();
            (
                paterno.to_string(),
                (!materno.is_empty()).then(|| materno.to_string()),
            )
        }
        None => (apellidos.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_email_accepts_institutional_and_general_addresses() {
        assert!(is_valid_registration_email("a123456@alumnos.uaslp.mx"));
        assert!(is_valid_registration_email("profesor@uaslp.mx"));
        assert!(is_valid_registration_email(" visitor@example.org "));
        assert!(!is_valid_registration_email("no-at-sign"));
        assert!(!is_valid_registration_email("user@localhost"));
    }

    #[test]
    fn clave_must_be_six_digits() {
        assert!(is_valid_clave("123456"));
        assert!(!is_valid_clave("12345"));
        assert!(!is_valid_clave("1234567"));
        assert!(!is_valid_clave("12a456"));
        assert!(!is_valid_clave("١٢٣٤٥٦"));
    }

    #[test]
    fn splits_surnames_at_first_whitespace() {
        assert_eq!(split_apellidos("Ruiz"), ("Ruiz".to_string(), None));
        assert_eq!(
            split_apellidos(" Ruiz  López Pérez "),
            ("Ruiz".to_string(), Some("López Pérez".to_string()))
        );
    }

    #[test]
    fn identifier_kind() {
        assert!(is_email_identifier("a123456@alumnos.uaslp.mx"));
        assert!(!is_email_identifier("123456"));
    }
}
