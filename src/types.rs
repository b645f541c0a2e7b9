/// Shared domain enums used across repositories, handlers and reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access role stored in `users.rol`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Alumno,
    Becarios,
    Administrador,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Alumno, Role::Becarios, Role::Administrador];

    /// Roles allowed to manage announcements and review applications
    pub const STAFF: &'static [Role] = &[Role::Becarios, Role::Administrador];
    pub const ADMIN: &'static [Role] = &[Role::Administrador];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Alumno => "alumno",
            Role::Becarios => "becarios",
            Role::Administrador => "administrador",
        }
    }
}

/// Mobility category stored in `users.tipo_movilidad`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobilityType {
    MovilidadInternacional,
    MovilidadVirtual,
    VisitanteNacional,
    VisitanteInternacional,
}

impl MobilityType {
    pub const ALL: [MobilityType; 4] = [
        MobilityType::MovilidadInternacional,
        MobilityType::MovilidadVirtual,
        MobilityType::VisitanteNacional,
        MobilityType::VisitanteInternacional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MobilityType::MovilidadInternacional => "movilidad_internacional",
            MobilityType::MovilidadVirtual => "movilidad_virtual",
            MobilityType::VisitanteNacional => "visitante_nacional",
            MobilityType::VisitanteInternacional => "visitante_internacional",
        }
    }

    pub fn is_visitor(&self) -> bool {
        matches!(self, MobilityType::VisitanteNacional | MobilityType::VisitanteInternacional)
    }
}

/// Lifecycle state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pendiente,
    EnRevision,
    Aceptada,
    Rechazada,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pendiente,
        ApplicationStatus::EnRevision,
        ApplicationStatus::Aceptada,
        ApplicationStatus::Rechazada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pendiente => "pendiente",
            ApplicationStatus::EnRevision => "en_revision",
            ApplicationStatus::Aceptada => "aceptada",
            ApplicationStatus::Rechazada => "rechazada",
        }
    }

    /// A review can only move an application into one of these states.
    pub fn is_review_outcome(&self) -> bool {
        !matches!(self, ApplicationStatus::Pendiente)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! str_enum {
    ($ty:ty) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == s)
                    .ok_or_else(|| UnknownVariant(s.to_string()))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Role);
str_enum!(MobilityType);
str_enum!(ApplicationStatus);
