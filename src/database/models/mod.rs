pub mod application;
pub mod catalog;
pub mod convocatoria;
pub mod stats;
pub mod user;
pub mod visitor;

pub use application::{Application, ApplicationDetail, NewApplication, StoredFile};
pub use catalog::{
    Beca, BecaInput, Carrera, CarreraInput, CatalogRef, Facultad, FacultadInput, Materia, MateriaInput, Universidad,
    UniversidadInput,
};
pub use convocatoria::{Convocatoria, ConvocatoriaInput};
pub use stats::{CountRow, MovilidadReportRow, VisitanteReportRow, VisitorTotals};
pub use user::{NewUser, User, UserDetail, UserField};
pub use visitor::{NewVisit, VisitanteInfo, VisitanteInfoDetail, VisitanteInfoInput, VisitorLog, VisitorLogEntry};
