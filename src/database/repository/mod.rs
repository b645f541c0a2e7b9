pub mod applications;
pub mod becas;
pub mod carreras;
pub mod convocatorias;
pub mod facultades;
pub mod materias;
pub mod universidades;
pub mod users;
pub mod visitantes_info;
pub mod visitor_logs;

pub use applications::ApplicationRepository;
pub use becas::BecaRepository;
pub use carreras::CarreraRepository;
pub use convocatorias::ConvocatoriaRepository;
pub use facultades::FacultadRepository;
pub use materias::MateriaRepository;
pub use universidades::UniversidadRepository;
pub use users::UserRepository;
pub use visitantes_info::VisitanteInfoRepository;
pub use visitor_logs::{Period, VisitorLogRepository};
