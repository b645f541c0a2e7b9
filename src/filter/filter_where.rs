use super::error::FilterError;
use super::types::{ColumnScope, FilterField, FilterOp, Predicate, SqlResult};
use crate::database::SqlParam;

/// Renders predicates as positional SQL conditions joined with AND
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn generate(
        predicates: &[Predicate],
        scope: &ColumnScope,
        starting_param_index: usize,
    ) -> Result<SqlResult, FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        for predicate in predicates {
            filter_where.push(predicate, scope)?;
        }
        Ok(filter_where.finish())
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        let placeholder = format!("${}", self.param_index);
        self.param_index += 1;
        placeholder
    }

    fn push(&mut self, predicate: &Predicate, scope: &ColumnScope) -> Result<(), FilterError> {
        let value = SqlParam::from(predicate.value.clone());

        let condition = match predicate.field.op() {
            FilterOp::Eq => {
                let column = Self::column(predicate.field, scope)?;
                format!("{} = {}", column, self.param(value))
            }
            FilterOp::OnOrAfter => format!("{} >= {}", scope.created_at, self.param(value)),
            FilterOp::OnOrBefore => format!("{} < {}::date + 1", scope.created_at, self.param(value)),
            FilterOp::EitherCycle => {
                let table = scope.application.unwrap_or(scope.user);
                let p = self.param(value);
                format!(
                    "({t}.ciclo_escolar_inicio = {p} OR {t}.ciclo_escolar_final = {p})",
                    t = table,
                    p = p
                )
            }
        };

        self.conditions.push(condition);
        Ok(())
    }

    /// Qualified column for an equality predicate
    fn column(field: FilterField, scope: &ColumnScope) -> Result<String, FilterError> {
        let column = match field {
            FilterField::UniversidadId
            | FilterField::FacultadId
            | FilterField::CarreraId
            | FilterField::BecaId
            | FilterField::TipoMovilidad => format!("{}.{}", scope.user, field.key()),
            FilterField::CicloEscolarInicio | FilterField::CicloEscolarFinal => {
                let table = scope.application.unwrap_or(scope.user);
                format!("{}.{}", table, field.key())
            }
            FilterField::Estado => match scope.application {
                Some(table) => format!("{}.estado", table),
                None => return Err(FilterError::UnsupportedField(field.key())),
            },
            FilterField::UserId | FilterField::PageVisited | FilterField::Action => match scope.visitor_log {
                Some(table) => format!("{}.{}", table, field.key()),
                None => return Err(FilterError::UnsupportedField(field.key())),
            },
            FilterField::FechaInicio | FilterField::FechaFin | FilterField::CicloEscolar => {
                return Err(FilterError::UnsupportedField(field.key()))
            }
        };
        Ok(column)
    }

    fn finish(self) -> SqlResult {
        SqlResult {
            clause: self.conditions.join(" AND "),
            params: self.param_values,
        }
    }
}
