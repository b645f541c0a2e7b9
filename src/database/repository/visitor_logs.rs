use std::str::FromStr;

use crate::database::models::{CountRow, NewVisit, VisitorLog, VisitorLogEntry, VisitorTotals};
use crate::database::{Database, DatabaseError};
use crate::filter::{ColumnScope, Filter, SqlResult};
use crate::sql_params;

/// Bucket size for visits-over-time reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Hour,
    Day,
    Week,
    Month,
}

impl Period {
    /// `TO_CHAR` format of one bucket
    fn format(&self) -> &'static str {
        match self {
            Period::Hour => "YYYY-MM-DD HH24:00",
            Period::Day => "YYYY-MM-DD",
            Period::Week => "IYYY-IW",
            Period::Month => "YYYY-MM",
        }
    }

    /// How far back the report looks
    fn window(&self) -> &'static str {
        match self {
            Period::Hour => "1 day",
            Period::Day => "30 days",
            Period::Week => "12 weeks",
            Period::Month => "12 months",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hour" => Ok(Period::Hour),
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(other.to_string()),
        }
    }
}

pub struct VisitorLogRepository<'a> {
    db: &'a Database,
}

impl<'a> VisitorLogRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record a visit. A user id that no longer exists is stored as NULL.
    pub async fn log(&self, visit: &NewVisit) -> Result<VisitorLog, DatabaseError> {
        self.db
            .fetch_one(
                "INSERT INTO visitor_logs (user_id, ip_address, user_agent, page_visited, action, session_id) \
                 VALUES ((SELECT id FROM users WHERE id = $1), $2, $3, $4, COALESCE($5, 'visit'), $6) \
                 RETURNING *",
                &sql_params![
                    visit.user_id,
                    visit.ip_address.as_deref(),
                    visit.user_agent.as_deref(),
                    visit.page_visited.as_deref(),
                    visit.action.as_deref(),
                    visit.session_id.as_deref()
                ],
            )
            .await
    }

    fn conditions(filter: &Filter) -> Result<SqlResult, DatabaseError> {
        Ok(filter.to_sql(&ColumnScope::VISITOR_LOGS, 1)?)
    }

    /// Filtered log rows with visitor names, newest first
    pub async fn entries(&self, filter: &Filter, limit: i64, offset: i64) -> Result<Vec<VisitorLogEntry>, DatabaseError> {
        let conditions = Self::conditions(filter)?;
        let next = conditions.params.len() + 1;
        let sql = format!(
            "SELECT vl.*, u.nombres, u.apellido_paterno, u.email \
             FROM visitor_logs vl LEFT JOIN users u ON vl.user_id = u.id \
             {} ORDER BY vl.created_at DESC, vl.id DESC LIMIT ${} OFFSET ${}",
            conditions.where_sql(),
            next,
            next + 1
        );
        let mut params = conditions.params;
        params.extend(sql_params![limit, offset]);
        self.db.fetch_all(&sql, &params).await
    }

    pub async fn totals(&self, filter: &Filter) -> Result<VisitorTotals, DatabaseError> {
        let conditions = Self::conditions(filter)?;
        let sql = format!(
            "SELECT COUNT(*) AS total_visits, \
                    COUNT(DISTINCT vl.user_id) AS unique_users, \
                    COUNT(DISTINCT vl.ip_address) AS unique_ips, \
                    COUNT(DISTINCT vl.session_id) AS unique_sessions \
             FROM visitor_logs vl {}",
            conditions.where_sql()
        );
        self.db.fetch_one(&sql, &conditions.params).await
    }

    pub async fn top_pages(&self, filter: &Filter, limit: i64) -> Result<Vec<CountRow>, DatabaseError> {
        self.top_by("page_visited", filter, limit).await
    }

    pub async fn top_actions(&self, filter: &Filter, limit: i64) -> Result<Vec<CountRow>, DatabaseError> {
        self.top_by("action", filter, limit).await
    }

    async fn top_by(&self, column: &'static str, filter: &Filter, limit: i64) -> Result<Vec<CountRow>, DatabaseError> {
        let conditions = Self::conditions(filter)?;
        let sql = format!(
            "SELECT NULL::int AS id, vl.{column} AS label, COUNT(*) AS value \
             FROM visitor_logs vl {} \
             GROUP BY vl.{column} ORDER BY value DESC, label LIMIT ${}",
            conditions.where_sql(),
            conditions.params.len() + 1,
            column = column
        );
        let mut params = conditions.params;
        params.extend(sql_params![limit]);
        self.db.fetch_all(&sql, &params).await
    }

    /// Visits per day over the last 30 days
    pub async fn daily(&self, filter: &Filter) -> Result<Vec<CountRow>, DatabaseError> {
        let conditions = Self::conditions(filter)?;
        let sql = format!(
            "SELECT NULL::int AS id, TO_CHAR(vl.created_at, 'YYYY-MM-DD') AS label, COUNT(*) AS value \
             FROM visitor_logs vl \
             WHERE vl.created_at >= CURRENT_DATE - INTERVAL '30 days'{} \
             GROUP BY 2 ORDER BY 2 DESC",
            conditions.and_sql()
        );
        self.db.fetch_all(&sql, &conditions.params).await
    }

    /// Visits per hour of day
    pub async fn hourly(&self, filter: &Filter) -> Result<Vec<CountRow>, DatabaseError> {
        let conditions = Self::conditions(filter)?;
        let sql = format!(
            "SELECT NULL::int AS id, LPAD(EXTRACT(HOUR FROM vl.created_at)::int::text, 2, '0') AS label, \
                    COUNT(*) AS value \
             FROM visitor_logs vl {} \
             GROUP BY 2 ORDER BY 2",
            conditions.where_sql()
        );
        self.db.fetch_all(&sql, &conditions.params).await
    }

    /// Visits bucketed by `period` within its window
    pub async fn by_period(&self, period: Period) -> Result<Vec<CountRow>, DatabaseError> {
        let sql = format!(
            "SELECT NULL::int AS id, TO_CHAR(vl.created_at, '{}') AS label, COUNT(*) AS value \
             FROM visitor_logs vl \
             WHERE vl.created_at >= NOW() - INTERVAL '{}' \
             GROUP BY 2 ORDER BY 2 DESC",
            period.format(),
            period.window()
        );
        self.db.fetch_all(&sql, &[]).await
    }

    /// Visits per hour of day over the last 30 days
    pub async fn recent_hourly(&self) -> Result<Vec<CountRow>, DatabaseError> {
        self.db
            .fetch_all(
                "SELECT NULL::int AS id, LPAD(EXTRACT(HOUR FROM vl.created_at)::int::text, 2, '0') AS label, \
                        COUNT(*) AS value \
                 FROM visitor_logs vl \
                 WHERE vl.created_at >= NOW() - INTERVAL '30 days' \
                 GROUP BY 2 ORDER BY 2",
                &[],
            )
            .await
    }

    /// Most visited pages in the last 30 days
    pub async fn recent_pages(&self, limit: i64) -> Result<Vec<CountRow>, DatabaseError> {
        self.db
            .fetch_all(
                "SELECT NULL::int AS id, vl.page_visited AS label, COUNT(*) AS value \
                 FROM visitor_logs vl \
                 WHERE vl.created_at >= NOW() - INTERVAL '30 days' \
                 GROUP BY vl.page_visited ORDER BY value DESC, label LIMIT $1",
                &sql_params![limit],
            )
            .await
    }

    /// Totals over the last 30 days
    pub async fn recent_totals(&self) -> Result<VisitorTotals, DatabaseError> {
        self.db
            .fetch_one(
                "SELECT COUNT(*) AS total_visits, \
                        COUNT(DISTINCT vl.user_id) AS unique_users, \
                        COUNT(DISTINCT vl.ip_address) AS unique_ips, \
                        COUNT(DISTINCT vl.session_id) AS unique_sessions \
                 FROM visitor_logs vl \
                 WHERE vl.created_at >= NOW() - INTERVAL '30 days'",
                &[],
            )
            .await
    }
}
