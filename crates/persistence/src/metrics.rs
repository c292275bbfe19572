//! Storage metrics collection.

use metrics::{counter, histogram};
use std::time::Instant;

/// Times a storage operation and records it under its backend and name.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new(Backend::Postgres, "find_calculation_by_id");
/// let result = sqlx::query_as::<_, CalculationEntity>(...).fetch_optional(&pool).await;
/// timer.finish(result.is_ok());
/// result
/// ```
pub struct QueryTimer {
    backend: Backend,
    query_name: &'static str,
    start: Instant,
}

/// Storage backend label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Memory => "memory",
        }
    }
}

impl QueryTimer {
    pub fn new(backend: Backend, query_name: &'static str) -> Self {
        Self {
            backend,
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration, and count the query as failed when `ok` is false.
    pub fn finish(self, ok: bool) {
        let duration = self.start.elapsed().as_secs_f64();

        histogram!(
            "storage_query_duration_seconds",
            "backend" => self.backend.as_str(),
            "query" => self.query_name
        )
        .record(duration);

        if !ok {
            counter!(
                "storage_query_errors_total",
                "backend" => self.backend.as_str(),
                "query" => self.query_name
            )
            .increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new(Backend::Postgres, "count_calculations");
        assert_eq!(timer.query_name, "count_calculations");
        assert_eq!(timer.backend, Backend::Postgres);
    }

    #[test]
    fn test_finish_without_recorder() {
        // No global recorder installed: recording is a no-op.
        QueryTimer::new(Backend::Memory, "insert_calculation").finish(false);
    }

    #[test]
    fn test_backend_labels() {
        assert_eq!(Backend::Postgres.as_str(), "postgres");
        assert_eq!(Backend::Memory.as_str(), "memory");
    }
}
