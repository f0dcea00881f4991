//! A cached search.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use crate::query::{QueryExpression, Stage};

/// Compiled query plus its match count at creation time.
///
/// Everything except the last access time is fixed at creation.
#[derive(Debug)]
pub struct SearchSession {
    id: String,
    container_name: String,
    query: QueryExpression,
    stages: Vec<Stage>,
    total_count: u64,
    created_at: DateTime<Utc>,
    /// Milliseconds since the epoch
    last_accessed: AtomicI64,
}

impl SearchSession {
    pub fn new(
        id: impl Into<String>,
        container_name: impl Into<String>,
        query: QueryExpression,
        stages: Vec<Stage>,
        total_count: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            container_name: container_name.into(),
            query,
            stages,
            total_count,
            created_at,
            last_accessed: AtomicI64::new(created_at.timestamp_millis()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// The expression as submitted
    pub fn query(&self) -> &QueryExpression {
        &self.query
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        let millis = self.last_accessed.load(Ordering::Acquire);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(self.created_at)
    }

    pub(super) fn touch(&self, at: DateTime<Utc>) {
        self.last_accessed
            .fetch_max(at.timestamp_millis(), Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_touch_never_moves_backwards() {
        let created = Utc::now();
        let session = SearchSession::new("id", "c", QueryExpression::new(), vec![], 0, created);
        session.touch(created + Duration::seconds(10));
        session.touch(created + Duration::seconds(5));
        assert_eq!(
            session.last_accessed_at().timestamp_millis(),
            (created + Duration::seconds(10)).timestamp_millis()
        );
    }
}
