use std::env;
use std::time::Duration;

/// Connection settings for the garden database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL, possibly with a `?query` suffix.
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/plansow";

    /// Name of the environment variable holding the connection URL.
    pub const ENV_VAR: &str = "PLANSOW_DATABASE_URL";

    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    /// Database used to issue `CREATE DATABASE`.
    pub const MAINTENANCE_DB: &str = "postgres";

    /// `PLANSOW_DATABASE_URL`, or [`Self::DEFAULT_URL`] when unset.
    pub fn from_env() -> Self {
        let database_url =
            env::var(Self::ENV_VAR).unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self::new(database_url)
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(10),
        }
    }

    /// `(server, database, query)` parts of the URL. The server part keeps
    /// scheme, credentials, host and port.
    fn parts(&self) -> (&str, &str, Option<&str>) {
        let (base, query) = match self.database_url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (self.database_url.as_str(), None),
        };
        match base.rfind('/') {
            // "postgresql://host" has its last slash inside the scheme.
            Some(pos) if !base[..pos].ends_with('/') => (&base[..pos], &base[pos + 1..], query),
            _ => (base, "", query),
        }
    }

    /// The database name in the URL, if there is one.
    pub fn database_name(&self) -> Option<&str> {
        let (_, name, _) = self.parts();
        Some(name).filter(|n| !n.is_empty())
    }

    /// Same server and query options, pointed at another database.
    pub fn for_database(&self, name: &str) -> Self {
        let (server, _, query) = self.parts();
        let mut url = format!("{server}/{name}");
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        Self {
            database_url: url,
            ..self.clone()
        }
    }

    /// Config for the maintenance database on the same server, single connection.
    pub fn maintenance(&self) -> Self {
        Self {
            max_connections: 1,
            ..self.for_database(Self::MAINTENANCE_DB)
        }
    }

    /// The URL with any password replaced by `***`, for logs and errors.
    pub fn redacted_url(&self) -> String {
        let url = &self.database_url;
        let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
            return url.clone();
        };
        let Some(at) = url[scheme_end..].find('@').map(|i| i + scheme_end) else {
            return url.clone();
        };
        match url[scheme_end..at].find(':') {
            Some(colon) => format!("{}:***{}", &url[..scheme_end + colon], &url[at..]),
            None => url.clone(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = DbConfig::new(DbConfig::DEFAULT_URL);
        assert_eq!(cfg.database_name(), Some("plansow"));
        assert_eq!(cfg.max_connections, DbConfig::DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn database_name_strips_query_string() {
        let cfg = DbConfig::new("postgresql://localhost:5432/garden?sslmode=disable");
        assert_eq!(cfg.database_name(), Some("garden"));
    }

    #[test]
    fn database_name_missing() {
        assert_eq!(DbConfig::new("postgresql://localhost:5432/").database_name(), None);
        assert_eq!(DbConfig::new("postgresql://localhost:5432").database_name(), None);
    }

    #[test]
    fn maintenance_keeps_server_and_query() {
        let cfg = DbConfig::new("postgresql://gardener@db:5433/plansow?sslmode=require");
        let maint = cfg.maintenance();
        assert_eq!(
            maint.database_url,
            "postgresql://gardener@db:5433/postgres?sslmode=require"
        );
        assert_eq!(maint.max_connections, 1);
    }

    #[test]
    fn for_database_on_bare_server() {
        let cfg = DbConfig::new("postgresql://localhost:5432");
        assert_eq!(
            cfg.for_database("allotment").database_url,
            "postgresql://localhost:5432/allotment"
        );
    }

    #[test]
    fn redacted_url_hides_password_only() {
        let cfg = DbConfig::new("postgresql://gardener:s3cret@db:5432/plansow");
        assert_eq!(cfg.redacted_url(), "postgresql://gardener:***@db:5432/plansow");

        let no_password = DbConfig::new("postgresql://gardener@db:5432/plansow");
        assert_eq!(no_password.redacted_url(), no_password.database_url);
    }
}
