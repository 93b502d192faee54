use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Same file the server opens when no database is configured.
const DEFAULT_DATABASE_URL: &str = "sqlite:family_money.db?mode=rwc";

/// Environment key the server reads for an on-disk SQLite path.
const SQLITE_PATH_ENV: &str = "FAMILY_MONEY__SERVER__DATABASE__SQLITE";

const USAGE: &str = "Usage: cargo run -p migration -- [up [N]|down [N]|fresh|refresh|reset|status]";

/// `DATABASE_URL` wins, then the server's SQLite path, then the default file.
fn database_url(database_url: Option<String>, sqlite_path: Option<String>) -> String {
    match (database_url, sqlite_path) {
        (Some(url), _) if !url.trim().is_empty() => url,
        (_, Some(path)) if !path.trim().is_empty() => format!("sqlite:{}?mode=rwc", path.trim()),
        _ => DEFAULT_DATABASE_URL.to_string(),
    }
}

fn steps(arg: Option<String>) -> Result<Option<u32>, std::num::ParseIntError> {
    arg.map(|n| n.parse()).transpose()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db_url = database_url(
        std::env::var("DATABASE_URL").ok(),
        std::env::var(SQLITE_PATH_ENV).ok(),
    );
    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, steps(args.next())?).await?,
        "down" => migration::Migrator::down(&db, Some(steps(args.next())?.unwrap_or(1))).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "refresh" => migration::Migrator::refresh(&db).await?,
        "reset" => migration::Migrator::reset(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins() {
        assert_eq!(
            database_url(Some("sqlite::memory:".into()), Some("/tmp/x.db".into())),
            "sqlite::memory:"
        );
    }

    #[test]
    fn falls_back_to_server_sqlite_path() {
        assert_eq!(
            database_url(None, Some("/var/lib/family_money.db".into())),
            "sqlite:/var/lib/family_money.db?mode=rwc"
        );
        assert_eq!(
            database_url(Some("  ".into()), None),
            DEFAULT_DATABASE_URL
        );
    }

    #[test]
    fn step_counts_parse() {
        assert_eq!(steps(None).unwrap(), None);
        assert_eq!(steps(Some("2".into())).unwrap(), Some(2));
        assert!(steps(Some("two".into())).is_err());
    }
}
