pub mod postgres;

pub use postgres::PostgresUserDirectory;
