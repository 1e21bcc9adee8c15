pub mod app_config;
pub mod database;
pub mod movie_repo;
pub mod redis_repo;
pub mod seed;

pub use database::DbClient;
pub use movie_repo::PostgresMovieStore;
pub use redis_repo::RedisClient;
