use envinject::EnvInject;

#[derive(Default, EnvInject)]
struct Pool {
    size: u32,
}

#[derive(Default, EnvInject)]
struct Database {
    host: String,
    pool: Pool,
}

#[derive(Default, EnvInject)]
struct Config {
    database: Database,

    #[env(nested, prefix = "CACHE_")]
    cache: Database,
}

fn main() {
    assert_eq!(
        Config::variable_names(),
        [
            "DATABASE_HOST",
            "DATABASE_POOL_SIZE",
            "CACHE_HOST",
            "CACHE_POOL_SIZE",
        ]
    );

    let config = Config::default();
    let _ = (config.database.host, config.database.pool.size, config.cache);
}
