pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_db_host")]
        pub db_host: String,
        #[serde(default = "default_db_user")]
        pub db_user: String,
        #[serde(default)]
        pub db_pass: String,
        #[serde(default = "default_db_name")]
        pub db_name: String,
        #[serde(default = "default_db_port")]
        pub db_port: u16,
        /// Full connection string; takes precedence over the individual fields.
        #[serde(default)]
        pub db_url: Option<String>,
        #[serde(default = "default_db_max_connections")]
        pub db_max_connections: u32,
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default = "default_cors_origin")]
        pub cors_origin: String,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_environment(config::Environment::default())
        }

        /// Loads configuration from the given environment source.
        pub fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(environment.try_parsing(true))
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Returns the PostgreSQL connection string.
        ///
        /// Credentials and database name are percent-encoded, so any password
        /// accepted by the server also survives the URL.
        pub fn database_url(&self) -> String {
            match &self.db_url {
                Some(url) => url.clone(),
                None => format!(
                    "postgres://{}:{}@{}:{}/{}",
                    urlencoding::encode(&self.db_user),
                    urlencoding::encode(&self.db_pass),
                    self.db_host,
                    self.db_port,
                    urlencoding::encode(&self.db_name)
                ),
            }
        }
    }

    fn default_db_host() -> String {
        "localhost".to_string()
    }

    fn default_db_user() -> String {
        "postgres".to_string()
    }

    fn default_db_name() -> String {
        "tasks".to_string()
    }

    fn default_db_port() -> u16 {
        5432
    }

    fn default_db_max_connections() -> u32 {
        10
    }

    fn default_port() -> u16 {
        3000
    }

    fn default_cors_origin() -> String {
        "http://localhost:5173".to_string()
    }

}
pub mod entities;
pub mod schema;
pub mod task;
pub mod web;
