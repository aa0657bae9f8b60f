use clap::Parser;

use crate::config::AppConfig;

/// Command-line overrides applied on top of the environment configuration
#[derive(Debug, Parser)]
#[command(name = "blog-api")]
#[command(about = "Blog API server - users, posts and comments with JWT sessions")]
#[command(version)]
pub struct Cli {
    #[arg(long, short, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "MongoDB connection string (overrides MONGODB_URI)")]
    pub mongodb_uri: Option<String>,

    #[arg(long, help = "Keep all data in process memory instead of MongoDB")]
    pub in_memory: bool,
}

impl Cli {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(uri) = &self.mongodb_uri {
            config.database.uri = uri.clone();
        }
    }
}
