use actix_web::{middleware::NormalizePath, web, HttpServer};
use error_stack::{Result, ResultExt};
use foodgram::config::Server as Config;
use foodgram::App;
use tracing_actix_web::TracingLogger;

use clap::Parser;
use std::net::IpAddr;
use std::num::NonZeroUsize;

use super::CommandError;

/// Expose the Foodgram API HTTP server
#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
    /// Keep all data in memory instead of connecting to Postgres.
    #[clap(long)]
    pub in_memory: bool,
}

pub fn run(args: ServerCommand) -> Result<(), CommandError> {
    let mut config = super::setup()?;
    args.override_config(&mut config);

    let runtime = super::runtime(config.workers.map(NonZeroUsize::get))?;
    runtime.block_on(serve(config, args.in_memory))
}

async fn serve(config: Config, in_memory: bool) -> Result<(), CommandError> {
    let address = (config.address, config.port);
    let workers = config.workers;
    let app = if in_memory {
        tracing::warn!("running with in-memory storage, data is lost on shutdown");
        App::in_memory(config)
    } else {
        super::connect(config).await?
    };

    let mut server = HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(foodgram::http::controllers::configure)
    });
    if let Some(workers) = workers {
        server = server.workers(workers.get());
    }

    tracing::info!("listening on {}:{}", address.0, address.1);
    server
        .bind(address)
        .change_context(CommandError)
        .attach_printable_lazy(|| format!("could not bind to {}:{}", address.0, address.1))?
        .run()
        .await
        .change_context(CommandError)
}

impl ServerCommand {
    fn override_config(&self, config: &mut Config) {
        // override server configurations if set by the cli
        if let Some(address) = self.address {
            config.address = address;
        }

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
    }
}
