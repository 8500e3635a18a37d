use std::path::PathBuf;
use std::sync::Arc;

use sentinel_httpd::config::Config;
use sentinel_httpd::logging;
use sentinel_httpd::server::{self, EXIT_FAILURE, EXIT_SPAWN_FAILURE, daemon, fatal, listener, privilege};

fn main() {
    let mut cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("sentinel-httpd: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    logging::init(cfg.debug);

    if let Err(e) = cfg.resolve_document_root() {
        fatal(EXIT_FAILURE, &e);
    }
    if let Err(e) = server::ignore_sigpipe() {
        fatal(EXIT_FAILURE, &e);
    }

    let socket = listener::bind(&cfg).unwrap_or_else(|e| fatal(EXIT_FAILURE, &e));

    if cfg.detach() {
        if let Err(e) = daemon::detach() {
            fatal(EXIT_FAILURE, &e);
        }
    }

    if let Some(confinement) = cfg.confinement.clone() {
        if let Err(e) = privilege::drop_privileges(&cfg.document_root, &confinement) {
            fatal(EXIT_FAILURE, &e);
        }
        cfg.document_root = PathBuf::from("/");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fatal(EXIT_SPAWN_FAILURE, &anyhow::Error::from(e)));

    let cfg = Arc::new(cfg);
    let result = runtime.block_on(async {
        tokio::select! {
            res = listener::run(socket, cfg) => res,

            _ = server::shutdown_signal() => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        fatal(EXIT_FAILURE, &e);
    }
}
