use clap::Parser;
use pingora::server::configuration::Opt;
use pingora::server::Server;
use std::path::PathBuf;
use torii::config::Config;
use torii::proxy::ToriiProxy;

/// Torii Image Gateway - validating image proxy built with Cloudflare's Pingora
#[derive(Parser, Debug)]
#[command(name = "torii")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Daemon mode
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,

    /// Upgrade workers gracefully
    #[arg(long)]
    upgrade: bool,
}

fn main() {
    // Initialize logging subsystem
    torii::logging::init_subscriber().expect("Failed to initialize logging subsystem");

    // Parse command-line arguments
    let args = Args::parse();

    // Load gateway configuration from file
    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        allowed_clients = config.access.allowed_client_ips.len(),
        allowed_origins = config.access.allowed_source_origins.len(),
        "Configuration loaded successfully"
    );

    // Build Pingora server options
    let opt = Opt {
        daemon: args.daemon,
        test: args.test,
        upgrade: args.upgrade,
        ..Default::default()
    };

    // Create Pingora server
    let mut server = Server::new(Some(opt)).expect("Failed to create Pingora server");
    server.bootstrap();

    let listen_addr = format!("{}:{}", config.server.address, config.server.port);

    // Create ToriiProxy instance
    let proxy = ToriiProxy::new(config);

    // Create HTTP proxy service
    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, proxy);

    // Add TCP listener for HTTP
    proxy_service.add_tcp(&listen_addr);

    tracing::info!(
        address = %listen_addr,
        "Starting Torii Image Gateway"
    );

    // Register service with server
    server.add_service(proxy_service);

    // Run server forever (blocks until shutdown)
    server.run_forever();
}
