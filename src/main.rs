use std::sync::Arc;

use clap::Parser;
use log::{ debug, error, info };

use fixture_http_server::{
  cofg::{ build_config_from_cli, cli::{ Args, Command }, Cofg },
  observer::{ LogObserver, NoopObserver, ServeObserver },
  runner,
  server::FileServer,
};

fn init_logger() {
  env_logger
    ::builder()
    .default_format()
    .format_module_path(true)
    .format_line_number(true)
    .format_timestamp(None)
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
}

fn observer(s: &Cofg) -> Arc<dyn ServeObserver> {
  if s.log_requests { Arc::new(LogObserver) } else { Arc::new(NoopObserver) }
}

async fn run_server(s: &Cofg) -> Result<(), Box<dyn std::error::Error>> {
  let server = FileServer::bind(s.serve_config(), observer(s))?;
  info!("run in http://{}/", server.local_addr());

  let stopper = server.stopper();
  actix_web::rt::spawn(async move {
    match tokio::signal::ctrl_c().await {
      Ok(()) => info!("interrupted, stopping"),
      Err(e) => error!("failed to listen for ctrl-c: {e}"),
    }
    stopper.stop();
  });

  server.start().await?;
  Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  init_logger();
  let args = Args::parse();
  let s = build_config_from_cli(Cofg::load(args.config.as_deref())?, &args);
  debug!("cofg: {s:#?}");

  match args.command.as_ref().unwrap_or(&Command::Serve) {
    Command::Serve => run_server(&s).await,
    Command::Test(_) => {
      let outcome = runner::run(s.run_param(observer(&s))).await?;
      std::process::exit(outcome.status.code().unwrap_or(1));
    }
  }
}
