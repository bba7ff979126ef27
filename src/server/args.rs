use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TRACKTIME_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,
}
