use authkit::cli::{Args, Command, handle_create_superuser, init_logging, open_database};
use clap::Parser;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    match args.command {
        Command::CreateSuperuser(cmd) => {
            let Some(db) = open_database(&cmd.database).await else {
                std::process::exit(1);
            };
            handle_create_superuser(db, &cmd).await;
        }
    }
}
