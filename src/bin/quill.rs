use anyhow::Result;
use quill::cli::{actions::server, actions::Action, start};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    match action {
        Action::Server(args) => server::execute(args).await?,
    }

    Ok(())
}
