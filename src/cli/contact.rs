use clap::Subcommand;
use color_eyre::eyre;
use quill::{contact::ContactDraft, utils::display_date, workspace::Workspace};
use tracing::info;

use crate::print_json;

#[derive(Subcommand)]
pub enum ContactCommands {
    /// Leave a message for the author
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        message: String,
    },

    /// Read messages, newest first
    List,
}

pub async fn run_contact(
    workspace: &Workspace,
    command: ContactCommands,
    json: bool,
) -> eyre::Result<()> {
    match command {
        ContactCommands::Send {
            name,
            email,
            message,
        } => {
            let entry = workspace
                .reader()
                .send_contact(&ContactDraft::new(name, email, message))
                .await?;
            if json {
                return print_json(&entry);
            }
            info!("Message sent");
            Ok(())
        }
        ContactCommands::List => {
            let entries = workspace
                .studio(workspace.local_session())
                .contacts()
                .await?;
            if json {
                return print_json(&entries);
            }
            for entry in &entries {
                println!(
                    "{} <{}> on {}",
                    entry.name(),
                    entry.email(),
                    display_date(entry.created_at())
                );
                println!("  {}", entry.message());
            }
            Ok(())
        }
    }
}
