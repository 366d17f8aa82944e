//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gallerydesk", version, about = "Gallery admin console")]
pub struct Cli {
    /// Overrides the API base URL from the config file.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List upload targets, optionally filtered by label or gallery id.
    Events {
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Upload files into an event's gallery.
    Upload {
        /// Gallery (container) id to upload into.
        #[arg(short, long)]
        event: String,

        /// Extra retry-only passes to run while files keep failing.
        #[arg(long, default_value_t = 0)]
        retry: u32,

        /// Upload names, in queue order. Defaults to each file's name.
        #[arg(long = "name", value_name = "NAME")]
        names: Vec<String>,

        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List games.
    Games,

    /// Search galleries of a game.
    Search {
        #[arg(short, long)]
        game: String,
        keyword: String,
    },

    /// Show a gallery's details.
    GalleryInfo {
        #[arg(short, long)]
        game: String,
        name: String,
    },

    /// Create a gallery and print its edit link.
    CreateGallery {
        #[arg(short, long)]
        game: String,
        name: String,

        /// Mark the gallery as content.
        #[arg(long)]
        content: bool,

        /// Publication date, `YYYY/MM/DD`. Defaults to today.
        #[arg(long)]
        public_date: Option<String>,
    },

    /// Check pasted item lines against existing events.
    Check {
        #[arg(short, long)]
        game: String,

        /// File with the pasted text; stdin when omitted.
        input: Option<PathBuf>,
    },

    /// Store or show the admin session cookie.
    Login {
        /// Cookie to store. Shows the stored cookie when omitted.
        cookie: Option<String>,
    },

    /// Show the effective configuration.
    Config {
        /// Write the effective settings to the config file.
        #[arg(long)]
        save: bool,
    },

    /// Schedule page operations.
    #[command(subcommand)]
    Schedule(ScheduleCommand),
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// Show game sections scheduled for a day.
    Show {
        /// Day to show, `YYYY/MM/DD`. Defaults to today shifted by `--days`.
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        days: i64,
    },

    /// Create or update a schedulable event.
    SaveEvent {
        #[arg(short, long)]
        game: String,
        #[arg(long)]
        gallery: String,
        name: String,

        /// Existing event id to update.
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        default_day: Option<i64>,
        #[arg(long)]
        post_slug: Option<String>,
    },

    /// Schedule an event from today for its default number of days.
    AddDetail {
        #[arg(short, long)]
        game: String,
        #[arg(long)]
        event: String,
        #[arg(long, default_value_t = 0)]
        default_day: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn upload_args() {
        let cli = Cli::parse_from([
            "gallerydesk", "upload", "--event", "42", "--retry", "2", "a.jpg", "b.jpg",
        ]);
        match cli.command {
            Command::Upload {
                event,
                retry,
                paths,
                names,
            } => {
                assert_eq!(event, "42");
                assert_eq!(retry, 2);
                assert_eq!(paths, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
                assert!(names.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_save_flag() {
        let cli = Cli::parse_from(["gallerydesk", "config", "--save"]);
        assert!(matches!(cli.command, Command::Config { save: true }));
        let cli = Cli::parse_from(["gallerydesk", "config"]);
        assert!(matches!(cli.command, Command::Config { save: false }));
    }

    #[test]
    fn schedule_negative_offset() {
        let cli = Cli::parse_from(["gallerydesk", "schedule", "show", "--days", "-3"]);
        assert!(matches!(
            cli.command,
            Command::Schedule(ScheduleCommand::Show { days: -3, date: None })
        ));
    }
}
