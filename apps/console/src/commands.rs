//! Subcommand handlers.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use gallerydesk_api::{
    Client, DateOffset, EventOption, SiteLinks, detail_end_date, filter_events, format_date,
    merge_check_lines, parse_date,
};
use gallerydesk_protocol::EventDetail;
use gallerydesk_protocol::messages::{
    CreateGalleryRequest, SaveEventDetailRequest, SaveEventRequest,
};
use gallerydesk_transfer::{FileId, FileSource};
use gallerydesk_upload::{FileState, PassSummary, UploadEvent, UploadManager};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::{Command, ScheduleCommand};
use crate::config::{ConsoleConfig, config_path};
use crate::transport::ApiTransport;

pub async fn run(command: Command, config: &ConsoleConfig) -> anyhow::Result<()> {
    let client = Client::with_timeout(&config.api_base_url, config.request_timeout())
        .context("failed to create API client")?;
    let links = SiteLinks::new(&config.site_base_url);

    match command {
        Command::Events { filter } => list_events(&client, &links, filter.as_deref()).await,
        Command::Upload {
            event,
            retry,
            names,
            paths,
        } => upload(config, client, &event, retry, &names, &paths).await,
        Command::Games => {
            for game in client.list_games().await? {
                println!("{:>6}  {}", game.id, game.name);
            }
            Ok(())
        }
        Command::Search { game, keyword } => {
            for hit in client.search_galleries(&game, &keyword).await? {
                println!("{}  {}", hit.short_title(), hit.href);
                for event in hit.matching_events(&keyword) {
                    println!("    {event}");
                }
            }
            Ok(())
        }
        Command::GalleryInfo { game, name } => {
            let info = client.gallery_info(&game, &name).await?;
            println!("id: {}", info.id);
            println!("edit: {}", links.edit_url(&info.id));
            for (key, value) in &info.extra {
                println!("{key}: {value}");
            }
            Ok(())
        }
        Command::CreateGallery {
            game,
            name,
            content,
            public_date,
        } => {
            let public_date = match public_date {
                Some(d) => format_date(parse_day(&d)?),
                None => format_date(today()),
            };
            let req = CreateGalleryRequest {
                game_id: game,
                gallery_name: name,
                is_content: content,
                public_date,
            };
            let id = client.create_gallery(&req).await?;
            info!(gallery_id = %id, "gallery created");
            println!("{}", links.edit_url(&id));
            Ok(())
        }
        Command::Check { game, input } => check(&client, &game, input.as_deref()).await,
        Command::Login { cookie } => login(&client, cookie.as_deref()).await,
        Command::Schedule(cmd) => schedule(&client, cmd).await,
        Command::Config { save } => show_config(config, save),
    }
}

fn show_config(config: &ConsoleConfig, save: bool) -> anyhow::Result<()> {
    let path = config_path()?;
    if save {
        config.save()?;
        info!(path = %path.display(), "configuration written");
    }
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

async fn list_events(client: &Client, links: &SiteLinks, filter: Option<&str>) -> anyhow::Result<()> {
    let options: Vec<EventOption> = client
        .list_events()
        .await?
        .into_iter()
        .map(EventOption::from)
        .collect();

    for option in filter_events(&options, filter.unwrap_or("")) {
        println!(
            "{:>8}  {}",
            option.container_id().unwrap_or("-"),
            option.label
        );
        let (edit, view) = links.event_links(&option.event);
        if let Some(edit) = edit {
            println!("          edit: {edit}");
        }
        if let Some(view) = view {
            println!("          view: {view}");
        }
    }
    Ok(())
}

async fn upload(
    config: &ConsoleConfig,
    client: Client,
    container_id: &str,
    retry_passes: u32,
    names: &[String],
    paths: &[PathBuf],
) -> anyhow::Result<()> {
    let mut manager = UploadManager::new(config.scheduler_config());
    manager.select_container(container_id);

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let source = FileSource::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        sources.push(source);
    }
    manager.add_files(sources);
    for (index, name) in names.iter().enumerate() {
        manager.rename(index, name.as_str())?;
    }

    let labels: HashMap<FileId, String> = manager
        .queue()
        .iter()
        .map(|e| (e.id(), e.display_name().to_string()))
        .collect();
    let reporter = manager
        .take_events()
        .map(|rx| tokio::spawn(report_events(rx, labels)));

    let cancel = manager.scheduler().cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling upload");
            cancel.cancel();
        }
    });

    let transport = ApiTransport::new(client);
    let mut summary = manager.start_upload(&transport).await?;
    let mut remaining = retry_passes;
    while !summary.is_success() && remaining > 0 {
        remaining -= 1;
        info!(failed = summary.failed(), "retrying failed files");
        summary = manager.retry_failed(&transport).await?;
    }

    drop(manager);
    if let Some(reporter) = reporter {
        let _ = reporter.await;
    }
    finish(&summary)
}

fn finish(summary: &PassSummary) -> anyhow::Result<()> {
    if let Some(base) = summary.order_base {
        println!("{} files uploaded (order from {base})", summary.succeeded());
    }
    match summary.failure_message() {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

async fn report_events(mut rx: mpsc::UnboundedReceiver<UploadEvent>, labels: HashMap<FileId, String>) {
    let name = |id: &FileId| labels.get(id).cloned().unwrap_or_else(|| id.to_string());
    while let Some(event) = rx.recv().await {
        match event {
            UploadEvent::PassStarted { mode, files, order_base } => {
                println!("{mode:?} pass: {files} files, order from {order_base}");
            }
            UploadEvent::FileState {
                file_id,
                state: FileState::Uploading,
            } => println!("{}: uploading", name(&file_id)),
            UploadEvent::FileState { .. } => {}
            UploadEvent::FileProgress { file_id, percent } => {
                println!("{}: {percent}%", name(&file_id));
            }
            UploadEvent::FileCompleted { file_id } => println!("{}: done", name(&file_id)),
            UploadEvent::FileFailed { file_id, error } => {
                println!("{}: failed ({error})", name(&file_id));
            }
            UploadEvent::PassFinished { succeeded, failed } => {
                println!("pass finished: {succeeded} succeeded, {failed} failed");
            }
            UploadEvent::PassAborted { error } => println!("pass aborted: {error}"),
        }
    }
}

async fn check(client: &Client, game: &str, input: Option<&Path>) -> anyhow::Result<()> {
    let raw = match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let lines = merge_check_lines(&raw);
    if lines.is_empty() {
        bail!("nothing to check");
    }
    for row in client.check_items(game, lines).await? {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}

async fn login(client: &Client, cookie: Option<&str>) -> anyhow::Result<()> {
    match cookie {
        Some(cookie) => {
            if !client.save_login_data(cookie).await? {
                bail!("login failed");
            }
            println!("login saved");
        }
        None => match client.read_login_cookie().await? {
            Some(cookie) if !cookie.is_empty() => println!("{cookie}"),
            _ => println!("no cookie stored"),
        },
    }
    Ok(())
}

async fn schedule(client: &Client, cmd: ScheduleCommand) -> anyhow::Result<()> {
    match cmd {
        ScheduleCommand::Show { date, days } => {
            let day = selected_day(date.as_deref(), days)?;
            println!("{}", format_date(day));
            for section in client.scheduled_games(day).await? {
                println!("{} ({})", section.name, section.id);
                for detail in section.event_details.iter().filter(|d| !d.is_delete) {
                    println!(
                        "    event {}: {} -> {} {}",
                        detail.event_id.as_deref().unwrap_or("-"),
                        detail.from.as_deref().unwrap_or("?"),
                        detail.to.as_deref().unwrap_or("?"),
                        detail.status
                    );
                }
            }
            Ok(())
        }
        ScheduleCommand::SaveEvent {
            game,
            gallery,
            name,
            id,
            group,
            default_day,
            post_slug,
        } => {
            let req = SaveEventRequest {
                event_id: id,
                name,
                gallery_id: gallery,
                g_name: group,
                default_day,
                post_slug,
                game_id: game,
            };
            println!("{}", client.save_event(&req).await?);
            Ok(())
        }
        ScheduleCommand::AddDetail {
            game,
            event,
            default_day,
        } => {
            let today = today();
            let req = SaveEventDetailRequest {
                detail: new_detail(today, &event, default_day)?,
                date: format_date(today),
                game_id: game,
            };
            let resp = client.save_event_detail(&req).await?;
            println!("{} {}", resp.id.as_deref().unwrap_or("-"), resp.status);
            Ok(())
        }
    }
}

/// A fresh date range starting on `day` and lasting `default_day` days.
fn new_detail(day: NaiveDate, event_id: &str, default_day: i64) -> anyhow::Result<EventDetail> {
    let to = detail_end_date(day, default_day)
        .with_context(|| format!("default day {default_day} is out of range"))?;
    Ok(EventDetail {
        from: Some(format_date(day)),
        to: Some(to),
        event_id: Some(event_id.to_string()),
        kind: "date".into(),
        ..EventDetail::default()
    })
}

fn selected_day(date: Option<&str>, days: i64) -> anyhow::Result<NaiveDate> {
    match date {
        Some(d) => parse_day(d),
        None => DateOffset::days(days)
            .apply(Local::now().naive_local())
            .map(|moment| moment.date())
            .with_context(|| format!("day offset {days} is out of range")),
    }
}

fn parse_day(s: &str) -> anyhow::Result<NaiveDate> {
    parse_date(s).with_context(|| format!("invalid date {s:?}, expected YYYY/MM/DD"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
