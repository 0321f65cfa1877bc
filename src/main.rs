use std::collections::BTreeMap;

use artifact_filters_lib::config::TrackerConfig;
use artifact_filters_lib::filters::FilterState;
use artifact_filters_lib::{init_tracing, AppError, TrackerApp};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Input { filter: String, text: String },
    Choose { filter: String, value: String },
    Cycle(String),
    Click(String),
    ClearAll,
    Refresh,
    Status,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.trim().splitn(3, ' ');
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let filter = parts.next().map(str::to_string);
        let rest = parts.next().unwrap_or_default().to_string();

        let need_filter = |filter: Option<String>| {
            filter.ok_or_else(|| format!("'{verb}' needs a filter type"))
        };
        match verb.as_str() {
            "input" => Ok(Self::Input {
                filter: need_filter(filter)?,
                text: rest,
            }),
            "choose" => Ok(Self::Choose {
                filter: need_filter(filter)?,
                value: rest,
            }),
            "cycle" => Ok(Self::Cycle(need_filter(filter)?)),
            "click" => Ok(Self::Click(need_filter(filter)?)),
            "clear" => Ok(Self::ClearAll),
            "refresh" => Ok(Self::Refresh),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!(
                "unknown command '{other}'. Use input, choose, cycle, click, clear, refresh, status or quit"
            )),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("artifact-filters failed: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = TrackerConfig::from_env();
    let app = TrackerApp::start(&config).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        execute(&app, command).await;
        app.settled().await;
    }

    app.shutdown().await
}

async fn execute(app: &TrackerApp, command: Command) {
    let lookup = |filter: &str| {
        let control = app.control(filter);
        if control.is_none() {
            eprintln!("no filter control for '{filter}'");
        }
        control
    };

    match command {
        Command::Input { filter, text } => {
            if let Some(control) = lookup(&filter) {
                control.input(&text).await;
            }
        }
        Command::Choose { filter, value } => {
            if let Some(control) = lookup(&filter) {
                control.choose(&value).await;
            }
        }
        Command::Cycle(filter) => {
            if let Some(control) = lookup(&filter) {
                control.click_footer().await;
            }
        }
        Command::Click(filter) => {
            if let Some(control) = lookup(&filter) {
                control.click().await;
            }
        }
        Command::ClearAll => app.session().clear_all(),
        Command::Refresh => app.pipeline().refresh(),
        Command::Status => {
            app.settled().await;
            let controls: BTreeMap<String, FilterState> = app
                .controls()
                .iter()
                .map(|c| (c.filter_type().to_string(), c.state()))
                .collect();
            let report = serde_json::json!({
                "filters": app.session().aggregator().get_filter(),
                "controls": controls,
                "status": app.status().snapshot(),
            });
            match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("failed to render status: {e}"),
            }
        }
        Command::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::Command;

    #[test]
    fn parses_commands_with_free_text() {
        assert_eq!(
            Command::parse("input search login page"),
            Ok(Command::Input {
                filter: "search".to_string(),
                text: "login page".to_string(),
            })
        );
        assert_eq!(Command::parse("CYCLE status"), Ok(Command::Cycle("status".to_string())));
        assert_eq!(Command::parse("clear"), Ok(Command::ClearAll));
        assert!(Command::parse("click").is_err());
        assert!(Command::parse("dance").is_err());
    }
}
