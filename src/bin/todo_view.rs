use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use task_manager::{
    client::{ClientConfig, HttpTodoApi, TodoView, render},
    logging::init_stderr_tracing,
};

const HELP: &str = "\
commands:
  ls                  show the list
  reload              fetch the list from the server
  add <title>         create a todo
  toggle <id>         flip completion
  edit <id>           start editing a title
  draft <text>        change the title being edited
  save                send the edited title
  cancel              leave edit mode
  type <id> <text>    inline title edit (debounced)
  rm <id>             delete a todo
  help                this text
  quit                exit";

#[derive(Parser)]
#[command(author, version, about = "Terminal front end for the task manager API")]
struct Args {
    /// Server base URL
    #[arg(long, env = "TODO_BASE_URL", default_value = task_manager::client::DEFAULT_BASE_URL)]
    base_url: String,
    /// Quiet period before an inline title edit is sent, in milliseconds
    #[arg(long, env = "TODO_DEBOUNCE_MS", default_value_t = 500)]
    debounce_ms: u64,
    /// Per-request timeout, in seconds
    #[arg(long, env = "TODO_TIMEOUT_SECS", default_value_t = 5)]
    timeout_secs: u64,
    /// Log filter for diagnostics written to stderr
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log: String,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            debounce: Duration::from_millis(self.debounce_ms),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Reload,
    Add(String),
    Toggle(i32),
    Edit(i32),
    Draft(String),
    Save,
    Cancel,
    Type(i32, String),
    Remove(i32),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let id = |arg: &str| -> Result<i32, String> {
            arg.parse().map_err(|_| format!("`{arg}` is not a todo id"))
        };

        match name {
            "ls" | "" => Ok(Self::List),
            "reload" => Ok(Self::Reload),
            "add" => Ok(Self::Add(rest.to_string())),
            "toggle" => id(rest).map(Self::Toggle),
            "edit" => id(rest).map(Self::Edit),
            "draft" => Ok(Self::Draft(rest.to_string())),
            "save" => Ok(Self::Save),
            "cancel" => Ok(Self::Cancel),
            "type" => {
                let (target, text) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Self::Type(id(target)?, text.to_string()))
            }
            "rm" => id(rest).map(Self::Remove),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command `{other}`, try `help`")),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("todo-view failed: {err:?}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_stderr_tracing(&args.log);

    let cfg = args.client_config();
    let api = HttpTodoApi::new(&cfg).context("failed to build http client")?;
    let view = TodoView::with_config(api, &cfg);

    if !view.load().await {
        println!("could not reach {}, starting with an empty list", cfg.base_url);
    }
    show(&view)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            Command::List => {}
            Command::Reload => {
                view.load().await;
            }
            Command::Add(title) => {
                view.set_input(title);
                view.add().await;
            }
            Command::Toggle(id) => {
                view.toggle(id).await;
            }
            Command::Edit(id) => {
                if !view.start_edit(id) {
                    println!("no todo #{id}");
                }
            }
            Command::Draft(text) => {
                if !view.set_draft(text) {
                    println!("not editing, use `edit <id>` first");
                }
            }
            Command::Save => {
                view.commit_edit().await;
            }
            Command::Cancel => view.cancel_edit(),
            Command::Type(id, text) => {
                if !view.edit_title_inline(id, text) {
                    println!("no todo #{id}");
                }
                continue;
            }
            Command::Remove(id) => {
                view.delete(id).await;
            }
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
        }
        show(&view)?;
    }

    // let debounced edits go out before the runtime shuts down
    view.flush_edits().await;
    Ok(())
}

fn show<A: task_manager::client::TodoApi>(view: &TodoView<A>) -> Result<()> {
    let text = render(&view.snapshot()).context("failed to render view")?;
    println!("{text}");
    Ok(())
}
