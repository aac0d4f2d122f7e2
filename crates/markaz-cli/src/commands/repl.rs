//! Interactive loop: plain lines are prompts, `/`-lines are commands.

use anyhow::Result;
use markaz_application::MindMapController;
use markaz_core::MarkazError;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{Options, Workspace, bootstrap};

const HELP: &str = "\
Type a question to grow the graph, or one of:
  /new              start a new chat
  /chats            list chats
  /switch <id>      switch to a chat
  /search <term>    find and focus a concept
  /focus <id>       focus a concept by id
  /tree             hierarchical layout
  /network          free-floating layout
  /graph            print the current graph
  /stats            assistant history per chat (OpenAI backend)
  /clear            forget the assistant history of this chat
  /quit             save and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Ask(String),
    New,
    Chats,
    Switch(String),
    Search(String),
    Focus(String),
    Tree,
    Network,
    Graph,
    Stats,
    ClearHistory,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return if line.is_empty() {
            ReplCommand::Empty
        } else {
            ReplCommand::Ask(line.to_string())
        };
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim().to_string()),
        None => (command, String::new()),
    };

    match (name, argument.is_empty()) {
        ("new", _) => ReplCommand::New,
        ("chats", _) => ReplCommand::Chats,
        ("switch", false) => ReplCommand::Switch(argument),
        ("search", _) => ReplCommand::Search(argument),
        ("focus", false) => ReplCommand::Focus(argument),
        ("tree", _) => ReplCommand::Tree,
        ("network", _) => ReplCommand::Network,
        ("graph", _) => ReplCommand::Graph,
        ("stats", _) => ReplCommand::Stats,
        ("clear", _) => ReplCommand::ClearHistory,
        ("help", _) => ReplCommand::Help,
        ("quit" | "exit", _) => ReplCommand::Quit,
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

pub async fn run(options: &Options) -> Result<()> {
    let mut workspace = bootstrap(options).await?;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ReplCommand::Quit => break,
            command => execute(&mut workspace, command).await,
        }
    }

    workspace.persist().await
}

async fn execute(workspace: &mut Workspace, command: ReplCommand) {
    let controller = &mut workspace.controller;
    match command {
        ReplCommand::Ask(prompt) => {
            if let Err(err) = controller.ask(&prompt).await {
                report(&err);
            }
        }
        ReplCommand::New => {
            controller.create_chat();
        }
        ReplCommand::Chats => {
            for chat in controller.list_chats() {
                let marker = if chat.is_active { "*" } else { " " };
                println!("{} {}", marker, chat.id);
            }
        }
        ReplCommand::Switch(id) => {
            let active = controller.switch_chat(&id);
            if active != id {
                println!("[!] '{}' cannot be used as a chat id; started {}", id, active);
            }
        }
        ReplCommand::Search(term) => {
            controller.search(&term);
        }
        ReplCommand::Focus(id) => {
            if controller.focus_node(&id).is_none() {
                println!("[!] No positioned concept with id {}", id);
            }
        }
        ReplCommand::Tree => {
            let transition = controller.enable_tree();
            println!("[layout] {}", transition.mode.as_str());
        }
        ReplCommand::Network => {
            let transition = controller.enable_network();
            println!("[layout] {}", transition.mode.as_str());
        }
        ReplCommand::Graph => print_graph(controller),
        ReplCommand::Stats => match &workspace.agent {
            Some(agent) => {
                let stats = agent.stats().await;
                println!("{} chat(s) with history", stats.total_chats);
                for (id, count) in &stats.messages_per_chat {
                    println!("  {} {} message(s)", id, count);
                }
            }
            None => println!("[!] The remote assistant keeps its own history"),
        },
        ReplCommand::ClearHistory => match (&workspace.agent, controller.active_chat_id()) {
            (Some(agent), Some(id)) => {
                if agent.clear(id).await {
                    println!("[history] cleared for {}", id);
                } else {
                    println!("[history] {} had none", id);
                }
            }
            (None, _) => println!("[!] The remote assistant keeps its own history"),
            (Some(_), None) => println!("[!] No active chat"),
        },
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Unknown(line) => println!("[!] Unknown command {}; try /help", line),
        ReplCommand::Empty | ReplCommand::Quit => {}
    }
}

fn print_graph(controller: &MindMapController) {
    let store = controller.store();
    for node in store.current_nodes() {
        println!("{} {} [{}]: {}", node.icon, node.label, node.id, node.summary);
    }
    for link in store.current_links() {
        println!("  {} - {}", link.source, link.target);
    }
}

fn report(err: &MarkazError) {
    println!("[!] {}", err);
}
