//! CLI commands

use anyhow::{Result, bail};
use clap::Subcommand;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracker_frontend_common::{App, ClientConfig, FileStorage, Notifier, RouteName};
use tracker_http::types::{Comment, IssueFilter, IssueForm};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        username: String,

        #[arg(long, env = "TRACKER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account (does not log in)
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "TRACKER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the persisted session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List issues
    Issues {
        /// Filter by status (e.g. OPEN, CLOSED)
        #[arg(long)]
        status: Option<String>,

        /// Free-text search
        #[arg(short = 'q', long)]
        query: Option<String>,

        /// Filter by label; repeat for several labels
        #[arg(long = "label-id")]
        label_ids: Vec<u64>,

        #[arg(long)]
        assignee_id: Option<u64>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        size: Option<u32>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one issue
    Issue {
        id: u64,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// File a new issue (requires login)
    NewIssue {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        assignee_id: Option<u64>,

        #[arg(long = "label-id")]
        label_ids: Vec<u64>,
    },

    /// List labels
    Labels {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the comment thread of an issue
    Comments {
        issue_id: u64,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Navigate to a route and print where the guard lets you land
    Open { path: String },
}

/// Prints notices to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

impl Commands {
    pub async fn execute(self, client_config: ClientConfig, data_dir: &Path) -> Result<()> {
        let storage = Arc::new(FileStorage::new(config::session_path(data_dir)));
        debug!(session = %storage.path().display(), "Using persisted session");
        let app = App::bootstrap(client_config, storage, Arc::new(StderrNotifier))?;

        match self {
            Self::Login { username, password } => {
                let user = app.auth.login(&username, &password).await?;
                println!("Logged in as {} ({})", user.username, user.email);
            }
            Self::Register {
                username,
                email,
                password,
            } => {
                app.auth.register(&username, &email, &password).await?;
                println!("Registered {username}. Log in with `tracker login`.");
            }
            Self::Logout => {
                app.auth.logout();
                println!("Logged out");
            }
            Self::Whoami => match app.store.current_user() {
                Some(user) => println!("{} <{}> (id {})", user.username, user.email, user.id),
                None => println!("Not logged in"),
            },
            Self::Issues {
                status,
                query,
                label_ids,
                assignee_id,
                page,
                size,
                json,
            } => {
                let filter = IssueFilter {
                    status,
                    query,
                    label_ids,
                    assignee_id,
                    page,
                    size,
                };
                let response = app.client.list_issues(&filter).await?;
                if json {
                    return print_json(&response);
                }
                for issue in &response.issues {
                    println!("#{:<6} {:<8} {}", issue.id, issue.status, issue.title);
                }
                println!(
                    "page {} (size {}), {} issues total",
                    response.meta.page, response.meta.size, response.meta.total
                );
            }
            Self::Issue { id, json } => {
                let issue = app.client.get_issue(id).await?;
                if json {
                    return print_json(&issue);
                }
                println!("#{} {} [{}]", issue.id, issue.title, issue.status);
                println!("author {} | updated {}", issue.author_id, issue.updated_at);
                if let Some(description) = issue.description.filter(|d| !d.is_empty()) {
                    println!();
                    println!("{description}");
                }
            }
            Self::NewIssue {
                title,
                description,
                assignee_id,
                label_ids,
            } => {
                let landed = app.router.push("/issues/new")?;
                if landed.name != RouteName::IssueCreate {
                    bail!("Log in first with `tracker login`");
                }

                let form = IssueForm {
                    title,
                    description,
                    assignee_id,
                    label_ids,
                };
                let issue = app.client.create_issue(&form).await?;
                info!(issue_id = issue.id, "Issue created");
                println!("Created issue #{}", issue.id);
            }
            Self::Labels { json } => {
                let labels = app.client.list_labels().await?;
                if json {
                    return print_json(&labels);
                }
                for label in &labels {
                    println!(
                        "{:<4} {:<20} {:<8} {} open",
                        label.id, label.name, label.color, label.issue_open_count
                    );
                }
            }
            Self::Comments { issue_id, json } => {
                let comments = app.client.list_comments(issue_id).await?;
                if json {
                    return print_json(&comments);
                }
                print_thread(&comments, 0);
            }
            Self::Open { path } => {
                let landed = app.router.push(&path)?;
                println!("{} {}", landed.name, landed.path);
            }
        }

        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_thread(comments: &[Comment], depth: usize) {
    for comment in comments {
        let author = comment
            .author
            .clone()
            .unwrap_or_else(|| format!("user {}", comment.author_id));
        println!("{:indent$}{author}: {}", "", comment.description, indent = depth * 2);
        print_thread(&comment.children, depth + 1);
    }
}
