//! Line-oriented front end.
//!
//! DESIGN
//! ======
//! The cookie jar only lives as long as the process, so the binary runs an
//! interactive shell instead of one-shot subcommands. Each input line is
//! parsed with clap, dispatched to a page or the session, and answered with
//! the output lines plus any toasts raised along the way. After every
//! command the route guard re-checks the current view.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::guard::{GuardDecision, RouteGuard};
use crate::nav::{Navigator, View};
use crate::net::api::ImageUpload;
use crate::net::types::{Item, ItemInput, ProfileUpdate};
use crate::notify::{ToastLevel, ToastQueue};
use crate::pages::inventory::{self, InventoryPage};
use crate::pages::profile::{self, PasswordForm};
use crate::pages::users::UsersPage;
use crate::pages::{PageContext, dashboard};
use crate::state::inventory::{ALL_TYPES, ItemFilter, StockStatus};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "stockroom", disable_version_flag = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Sign in.
    Login { email: String, password: String },
    /// Create an account and sign in.
    Register {
        name: String,
        email: String,
        password: String,
        /// Defaults to the password.
        #[arg(long)]
        confirmation: Option<String>,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Open a view by path, e.g. `/inventory/3`.
    Goto { path: String },
    /// Totals and low-stock items.
    Dashboard,
    /// List inventory.
    Items {
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one item.
    Item { id: u64 },
    /// Add an item (admin).
    ItemAdd {
        name: String,
        #[arg(long = "type")]
        kind: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Edit an item (admin).
    ItemEdit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        quantity: Option<i64>,
    },
    /// Delete an item (admin).
    ItemDelete { id: u64 },
    /// List users (admin).
    Users,
    /// Restrict or unrestrict a user (admin).
    UserToggle { id: u64 },
    /// Change your password.
    Password { current: String, new: String, confirmation: String },
    /// Edit your profile.
    ProfileUpdate {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    #[command(alias = "exit")]
    Quit,
}

/// Output of one shell line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn say(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

/// Split a line into words, honoring single and double quotes.
pub fn split_words(line: &str) -> Result<Vec<String>, &'static str> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err("unterminated quote");
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn item_row(item: &Item) -> String {
    format!("{:>5}  {:<28} {:<14} {:>6}", item.id, item.name, item.kind, item.quantity)
}

pub struct Shell {
    ctx: PageContext,
    toasts: Arc<ToastQueue>,
    guard: RouteGuard,
    inventory: InventoryPage,
    users: UsersPage,
}

impl Shell {
    pub fn new(ctx: PageContext, toasts: Arc<ToastQueue>) -> Self {
        Self {
            guard: RouteGuard::new(ctx.navigator.clone()),
            inventory: InventoryPage::new(ctx.clone()),
            users: UsersPage::new(ctx.clone()),
            toasts,
            ctx,
        }
    }

    pub fn prompt(&self) -> String {
        let who = self.ctx.session.user().map_or_else(|| "guest".to_owned(), |u| u.email);
        format!("{who} {}> ", self.ctx.navigator.current())
    }

    /// Parse and run one input line.
    pub async fn execute(&mut self, line: &str) -> Reply {
        let mut reply = Reply::default();
        let words = match split_words(line) {
            Ok(words) if words.is_empty() => return reply,
            Ok(words) => words,
            Err(message) => {
                reply.say(message);
                return reply;
            }
        };
        let before = self.ctx.navigator.current();
        match Line::try_parse_from(words) {
            Ok(Line { command }) => self.run(command, &mut reply).await,
            Err(error) => reply.say(error.render().to_string().trim_end()),
        }

        if self.guard.check(&self.ctx.session.snapshot()) == GuardDecision::Pending {
            reply.say("(session still loading)");
        }
        for toast in self.toasts.drain() {
            let tag = match toast.level {
                ToastLevel::Success => "ok",
                ToastLevel::Error => "error",
            };
            reply.say(format!("[{tag}] {}", toast.message));
        }
        let after = self.ctx.navigator.current();
        if after != before {
            reply.say(format!("view: {after}"));
        }
        reply
    }

    /// Navigate, then let the guard veto. Returns whether the view is shown.
    fn open(&self, view: View) -> bool {
        self.ctx.navigator.navigate(view);
        self.guard.check(&self.ctx.session.snapshot()) == GuardDecision::Allow
    }

    async fn run(&mut self, command: ShellCommand, reply: &mut Reply) {
        match command {
            ShellCommand::Login { email, password } => {
                if self.ctx.navigator.current() != View::Register {
                    self.ctx.navigator.navigate(View::Login);
                }
                // Failures are already toasted.
                if let Err(error) = self.ctx.session.login(&email, &password).await {
                    tracing::debug!(%error, "login command failed");
                }
            }
            ShellCommand::Register { name, email, password, confirmation } => {
                self.ctx.navigator.navigate(View::Register);
                let confirmation = confirmation.unwrap_or_else(|| password.clone());
                if let Err(error) = self.ctx.session.register(&name, &email, &password, &confirmation).await {
                    tracing::debug!(%error, "register command failed");
                }
            }
            ShellCommand::Logout => self.ctx.session.logout().await,
            ShellCommand::Whoami => match self.ctx.session.user() {
                Some(user) => {
                    let roles: Vec<&str> = user.roles.iter().map(String::as_str).collect();
                    reply.say(format!("{} <{}> id={} roles=[{}]", user.name, user.email, user.id, roles.join(", ")));
                }
                None => reply.say("not signed in"),
            },
            ShellCommand::Goto { path } => match View::parse(&path) {
                Some(view) => {
                    self.open(view);
                }
                None => reply.say(format!("no such view: {path}")),
            },
            ShellCommand::Dashboard => {
                if self.open(View::Dashboard) {
                    self.show_dashboard(reply).await;
                }
            }
            ShellCommand::Items { kind, search } => {
                if !self.open(View::Inventory) {
                    return;
                }
                self.inventory.filter = ItemFilter {
                    kind: kind.unwrap_or_else(|| ALL_TYPES.to_owned()),
                    search: search.unwrap_or_default(),
                };
                if self.inventory.load().await.is_ok() {
                    self.show_items(reply);
                }
            }
            ShellCommand::Item { id } => {
                if !self.open(View::Item(id)) {
                    return;
                }
                if let Ok(item) = inventory::load_item(&self.ctx, id).await {
                    reply.say(item_row(&item));
                }
            }
            ShellCommand::ItemAdd { name, kind, quantity, image } => {
                if !self.open(View::Inventory) {
                    return;
                }
                let upload = match image {
                    Some(path) => match tokio::fs::read(&path).await {
                        Ok(bytes) => {
                            let file_name = path
                                .file_name()
                                .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
                            Some(ImageUpload { file_name, mime: mime_for(&path).to_owned(), bytes })
                        }
                        Err(error) => {
                            reply.say(format!("cannot read {}: {error}", path.display()));
                            return;
                        }
                    },
                    None => None,
                };
                let input = ItemInput { name, kind, quantity };
                if self.inventory.add(&input, upload).await.is_ok() {
                    self.show_items(reply);
                }
            }
            ShellCommand::ItemEdit { id, name, kind, quantity } => {
                if !self.open(View::ItemEdit(id)) {
                    return;
                }
                let Ok(current) = inventory::load_item(&self.ctx, id).await else {
                    return;
                };
                let input = ItemInput {
                    name: name.unwrap_or(current.name),
                    kind: kind.unwrap_or(current.kind),
                    quantity: quantity.unwrap_or(current.quantity),
                };
                if let Err(error) = inventory::save_item(&self.ctx, id, &input).await {
                    tracing::debug!(%error, "item-edit command failed");
                }
            }
            ShellCommand::ItemDelete { id } => {
                if self.open(View::Inventory) && self.inventory.delete(id).await.is_ok() {
                    self.show_items(reply);
                }
            }
            ShellCommand::Users => {
                if self.open(View::Users) && self.users.load().await.is_ok() {
                    self.show_users(reply);
                }
            }
            ShellCommand::UserToggle { id } => {
                if !self.open(View::Users) {
                    return;
                }
                if self.users.users().is_empty() && self.users.load().await.is_err() {
                    return;
                }
                if self.users.toggle_restriction(id).await.is_ok() {
                    self.show_users(reply);
                }
            }
            ShellCommand::Password { current, new, confirmation } => {
                if self.open(View::Profile) {
                    let form = PasswordForm { current, new, confirmation };
                    if let Err(error) = profile::change_password(&self.ctx, &form).await {
                        tracing::debug!(%error, "password command failed");
                    }
                }
            }
            ShellCommand::ProfileUpdate { name, email } => {
                if self.open(View::Profile) {
                    profile::update_profile(&self.ctx, &ProfileUpdate { name, email }).await;
                }
            }
            ShellCommand::Quit => reply.quit = true,
        }
    }

    async fn show_dashboard(&self, reply: &mut Reply) {
        let summary = dashboard::load(&self.ctx).await;
        reply.say(format!("total items: {}", summary.total_items));
        if let Some(users) = summary.total_users {
            reply.say(format!("total users: {users}"));
        }
        reply.say(format!("low stock: {}", summary.low_stock.len()));
        for item in &summary.low_stock {
            reply.say(format!("{}  [{}]", item_row(item), StockStatus::of(item.quantity)));
        }
    }

    fn show_items(&self, reply: &mut Reply) {
        let rows = self.inventory.visible();
        reply.say(format!("types: {}", self.inventory.types().join(", ")));
        if rows.is_empty() {
            reply.say("no items");
        }
        for item in &rows {
            reply.say(item_row(item));
        }
    }

    fn show_users(&self, reply: &mut Reply) {
        for user in self.users.users() {
            let flags = match (user.is_admin(), user.is_restricted) {
                (true, _) => " (admin)",
                (false, true) => " (restricted)",
                (false, false) => "",
            };
            reply.say(format!("{:>5}  {} <{}>{flags}", user.id, user.name, user.email));
        }
    }
}
