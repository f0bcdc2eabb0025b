//! Human-readable summary of a dispatched signal sequence.
//!
//! Takes the signals recorded for one command and folds them into what a
//! user would have seen: the token list, the token detail, notifications,
//! and whether loading ended.

use heimdall_core::{AccessToken, AccessTokenPage, Notification, NotificationKind, Signal};
use std::time::Duration;

/// Folded view of a signal sequence.
#[derive(Debug, Default)]
pub struct Report {
    pub command: String,
    pub signal_count: usize,
    pub tokens: Option<AccessTokenPage>,
    pub token: Option<AccessToken>,
    pub notifications: Vec<Notification>,
    pub navigations: Vec<String>,
    /// `LoadingStarted` minus `LoadingFinished`. Positive means a spinner
    /// would still be showing.
    pub loading_balance: i64,
    pub elapsed: Duration,
}

impl Report {
    /// Build a report from signals in dispatch order. Later data signals
    /// replace earlier ones; clears reset them.
    pub fn build(
        command: impl Into<String>,
        signals: &[Signal],
        navigations: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        let mut report = Report {
            command: command.into(),
            signal_count: signals.len(),
            navigations,
            elapsed,
            ..Report::default()
        };

        for signal in signals {
            match signal {
                Signal::LoadingStarted => report.loading_balance += 1,
                Signal::LoadingFinished => report.loading_balance -= 1,
                Signal::TokensLoaded { access_tokens } => {
                    report.tokens = Some(access_tokens.clone())
                }
                Signal::TokensCleared => report.tokens = None,
                Signal::TokenLoaded { access_token } => report.token = Some(access_token.clone()),
                Signal::TokenCleared => report.token = None,
                Signal::NotificationPosted { notification } => {
                    report.notifications.push(notification.clone())
                }
            }
        }

        report
    }

    pub fn has_errors(&self) -> bool {
        self.notifications
            .iter()
            .any(|n| n.kind == NotificationKind::Error)
    }

    /// Render the report as a formatted string.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push('\n');
        out.push_str("╔══════════════════════════════════════════════════════════════╗\n");
        out.push_str("║                   HEIMDALL ACCESS TOKENS                    ║\n");
        out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Command:            {:>38} ║\n", self.command));
        out.push_str(&format!("║  Signals:            {:>38} ║\n", self.signal_count));
        out.push_str(&format!(
            "║  Loading:            {:>38} ║\n",
            if self.loading_balance > 0 { "pending" } else { "done" }
        ));
        out.push_str(&format!("║  Elapsed:            {:>35?} ║\n", self.elapsed));

        if let Some(page) = &self.tokens {
            out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
            let total = page
                .total_elements
                .map_or_else(|| "?".to_string(), |t| t.to_string());
            out.push_str(&format!(
                "║  TOKENS ({} of {})\n",
                page.len(),
                total
            ));
            for token in &page.content {
                out.push_str(&format!("║  {}\n", token_line(token)));
            }
        }

        if let Some(token) = &self.token {
            out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
            out.push_str("║  TOKEN\n");
            out.push_str(&format!("║  {}\n", token_line(token)));
            if let Some(expires) = &token.expired_date {
                out.push_str(&format!("║     Expires: {expires}\n"));
            }
        }

        if !self.notifications.is_empty() || !self.navigations.is_empty() {
            out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
            for n in &self.notifications {
                let tag = match n.kind {
                    NotificationKind::Success => "OK ",
                    NotificationKind::Error => "ERR",
                };
                match &n.description {
                    Some(desc) => out.push_str(&format!("║  [{tag}] {}: {desc}\n", n.message)),
                    None => out.push_str(&format!("║  [{tag}] {}\n", n.message)),
                }
            }
            for path in &self.navigations {
                out.push_str(&format!("║  -> {path}\n"));
            }
        }

        out.push_str("╚══════════════════════════════════════════════════════════════╝\n");
        out
    }
}

fn token_line(token: &AccessToken) -> String {
    format!(
        "#{:<6} {:<32} app={:<6} {}",
        token.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        token.code.as_deref().unwrap_or("-"),
        token
            .app
            .as_ref()
            .map_or_else(|| "-".to_string(), |a| a.id.to_string()),
        token.status.as_deref().unwrap_or("")
    )
}
