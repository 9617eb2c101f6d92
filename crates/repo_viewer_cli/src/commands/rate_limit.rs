//! Remaining API quota.

use chrono::{DateTime, Utc};
use colored::Colorize;
use github_client::RateLimit;
use tracing::instrument;

use super::AppContext;
use crate::errors::Error;

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;

#[instrument(skip(ctx))]
pub async fn execute(ctx: &AppContext) -> Result<(), Error> {
    let limit = ctx.client.rate_limit().await?;
    print!(
        "{}",
        render_rate_limit(&limit, ctx.client.is_authenticated(), Utc::now())
    );
    Ok(())
}

/// Formats the quota and the time until it resets.
pub fn render_rate_limit(limit: &RateLimit, authenticated: bool, now: DateTime<Utc>) -> String {
    let remaining = if limit.remaining == 0 {
        limit.remaining.to_string().red().bold()
    } else {
        limit.remaining.to_string().green()
    };
    let mut output = format!(
        "{}: {} of {} requests left ({})\n",
        "Rate limit".bold(),
        remaining,
        limit.limit,
        if authenticated {
            "authenticated"
        } else {
            "anonymous"
        }
    );

    match DateTime::<Utc>::from_timestamp(limit.reset as i64, 0) {
        Some(reset) if reset > now => {
            let minutes = (reset - now).num_minutes();
            output.push_str(&format!(
                "Resets at {} (in {} min)\n",
                reset.format("%H:%M:%S UTC"),
                minutes
            ));
        }
        _ => output.push_str("Quota has already reset\n"),
    }

    if !authenticated {
        output.push_str(&format!(
            "{}\n",
            "Set GITHUB_TOKEN to raise the limit".dimmed()
        ));
    }
    output
}
