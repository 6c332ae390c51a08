//! Book statistics charts.

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::api::{ApiError, BookHistory};
use crate::charts::{self, SeriesInput, DEFAULT_SECONDARY_SCALE};
use crate::commands::{api_error_text, with_promo};
use crate::parse::parse_book_identifier;
use crate::{Context, Error};

const DEFAULT_DAYS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum StatsMetric {
    #[name = "followers"]
    Followers,
    #[name = "views"]
    Views,
    #[name = "rating"]
    Rating,
}

/// Chart a book's stats history
#[poise::command(slash_command)]
pub async fn bookstats(
    ctx: Context<'_>,
    #[description = "Book ID or fiction URL"] book: String,
    #[description = "Which metric to chart (default: followers)"] metric: Option<StatsMetric>,
    #[description = "Days of history (default: 90)"]
    #[min = 7]
    #[max = 3650]
    days: Option<u32>,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!("bookstats called by {} for '{}'", ctx.author().name, book);

    let book = match parse_book_identifier(&book) {
        Ok(book) => book,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let metric = metric.unwrap_or(StatsMetric::Followers);
    let days = days.unwrap_or(DEFAULT_DAYS);

    let history = match ctx.data().api.book_history(book.id, days).await {
        Ok(history) => history,
        Err(e) => {
            if !matches!(e, ApiError::Rejected(_)) {
                error!("History fetch for book {} failed: {}", book.id, e);
            }
            ctx.say(api_error_text(&e)).await?;
            return Ok(());
        }
    };

    // Chart failure is reported on its own; the data fetch above already
    // succeeded and saying otherwise would mislead the user.
    let chart = match render_metric(&history, metric, days) {
        Ok(chart) => chart,
        Err(e) => {
            error!("Chart for book {} ({:?}) failed: {}", book.id, metric, e);
            ctx.say("Failed to generate the chart. Please try again later.")
                .await?;
            return Ok(());
        }
    };

    let attachment = serenity::CreateAttachment::bytes(chart.png, "bookstats.png");

    let mut footer_parts: Vec<String> = Vec::new();
    if chart.degraded {
        footer_parts
            .push("Dates are approximate: no sample timestamps were available".to_string());
    }
    if let Some(promo) = ctx.data().promo.next() {
        footer_parts.push(promo.to_string());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{} ({} days)", history.title, days))
        .url(book.url.clone())
        .image("attachment://bookstats.png")
        .color(0x3498db);
    if !footer_parts.is_empty() {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer_parts.join(" | ")));
    }

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .attachment(attachment),
    )
    .await?;

    Ok(())
}

fn render_metric(
    history: &BookHistory,
    metric: StatsMetric,
    days: u32,
) -> Result<charts::Chart, charts::ChartError> {
    let title = format!("{} ({} days)", history.title, days);
    match metric {
        StatsMetric::Followers => charts::render_single(
            &title,
            "Followers",
            SeriesInput {
                labels: &history.labels,
                timestamps: history.timestamps.as_deref(),
                values: &history.followers,
            },
        ),
        StatsMetric::Views => charts::render_dual(
            &title,
            "Average views",
            "Chapters",
            SeriesInput {
                labels: &history.labels,
                timestamps: history.timestamps.as_deref(),
                values: &history.views,
            },
            &history.chapters,
            DEFAULT_SECONDARY_SCALE,
        ),
        StatsMetric::Rating => charts::render_dual(
            &title,
            "Rating",
            "Ratings count",
            SeriesInput {
                labels: &history.labels,
                timestamps: history.timestamps.as_deref(),
                values: &history.rating,
            },
            &history.rating_count,
            DEFAULT_SECONDARY_SCALE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metric_with_empty_history_yields_placeholder() {
        let history = BookHistory {
            book_id: 1,
            title: "Empty".to_string(),
            labels: vec![],
            timestamps: None,
            followers: vec![],
            views: vec![],
            rating: vec![],
            rating_count: vec![],
            chapters: vec![],
        };
        for metric in [StatsMetric::Followers, StatsMetric::Views, StatsMetric::Rating] {
            let chart = render_metric(&history, metric, 90).unwrap();
            assert!(!chart.png.is_empty());
        }
    }
}
