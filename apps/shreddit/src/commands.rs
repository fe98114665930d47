//! Command handlers and the wiring between stages. Each handler builds what it
//! needs from `Config` and prints its result to stdout.

use std::sync::Arc;

use tracing::info;

use crate::captions::{AiCaptions, CaptionContext, Captions, FixedCaptions, Genre};
use crate::cli::{Command, ConfigCommand};
use crate::config::Config;
use crate::errors::AppError;
use crate::images::{HttpImageLoader, ImageSource};
use crate::layout::{CaptionLayoutEngine, TableMetrics};
use crate::llm_client::LlmClient;
use crate::pipeline::{MakeRequest, MemeOutcome, MemePipeline};
use crate::reddit::{RedditClient, RedditPost};
use crate::render::{load_font, resolve_font_path, OutlinedTextPainter};
use crate::store::MemeStore;

pub async fn run(command: Command, config: &mut Config) -> Result<(), AppError> {
    match command {
        Command::Make {
            source,
            top,
            bottom,
            ai,
            band,
            genre,
            output,
        } => {
            let context = caption_context(band, genre);
            let request = MakeRequest {
                source: ImageSource::parse(&source)?,
                context: context.clone(),
                output_name: output,
            };
            let pipeline = build_pipeline(config)?;

            let outcome = if ai || context != CaptionContext::Generic {
                let ai = ai_captions(config)?;
                pipeline.create(&request, &ai).await?
            } else {
                let captions = Captions::new(top, bottom);
                if captions.is_empty() {
                    return Err(AppError::Validation(
                        "provide --top and/or --bottom, or use --ai".to_string(),
                    ));
                }
                pipeline.create(&request, &FixedCaptions::new(captions)).await?
            };
            print_outcome(&outcome);
        }

        Command::Browse {
            subreddit,
            category,
            limit,
            no_validate,
        } => {
            let subreddit = subreddit
                .or_else(|| config.settings.default_subreddits.first().cloned())
                .unwrap_or_else(|| "memes".to_string());
            let posts = reddit_client(config)?
                .with_url_validation(!no_validate)
                .fetch_memes(&subreddit, category, limit)
                .await?;
            print_posts(&posts);
        }

        Command::Search { keyword, limit } => {
            let posts = reddit_client(config)?.search_memes(&keyword, limit).await?;
            print_posts(&posts);
        }

        Command::Trending { limit } => {
            let subs = reddit_client(config)?.trending_meme_subreddits(limit).await?;
            for sub in subs {
                println!("r/{:<24} {:>10} subscribers  {}", sub.name, sub.subscribers, sub.description);
            }
        }

        Command::Band { name, limit, pick } => {
            let posts = reddit_client(config)?.search_band_images(&name, limit).await?;
            print_posts(&posts);
            if let Some(n) = pick {
                let context = CaptionContext::Band { name };
                make_from_pick(config, &posts, n, context).await?;
            }
        }

        Command::Genre { genre, limit, pick } => {
            let posts = reddit_client(config)?.search_genre_images(genre, limit).await?;
            print_posts(&posts);
            if let Some(n) = pick {
                make_from_pick(config, &posts, n, CaptionContext::Genre(genre)).await?;
            }
        }

        Command::Genres => {
            for genre in Genre::ALL {
                let p = genre.personality();
                println!("{:<12} {}", genre.display_name(), p.persona);
            }
        }

        Command::Regenerate { path, band, genre } => {
            let context = caption_context(band, genre);
            let ai = ai_captions(config)?;
            let outcome = build_pipeline(config)?
                .regenerate(&path, &context, &ai)
                .await?;
            print_outcome(&outcome);
        }

        Command::Gallery { limit } => {
            let store = MemeStore::new(&config.settings.image_editor.output_dir);
            let memes = store.recent(limit)?;
            if memes.is_empty() {
                println!("No memes in {} yet.", store.output_dir().display());
            }
            for meme in memes {
                println!(
                    "{}  {}",
                    meme.created_at.format("%Y-%m-%d %H:%M:%S"),
                    meme.path.display()
                );
            }
        }

        Command::Layout {
            text,
            width,
            height,
            band,
            font,
        } => {
            let family = font.unwrap_or(config.settings.image_editor.fallback_metrics);
            let engine = CaptionLayoutEngine::new(config.settings.layout.clone())
                .with_metrics(Arc::new(TableMetrics::new(family)));
            let prepared = config.settings.caption_style.prepare(&text);
            let layout = engine.layout(width, height, &prepared, band)?;
            let json = serde_json::to_string_pretty(&layout)
                .map_err(|e| AppError::Internal(e.into()))?;
            println!("{json}");
        }

        Command::Config { action } => run_config(action, config)?,
    }
    Ok(())
}

fn run_config(action: ConfigCommand, config: &mut Config) -> Result<(), AppError> {
    match action {
        ConfigCommand::Show => {
            let mut shown = config.settings.clone();
            shown.reddit = config.reddit_credentials();
            if !shown.reddit.client_secret.is_empty() {
                shown.reddit.client_secret = "********".to_string();
            }
            let json = serde_json::to_string_pretty(&shown)
                .map_err(|e| AppError::Internal(e.into()))?;
            println!("# {}", config.settings_path.display());
            println!("{json}");
            println!(
                "# AI captions: {}",
                if config.ai_available() {
                    "available"
                } else {
                    "unavailable"
                }
            );
        }
        ConfigCommand::Reddit {
            client_id,
            client_secret,
            user_agent,
        } => {
            config
                .settings
                .update_reddit_credentials(&client_id, &client_secret, user_agent.as_deref());
            config.save_settings()?;
            println!("Reddit credentials saved.");
        }
        ConfigCommand::Ai {
            enable,
            disable: _,
            temp_dir,
            model,
        } => {
            config
                .settings
                .update_ai_settings(enable, temp_dir, model.as_deref());
            config.save_settings()?;
            println!(
                "AI captions {}.",
                if enable { "enabled" } else { "disabled" }
            );
            if enable && config.openai_api_key.is_none() {
                println!("Note: set OPENAI_API_KEY to actually use them.");
            }
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Wiring
// ────────────────────────────────────────────────────────────────────────────

fn caption_context(band: Option<String>, genre: Option<Genre>) -> CaptionContext {
    match (band, genre) {
        (Some(name), _) => CaptionContext::Band { name },
        (None, Some(genre)) => CaptionContext::Genre(genre),
        (None, None) => CaptionContext::Generic,
    }
}

fn reddit_client(config: &Config) -> Result<RedditClient, AppError> {
    Ok(RedditClient::new(
        config.reddit_credentials(),
        config.settings.default_subreddits.clone(),
        config.settings.guitar_subreddits.clone(),
    )?)
}

fn ai_captions(config: &Config) -> Result<AiCaptions, AppError> {
    if !config.settings.ai.enabled {
        return Err(AppError::AiUnavailable(
            "AI is disabled; run `shreddit config ai --enable`".to_string(),
        ));
    }
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or_else(|| AppError::AiUnavailable("OPENAI_API_KEY is not set".to_string()))?;
    let client = LlmClient::new(api_key, &config.openai_base_url, &config.settings.ai.model)?;
    info!("LLM client initialized (model: {})", client.model());
    Ok(AiCaptions::new(client))
}

fn build_pipeline(config: &Config) -> Result<MemePipeline, AppError> {
    let editor = &config.settings.image_editor;
    let font_path = resolve_font_path(editor.font_path()).ok_or_else(|| {
        AppError::Font(
            "no usable font found; set image_editor.font_path in the settings file".to_string(),
        )
    })?;
    let painter = OutlinedTextPainter::new(load_font(&font_path)?, config.settings.caption_style.clone());
    let engine = CaptionLayoutEngine::new(config.settings.layout.clone()).with_metrics(painter.metrics());

    let http = reqwest::Client::builder()
        .user_agent(config.reddit_credentials().user_agent)
        .build()
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(MemePipeline::new(
        Arc::new(HttpImageLoader::new(http)),
        engine,
        Arc::new(painter),
        config.settings.caption_style.clone(),
        MemeStore::new(&editor.output_dir),
    )
    .with_scratch_dir(&config.settings.ai.temp_dir))
}

async fn make_from_pick(
    config: &Config,
    posts: &[RedditPost],
    n: usize,
    context: CaptionContext,
) -> Result<(), AppError> {
    let post = n
        .checked_sub(1)
        .and_then(|i| posts.get(i))
        .ok_or_else(|| {
            AppError::Validation(format!("--pick {n} is out of range (1..={})", posts.len()))
        })?;

    let request = MakeRequest {
        source: ImageSource::parse(&post.url)?,
        context,
        output_name: None,
    };
    let ai = ai_captions(config)?;
    let outcome = build_pipeline(config)?.create(&request, &ai).await?;
    print_outcome(&outcome);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

fn print_posts(posts: &[RedditPost]) {
    if posts.is_empty() {
        println!("No images found.");
        return;
    }
    for (i, post) in posts.iter().enumerate() {
        println!(
            "{:>3}. [r/{}] {} (score {})\n     {}",
            i + 1,
            post.subreddit,
            post.title,
            post.score,
            post.url
        );
    }
}

fn print_outcome(outcome: &MemeOutcome) {
    println!("Saved {}", outcome.path.display());
    if !outcome.top.is_empty() {
        println!("  top:    {}", outcome.top);
    }
    if !outcome.bottom.is_empty() {
        println!("  bottom: {}", outcome.bottom);
    }
    for layout in &outcome.layouts {
        println!(
            "  {:?}: {}px, y {}..{}{}  {}",
            layout.band,
            layout.font_size_px,
            layout.origin_y,
            layout.bottom_y(),
            if layout.overflow { ", overflow" } else { "" },
            layout.line_texts().join(" / ")
        );
    }
}
