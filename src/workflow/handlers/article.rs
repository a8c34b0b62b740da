//! Article generation and its review gate

use tracing::info;

use crate::domain::get_next_state;
use crate::errors::{RelatoError, Result};
use crate::interact::{Prompted, SelectOption};
use crate::prompts::{build_prompt, PromptKind};
use crate::schemas::{Context, State};
use crate::workflow::{StageDeps, StageOutcome};

use super::{export_artifact, mark_stage_done, read_source_text, run_artifact};

/// Generate the article from the research summary (or the transcript when
/// no research ran). Each call counts against the attempt budget.
pub async fn article_generate(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let source = read_source_text(&ctx)?;

    // Rejection feedback from the previous review round goes into the prompt
    let source = match &ctx.last_error {
        Some(feedback) => format!("{}\n\nPrevious draft was rejected: {}", source, feedback),
        None => source,
    };

    let prompt = build_prompt(&ctx, PromptKind::Article, &source)?;
    let dest = run_artifact(&ctx, "article.md");

    let ctx = ctx.bump_article_attempts();
    info!(attempt = ctx.article_attempts, "generating article");
    deps.engine.generate(PromptKind::Article, &prompt, &dest).await?;

    // Social posts ride along with every article draft
    let posts_prompt = build_prompt(&ctx, PromptKind::SocialPosts, &source)?;
    let posts_dest = run_artifact(&ctx, "social_posts.md");
    deps.engine
        .generate(PromptKind::SocialPosts, &posts_prompt, &posts_dest)
        .await?;

    let ctx = ctx.with_article(&dest).with_social_posts(&posts_dest);
    let ctx = mark_stage_done(ctx, "article_generate")?;
    Ok(StageOutcome::advance(State::ArticleReview, ctx))
}

/// Review gate for the article. Approval (direct or after an edit) clears
/// the error marker and moves on; rejection records feedback and lets the
/// retry policy decide whether another attempt is allowed.
pub async fn article_review(ctx: Context, deps: &StageDeps<'_>) -> Result<StageOutcome> {
    let article = ctx
        .article_path
        .clone()
        .ok_or_else(|| RelatoError::EngineError("No article available for review".to_string()))?;

    let body = std::fs::read_to_string(&article)?;
    deps.interact.show("Article", &body);

    let options = [
        SelectOption::new("approve", "Approve the article"),
        SelectOption::new("edit", "Edit it, then approve"),
        SelectOption::new("reject", "Reject and regenerate"),
    ];

    let choice = match deps.interact.select("What now?", &options)? {
        Prompted::Value(v) => v,
        Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
    };

    match choice.as_str() {
        "approve" => approve(ctx, deps, &article),
        "edit" => match deps.interact.edit_file(&article)? {
            Prompted::Value(()) => approve(ctx, deps, &article),
            Prompted::Cancelled => Ok(StageOutcome::Cancelled),
        },
        "reject" => {
            let feedback = match deps.interact.text("Why was it rejected?")? {
                Prompted::Value(text) if !text.trim().is_empty() => text,
                Prompted::Value(_) => "rejected".to_string(),
                Prompted::Cancelled => return Ok(StageOutcome::Cancelled),
            };

            let ctx = ctx.with_error(Some(feedback));
            let next = get_next_state(State::ArticleReview, &ctx)?;
            if next == State::OutputSelect {
                info!("attempt budget exhausted, keeping the last draft");
            }
            Ok(StageOutcome::advance(next, ctx))
        }
        other => Err(RelatoError::Routing(format!(
            "Unknown review choice: {}",
            other
        ))),
    }
}

fn approve(ctx: Context, deps: &StageDeps<'_>, article: &std::path::Path) -> Result<StageOutcome> {
    let ctx = ctx.with_error(None);
    let mut ctx = export_artifact(ctx, deps, article)?;
    if let Some(posts) = ctx.social_posts_path.clone() {
        ctx = export_artifact(ctx, deps, &posts)?;
    }
    let ctx = mark_stage_done(ctx, "article_review")?;
    let next = get_next_state(State::ArticleReview, &ctx)?;
    Ok(StageOutcome::advance(next, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_ARTICLE_ATTEMPTS;
    use crate::engine::stub::StubEngine;
    use crate::interact::scripted::{Answer, ScriptedInteraction};
    use crate::schemas::{Config, ContextOptions};
    use tempfile::TempDir;

    fn make_ctx(temp: &TempDir) -> Context {
        let ctx = Context::create(ContextOptions {
            project_name: "p".to_string(),
            base_dir: temp.path().to_path_buf(),
            lang: None,
            initial_state: None,
        })
        .unwrap();
        let transcript = ctx.run_dir.join("transcript.txt");
        std::fs::write(&transcript, "the transcript").unwrap();
        ctx.with_transcript(&transcript)
    }

    fn advance_of(outcome: StageOutcome) -> (State, Context) {
        match outcome {
            StageOutcome::Advance { next_state, context } => (next_state, context),
            other => panic!("expected advance, got {:?}", other),
        }
    }

    fn deps<'a>(
        config: &'a Config,
        interact: &'a ScriptedInteraction,
        engine: &'a StubEngine,
    ) -> StageDeps<'a> {
        StageDeps {
            config,
            interact,
            engine,
        }
    }

    #[tokio::test]
    async fn test_generate_bumps_attempts() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp);
        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![]);
        let engine = StubEngine::default();
        let deps = deps(&config, &interact, &engine);

        let (next, ctx) = advance_of(article_generate(ctx, &deps).await.unwrap());
        assert_eq!(next, State::ArticleReview);
        assert_eq!(ctx.article_attempts, 1);
        assert!(ctx.article_path.as_ref().unwrap().exists());
        assert!(ctx.social_posts_path.as_ref().unwrap().exists());
    }

    #[tokio::test]
    async fn test_approve_clears_error_and_exports() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp).with_error(Some("rejected".to_string()));
        let article = ctx.run_dir.join("article.md");
        std::fs::write(&article, "draft").unwrap();
        let ctx = ctx.with_article(&article);

        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![Answer::Select("approve".to_string())]);
        let engine = StubEngine::default();
        let deps = deps(&config, &interact, &engine);

        let (next, ctx) = advance_of(article_review(ctx, &deps).await.unwrap());
        assert_eq!(next, State::OutputSelect);
        assert!(ctx.last_error.is_none());
        assert_eq!(ctx.output_files.len(), 1);
    }

    #[tokio::test]
    async fn test_reject_records_feedback_and_retries() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp).bump_article_attempts();
        let article = ctx.run_dir.join("article.md");
        std::fs::write(&article, "draft").unwrap();
        let ctx = ctx.with_article(&article);

        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![
            Answer::Select("reject".to_string()),
            Answer::Text("too vague".to_string()),
        ]);
        let engine = StubEngine::default();
        let deps = deps(&config, &interact, &engine);

        let (next, ctx) = advance_of(article_review(ctx, &deps).await.unwrap());
        assert_eq!(next, State::ArticleGenerate);
        assert_eq!(ctx.last_error.as_deref(), Some("too vague"));
    }

    #[tokio::test]
    async fn test_reject_after_exhaustion_moves_forward() {
        let temp = TempDir::new().unwrap();
        let mut ctx = make_ctx(&temp);
        for _ in 0..MAX_ARTICLE_ATTEMPTS {
            ctx = ctx.bump_article_attempts();
        }
        let article = ctx.run_dir.join("article.md");
        std::fs::write(&article, "draft").unwrap();
        let ctx = ctx.with_article(&article);

        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![
            Answer::Select("reject".to_string()),
            Answer::Text("still bad".to_string()),
        ]);
        let engine = StubEngine::default();
        let deps = deps(&config, &interact, &engine);

        let (next, _) = advance_of(article_review(ctx, &deps).await.unwrap());
        assert_eq!(next, State::OutputSelect);
    }

    #[tokio::test]
    async fn test_edit_counts_as_approval() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp);
        let article = ctx.run_dir.join("article.md");
        std::fs::write(&article, "draft").unwrap();
        let ctx = ctx.with_article(&article);

        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![
            Answer::Select("edit".to_string()),
            Answer::Edit,
        ]);
        let engine = StubEngine::default();
        let deps = deps(&config, &interact, &engine);

        let (next, ctx) = advance_of(article_review(ctx, &deps).await.unwrap());
        assert_eq!(next, State::OutputSelect);
        assert_eq!(ctx.output_files.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_includes_rejection_feedback() {
        let temp = TempDir::new().unwrap();
        let ctx = make_ctx(&temp).with_error(Some("needs examples".to_string()));
        let config = Config::default();
        let interact = ScriptedInteraction::new(vec![]);
        let engine = StubEngine::default();
        let deps = deps(&config, &interact, &engine);

        let (_, _ctx) = advance_of(article_generate(ctx, &deps).await.unwrap());
        // The feedback reached the engine through the prompt
        let calls = engine.calls.lock().unwrap();
        assert!(calls[0].contains("generate"));
    }
}
