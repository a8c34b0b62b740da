//! Prompt templates for the generation engine
//!
//! Supports {{variable}} substitution. Templates are bundled at compile time;
//! a project can override them by dropping files with the same names into
//! `<project>/prompts/`.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use crate::errors::Result;
use crate::schemas::Context;

const RESEARCH_PROMPT_TEMPLATE: &str = include_str!("../../prompts/research_prompt.md");
const RESEARCH_TEMPLATE: &str = include_str!("../../prompts/research.md");
const ARTICLE_TEMPLATE: &str = include_str!("../../prompts/article.md");
const SOCIAL_POSTS_TEMPLATE: &str = include_str!("../../prompts/social_posts.md");
const PODCAST_SCRIPT_TEMPLATE: &str = include_str!("../../prompts/podcast_script.md");
const REEL_SCRIPT_TEMPLATE: &str = include_str!("../../prompts/reel_script.md");
const TRANSLATE_TEMPLATE: &str = include_str!("../../prompts/translate.md");
const CLEANUP_TEMPLATE: &str = include_str!("../../prompts/cleanup.md");

/// What the generation engine is being asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    ResearchPrompt,
    Research,
    Article,
    SocialPosts,
    PodcastScript,
    ReelScript,
    Translate,
    CleanupTranscript,
}

impl PromptKind {
    /// File name used for project-level template overrides
    pub fn template_name(&self) -> &'static str {
        match self {
            PromptKind::ResearchPrompt => "research_prompt.md",
            PromptKind::Research => "research.md",
            PromptKind::Article => "article.md",
            PromptKind::SocialPosts => "social_posts.md",
            PromptKind::PodcastScript => "podcast_script.md",
            PromptKind::ReelScript => "reel_script.md",
            PromptKind::Translate => "translate.md",
            PromptKind::CleanupTranscript => "cleanup.md",
        }
    }

    fn bundled_template(&self) -> &'static str {
        match self {
            PromptKind::ResearchPrompt => RESEARCH_PROMPT_TEMPLATE,
            PromptKind::Research => RESEARCH_TEMPLATE,
            PromptKind::Article => ARTICLE_TEMPLATE,
            PromptKind::SocialPosts => SOCIAL_POSTS_TEMPLATE,
            PromptKind::PodcastScript => PODCAST_SCRIPT_TEMPLATE,
            PromptKind::ReelScript => REEL_SCRIPT_TEMPLATE,
            PromptKind::Translate => TRANSLATE_TEMPLATE,
            PromptKind::CleanupTranscript => CLEANUP_TEMPLATE,
        }
    }
}

/// Render {{variable}} placeholders from the map. Unknown variables render
/// as empty strings.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> String {
    let re = Regex::new(r"\{\{(\w+)\}\}").expect("static regex");
    re.replace_all(template, |caps: &regex::Captures| {
        variables.get(&caps[1]).cloned().unwrap_or_default()
    })
    .into_owned()
}

/// Load a prompt template, preferring a project-level override.
pub fn load_template(project_dir: &Path, kind: PromptKind) -> Result<String> {
    let override_path = project_dir.join("prompts").join(kind.template_name());
    if override_path.exists() {
        return Ok(std::fs::read_to_string(&override_path)?);
    }
    Ok(kind.bundled_template().to_string())
}

/// Build a rendered prompt for the given kind from the context and the
/// source text the stage is transforming.
pub fn build_prompt(ctx: &Context, kind: PromptKind, source_text: &str) -> Result<String> {
    let template = load_template(&ctx.project_dir, kind)?;

    let mut variables = HashMap::new();
    variables.insert("project".to_string(), ctx.project_name.clone());
    variables.insert("lang".to_string(), ctx.lang.clone());
    variables.insert("source".to_string(), source_text.to_string());

    Ok(render_template(&template, &variables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::ContextOptions;
    use tempfile::TempDir;

    #[test]
    fn test_render_substitutes_variables() {
        let mut vars = HashMap::new();
        vars.insert("lang".to_string(), "es".to_string());
        vars.insert("source".to_string(), "hola".to_string());

        let out = render_template("lang={{lang}} body={{source}}", &vars);
        assert_eq!(out, "lang=es body=hola");
    }

    #[test]
    fn test_render_unknown_variable_is_empty() {
        let out = render_template("x={{missing}}!", &HashMap::new());
        assert_eq!(out, "x=!");
    }

    #[test]
    fn test_bundled_templates_mention_source() {
        for kind in [
            PromptKind::ResearchPrompt,
            PromptKind::Research,
            PromptKind::Article,
            PromptKind::SocialPosts,
            PromptKind::PodcastScript,
            PromptKind::ReelScript,
            PromptKind::Translate,
            PromptKind::CleanupTranscript,
        ] {
            assert!(
                kind.bundled_template().contains("{{source}}"),
                "{} must embed the source text",
                kind.template_name()
            );
        }
    }

    #[test]
    fn test_project_override_wins() {
        let temp = TempDir::new().unwrap();
        let prompts_dir = temp.path().join("prompts");
        std::fs::create_dir_all(&prompts_dir).unwrap();
        std::fs::write(prompts_dir.join("article.md"), "custom {{source}}").unwrap();

        let template = load_template(temp.path(), PromptKind::Article).unwrap();
        assert_eq!(template, "custom {{source}}");
    }

    #[test]
    fn test_build_prompt_fills_context_fields() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::create(ContextOptions {
            project_name: "talk".to_string(),
            base_dir: temp.path().to_path_buf(),
            lang: Some("en".to_string()),
            initial_state: None,
        })
        .unwrap();

        let prompt = build_prompt(&ctx, PromptKind::Article, "the transcript").unwrap();
        assert!(prompt.contains("the transcript"));
        assert!(prompt.contains("en"));
    }
}
