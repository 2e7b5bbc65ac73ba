//! Deterministic per-platform rewrites.

use std::collections::HashSet;

use super::content::{ContentItem, PlatformVariant};
use crate::util::serde::Platform;

/// Appended when text is shortened.
pub const ELLIPSIS: char = '…';

const TWITTER_QUESTION: &str = "What do you think?";
const TWITTER_MAX_TAGS: usize = 2;
const LINKEDIN_CTA: &str = "What has your experience been? Share your perspective in the comments.";
const INSTAGRAM_PROMPT: &str = "📸 Double-tap if this resonates and share it with someone who needs to see it!";
const INSTAGRAM_MAX_TAGS: usize = 30;
const FACEBOOK_PROMPT: &str = "👉 Let us know your thoughts in the comments!";
const TIKTOK_HOOK: &str = "🎬";
const TIKTOK_BODY_CAP: usize = 150;
const TIKTOK_MAX_TAGS: usize = 5;

/// Normalize hashtags to `#tag`, dropping blanks and case-insensitive duplicates.
pub fn normalize_hashtags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter_map(|tag| {
            let cleaned: String = tag
                .trim()
                .trim_start_matches('#')
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            (!cleaned.is_empty()).then(|| format!("#{cleaned}"))
        })
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect()
}

/// Shorten `text` to at most `max` characters, ending in [`ELLIPSIS`] when cut.
pub fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    if text.chars().count() <= max {
        return (text.to_string(), false);
    }
    if max == 0 {
        return (String::new(), true);
    }
    let mut out: String = text.chars().take(max - 1).collect();
    let kept = out.trim_end().len();
    out.truncate(kept);
    out.push(ELLIPSIS);
    (out, true)
}

/// One variant per distinct target platform.
pub fn variants(item: &ContentItem) -> Vec<PlatformVariant> {
    item.distinct_platforms()
        .into_iter()
        .map(|platform| platform_variant(item, platform))
        .collect()
}

/// Rewrite `item` for `platform`.
pub fn platform_variant(item: &ContentItem, platform: Platform) -> PlatformVariant {
    let tags = normalize_hashtags(&item.hashtags);
    let title = item.title.trim();
    let description = item.description.trim();
    let lead = if description.is_empty() { title } else { description };

    match platform {
        Platform::Twitter => {
            let tags: Vec<String> = tags.into_iter().take(TWITTER_MAX_TAGS).collect();
            let question = if lead.ends_with('?') {
                String::new()
            } else {
                TWITTER_QUESTION.to_string()
            };
            Layout {
                head: Vec::new(),
                body: lead,
                body_cap: None,
                tail: vec![question, tags.join(" ")],
                separator: " ",
            }
            .render(platform, tags)
        }
        Platform::LinkedIn => Layout {
            head: vec![title.to_string()],
            body: description,
            body_cap: None,
            tail: vec![LINKEDIN_CTA.to_string(), tags.join(" ")],
            separator: "\n\n",
        }
        .render(platform, tags),
        Platform::Instagram => {
            let tags: Vec<String> = tags.into_iter().take(INSTAGRAM_MAX_TAGS).collect();
            Layout {
                head: Vec::new(),
                body: lead,
                body_cap: None,
                tail: vec![INSTAGRAM_PROMPT.to_string(), tags.join(" ")],
                separator: "\n\n",
            }
            .render(platform, tags)
        }
        Platform::Facebook => Layout {
            head: vec![title.to_string()],
            body: description,
            body_cap: None,
            tail: vec![FACEBOOK_PROMPT.to_string()],
            separator: "\n\n",
        }
        .render(platform, Vec::new()),
        Platform::TikTok => {
            let tags: Vec<String> = tags.into_iter().take(TIKTOK_MAX_TAGS).collect();
            Layout {
                head: vec![TIKTOK_HOOK.to_string()],
                body: lead,
                body_cap: Some(TIKTOK_BODY_CAP),
                tail: vec![tags.join(" ")],
                separator: " ",
            }
            .render(platform, tags)
        }
    }
}

/// Fixed parts around a body that absorbs all truncation.
struct Layout<'a> {
    head: Vec<String>,
    body: &'a str,
    body_cap: Option<usize>,
    tail: Vec<String>,
    separator: &'static str,
}

impl Layout<'_> {
    fn render(self, platform: Platform, hashtags: Vec<String>) -> PlatformVariant {
        let limit = platform.char_limit();
        let head: Vec<String> = self.head.into_iter().filter(|p| !p.is_empty()).collect();
        let tail: Vec<String> = self.tail.into_iter().filter(|p| !p.is_empty()).collect();

        let fixed = head
            .iter()
            .chain(&tail)
            .map(|p| p.chars().count())
            .sum::<usize>()
            + self.separator.chars().count() * (head.len() + tail.len());
        let budget = limit
            .saturating_sub(fixed)
            .min(self.body_cap.unwrap_or(usize::MAX));
        let (body, mut truncated) = truncate_chars(self.body, budget);

        let parts: Vec<String> = head
            .into_iter()
            .chain(std::iter::once(body))
            .chain(tail)
            .filter(|p| !p.is_empty())
            .collect();
        let (text, clipped) = truncate_chars(&parts.join(self.separator), limit);
        truncated |= clipped;

        PlatformVariant {
            platform,
            char_count: text.chars().count(),
            text,
            truncated,
            hashtags,
        }
    }
}
