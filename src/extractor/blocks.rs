//! Article-block parsing.
//!
//! The archive generator has produced two markup shapes over time:
//!
//! 1. **Single-language**: the `.article-block` holds one `h3 a` title and
//!    one `.summary` element directly.
//! 2. **Multi-language**: the block wraps per-language `.content` divs inside
//!    a `.content-wrapper`; each content div carries the language code as an
//!    extra CSS class next to `content`/`active` and holds its own title
//!    anchor and summary.
//!
//! [`BlockVariant::detect`] picks the parser per block, so mixed archives
//! parse correctly. Both shapes share the header line
//! `언론사: <source> | 발행 시간: <timestamp>` and the reliability annotation
//! `신뢰도: 높음/보통/낮음` embedded in the summary element, which is stripped
//! from the clean summary text after capture.

use crate::models::{
    DEFAULT_LANGUAGE, LocalizedText, NewsArticle, PLACEHOLDER_LINK, Reliability, UNKNOWN_SOURCE,
};
use crate::utils::truncate_for_log;
use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Output format for the `date` field.
pub(crate) const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static ARTICLE_BLOCK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".article-block").unwrap());
static HEADER_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static TITLE_LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h3 a").unwrap());
static SUMMARY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".summary").unwrap());
static IMAGE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".article-image").unwrap());
static CONTENT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".content-wrapper .content").unwrap());

static SOURCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"언론사:\s*(.*?)\s*\|").unwrap());
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"발행 시간:\s*(.*)").unwrap());
static RELIABILITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"신뢰도:\s*(높음|보통|낮음)").unwrap());
static DOTTED_TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\.(\d{2})\.(\d{2})\s+(\d{2}):(\d{2})$").unwrap());

/// Markup shape of one article block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockVariant {
    SingleLanguage,
    MultiLanguage,
}

impl BlockVariant {
    /// Classify a block by the presence of per-language content divs.
    pub fn detect(block: ElementRef<'_>) -> Self {
        if block.select(&CONTENT_SEL).next().is_some() {
            BlockVariant::MultiLanguage
        } else {
            BlockVariant::SingleLanguage
        }
    }
}

/// Parse every `.article-block` in a document into candidate records.
///
/// Candidates missing a title in every language are dropped silently;
/// incomplete markup is expected, not an error.
pub(crate) fn parse_document_blocks(
    document: &Html,
    category: &str,
    sub_category: Option<&str>,
) -> Vec<NewsArticle> {
    document
        .select(&ARTICLE_BLOCK_SEL)
        .filter_map(|block| parse_block(block, category, sub_category))
        .collect()
}

/// Parse a single article block into a record, if it is valid.
pub(crate) fn parse_block(
    block: ElementRef<'_>,
    category: &str,
    sub_category: Option<&str>,
) -> Option<NewsArticle> {
    let (source, date) = parse_header(block);
    let image_url = block
        .select(&IMAGE_SEL)
        .next()
        .and_then(|image| image.value().attr("src"))
        .map(str::to_string);

    let (titles, summaries, link, reliability) = match BlockVariant::detect(block) {
        BlockVariant::SingleLanguage => parse_single_language(block),
        BlockVariant::MultiLanguage => parse_multi_language(block),
    };

    if titles.is_blank() {
        debug!(category, "Dropping article block without any title");
        return None;
    }
    let link = link
        .filter(|href| !href.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER_LINK.to_string());
    if link.is_empty() {
        return None;
    }

    let title = titles.resolve(DEFAULT_LANGUAGE).to_string();
    let summary = summaries.resolve(DEFAULT_LANGUAGE).to_string();
    let search_text = format!("{title} {summary} {source}").to_lowercase();

    Some(NewsArticle {
        category: category.to_string(),
        sub_category: sub_category.map(str::to_string),
        title,
        translated_titles: titles,
        summary,
        translated_summaries: summaries,
        link,
        source,
        date,
        reliability: reliability.unwrap_or_default(),
        image_url,
        search_text,
    })
}

/// Recover publisher and publication time from the block's header line.
fn parse_header(block: ElementRef<'_>) -> (String, String) {
    let header = block
        .select(&HEADER_SEL)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let source = SOURCE_RE
        .captures(&header)
        .map(|captures| captures[1].trim().to_string())
        .filter(|source| !source.is_empty())
        .unwrap_or_else(|| {
            if !header.trim().is_empty() {
                debug!(
                    header = %truncate_for_log(header.trim(), 120),
                    "No publisher label in block header"
                );
            }
            UNKNOWN_SOURCE.to_string()
        });

    let date = match TIMESTAMP_RE.captures(&header) {
        Some(captures) => normalize_timestamp(&captures[1]),
        None => now_iso(),
    };

    (source, date)
}

fn parse_single_language(
    block: ElementRef<'_>,
) -> (LocalizedText, LocalizedText, Option<String>, Option<Reliability>) {
    let mut titles = LocalizedText::new();
    let mut link = None;
    if let Some(anchor) = block.select(&TITLE_LINK_SEL).next() {
        let title = element_text(anchor);
        if !title.trim().is_empty() {
            titles = LocalizedText::single(title.trim());
        }
        link = anchor.value().attr("href").map(str::to_string);
    }

    let mut summaries = LocalizedText::new();
    let mut reliability = None;
    if let Some(summary) = block.select(&SUMMARY_SEL).next() {
        let (text, parsed) = summary_and_reliability(summary);
        if !text.is_empty() {
            summaries = LocalizedText::single(text);
        }
        reliability = parsed;
    }

    (titles, summaries, link, reliability)
}

fn parse_multi_language(
    block: ElementRef<'_>,
) -> (LocalizedText, LocalizedText, Option<String>, Option<Reliability>) {
    let mut titles = LocalizedText::new();
    let mut summaries = LocalizedText::new();
    let mut link = None;
    let mut reliability: Option<Reliability> = None;

    for content in block.select(&CONTENT_SEL) {
        let Some(language) = language_class(content) else {
            continue;
        };
        if let Some(anchor) = content.select(&TITLE_LINK_SEL).next() {
            let title = element_text(anchor);
            if !title.trim().is_empty() {
                titles.insert(language.as_str(), title.trim());
            }
            if link.is_none() {
                link = anchor.value().attr("href").map(str::to_string);
            }
        }
        if let Some(summary) = content.select(&SUMMARY_SEL).next() {
            let (text, parsed) = summary_and_reliability(summary);
            if !text.is_empty() {
                summaries.insert(language.as_str(), text);
            }
            // First language block with an annotation wins.
            if reliability.is_none() {
                reliability = parsed;
            }
        }
    }

    (titles, summaries, link, reliability)
}

/// Pull the language code off a `.content` div.
///
/// Shared classes (`content`, the visibility toggle `active`) are excluded;
/// whatever remains is the language code.
fn language_class(content: ElementRef<'_>) -> Option<String> {
    content
        .value()
        .classes()
        .find(|class| *class != "content" && *class != "active")
        .map(str::to_string)
}

/// Clean summary text and reliability label from a `.summary` element.
///
/// Text nodes under the `.reliability` span are excluded from the clean
/// summary; the label is captured from the span. Older markup carries the
/// annotation as plain text, so a second pass captures and strips it from
/// the collected text.
fn summary_and_reliability(summary: ElementRef<'_>) -> (String, Option<Reliability>) {
    let mut clean = String::new();
    let mut reliability = None;

    for node in summary.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let text: &str = text;
        let in_annotation = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| element.classes().any(|class| class == "reliability"))
        });
        if in_annotation {
            if reliability.is_none() {
                reliability = RELIABILITY_RE
                    .captures(text)
                    .map(|captures| Reliability::from_label(&captures[1]));
            }
        } else {
            clean.push_str(text);
        }
    }

    if reliability.is_none() {
        if let Some(captures) = RELIABILITY_RE.captures(&clean) {
            reliability = Some(Reliability::from_label(&captures[1]));
            clean = RELIABILITY_RE.replace(&clean, "").into_owned();
        }
    }

    (clean.trim().to_string(), reliability)
}

/// Normalize a raw timestamp into `%Y-%m-%dT%H:%M:%S`.
///
/// Accepts the dotted locale form `YYYY.MM.DD HH:mm` and the generator's
/// `YYYY-MM-DD HH:MM:SS`. Anything unparseable falls back to the current
/// local time.
pub(crate) fn normalize_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    let candidate = match DOTTED_TIMESTAMP_RE.captures(raw) {
        Some(c) => format!("{}-{}-{}T{}:{}:00", &c[1], &c[2], &c[3], &c[4], &c[5]),
        None => raw.replacen(' ', "T", 1),
    };

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&candidate, format) {
            return parsed.format(ISO_FORMAT).to_string();
        }
    }

    warn!(raw, "Unparseable publication time; falling back to now");
    now_iso()
}

fn now_iso() -> String {
    Local::now().naive_local().format(ISO_FORMAT).to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_block(html: &Html) -> ElementRef<'_> {
        html.select(&ARTICLE_BLOCK_SEL).next().unwrap()
    }

    const SINGLE_LANGUAGE_BLOCK: &str = r#"
        <html><body>
        <div class="article-block">
          <p><b>언론사:</b> 한겨레 | <b>발행 시간:</b> 2025.08.26 02:00</p>
          <h3><a href="https://news.example.com/a1">해외 기업인 입국심사 빨라진다</a></h3>
          <div class="summary">정부가 입국 절차 간소화 계획을 밝혔다.<span class="reliability high">신뢰도: 높음</span></div>
        </div>
        </body></html>
    "#;

    const MULTI_LANGUAGE_BLOCK: &str = r#"
        <html><body>
        <div class="article-block" id="article-0">
          <p><b>언론사:</b> 연합뉴스 | <b>발행 시간:</b> 2025-08-25 01:16:45</p>
          <div class="content-wrapper">
            <div class="content ko active">
              <h3><a href="https://news.example.com/a2" target="_blank">노동시장, 미국 경제 뇌관 되나</a></h3>
              <div class="summary">미국 노동 시장에 불안 요소가 커지고 있다.<span class="reliability medium">신뢰도: 보통</span></div>
            </div>
            <div class="content en">
              <h3><a href="https://news.example.com/a2" target="_blank">Is the labor market a risk to the US economy?</a></h3>
              <div class="summary">미국 노동 시장에 불안 요소가 커지고 있다.<span class="reliability medium">신뢰도: 보통</span></div>
            </div>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_variant_detection() {
        let single = Html::parse_document(SINGLE_LANGUAGE_BLOCK);
        assert_eq!(
            BlockVariant::detect(first_block(&single)),
            BlockVariant::SingleLanguage
        );
        let multi = Html::parse_document(MULTI_LANGUAGE_BLOCK);
        assert_eq!(
            BlockVariant::detect(first_block(&multi)),
            BlockVariant::MultiLanguage
        );
    }

    #[test]
    fn test_parse_single_language_block() {
        let html = Html::parse_document(SINGLE_LANGUAGE_BLOCK);
        let article = parse_block(first_block(&html), "경제", Some("글로벌")).unwrap();

        assert_eq!(article.source, "한겨레");
        assert_eq!(article.date, "2025-08-26T02:00:00");
        assert_eq!(article.reliability, Reliability::High);
        assert_eq!(article.title, "해외 기업인 입국심사 빨라진다");
        assert_eq!(article.link, "https://news.example.com/a1");
        assert_eq!(article.summary, "정부가 입국 절차 간소화 계획을 밝혔다.");
        assert_eq!(article.category, "경제");
        assert_eq!(article.sub_category.as_deref(), Some("글로벌"));
    }

    #[test]
    fn test_summary_strips_reliability_annotation() {
        let html = Html::parse_document(SINGLE_LANGUAGE_BLOCK);
        let article = parse_block(first_block(&html), "경제", None).unwrap();
        assert!(!article.summary.contains("신뢰도"));
        assert!(!article.summary.contains("높음"));
        assert!(!article.summary.contains('<'));
    }

    #[test]
    fn test_parse_multi_language_block() {
        let html = Html::parse_document(MULTI_LANGUAGE_BLOCK);
        let article = parse_block(first_block(&html), "경제", None).unwrap();

        assert_eq!(
            article.translated_titles.get("ko"),
            Some("노동시장, 미국 경제 뇌관 되나")
        );
        assert_eq!(
            article.translated_titles.get("en"),
            Some("Is the labor market a risk to the US economy?")
        );
        assert_eq!(article.title, "노동시장, 미국 경제 뇌관 되나");
        assert_eq!(article.link, "https://news.example.com/a2");
        assert_eq!(article.source, "연합뉴스");
        assert_eq!(article.date, "2025-08-25T01:16:45");
        assert_eq!(article.reliability, Reliability::Medium);
    }

    #[test]
    fn test_missing_reliability_defaults_to_unknown() {
        let html = Html::parse_document(
            r#"<div class="article-block">
                 <p>언론사: 뉴스1 | 발행 시간: 2025.08.25 21:00</p>
                 <h3><a href="https://news.example.com/a3">제목</a></h3>
                 <div class="summary">신뢰도 표기가 없는 요약.</div>
               </div>"#,
        );
        let article = parse_block(first_block(&html), "정치", None).unwrap();
        assert_eq!(article.reliability, Reliability::Unknown);
        assert_eq!(article.reliability.rank(), 0);
        assert_eq!(article.summary, "신뢰도 표기가 없는 요약.");
    }

    #[test]
    fn test_plain_text_annotation_is_captured_and_stripped() {
        let html = Html::parse_document(
            r#"<div class="article-block">
                 <h3><a href="https://news.example.com/a4">제목</a></h3>
                 <div class="summary">요약 본문. 신뢰도: 낮음</div>
               </div>"#,
        );
        let article = parse_block(first_block(&html), "사회", None).unwrap();
        assert_eq!(article.reliability, Reliability::Low);
        assert_eq!(article.summary, "요약 본문.");
    }

    #[test]
    fn test_missing_header_uses_defaults() {
        let html = Html::parse_document(
            r#"<div class="article-block">
                 <h3><a href="https://news.example.com/a5">제목만 있는 기사</a></h3>
               </div>"#,
        );
        let article = parse_block(first_block(&html), "문화", None).unwrap();
        assert_eq!(article.source, UNKNOWN_SOURCE);
        // Fallback date must still be a valid ISO timestamp.
        assert!(NaiveDateTime::parse_from_str(&article.date, ISO_FORMAT).is_ok());
    }

    #[test]
    fn test_block_without_title_is_dropped() {
        let html = Html::parse_document(
            r#"<div class="article-block">
                 <p>언론사: YTN | 발행 시간: 2025.08.25 21:00</p>
                 <div class="summary">제목 없는 요약.</div>
               </div>"#,
        );
        assert!(parse_block(first_block(&html), "경제", None).is_none());
    }

    #[test]
    fn test_anchor_without_href_gets_placeholder_link() {
        let html = Html::parse_document(
            r#"<div class="article-block">
                 <h3><a>링크 없는 제목</a></h3>
               </div>"#,
        );
        let article = parse_block(first_block(&html), "경제", None).unwrap();
        assert_eq!(article.link, PLACEHOLDER_LINK);
    }

    #[test]
    fn test_image_url_extraction() {
        let html = Html::parse_document(
            r#"<div class="article-block">
                 <img class="article-image" src="/news-images/economy-1.jpg">
                 <h3><a href="https://news.example.com/a6">제목</a></h3>
               </div>"#,
        );
        let article = parse_block(first_block(&html), "경제", None).unwrap();
        assert_eq!(article.image_url.as_deref(), Some("/news-images/economy-1.jpg"));
    }

    #[test]
    fn test_normalize_dotted_timestamp() {
        assert_eq!(normalize_timestamp("2025.08.26 02:00"), "2025-08-26T02:00:00");
    }

    #[test]
    fn test_normalize_generator_timestamp() {
        assert_eq!(
            normalize_timestamp("2025-08-25 01:16:45"),
            "2025-08-25T01:16:45"
        );
    }

    #[test]
    fn test_normalize_garbage_timestamp_falls_back_to_now() {
        let fallback = normalize_timestamp("방금 전");
        assert!(NaiveDateTime::parse_from_str(&fallback, ISO_FORMAT).is_ok());
    }

    #[test]
    fn test_search_text_is_lowercased_blob() {
        let html = Html::parse_document(
            r#"<div class="article-block">
                 <p>언론사: IT조선 | 발행 시간: 2025.08.25 10:00</p>
                 <h3><a href="https://news.example.com/a7">AI Chip Race</a></h3>
                 <div class="summary">Global AI 경쟁이 가속화되고 있다.</div>
               </div>"#,
        );
        let article = parse_block(first_block(&html), "IT_과학", None).unwrap();
        assert!(article.search_text.contains("ai chip race"));
        assert!(article.search_text.contains("it조선"));
        assert!(!article.search_text.contains("AI"));
    }
}
