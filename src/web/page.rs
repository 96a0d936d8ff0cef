//! Server-rendered chat page.

use std::fmt::Write as _;

use crate::chat::{ChatTurn, Role};

pub const DEFAULT_TITLE: &str = "Gazzi Chatbot";
pub const DEFAULT_ICON: &str = "📚";
pub const INPUT_PLACEHOLDER: &str = "질문을 입력해 주세요.";
pub const PENDING_MESSAGE: &str = "답변을 준비하고 있습니다...";

/// Seconds between reloads while an answer is pending.
const PENDING_REFRESH_SECS: u32 = 2;

const STYLESHEET: &str = "\
body{margin:0;font-family:system-ui,sans-serif;background:#fafafa;color:#222}\
main{max-width:46rem;margin:0 auto;padding:1rem 1rem 6rem}\
.bubble{margin:.75rem 0;padding:.75rem 1rem;border-radius:.75rem;white-space:pre-wrap}\
.bubble .role{display:block;font-size:.75rem;opacity:.6;margin-bottom:.25rem}\
.user{background:#e8f0fe}\
.assistant{background:#fff;border:1px solid #e4e4e4}\
.notice{background:#fdecea;border:1px solid #f5c2c0}\
.pending{opacity:.6;font-style:italic}\
form{position:fixed;bottom:0;left:0;right:0;background:#fafafa;padding:1rem}\
form input{display:block;box-sizing:border-box;width:100%;max-width:46rem;margin:0 auto;\
padding:.75rem;font-size:1rem;border:1px solid #ccc;border-radius:.5rem}";

/// Page chrome set at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub title: String,
    pub icon: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            icon: DEFAULT_ICON.to_string(),
        }
    }
}

/// One rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub role: Role,
    pub html: String,
}

pub fn render_transcript(turns: &[ChatTurn]) -> Vec<Bubble> {
    turns
        .iter()
        .map(|turn| Bubble {
            role: turn.role(),
            html: format!(
                r#"<div class="bubble {role}"><span class="role">{role}</span>{content}</div>"#,
                role = turn.role(),
                content = escape_html(turn.content()),
            ),
        })
        .collect()
}

/// Renders the whole page.
///
/// With `pending`, the last user turn is still waiting for its answer: a
/// placeholder bubble is shown and the page reloads itself until it arrives.
pub fn render_page(
    page: &PageConfig,
    turns: &[ChatTurn],
    pending: bool,
    notice: Option<&str>,
) -> String {
    let title = escape_html(&page.title);
    let refresh = if pending {
        format!("<meta http-equiv=\"refresh\" content=\"{PENDING_REFRESH_SECS}\">\n")
    } else {
        String::new()
    };
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         {refresh}<title>{title}</title>\n\
         <link rel=\"icon\" href=\"{icon}\">\n\
         <style>{STYLESHEET}</style>\n\
         </head>\n<body>\n<main>\n<h1>{title}</h1>\n\
         <section id=\"transcript\">\n",
        icon = favicon_href(&page.icon),
    );

    for bubble in render_transcript(turns) {
        html.push_str(&bubble.html);
        html.push('\n');
    }

    if pending {
        let _ = writeln!(
            html,
            r#"<div class="bubble assistant pending"><span class="role">assistant</span>{PENDING_MESSAGE}</div>"#
        );
    }

    if let Some(notice) = notice {
        let _ = writeln!(
            html,
            r#"<div class="bubble assistant notice"><span class="role">assistant</span>{}</div>"#,
            escape_html(notice)
        );
    }

    let _ = write!(
        html,
        "</section>\n</main>\n\
         <form method=\"post\" action=\"/\">\n\
         <input type=\"text\" name=\"question\" placeholder=\"{INPUT_PLACEHOLDER}\" \
         autocomplete=\"off\" autofocus>\n\
         </form>\n\
         <script>window.scrollTo(0, document.body.scrollHeight);</script>\n\
         </body>\n</html>\n"
    );

    html
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders an emoji (or any short text) as an SVG favicon data URL.
fn favicon_href(icon: &str) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'>\
         <text y='.9em' font-size='90'>{}</text></svg>",
        escape_html(icon)
    );
    format!("data:image/svg+xml,{}", urlencoding::encode(&svg))
}
