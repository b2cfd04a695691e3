//! HTML rendering for outcomes and the chat page.
//!
//! All user and model text passes through [`escape_html`]; model output is
//! never trusted as markup.

use sukoon::guidance::{GuidanceOutcome, GuidanceResponse};

use crate::view::ViewState;

/// Heads the verse card only; the other cards are model commentary.
pub const VERSE_LABEL: &str = "Quranic guidance / Hadith";
/// "Explanation in Urdu".
pub const EXPLANATION_LABEL: &str = "اردو میں وضاحت";

const RTL_ATTRS: &str = " dir=\"rtl\" lang=\"ur\"";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape and keep line breaks.
fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text).replace('\n', "<br>"))
}

fn card(class: &str, attrs: &str, label: Option<&str>, body: &str) -> String {
    let heading = label
        .map(|l| format!("<h3>{}</h3>", escape_html(l)))
        .unwrap_or_default();
    format!("<div class=\"card {class}\"{attrs}>{heading}{}</div>", paragraph(body))
}

fn render_response(response: &GuidanceResponse) -> String {
    let mut html = card("english", "", None, &response.english_segment);
    if let Some(verse) = &response.verse_segment {
        html.push_str(&card("verse", "", Some(VERSE_LABEL), verse));
    }
    if let Some(urdu) = &response.urdu_segment {
        html.push_str(&card("urdu", RTL_ATTRS, Some(EXPLANATION_LABEL), urdu));
    }
    html
}

/// Cards for one outcome. Empty for [`GuidanceOutcome::NoSubmission`].
pub fn render_outcome(outcome: &GuidanceOutcome) -> String {
    match outcome {
        GuidanceOutcome::NoSubmission => String::new(),
        GuidanceOutcome::Crisis { helpline } => card("crisis", " role=\"alert\"", None, helpline),
        GuidanceOutcome::Guidance(response) => render_response(response),
        GuidanceOutcome::Apology { message } => card("apology", "", None, message),
    }
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:42rem;margin:2rem auto;padding:0 1rem}\
body.light{background:#fafaf7;color:#1d1d1b}\
body.dark{background:#15181c;color:#e8e6e1}\
.card{border-radius:.75rem;padding:1rem 1.25rem;margin:.75rem 0;border:1px solid #8884}\
.card h3{margin:0 0 .5rem;font-size:.9rem;opacity:.8}\
.verse{border-left:4px solid #2f7d5b}\
.urdu{font-size:1.15rem;line-height:2}\
.crisis{border:2px solid #c0392b}\
.apology{opacity:.85}\
form{display:flex;gap:.5rem}\
textarea{flex:1;min-height:4rem}";

const SCRIPT: &str = r#"
const form = document.getElementById('ask');
const answers = document.getElementById('answers');
form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const message = form.message.value;
  const resp = await fetch('/api/guidance', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({message}),
  });
  if (resp.status === 204) return;
  const reply = await resp.json();
  answers.innerHTML = reply.html;
  form.message.value = '';
});
document.getElementById('theme').addEventListener('click', async () => {
  const resp = await fetch('/api/theme', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: '{}',
  });
  const view = await resp.json();
  document.body.className = view.theme;
});
"#;

/// The full chat page for the current view.
pub fn render_page(view: &ViewState) -> String {
    let title = escape_html(&view.title);
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n\
<body class=\"{theme}\">\n<header><h1>{title}</h1>\
<button id=\"theme\" type=\"button\">Toggle theme</button></header>\n\
<form id=\"ask\"><textarea name=\"message\" placeholder=\"What is on your heart?\"></textarea>\
<button type=\"submit\">Ask</button></form>\n\
<section id=\"answers\"></section>\n<script>{SCRIPT}</script>\n</body>\n</html>\n",
        theme = view.theme.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukoon::guidance::ParseQuality;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>'"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;&#39;"
        );
        assert_eq!(escape_html("صبر"), "صبر");
    }

    #[test]
    fn segmented_response_renders_three_cards() {
        let outcome = GuidanceOutcome::Guidance(GuidanceResponse::segmented(
            "Stay strong.",
            "Patience is the key to relief.",
            "صبر کلید ہے۔",
        ));
        let html = render_outcome(&outcome);
        assert!(html.contains("<div class=\"card english\"><p>Stay strong.</p></div>"));
        assert!(html.contains(VERSE_LABEL));
        assert!(html.contains("<div class=\"card urdu\" dir=\"rtl\" lang=\"ur\">"));
        assert!(html.contains("صبر کلید ہے۔"));
    }

    #[test]
    fn scripture_label_heads_only_the_verse_card() {
        let outcome = GuidanceOutcome::Guidance(GuidanceResponse::segmented(
            "Stay strong.",
            "Patience is the key to relief.",
            "صبر کلید ہے۔",
        ));
        let html = render_outcome(&outcome);
        assert_eq!(html.matches(VERSE_LABEL).count(), 1);
        assert!(html.contains(&format!(
            "<div class=\"card verse\"><h3>{VERSE_LABEL}</h3><p>Patience is the key to relief.</p></div>"
        )));
        assert!(html.contains(&format!(
            "<div class=\"card urdu\" dir=\"rtl\" lang=\"ur\"><h3>{EXPLANATION_LABEL}</h3><p>صبر کلید ہے۔</p></div>"
        )));
        assert!(!html.contains("حدیث"));
    }

    #[test]
    fn unsegmented_response_renders_english_only() {
        let response = GuidanceResponse::unsegmented("line one\nline two");
        assert_eq!(response.quality, ParseQuality::Unsegmented);
        let html = render_outcome(&GuidanceOutcome::Guidance(response));
        assert!(html.contains("line one<br>line two"));
        assert!(!html.contains("card verse"));
        assert!(!html.contains("card urdu"));
    }

    #[test]
    fn model_markup_is_escaped() {
        let outcome = GuidanceOutcome::Guidance(GuidanceResponse::unsegmented(
            "<img src=x onerror=alert(1)>",
        ));
        let html = render_outcome(&outcome);
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn crisis_card_is_an_alert() {
        let html = render_outcome(&GuidanceOutcome::Crisis {
            helpline: "Call 1122".into(),
        });
        assert!(html.starts_with("<div class=\"card crisis\" role=\"alert\">"));
        assert!(html.contains("Call 1122"));
    }

    #[test]
    fn no_submission_renders_nothing() {
        assert!(render_outcome(&GuidanceOutcome::NoSubmission).is_empty());
    }

    #[test]
    fn page_uses_view_theme_and_escaped_title() {
        let mut view = ViewState::default().with_title("Sukoon <beta>");
        view.apply_theme(None);
        let page = render_page(&view);
        assert!(page.contains("<body class=\"dark\">"));
        assert!(page.contains("<title>Sukoon &lt;beta&gt;</title>"));
    }
}
