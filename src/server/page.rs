//! Single-page HTML front end

/// What to show under the input box
pub enum PageBody<'a> {
    Empty,
    Answer { question: &'a str, answer: &'a str },
    Error { question: &'a str, message: &'a str },
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

pub fn render(body: PageBody<'_>) -> String {
    let (value, result) = match body {
        PageBody::Empty => (String::new(), String::new()),
        PageBody::Answer { question, answer } => (
            escape_html(question),
            format!(
                r#"<div class="answer"><strong>Answer:</strong><p>{}</p></div>"#,
                escape_html(answer)
            ),
        ),
        PageBody::Error { question, message } => (
            escape_html(question),
            format!(
                r#"<div class="error"><strong>Error:</strong><p>{}</p></div>"#,
                escape_html(message)
            ),
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>HVAC Business Assistant</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
input[type=text] {{ width: 80%; padding: 0.4rem; }}
.answer {{ margin-top: 1.5rem; white-space: pre-wrap; }}
.error {{ margin-top: 1.5rem; color: #a00; }}
</style>
</head>
<body>
<h1>HVAC Business Assistant</h1>
<form method="get" action="/">
<input type="text" name="q" value="{value}" placeholder="Ask me about work orders, technicians, customers, quotes..." autofocus>
<button type="submit">Ask</button>
</form>
{result}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_answer_is_escaped() {
        let html = render(PageBody::Answer {
            question: "a<b",
            answer: "<script>x</script>",
        });
        assert!(html.contains(r#"value="a&lt;b""#));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_empty_has_form() {
        let html = render(PageBody::Empty);
        assert!(html.contains(r#"name="q""#));
        assert!(!html.contains("class=\"answer\""));
    }
}
