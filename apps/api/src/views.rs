//! Server-rendered pages of the contact form.

use crate::dto::ContactMessageRequest;

const PAGE_STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:1rem}input,textarea{width:100%;padding:.4rem}\
.alert{padding:.75rem;border:1px solid #c33;background:#fee;color:#811}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Renders the contact form, optionally with a validation message and the
/// values the visitor already typed.
pub fn contact_page(values: &ContactMessageRequest, error: Option<&str>) -> String {
    let alert = error
        .map(|message| format!("<div class=\"alert\" role=\"alert\">{}</div>\n", escape_html(message)))
        .unwrap_or_default();

    let body = format!(
        "<h1>Contact us</h1>\n{alert}<form method=\"post\" action=\"/contact\">\n\
         <label for=\"name\">Name</label>\n\
         <input id=\"name\" name=\"name\" maxlength=\"100\" required value=\"{name}\">\n\
         <label for=\"email\">Email</label>\n\
         <input id=\"email\" name=\"email\" type=\"email\" maxlength=\"100\" required value=\"{email}\">\n\
         <label for=\"message\">Message</label>\n\
         <textarea id=\"message\" name=\"message\" rows=\"6\" required>{message}</textarea>\n\
         <p><button type=\"submit\">Send</button></p>\n</form>",
        name = escape_html(values.name.as_str()),
        email = escape_html(values.email.as_str()),
        message = escape_html(values.message.as_str()),
    );

    layout("Contact", body.as_str())
}

pub fn thanks_page() -> String {
    layout(
        "Thank you",
        "<h1>Thank you</h1>\n<p>Your message has been received. We will get back to you soon.</p>\n\
         <p><a href=\"/contact\">Send another message</a></p>",
    )
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1>\n<div class=\"alert\" role=\"alert\">{}</div>\n\
         <p><a href=\"/contact\">Back to the form</a></p>",
        escape_html(message)
    );

    layout("Error", body.as_str())
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
