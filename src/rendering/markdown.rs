use pulldown_cmark::{html, Event, Options, Parser};

/// Render a blog body from Markdown to sanitized HTML.
///
/// GitHub Flavored Markdown extensions are enabled (tables, footnotes,
/// strikethrough, task lists). Single newlines inside a paragraph become
/// `<br>`, and the output is passed through an allow-list sanitizer so raw
/// HTML in a post cannot inject scripts.
pub fn render_markdown(raw: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(raw, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    ammonia::Builder::default()
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tags(&["input"])
        .clean(&html_output)
        .to_string()
}
