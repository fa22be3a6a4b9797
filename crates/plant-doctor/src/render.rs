/// HTML pages for the web front end.
///
/// Pages are assembled with `format!`; every interpolated value goes through
/// `escape` first.
use std::fmt::Write;

use plant_common::diagnosis::Diagnosis;

const INDEX_HTML: &str = include_str!("../templates/index.html");

pub fn index_page() -> &'static str {
    INDEX_HTML
}

pub struct ResultView<'a> {
    pub diagnosis: Diagnosis<'a>,
    pub location: Option<&'a str>,
    pub image_url: &'a str,
}

pub fn result_page(view: &ResultView<'_>) -> String {
    let record = view.diagnosis.record;

    let mut steps = String::new();
    for step in &record.treatment {
        let _ = writeln!(steps, "      <li>{}</li>", escape(step));
    }

    let pesticide = match &record.pesticide {
        Some(p) => format!(
            r#"    <section class="pesticide">
      <h2>Pesticide guidance</h2>
      <p><strong>Chemical:</strong> {} &mdash; {}</p>
      <p><strong>Organic:</strong> {} &mdash; {}</p>
    </section>
"#,
            escape(&p.chemical.name),
            escape(&p.chemical.usage),
            escape(&p.organic.name),
            escape(&p.organic.usage),
        ),
        None => String::new(),
    };

    let location = match view.location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(l) => format!("    <p class=\"location\">Location: {}</p>\n", escape(l)),
        None => String::new(),
    };

    let status = if view.diagnosis.healthy {
        "    <p class=\"status healthy\">Your plant looks healthy.</p>\n"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{name} | Plant Doctor</title>
</head>
<body>
  <main>
    <h1>{name}</h1>
    <img src="{image_url}" alt="Uploaded plant image" width="320">
{status}    <p class="description">{description}</p>
    <p class="severity">Severity: {severity}</p>
{location}    <section class="treatment">
      <h2>Treatment</h2>
      <ol>
{steps}      </ol>
    </section>
{pesticide}    <a href="/">Analyze another image</a>
  </main>
</body>
</html>
"#,
        name = escape(&record.name),
        image_url = escape(view.image_url),
        description = escape(&record.description),
        severity = escape(record.severity.as_str()),
    )
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
