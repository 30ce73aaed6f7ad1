//! HTML views

use std::fmt::Write;

use crate::config::SiteConfig;
use crate::content::{Category, Post};
use crate::helpers::{display_date, html_escape, link_to, truncate};
use crate::remote::{Event, RemoteError, SupabaseClient};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 72rem; padding: 1rem; color: #222; }
nav a { margin-right: 1rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(18rem, 1fr)); gap: 1.5rem; }
.card { border-radius: .5rem; box-shadow: 0 1px 4px rgba(0,0,0,.15); padding: 1rem; }
.card img { width: 100%; height: 12rem; object-fit: cover; border-radius: .375rem; }
.meta { color: #666; font-size: .8rem; }
.notice { border: 1px solid #e0a800; background: #fff8e1; padding: 1rem; border-radius: .5rem; }
.error { border-color: #d93025; background: #fdecea; }
pre { overflow-x: auto; padding: 1rem; }
"#;

/// Wrap a page body in the site chrome
pub fn layout(config: &SiteConfig, title: &str, body: &str) -> String {
    let page_title = if title.is_empty() {
        html_escape(&config.title)
    } else {
        format!("{} | {}", html_escape(title), html_escape(&config.title))
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{page_title}</title>
<style>{STYLE}</style>
</head>
<body>
<nav>{home}{events}{blog}{space}</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        home = link_to("/", "Home"),
        events = link_to("/events", "Events"),
        blog = link_to("/blog", "Blog"),
        space = link_to("/space", "Space"),
    )
}

pub fn env_missing() -> String {
    r#"<section class="notice">
<h1>Environment variables missing</h1>
<p>Please make sure to add the required environment variables to your project.</p>
</section>"#
        .to_string()
}

pub fn home(config: &SiteConfig) -> String {
    let mut html = format!("<h1>{}</h1>\n", html_escape(&config.title));
    if !config.description.is_empty() {
        let _ = writeln!(html, "<p>{}</p>", html_escape(&config.description));
    }
    html.push_str("<ul>\n");
    for (href, label) in [
        ("/events", "Upcoming events"),
        ("/blog", "Blog"),
        ("/space", "Space"),
    ] {
        let _ = writeln!(html, "<li>{}</li>", link_to(href, label));
    }
    html.push_str("</ul>");
    html
}

/// Events grid with registration details
pub fn events(events: &[Event], client: &SupabaseClient, bucket: &str) -> String {
    let mut html = String::from("<h1>Events</h1>\n");

    if events.is_empty() {
        html.push_str("<p>No events yet.</p>");
        return html;
    }

    html.push_str("<div class=\"grid\">\n");
    for event in events {
        html.push_str("<article class=\"card\">\n");

        if let Some(src) = event.image_url(client, bucket) {
            let _ = writeln!(
                html,
                r#"<img src="{}" alt="{}">"#,
                html_escape(&src),
                html_escape(&event.name)
            );
        }

        let _ = writeln!(html, "<h2>{}</h2>", html_escape(&event.name));
        if let Some(description) = &event.description {
            let _ = writeln!(html, "<p>{}</p>", html_escape(description));
        }

        let when = event
            .event_time
            .as_deref()
            .map(display_date)
            .unwrap_or_default();
        let location = event.location.as_deref().unwrap_or_default();
        let _ = writeln!(
            html,
            r#"<p class="meta">📅 {} | 📍 {}</p>"#,
            html_escape(&when),
            html_escape(location)
        );

        let _ = writeln!(
            html,
            r#"<p class="meta">📝 {} registrations</p>"#,
            event.registration_count()
        );
        html.push_str("<div class=\"meta\"><strong>Registered User IDs:</strong>\n<ul>");
        for user in event.registered_users() {
            let _ = write!(html, "<li>{}</li>", html_escape(user));
        }
        html.push_str("</ul></div>\n</article>\n");
    }
    html.push_str("</div>");
    html
}

/// Shown when the remote store could not answer, as opposed to an empty result
pub fn remote_error(section: &str, err: &RemoteError) -> String {
    format!(
        r#"<h1>{}</h1>
<section class="notice error">
<p>Could not load {} right now.</p>
<p class="meta">{}</p>
</section>"#,
        html_escape(section),
        html_escape(&section.to_lowercase()),
        html_escape(&err.to_string())
    )
}

pub fn blogs(rows: &[serde_json::Value]) -> String {
    let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
    format!("<pre>{}</pre>", html_escape(&json))
}

pub fn post_list(category: Category, posts: &[Post]) -> String {
    let heading = match category {
        Category::Blog => "Blog",
        Category::Space => "Space",
    };
    let mut html = format!("<h1>{}</h1>\n", heading);

    if posts.is_empty() {
        html.push_str("<p>Nothing here yet.</p>");
        return html;
    }

    html.push_str("<div class=\"grid\">\n");
    for post in posts {
        let href = format!("/{}/{}", category.dir_name(), post.slug);
        let _ = writeln!(
            html,
            r#"<article class="card">
<img src="{image}" alt="{alt}">
<h2>{title}</h2>
<p>{description}</p>
<p class="meta">{date} · {author} · {reading}</p>
</article>"#,
            image = html_escape(&post.image),
            alt = html_escape(&post.title),
            title = link_to(&href, &post.title),
            description = html_escape(&truncate(&post.description, 200, None)),
            date = html_escape(&display_date(&post.date)),
            author = html_escape(&post.author),
            reading = html_escape(&post.reading_time),
        );
    }
    html.push_str("</div>");
    html
}

pub fn post(post: &Post, content_html: &str) -> String {
    format!(
        r#"<article>
<img src="{image}" alt="{alt}">
<h1>{title}</h1>
<p class="meta">{date} · {author} · {reading}</p>
<div class="content">
{content_html}
</div>
</article>"#,
        image = html_escape(&post.image),
        alt = html_escape(&post.title),
        title = html_escape(&post.title),
        date = html_escape(&display_date(&post.date)),
        author = html_escape(&post.author),
        reading = html_escape(&post.reading_time),
    )
}

pub fn not_found() -> String {
    "<h1>Not found</h1>\n<p>The page you are looking for does not exist.</p>".to_string()
}

pub fn server_error(message: &str) -> String {
    format!(
        "<h1>Something went wrong</h1>\n<section class=\"notice error\"><p>{}</p></section>",
        html_escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;
    use crate::remote::{Registration, RowId};

    fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: Some("https://abc.supabase.co".to_string()),
            anon_key: Some("anon".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn event(registrations: Vec<Registration>) -> Event {
        Event {
            id: RowId::Int(1),
            name: "DevFest <2024>".to_string(),
            post_image: Some("devfest.png".to_string()),
            description: Some("Annual fest".to_string()),
            event_time: Some("2024-11-02".to_string()),
            location: Some("Pune".to_string()),
            created_at: None,
            registrations,
        }
    }

    #[test]
    fn test_events_grid() {
        let html = events(
            &[event(vec![Registration {
                id: RowId::Int(3),
                user_id: Some("u-42".to_string()),
            }])],
            &client(),
            "events",
        );
        assert!(html.contains("DevFest &lt;2024&gt;"));
        assert!(html.contains(
            r#"src="https://abc.supabase.co/storage/v1/object/public/events/devfest.png""#
        ));
        assert!(html.contains("1 registrations"));
        assert!(html.contains("<li>u-42</li>"));
        assert!(html.contains("Nov 2, 2024"));
    }

    #[test]
    fn test_empty_events_differs_from_error() {
        let empty = events(&[], &client(), "events");
        let failed = remote_error("Events", &RemoteError::MissingConfig("url"));
        assert!(empty.contains("No events yet."));
        assert!(!failed.contains("No events yet."));
        assert!(failed.contains("Could not load events"));
    }

    #[test]
    fn test_blogs_dump_is_escaped() {
        let rows = vec![serde_json::json!({"id": 1, "title": "<b>hi</b>"})];
        let html = blogs(&rows);
        assert!(html.starts_with("<pre>["));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
    }

    #[test]
    fn test_layout_title() {
        let config = SiteConfig::default();
        let html = layout(&config, "Events", "<p>x</p>");
        assert!(html.contains("<title>Events | GDG</title>"));
        assert!(html.contains(r#"<a href="/events">Events</a>"#));
    }
}
