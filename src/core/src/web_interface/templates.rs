//! Embedded page templates and static files.
//!
//! Templates use `{{name}}` placeholders filled by plain substitution. Only
//! values produced by this crate (counters, validated base64, timestamps)
//! are substituted, never raw user input.

use rust_embed::RustEmbed;

use crate::screenshot_channel::ScreenshotArtifact;
use crate::work_queue::QueueStatus;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/assets"]
pub struct Assets;

/// A static asset ready to be served.
pub struct StaticFile {
    pub body: Vec<u8>,
    pub mime_type: String,
}

fn template(name: &str) -> Option<String> {
    Assets::get(&format!("templates/{}", name))
        .map(|file| String::from_utf8_lossy(&file.data).into_owned())
}

/// Looks up `static/<name>`.
pub fn static_file(name: &str) -> Option<StaticFile> {
    let path = format!("static/{}", name);
    Assets::get(&path).map(|file| StaticFile {
        body: file.data.into_owned(),
        mime_type: mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string(),
    })
}

/// Submission page. The form is only offered while the queue is unlocked.
pub fn render_index(status: &QueueStatus) -> Option<String> {
    let status_block = if status.locked {
        r#"<p class="locked">Submission locked. Waiting for typing acknowledgement.</p>"#
            .to_string()
    } else {
        r#"<p class="ready">Ready to accept submissions</p>
    <form method="post" action="/submit">
        <label>Secret Key: <input type="password" name="key" required></label><br><br>
        <label>Content: <textarea name="content" rows="10" cols="80" required></textarea></label><br><br>
        <input type="submit" value="Submit">
    </form>"#
            .to_string()
    };

    template("index.html").map(|page| {
        page.replace("{{status_block}}", &status_block)
            .replace("{{queue_size}}", &status.queue_size.to_string())
    })
}

pub fn render_gallery(artifacts: &[ScreenshotArtifact]) -> Option<String> {
    let items = if artifacts.is_empty() {
        "        <p>No screenshots yet.</p>".to_string()
    } else {
        // Newest first on the page.
        artifacts
            .iter()
            .rev()
            .map(|a| {
                format!(
                    "        <figure><img src=\"{}\" alt=\"screenshot {}\"><figcaption>{} &middot; {} bytes</figcaption></figure>",
                    a.data_url(),
                    a.id,
                    a.captured_at.to_rfc3339(),
                    a.size
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    template("gallery.html").map(|page| {
        page.replace("{{count}}", &artifacts.len().to_string())
            .replace("{{items}}", &items)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screenshot_channel::ScreenshotUpload;

    fn status(locked: bool, queue_size: usize) -> QueueStatus {
        QueueStatus {
            locked,
            queue_size,
            latest_preview: "none".to_string(),
        }
    }

    #[test]
    fn test_index_offers_form_when_unlocked() {
        let page = render_index(&status(false, 0)).unwrap();
        assert!(page.contains("<form"));
        assert!(page.contains("Current queue size: 0"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_index_hides_form_when_locked() {
        let page = render_index(&status(true, 1)).unwrap();
        assert!(!page.contains("<form"));
        assert!(page.contains("Submission locked"));
        assert!(page.contains("Current queue size: 1"));
    }

    #[test]
    fn test_gallery_lists_newest_first() {
        let first = ScreenshotArtifact::from_upload(ScreenshotUpload {
            image: "YQ==".into(),
            timestamp: Some("2025-01-01T00:00:00Z".into()),
        })
        .unwrap();
        let second = ScreenshotArtifact::from_upload(ScreenshotUpload {
            image: "Yg==".into(),
            timestamp: Some("2025-01-02T00:00:00Z".into()),
        })
        .unwrap();

        let page = render_gallery(&[first, second]).unwrap();
        let newer = page.find("2025-01-02").unwrap();
        let older = page.find("2025-01-01").unwrap();
        assert!(newer < older);
        assert!(page.contains("Screenshots (2)"));
    }

    #[test]
    fn test_empty_gallery() {
        let page = render_gallery(&[]).unwrap();
        assert!(page.contains("No screenshots yet."));
    }

    #[test]
    fn test_static_stylesheet_has_css_mime() {
        let file = static_file("style.css").unwrap();
        assert_eq!(file.mime_type, "text/css");
        assert!(!file.body.is_empty());
        assert!(static_file("missing.js").is_none());
    }
}
